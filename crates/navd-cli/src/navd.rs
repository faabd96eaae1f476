use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navd_core::{AppConfig, DaemonServer, DaemonState, TagStore};

#[derive(Parser)]
#[command(name = "navd")]
#[command(author, version, about = "Directory-navigation daemon")]
struct Cli {
    /// Root directory for the socket and tag file
    #[arg(short = 'd', long = "root")]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let root = config.resolve_root(cli.root.as_deref());
    std::fs::create_dir_all(&root)
        .with_context(|| format!("cannot create root directory {}", root.display()))?;
    info!("Using root directory {}", root.display());

    // A missing tag file means an empty store; an unreadable one is
    // fatal here, before the socket is bound.
    let tags = TagStore::load(AppConfig::tag_file_path(&root))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let server = DaemonServer::new(DaemonState::new(tags), AppConfig::socket_path(&root));
    server.run(shutdown_rx).await?;

    Ok(())
}
