use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navd_core::{AppConfig, Command, DaemonClient, Error, Pid, Reply};

#[derive(Parser)]
#[command(name = "nav")]
#[command(author, version, about = "Directory-navigation client")]
struct Cli {
    /// Root directory for the daemon socket
    #[arg(short = 'd', long = "root")]
    root: Option<PathBuf>,

    /// PID of the issuing shell (use $$ in bash)
    pid: Pid,

    #[command(subcommand)]
    command: ClientCommand,
}

#[derive(Subcommand)]
enum ClientCommand {
    /// Register this shell with the daemon
    Register,
    /// Unregister this shell and discard its action stack
    Unregister,
    /// Add a tag-path association
    Add { name: String, path: String },
    /// Retrieve the path for a tag
    Get { name: String },
    /// Remove a tag
    Delete { name: String },
    /// Show all tag-path associations
    Show,
    /// List tag names only
    List,
    /// Save a path on the action stack
    Push { path: String },
    /// Take the last path off the action stack
    Pop,
    /// List all recorded actions
    Actions,
    /// Clear the action stack
    Reset,
}

impl From<ClientCommand> for Command {
    fn from(cmd: ClientCommand) -> Self {
        match cmd {
            ClientCommand::Register => Command::Register,
            ClientCommand::Unregister => Command::Unregister,
            ClientCommand::Add { name, path } => Command::Add { name, path },
            ClientCommand::Get { name } => Command::Get { name },
            ClientCommand::Delete { name } => Command::Delete { name },
            ClientCommand::Show => Command::Show,
            ClientCommand::List => Command::List,
            ClientCommand::Push { path } => Command::Push { path },
            ClientCommand::Pop => Command::Pop,
            ClientCommand::Actions => Command::Actions,
            ClientCommand::Reset => Command::Reset,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("nav: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let root = config.resolve_root(cli.root.as_deref());
    let client = DaemonClient::new(AppConfig::socket_path(&root));

    match client.request(cli.pid, cli.command.into()).await {
        Ok(Reply::Ok) => {
            println!("OK");
            ExitCode::SUCCESS
        }
        Ok(Reply::Value { value }) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Ok(Reply::Bad) => {
            // A well-formed query that found nothing still succeeds
            println!("BAD");
            ExitCode::SUCCESS
        }
        Ok(Reply::Err { message }) => {
            eprintln!("nav: {message}");
            println!("BAD");
            ExitCode::FAILURE
        }
        Err(Error::Transport(message)) => {
            eprintln!("nav: {message}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("nav: {e}");
            ExitCode::FAILURE
        }
    }
}
