//! IPC server for the daemon
//!
//! Listens on the root-scoped Unix socket and serves one request per
//! connection: read a line, dispatch, write one reply line, close.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use super::protocol::{Command, Reply, Request};
use crate::session::SessionRegistry;
use crate::tags::TagStore;
use crate::Result;

/// All mutable daemon state. Held behind one lock so no two mutations
/// of the tag store or of the same session's stack ever interleave,
/// and so persistence happens inside the mutating critical section.
pub struct DaemonState {
    pub tags: TagStore,
    pub sessions: SessionRegistry,
}

impl DaemonState {
    pub fn new(tags: TagStore) -> Self {
        Self {
            tags,
            sessions: SessionRegistry::new(),
        }
    }
}

pub struct DaemonServer {
    state: Arc<Mutex<DaemonState>>,
    socket_path: PathBuf,
}

impl DaemonServer {
    pub fn new(state: DaemonState, socket_path: PathBuf) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            socket_path,
        }
    }

    /// Run the accept loop until the shutdown channel fires
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        // Remove old socket file if exists
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("Listening on {}", self.socket_path.display());

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let state = self.state.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, state).await {
                                    warn!("Error handling connection: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutting down");
                        break;
                    }
                }
            }
        }

        // Session and stack state dies with the daemon; tags are
        // already durable from per-mutation writes.
        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

async fn handle_connection(stream: UnixStream, state: Arc<Mutex<DaemonState>>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut line = String::new();
    reader.read_line(&mut line).await?;

    // Parse before touching any state; a bad request never partially
    // applies and never leaves the client waiting.
    let reply = match serde_json::from_str::<Request>(&line) {
        Ok(request) => {
            debug!(pid = request.pid, ?request.command, "Received request");
            let mut state = state.lock().await;
            handle_request(&mut state, request)
        }
        Err(e) => {
            warn!("Failed to parse request: {}", e);
            Reply::err(format!("malformed request: {e}"))
        }
    };

    let reply_json = serde_json::to_string(&reply)?;
    writer.write_all(reply_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    Ok(())
}

/// Dispatch one validated request against the daemon state
fn handle_request(state: &mut DaemonState, request: Request) -> Reply {
    let pid = request.pid;

    if !request.command.bypasses_session_check() && !state.sessions.is_active(pid) {
        warn!("Shell {pid} is not registered");
        return Reply::err(format!("shell {pid} is not registered"));
    }

    match request.command {
        Command::Register => {
            state.sessions.register(pid);
            Reply::Ok
        }
        Command::Unregister => {
            if state.sessions.unregister(pid) {
                Reply::Ok
            } else {
                Reply::err(format!("shell {pid} is not registered"))
            }
        }
        Command::Add { name, path } => match state.tags.add(&name, &path) {
            Ok(()) => Reply::Ok,
            Err(e) => {
                error!("Failed to persist tag '{name}': {e}");
                Reply::err(e.to_string())
            }
        },
        Command::Get { name } => match state.tags.get(&name) {
            Some(path) => Reply::value(path),
            None => Reply::Bad,
        },
        Command::Delete { name } => match state.tags.delete(&name) {
            Ok(true) => Reply::Ok,
            Ok(false) => Reply::Bad,
            Err(e) => {
                error!("Failed to persist tag delete '{name}': {e}");
                Reply::err(e.to_string())
            }
        },
        Command::Show => Reply::value(state.tags.format_all()),
        Command::List => Reply::value(state.tags.names()),
        Command::Push { path } => {
            state.sessions.push(pid, path);
            Reply::Ok
        }
        Command::Pop => match state.sessions.pop(pid) {
            Some(path) => Reply::value(path),
            None => Reply::Bad,
        },
        Command::Actions => Reply::value(state.sessions.actions(pid)),
        Command::Reset => {
            state.sessions.reset(pid);
            Reply::Ok
        }
    }
}
