//! IPC client for connecting to the daemon
//!
//! One connection per request; the client keeps no state of its own.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::{Command, Reply, Request};
use crate::session::Pid;
use crate::{Error, Result};

#[derive(Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Send one command and return the daemon's reply
    pub async fn request(&self, pid: Pid, command: Command) -> Result<Reply> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            Error::Transport(format!(
                "failed to connect to daemon at {}: {}. Is the daemon running?",
                self.socket_path.display(),
                e
            ))
        })?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let request_json = serde_json::to_string(&Request::new(pid, command))?;
        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut reply_line = String::new();
        reader.read_line(&mut reply_line).await?;
        if reply_line.is_empty() {
            return Err(Error::Transport("daemon closed the connection".to_string()));
        }

        Ok(serde_json::from_str(&reply_line)?)
    }
}
