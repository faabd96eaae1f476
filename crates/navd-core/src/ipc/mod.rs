//! IPC module for daemon-client communication
//!
//! Unix socket based IPC between the long-running daemon and the
//! short-lived per-shell client invocations.

mod client;
mod protocol;
mod server;

pub use client::DaemonClient;
pub use protocol::{Command, Reply, Request};
pub use server::{DaemonServer, DaemonState};
