pub mod config;
pub mod error;
pub mod ipc;
pub mod session;
pub mod tags;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use ipc::{Command, DaemonClient, DaemonServer, DaemonState, Reply, Request};
pub use session::{Pid, SessionRegistry};
pub use tags::TagStore;
