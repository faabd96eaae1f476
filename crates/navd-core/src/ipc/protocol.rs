//! IPC protocol definitions for daemon-client communication
//!
//! Newline-framed JSON over a Unix socket, one request per connection.

use serde::{Deserialize, Serialize};

use crate::session::Pid;

/// One client request: the issuing shell's PID plus the command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub pid: Pid,
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    pub fn new(pid: Pid, command: Command) -> Self {
        Self { pid, command }
    }
}

/// The closed set of daemon commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Register,
    Unregister,
    Add { name: String, path: String },
    Get { name: String },
    Delete { name: String },
    Show,
    List,
    Push { path: String },
    Pop,
    Actions,
    Reset,
}

impl Command {
    /// Whether the command may run without an active session.
    /// Only `register` qualifies, since it is what creates one.
    pub fn bypasses_session_check(&self) -> bool {
        matches!(self, Command::Register)
    }
}

/// One daemon reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    /// Void success
    Ok,
    /// Successful query with a literal result
    Value { value: String },
    /// Well-formed query that found nothing
    Bad,
    /// Protocol error; the request was rejected
    Err { message: String },
}

impl Reply {
    pub fn value(value: impl Into<String>) -> Self {
        Reply::Value {
            value: value.into(),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Reply::Err {
            message: message.into(),
        }
    }

    /// Protocol-level success. Logical negatives count as success;
    /// only rejected requests fail.
    pub fn is_success(&self) -> bool {
        !matches!(self, Reply::Err { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::new(
            123456,
            Command::Add {
                name: "test".to_string(),
                path: "/tmp/".to_string(),
            },
        );
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"op\":\"add\""));
        assert!(json.contains("\"pid\":123456"));
    }

    #[test]
    fn test_request_round_trip() {
        let req = Request::new(7, Command::Get { name: "x".to_string() });
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pid, 7);
        assert_eq!(back.command, req.command);
    }

    #[test]
    fn test_unknown_verb_is_rejected() {
        let err = serde_json::from_str::<Request>(r#"{"pid":1,"op":"teleport"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        let err = serde_json::from_str::<Request>(r#"{"pid":1,"op":"add","name":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_only_register_bypasses_session_check() {
        assert!(Command::Register.bypasses_session_check());
        assert!(!Command::Pop.bypasses_session_check());
        assert!(!Command::Unregister.bypasses_session_check());
    }

    #[test]
    fn test_reply_success() {
        assert!(Reply::Ok.is_success());
        assert!(Reply::Bad.is_success());
        assert!(Reply::value("/tmp/").is_success());
        assert!(!Reply::err("no such shell").is_success());
    }
}
