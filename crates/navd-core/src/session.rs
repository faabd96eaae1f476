//! Session registry and per-session navigation stacks
//!
//! Each shell registers under its PID and owns one in-memory stack of
//! visited paths. The stack lives and dies with the session; nothing
//! here is persisted.

use std::collections::HashMap;

use tracing::info;

pub type Pid = u32;

#[derive(Debug, Default)]
struct Session {
    stack: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Pid, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shell. A second register for an active PID is a
    /// no-op, not an error.
    pub fn register(&mut self, pid: Pid) {
        if self.sessions.contains_key(&pid) {
            info!("Shell {pid} already registered");
            return;
        }
        self.sessions.insert(pid, Session::default());
        info!("Shell {pid} registered");
    }

    /// Unregister a shell, discarding its stack. Returns false for an
    /// unknown PID so the caller can reject the request instead of
    /// leaving the client waiting.
    pub fn unregister(&mut self, pid: Pid) -> bool {
        if self.sessions.remove(&pid).is_some() {
            info!("Shell {pid} unregistered");
            true
        } else {
            false
        }
    }

    pub fn is_active(&self, pid: Pid) -> bool {
        self.sessions.contains_key(&pid)
    }

    /// Push a path onto the owning session's stack. Only called for
    /// active sessions; an unknown PID is ignored.
    pub fn push(&mut self, pid: Pid, path: String) {
        if let Some(session) = self.sessions.get_mut(&pid) {
            session.stack.push(path);
        }
    }

    /// Pop the most recent path. An empty stack is a well-defined
    /// negative outcome.
    pub fn pop(&mut self, pid: Pid) -> Option<String> {
        self.sessions.get_mut(&pid)?.stack.pop()
    }

    /// Numbered top-down listing of the session's stack
    pub fn actions(&self, pid: Pid) -> String {
        let Some(session) = self.sessions.get(&pid) else {
            return String::new();
        };

        session
            .stack
            .iter()
            .rev()
            .enumerate()
            .map(|(i, path)| format!("    {}. {}", i + 1, path))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clear the session's stack
    pub fn reset(&mut self, pid: Pid) {
        if let Some(session) = self.sessions.get_mut(&pid) {
            session.stack.clear();
        }
    }

    pub fn stack_depth(&self, pid: Pid) -> usize {
        self.sessions.get(&pid).map_or(0, |s| s.stack.len())
    }
}
