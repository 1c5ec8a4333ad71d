//! Outbound side of a session
//!
//! The session never touches a socket. It hands finished lines to a
//! [`Transport`], which either writes them itself or holds them for an async
//! driver to flush.

use std::collections::VecDeque;
use std::io;

/// Where outbound command lines go
pub trait Transport {
    /// Whether a send can currently succeed
    fn is_connected(&self) -> bool;

    /// Send one line; `line` already carries its trailing newline
    fn send(&mut self, line: &str) -> io::Result<()>;
}

/// Transport that collects lines for a driver to write out
#[derive(Debug, Default)]
pub struct Outbox {
    connected: bool,
    lines: VecDeque<String>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            self.lines.clear();
        }
    }

    /// Take every line queued since the last call
    pub fn take(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Transport for Outbox {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, line: &str) -> io::Result<()> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "outbox is not connected"));
        }
        self.lines.push_back(line.to_string());
        Ok(())
    }
}
