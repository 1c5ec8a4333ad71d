use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while configuring or driving a device session
#[derive(Error, Debug)]
pub enum SessionError {
    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The TCP connection could not be established in time
    #[error("Connecting to {address} timed out after {timeout:?}")]
    ConnectTimeout { address: String, timeout: Duration },

    /// Socket-level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command could not be built from caller input
    #[error("Invalid command: {0}")]
    Command(#[from] kaleido_api::ApiError),

    /// The session task is gone
    #[error("Session channel has been closed")]
    ChannelClosed,

    /// The session task panicked or was cancelled
    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
