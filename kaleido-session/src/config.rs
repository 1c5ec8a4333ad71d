//! Configuration for the session engine and the TCP client

use std::time::Duration;

use kaleido_api::DEFAULT_PORT;

use crate::error::{Result, SessionError};

/// Settings the sans-IO [`Session`](crate::Session) needs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Device host, used to open the root context
    pub host: String,

    /// How long the command in flight may wait for its reply
    /// Default: 10 seconds
    pub command_timeout: Duration,

    /// Working buffer size at which an unfinished reply is declared malformed
    /// Default: 64 KiB
    pub max_buffer_len: usize,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            command_timeout: Duration::from_secs(10),
            max_buffer_len: 64 * 1024,
        }
    }
}

/// Configuration for [`KaleidoClient`](crate::KaleidoClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Device host name or IP address; required
    pub host: String,

    /// Control port
    /// Default: 13000
    pub port: u16,

    /// Timeout for establishing the TCP connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Per-command reply deadline
    /// Default: 10 seconds
    pub command_timeout: Duration,

    /// Bound on the working buffer
    /// Default: 64 KiB
    pub max_buffer_len: usize,

    /// How often the in-flight command is checked against its deadline
    /// Default: 250 milliseconds
    pub timeout_check_interval: Duration,

    /// Delay before reconnecting after the connection drops or fails;
    /// `None` stops the client instead
    /// Default: 5 seconds
    pub reconnect_interval: Option<Duration>,

    /// Capacity of the session event broadcast channel
    /// Default: 256
    pub event_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(10),
            max_buffer_len: 64 * 1024,
            timeout_check_interval: Duration::from_millis(250),
            reconnect_interval: Some(Duration::from_secs(5)),
            event_buffer_size: 256,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration and return the first issue found
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SessionError::Configuration("Host must not be empty".to_string()));
        }

        if self.host.contains(['<', '>', '\n', '\r']) {
            return Err(SessionError::Configuration(
                "Host must not contain markup or line breaks".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(SessionError::Configuration("Port must be greater than 0".to_string()));
        }

        if self.connect_timeout == Duration::ZERO || self.command_timeout == Duration::ZERO {
            return Err(SessionError::Configuration(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.timeout_check_interval == Duration::ZERO
            || self.timeout_check_interval > self.command_timeout
        {
            return Err(SessionError::Configuration(
                "Timeout check interval must be between 0 and the command timeout".to_string(),
            ));
        }

        if self.max_buffer_len == 0 {
            return Err(SessionError::Configuration(
                "Max buffer length must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(SessionError::Configuration(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` for the socket connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The subset handed to the session engine
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            host: self.host.clone(),
            command_timeout: self.command_timeout,
            max_buffer_len: self.max_buffer_len,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_max_buffer_len(mut self, len: usize) -> Self {
        self.max_buffer_len = len;
        self
    }

    pub fn with_timeout_check_interval(mut self, interval: Duration) -> Self {
        self.timeout_check_interval = interval;
        self
    }

    pub fn with_reconnect_interval(mut self, interval: Option<Duration>) -> Self {
        self.reconnect_interval = interval;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 13000);
        assert_eq!(config.command_timeout, Duration::from_secs(10));
        assert_eq!(config.max_buffer_len, 65536);
        // A host is required
        assert!(config.validate().is_err());
        assert!(ClientConfig::new("10.0.0.5").validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(ClientConfig::new("  ").validate().is_err());
        assert!(ClientConfig::new("bad<host>").validate().is_err());
        assert!(ClientConfig::new("h").with_port(0).validate().is_err());
        assert!(ClientConfig::new("h")
            .with_command_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ClientConfig::new("h")
            .with_timeout_check_interval(Duration::from_secs(60))
            .validate()
            .is_err());
        assert!(ClientConfig::new("h").with_event_buffer_size(0).validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new("10.0.0.5")
            .with_port(14000)
            .with_connect_timeout(Duration::from_secs(1))
            .with_command_timeout(Duration::from_secs(3))
            .with_max_buffer_len(1024)
            .with_reconnect_interval(None);

        assert_eq!(config.address(), "10.0.0.5:14000");
        assert!(config.validate().is_ok());

        let session = config.session_config();
        assert_eq!(session.host, "10.0.0.5");
        assert_eq!(session.command_timeout, Duration::from_secs(3));
        assert_eq!(session.max_buffer_len, 1024);
    }
}
