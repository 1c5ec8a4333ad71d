//! Events reported by a session to the layers above it

use std::fmt;

use kaleido_api::{Context, Scope};

/// Connection health as shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Connecting,
    Ok,
    Disconnected,
    ConnectionFailure,
    /// Something unexpected happened but the session carries on
    UnknownWarning,
    /// An internal consistency fault, such as a reply nobody asked for
    UnknownError,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceStatus::Connecting => "connecting",
            DeviceStatus::Ok => "ok",
            DeviceStatus::Disconnected => "disconnected",
            DeviceStatus::ConnectionFailure => "connection_failure",
            DeviceStatus::UnknownWarning => "unknown_warning",
            DeviceStatus::UnknownError => "unknown_error",
        };
        f.write_str(name)
    }
}

/// Something the session wants its collaborators to know about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Status {
        status: DeviceStatus,
        message: Option<String>,
    },

    /// The device answered `<nack/>`
    CommandRejected { command: String, context: Context },

    /// No reply arrived before the command timeout
    CommandTimedOut { command: String },

    /// A derived state value changed
    StateChanged { scope: Scope, property: &'static str },
}

impl SessionEvent {
    pub(crate) fn status(status: DeviceStatus, message: impl Into<Option<String>>) -> Self {
        SessionEvent::Status {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(DeviceStatus::ConnectionFailure.to_string(), "connection_failure");
        assert_eq!(DeviceStatus::Ok.to_string(), "ok");
    }

    #[test]
    fn test_status_constructor() {
        assert_eq!(
            SessionEvent::status(DeviceStatus::Ok, None),
            SessionEvent::Status {
                status: DeviceStatus::Ok,
                message: None
            }
        );
    }
}
