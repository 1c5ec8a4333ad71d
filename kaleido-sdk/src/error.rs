use std::time::Duration;

use kaleido_session::DeviceStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Command error: {0}")]
    Api(#[from] kaleido_api::ApiError),

    #[error("Session error: {0}")]
    Session(#[from] kaleido_session::SessionError),

    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    #[error("Layout not found: {0}")]
    LayoutNotFound(String),

    #[error("Device not ready after {timeout:?} (last status: {status})")]
    NotReady {
        timeout: Duration,
        status: DeviceStatus,
    },
}

pub type Result<T> = std::result::Result<T, SdkError>;
