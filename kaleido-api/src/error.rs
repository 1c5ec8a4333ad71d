use thiserror::Error;

/// Errors raised while building commands from caller input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// An argument cannot be expressed on the wire
    ///
    /// Newlines terminate a command, so they are rejected in every argument;
    /// markup characters are rejected where the device takes them verbatim.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// A name given on the command line or in configuration is not known
    #[error("Unknown {what}: {value}")]
    UnknownValue { what: &'static str, value: String },
}

impl ApiError {
    pub(crate) fn invalid(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::invalid("layout", "must not be empty");
        assert_eq!(err.to_string(), "Invalid parameter 'layout': must not be empty");

        let err = ApiError::UnknownValue {
            what: "tally colour",
            value: "blue".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown tally colour: blue");
    }
}
