//! Error types for reply parsing

use thiserror::Error;

/// Errors raised while decoding a complete reply element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The element could not be decoded as markup at all
    #[error("XML decoding failed: {0}")]
    XmlDecodingFailed(String),

    /// The element decoded, but its body does not have the expected shape
    #[error("Malformed reply body: {0}")]
    MalformedBody(String),

    /// A child element the reply shape requires was absent or misnamed
    #[error("Unexpected element <{found}>, expected <{expected}>")]
    UnexpectedElement { expected: String, found: String },

    /// An acknowledgement arrived where a payload was required
    #[error("Expected a payload but the device answered with a bare acknowledgement")]
    UnexpectedAcknowledgement,
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
