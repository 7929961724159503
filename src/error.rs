//! Error types for PEC parsing

use thiserror::Error;

/// Errors that can occur while parsing PEC envelopes and their content
#[derive(Error, Debug)]
pub enum ParseError {
    /// Failed to parse the message structure
    #[error("Failed to parse message structure: {0}")]
    Structure(String),

    /// Failed to decode a transfer-encoded body
    #[error("Failed to decode content: {0}")]
    Decode(String),

    /// Header value outside the set the PEC rules allow
    #[error("Invalid header format for {header}: {details}")]
    InvalidHeader { header: String, details: String },

    /// Invalid extractor configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<base64::DecodeError> for ParseError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<mailparse::MailParseError> for ParseError {
    fn from(err: mailparse::MailParseError) -> Self {
        Self::Structure(err.to_string())
    }
}

/// Result type for PEC parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
