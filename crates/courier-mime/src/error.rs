//! Error types for MIME operations.

use std::string::FromUtf8Error;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid MIME header.
    #[error("Invalid MIME header: {0}")]
    InvalidHeader(String),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Invalid encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Charset is not one we can encode to or decode from.
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Text contains a character the charset cannot represent.
    #[error("Character {ch:?} cannot be represented in {charset}")]
    Unrepresentable {
        /// Offending character.
        ch: char,
        /// Charset that was requested.
        charset: &'static str,
    },

    /// Invalid email address or mailbox syntax.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Returns true if this error comes from charset handling.
    #[must_use]
    pub const fn is_charset(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCharset(_) | Self::Unrepresentable { .. }
        )
    }
}
