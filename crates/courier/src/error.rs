//! Error types for envelope assembly and delivery.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while assembling or sending an envelope.
#[derive(Debug, Error)]
pub enum Error {
    /// A stamp or enclosure is missing a required field or was given
    /// malformed input.
    #[error("Construction error: {0}")]
    Construction(String),

    /// The assembled message is incomplete.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A charset is unsupported or cannot represent the text.
    #[error("Encoding error: {0}")]
    Encoding(#[source] courier_mime::Error),

    /// Reading an attachment failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connecting, sending or closing failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Sending failed and closing the transport afterwards failed too.
    #[error("Transport error: {send} (closing also failed: {close})")]
    Cleanup {
        /// The delivery failure.
        #[source]
        send: TransportError,
        /// The failure raised while releasing the transport.
        close: TransportError,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input to a stamp or enclosure, including unreadable attachments.
    Construction,
    /// Strict validation failed.
    Validation,
    /// Network delivery failed.
    Transport,
    /// Charset handling failed.
    Encoding,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Construction(_) | Self::Io(_) => ErrorKind::Construction,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Transport(_) | Self::Cleanup { .. } => ErrorKind::Transport,
        }
    }

    pub(crate) fn absent(what: &str) -> Self {
        Self::Construction(format!("{what} can't be absent"))
    }
}

impl From<courier_mime::Error> for Error {
    fn from(err: courier_mime::Error) -> Self {
        match err {
            courier_mime::Error::InvalidAddress(msg) => Self::Construction(msg),
            other => Self::Encoding(other),
        }
    }
}

/// Errors raised by a [`Wire`](crate::wire::Wire) or
/// [`Transport`](crate::wire::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// SMTP conversation failed.
    #[error(transparent)]
    Smtp(#[from] courier_smtp::Error),

    /// I/O error outside the SMTP conversation.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Operation did not finish in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Session properties are missing or malformed.
    #[error("Invalid session configuration: {0}")]
    Config(String),

    /// The message could not be rendered for transmission.
    #[error("Message could not be rendered: {0}")]
    Render(#[from] courier_mime::Error),

    /// Any other delivery failure.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_errors_are_classified() {
        let err: Error = courier_mime::Error::InvalidAddress("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::Construction);

        let err: Error = courier_mime::Error::UnsupportedCharset("KOI8-R".into()).into();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn test_cleanup_keeps_send_failure_as_source() {
        use std::error::Error as _;

        let err = Error::Cleanup {
            send: TransportError::Other("rejected".into()),
            close: TransportError::Other("broken pipe".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.source().map(ToString::to_string), Some("rejected".to_string()));
        assert!(err.to_string().contains("broken pipe"));
    }
}
