//! Network delivery behind two small traits.
//!
//! A [`Wire`] knows where to connect; each connection is a [`Transport`]
//! that sends messages until it is closed. [`Smtp`] and [`Smtps`] are the
//! wires shipped with this crate.

mod smtp;

pub use smtp::{Smtp, Smtps};

use crate::error::TransportError;
use courier_mime::{Address, Message};

/// Result type alias for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// An open delivery channel.
pub trait Transport: Send {
    /// Delivers `message` to every address in `recipients`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the message or the connection
    /// fails.
    fn send(&mut self, message: &Message, recipients: &[Address]) -> TransportResult<()>;

    /// Releases the channel. Calling it twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel could not be shut down cleanly.
    fn close(&mut self) -> TransportResult<()>;
}

/// A source of transports.
pub trait Wire: Send + Sync {
    /// Opens a new transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&self) -> TransportResult<Box<dyn Transport>>;
}

impl<W: Wire + ?Sized> Wire for &W {
    fn connect(&self) -> TransportResult<Box<dyn Transport>> {
        (**self).connect()
    }
}

impl<W: Wire + ?Sized> Wire for Box<W> {
    fn connect(&self) -> TransportResult<Box<dyn Transport>> {
        (**self).connect()
    }
}

impl<W: Wire + ?Sized> Wire for std::sync::Arc<W> {
    fn connect(&self) -> TransportResult<Box<dyn Transport>> {
        (**self).connect()
    }
}
