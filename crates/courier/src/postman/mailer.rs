//! Postman that delivers through a wire.

use super::{Postman, list};
use crate::envelope::{Envelope, Strict};
use crate::error::{Error, Result};
use crate::wire::{Transport, TransportResult, Wire};
use courier_mime::{Address, Message};

/// Validates every envelope strictly and sends it over a fresh transport.
///
/// The transport is closed on every path, including when sending fails. A
/// send failure is reported even if closing fails as well; the close failure
/// then rides along in [`Error::Cleanup`].
#[derive(Debug, Clone)]
pub struct Mailer<W> {
    wire: W,
}

impl<W> Mailer<W> {
    /// Creates a mailer over `wire`.
    pub const fn new(wire: W) -> Self {
        Self { wire }
    }
}

impl<W: Wire> Postman for Mailer<W> {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        let message = Strict::new(envelope).unwrap()?;
        let mut connection = Connection::new(self.wire.connect()?);
        let recipients: Vec<Address> = message
            .all_recipients()
            .into_iter()
            .map(|mailbox| mailbox.address.clone())
            .collect();
        let sent = connection.send(&message, &recipients);
        let closed = connection.close();

        match (sent, closed) {
            (Ok(()), Ok(())) => {
                tracing::info!(
                    from = %list(message.from()),
                    to = %list(message.all_recipients()),
                    "email sent"
                );
                Ok(())
            }
            (Err(send), Ok(())) => Err(Error::Transport(send)),
            (Ok(()), Err(close)) => Err(Error::Transport(close)),
            (Err(send), Err(close)) => Err(Error::Cleanup { send, close }),
        }
    }
}

/// Closes the transport when dropped unless it was closed explicitly.
struct Connection {
    transport: Box<dyn Transport>,
    open: bool,
}

impl Connection {
    fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            open: true,
        }
    }

    fn send(&mut self, message: &Message, recipients: &[Address]) -> TransportResult<()> {
        self.transport.send(message, recipients)
    }

    fn close(&mut self) -> TransportResult<()> {
        self.open = false;
        self.transport.close()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.transport.close() {
                tracing::warn!(error = %e, "failed to close transport");
            }
        }
    }
}
