//! Policy that keeps drafts from being sent.

use super::Postman;
use crate::envelope::Envelope;
use crate::error::Result;

/// Forwards envelopes unless the assembled message is flagged as a draft.
#[derive(Debug, Clone)]
pub struct PostNoDrafts<P> {
    origin: P,
}

impl<P> PostNoDrafts<P> {
    /// Wraps a postman.
    pub const fn new(origin: P) -> Self {
        Self { origin }
    }
}

impl<P: Postman> Postman for PostNoDrafts<P> {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        let message = envelope.unwrap()?;
        if message.flags.is_draft() {
            tracing::info!("message has DRAFT flag, ignoring");
            return Ok(());
        }
        self.origin.send(envelope)
    }
}
