//! Draft-flag decorator.

use super::{Envelope, EnvelopeKey};
use crate::error::Result;
use courier_mime::{Flag, Message};
use std::sync::Arc;

/// Sets the `DRAFT` flag on the assembled message.
#[derive(Debug, Clone)]
pub struct Draft<E> {
    origin: E,
}

impl<E> Draft<E> {
    /// Wraps an envelope.
    pub const fn new(origin: E) -> Self {
        Self { origin }
    }
}

impl<E: Envelope> Envelope for Draft<E> {
    fn unwrap(&self) -> Result<Arc<Message>> {
        let mut message = self.origin.unwrap()?;
        if !message.flags.is_draft() {
            Arc::make_mut(&mut message).set_flag(Flag::Draft, true);
        }
        Ok(message)
    }

    fn key(&self) -> EnvelopeKey {
        EnvelopeKey::decorated("draft", self.origin.key())
    }
}
