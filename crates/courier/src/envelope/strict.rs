//! Validating decorator.

use super::{Envelope, EnvelopeKey};
use crate::error::{Error, Result};
use courier_mime::Message;
use std::sync::Arc;

/// Fails unless the message has recipients, a sender and a subject.
#[derive(Debug, Clone)]
pub struct Strict<E> {
    origin: E,
}

impl<E> Strict<E> {
    /// Wraps an envelope.
    pub const fn new(origin: E) -> Self {
        Self { origin }
    }
}

impl<E: Envelope> Envelope for Strict<E> {
    fn unwrap(&self) -> Result<Arc<Message>> {
        let message = self.origin.unwrap()?;
        if message.all_recipients().is_empty() {
            return Err(Error::Validation("list of recipients is empty".into()));
        }
        if message.from().is_empty() {
            return Err(Error::Validation("list of senders is empty".into()));
        }
        if message.raw_subject().is_none() {
            return Err(Error::Validation("subject is empty".into()));
        }
        Ok(message)
    }

    fn key(&self) -> EnvelopeKey {
        EnvelopeKey::decorated("strict", self.origin.key())
    }
}
