//! Envelopes: immutable recipes that assemble a [`Message`].
//!
//! [`Mime`] is the base envelope. The decorators wrap any envelope and
//! post-process what it assembles:
//!
//! - [`Strict`] rejects messages without recipients, sender or subject
//! - [`Safe`] fills those gaps with placeholders instead
//! - [`Constant`] memoizes assembly in an [`EnvelopeCache`]
//! - [`Draft`] marks the message as a draft
//!
//! Messages are returned as `Arc<Message>`. Decorators that change a message
//! copy it first when it is shared, so a cached message is never modified.

mod constant;
mod draft;
mod mime;
mod safe;
mod strict;

pub use constant::{Constant, DEFAULT_TTL, EnvelopeCache};
pub use draft::Draft;
pub use mime::{Element, Mime};
pub use safe::Safe;
pub use strict::Strict;

use crate::enclosure::Enclosure;
use crate::error::Result;
use courier_mime::Message;
use std::sync::Arc;

/// Something that can assemble a message.
pub trait Envelope: Send + Sync {
    /// Assembles the message.
    ///
    /// # Errors
    ///
    /// Returns an error if any stamp or enclosure fails, or if a decorator
    /// rejects the result.
    fn unwrap(&self) -> Result<Arc<Message>>;

    /// Structural identity of this envelope, used as the cache key by
    /// [`Constant`].
    fn key(&self) -> EnvelopeKey;
}

/// Hashable identity of an envelope.
///
/// A [`Mime`] is identified by its enclosures alone; stamps do not take
/// part. Two envelopes that differ only in headers therefore share a cache
/// entry under [`Constant`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnvelopeKey {
    /// The [`Empty`] envelope.
    Empty,
    /// A base envelope, by its enclosures.
    Mime(Arc<Vec<Enclosure>>),
    /// A decorator around another envelope.
    Decorated(&'static str, Box<EnvelopeKey>),
}

impl EnvelopeKey {
    pub(crate) fn decorated(name: &'static str, inner: Self) -> Self {
        Self::Decorated(name, Box::new(inner))
    }
}

/// An envelope that always assembles an empty message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Empty;

impl Envelope for Empty {
    fn unwrap(&self) -> Result<Arc<Message>> {
        Ok(Arc::new(Message::new()))
    }

    fn key(&self) -> EnvelopeKey {
        EnvelopeKey::Empty
    }
}

impl<E: Envelope + ?Sized> Envelope for &E {
    fn unwrap(&self) -> Result<Arc<Message>> {
        (**self).unwrap()
    }

    fn key(&self) -> EnvelopeKey {
        (**self).key()
    }
}

impl<E: Envelope + ?Sized> Envelope for Box<E> {
    fn unwrap(&self) -> Result<Arc<Message>> {
        (**self).unwrap()
    }

    fn key(&self) -> EnvelopeKey {
        (**self).key()
    }
}

impl<E: Envelope + ?Sized> Envelope for Arc<E> {
    fn unwrap(&self) -> Result<Arc<Message>> {
        (**self).unwrap()
    }

    fn key(&self) -> EnvelopeKey {
        (**self).key()
    }
}
