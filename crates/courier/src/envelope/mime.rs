//! The base envelope.

use super::{Envelope, EnvelopeKey};
use crate::enclosure::{EnBinary, EnHtml, EnPlain, Enclosure};
use crate::error::Result;
use crate::stamp::{StBcc, StCc, StHeader, StRecipient, StReplyTo, StSender, StSubject, Stamp};
use courier_mime::Message;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A stamp or an enclosure, as accepted by [`Mime::with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Applied to headers, in order.
    Stamp(Stamp),
    /// Becomes a body part, in order.
    Enclosure(Enclosure),
}

impl From<Stamp> for Element {
    fn from(stamp: Stamp) -> Self {
        Self::Stamp(stamp)
    }
}

impl From<Enclosure> for Element {
    fn from(enclosure: Enclosure) -> Self {
        Self::Enclosure(enclosure)
    }
}

macro_rules! impl_from_element {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_element!(Stamp: StSender, StRecipient, StCc, StBcc, StReplyTo, StSubject, StHeader);
impl_from_element!(Enclosure: EnPlain, EnHtml, EnBinary);

/// Immutable list of stamps and enclosures.
///
/// [`with`](Self::with) returns a new envelope and leaves the receiver
/// untouched; the list that did not grow stays shared between the two.
///
/// Equality and hashing consider enclosures only.
#[derive(Debug, Clone, Default)]
pub struct Mime {
    stamps: Arc<Vec<Stamp>>,
    enclosures: Arc<Vec<Enclosure>>,
}

impl Mime {
    /// Creates an envelope with nothing in it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an envelope from existing lists.
    #[must_use]
    pub fn from_parts(stamps: Vec<Stamp>, enclosures: Vec<Enclosure>) -> Self {
        Self {
            stamps: Arc::new(stamps),
            enclosures: Arc::new(enclosures),
        }
    }

    /// Returns a new envelope with `element` appended.
    #[must_use]
    pub fn with(&self, element: impl Into<Element>) -> Self {
        let mut next = self.clone();
        match element.into() {
            Element::Stamp(stamp) => Arc::make_mut(&mut next.stamps).push(stamp),
            Element::Enclosure(enclosure) => Arc::make_mut(&mut next.enclosures).push(enclosure),
        }
        next
    }

    /// Stamps in application order.
    #[must_use]
    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    /// Enclosures in body-part order.
    #[must_use]
    pub fn enclosures(&self) -> &[Enclosure] {
        &self.enclosures
    }
}

impl PartialEq for Mime {
    fn eq(&self, other: &Self) -> bool {
        self.enclosures == other.enclosures
    }
}

impl Eq for Mime {}

impl Hash for Mime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.enclosures.hash(state);
    }
}

impl Envelope for Mime {
    /// Builds every body part first and applies stamps only when all of
    /// them succeeded.
    fn unwrap(&self) -> Result<Arc<Message>> {
        let parts = self
            .enclosures
            .iter()
            .map(Enclosure::part)
            .collect::<Result<Vec<_>>>()?;

        let mut message = Message::new();
        for stamp in self.stamps.iter() {
            stamp.attach(&mut message)?;
        }
        message.parts = parts;

        tracing::debug!(
            stamps = self.stamps.len(),
            parts = message.parts.len(),
            "envelope assembled"
        );
        Ok(Arc::new(message))
    }

    fn key(&self) -> EnvelopeKey {
        EnvelopeKey::Mime(Arc::clone(&self.enclosures))
    }
}
