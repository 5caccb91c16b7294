//! Dispatch: postmen deliver envelopes, policies decide whether they should.
//!
//! [`Mailer`] sends through a [`Wire`](crate::wire::Wire), [`Console`] only
//! logs. [`PostNoDrafts`] and [`PostNoLoops`] wrap any postman and drop
//! envelopes that must not leave.

mod console;
mod mailer;
mod no_drafts;
mod no_loops;

pub use console::Console;
pub use mailer::Mailer;
pub use no_drafts::PostNoDrafts;
pub use no_loops::PostNoLoops;

use crate::envelope::Envelope;
use crate::error::Result;
use courier_mime::Mailbox;
use std::sync::Arc;

/// Something that delivers envelopes.
pub trait Postman: Send + Sync {
    /// Delivers the message assembled from `envelope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be assembled or validated, or
    /// if delivery fails.
    fn send(&self, envelope: &dyn Envelope) -> Result<()>;
}

impl<P: Postman + ?Sized> Postman for &P {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        (**self).send(envelope)
    }
}

impl<P: Postman + ?Sized> Postman for Box<P> {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        (**self).send(envelope)
    }
}

impl<P: Postman + ?Sized> Postman for Arc<P> {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        (**self).send(envelope)
    }
}

/// Comma-separated mailboxes for log lines.
fn list<'a>(mailboxes: impl IntoIterator<Item = &'a Mailbox>) -> String {
    mailboxes
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
