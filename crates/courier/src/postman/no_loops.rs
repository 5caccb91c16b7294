//! Policy that keeps a message from being mailed back to its author.

use super::Postman;
use crate::envelope::Envelope;
use crate::error::Result;
use courier_mime::Mailbox;
use std::collections::BTreeSet;

/// Forwards envelopes unless a recipient is also the sender or the reply-to
/// address. Addresses are compared case-insensitively; display names are
/// ignored. Without a Reply-To header, From is used in its place.
#[derive(Debug, Clone)]
pub struct PostNoLoops<P> {
    origin: P,
}

impl<P> PostNoLoops<P> {
    /// Wraps a postman.
    pub const fn new(origin: P) -> Self {
        Self { origin }
    }
}

impl<P: Postman> Postman for PostNoLoops<P> {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        let message = envelope.unwrap()?;
        let recipients = normalized(message.all_recipients());

        let checks = [
            ("Reply-To and Recipients", message.effective_reply_to()),
            ("Recipients and From", message.from()),
        ];
        for (what, mailboxes) in checks {
            let overlap: Vec<String> = normalized(mailboxes)
                .intersection(&recipients)
                .cloned()
                .collect();
            if !overlap.is_empty() {
                tracing::info!(
                    overlap = %overlap.join(", "),
                    "{what} intersect, email not sent"
                );
                return Ok(());
            }
        }

        self.origin.send(envelope)
    }
}

fn normalized<'a>(mailboxes: impl IntoIterator<Item = &'a Mailbox>) -> BTreeSet<String> {
    mailboxes
        .into_iter()
        .map(|mailbox| mailbox.address.normalized())
        .collect()
}
