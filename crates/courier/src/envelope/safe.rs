//! Default-filling decorator.

use super::{Envelope, EnvelopeKey};
use crate::error::Result;
use courier_mime::{Charset, Mailbox, Message, RecipientType};
use std::sync::Arc;

/// Placeholder recipient.
const RECIPIENT: &str = "to@example.com";

/// Placeholder sender.
const SENDER: &str = "from@example.com";

/// Placeholder subject: the decorator's own name.
const SUBJECT: &str = "courier::envelope::Safe";

/// Fills a missing recipient, sender or subject with a placeholder and
/// logs a warning, so the message always passes [`Strict`](super::Strict).
#[derive(Debug, Clone)]
pub struct Safe<E> {
    origin: E,
}

impl<E> Safe<E> {
    /// Wraps an envelope.
    pub const fn new(origin: E) -> Self {
        Self { origin }
    }
}

impl<E: Envelope> Envelope for Safe<E> {
    fn unwrap(&self) -> Result<Arc<Message>> {
        let mut shared = self.origin.unwrap()?;

        if shared.all_recipients().is_empty() {
            Arc::make_mut(&mut shared).add_recipient(RecipientType::To, Mailbox::new(RECIPIENT)?);
            tracing::warn!(recipient = RECIPIENT, "recipient was missing, fake one added");
        }
        if shared.from().is_empty() {
            Arc::make_mut(&mut shared).set_from(Mailbox::new(SENDER)?);
            tracing::warn!(sender = SENDER, "sender was missing, fake one set");
        }
        if shared.raw_subject().is_none() {
            Arc::make_mut(&mut shared).set_subject(SUBJECT, Charset::UsAscii)?;
            tracing::warn!(subject = SUBJECT, "subject was missing, fake one set");
        }

        Ok(shared)
    }

    fn key(&self) -> EnvelopeKey {
        EnvelopeKey::decorated("safe", self.origin.key())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::envelope::{Empty, Mime, Strict};
    use crate::stamp::{StRecipient, StSender, StSubject};

    #[test]
    fn test_fills_everything_on_empty() {
        let message = Safe::new(Empty).unwrap().unwrap();
        assert_eq!(message.all_recipients()[0].address.as_str(), RECIPIENT);
        assert_eq!(message.from()[0].address.as_str(), SENDER);
        assert_eq!(message.raw_subject(), Some(SUBJECT));
    }

    #[test]
    fn test_missing_sender_is_filled_not_rejected() {
        let envelope = Mime::new()
            .with(StRecipient::new("to@example.com").unwrap())
            .with(StSubject::new("hi"));

        assert!(Strict::new(envelope.clone()).unwrap().is_err());
        let message = Safe::new(envelope).unwrap().unwrap();
        assert_eq!(message.from()[0].address.as_str(), "from@example.com");
    }

    #[test]
    fn test_existing_values_are_kept() {
        let envelope = Mime::new()
            .with(StSender::new("me@example.com").unwrap())
            .with(StRecipient::new("you@example.com").unwrap())
            .with(StSubject::new("hi"));
        let message = Safe::new(envelope).unwrap().unwrap();

        assert_eq!(message.from()[0].address.as_str(), "me@example.com");
        assert_eq!(message.all_recipients().len(), 1);
        assert_eq!(message.raw_subject(), Some("hi"));
    }

    #[test]
    fn test_safe_makes_strict_pass() {
        assert!(Strict::new(Safe::new(Empty)).unwrap().is_ok());
    }
}
