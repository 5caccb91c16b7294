//! Dry-run postman.

use super::{Postman, list};
use crate::envelope::{Envelope, Strict};
use crate::error::Result;

/// Validates envelopes like [`Mailer`](super::Mailer) but only logs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Console;

impl Postman for Console {
    fn send(&self, envelope: &dyn Envelope) -> Result<()> {
        let message = Strict::new(envelope).unwrap()?;
        tracing::info!(
            subject = %message.subject().unwrap_or_default(),
            from = %list(message.from()),
            to = %list(message.all_recipients()),
            "fake email"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::envelope::Mime;
    use crate::stamp::{StRecipient, StSender, StSubject};

    #[test]
    fn test_accepts_complete_envelope() {
        let envelope = Mime::new()
            .with(StSender::new("from@example.com").unwrap())
            .with(StRecipient::new("to@example.com").unwrap())
            .with(StSubject::new("hi"));
        assert!(Console.send(&envelope).is_ok());
    }

    #[test]
    fn test_rejects_incomplete_envelope() {
        let envelope = Mime::new().with(StSubject::new("hi"));
        let err = Console.send(&envelope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
