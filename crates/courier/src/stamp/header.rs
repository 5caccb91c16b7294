//! Arbitrary header stamp.

use crate::error::{Error, Result};
use courier_mime::{Charset, Headers, Mailbox, Message, RecipientType};
use serde::{Deserialize, Serialize};

/// Adds a header; an existing header with the same name is kept.
///
/// Headers that [`Message`] keeps in structured form are routed there:
/// `From`, `To`, `Cc`, `Bcc` and `Reply-To` take one mailbox and add it to
/// the matching list, and `Subject` replaces the subject, since a message
/// has only one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StHeader {
    name: Option<String>,
    value: Option<String>,
}

impl StHeader {
    /// Creates a header stamp.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }

    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the name or value is absent, or the
    /// name is not a valid header field name.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        let name = self.name.as_deref().ok_or_else(|| Error::absent("Header name"))?;
        let value = self.value.as_deref().ok_or_else(|| Error::absent("Header value"))?;

        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
            return Err(Error::Construction(format!(
                "Invalid header name: {}",
                name.escape_debug()
            )));
        }

        match name.to_ascii_lowercase().as_str() {
            "from" => message.add_from(Mailbox::parse(value)?),
            "to" => message.add_recipient(RecipientType::To, Mailbox::parse(value)?),
            "cc" => message.add_recipient(RecipientType::Cc, Mailbox::parse(value)?),
            "bcc" => message.add_recipient(RecipientType::Bcc, Mailbox::parse(value)?),
            "reply-to" => message.add_reply_to(Mailbox::parse(value)?),
            "subject" => message.set_subject(value, Charset::Utf8)?,
            _ => message
                .headers
                .add(name, Headers::encode_value(value, Charset::Utf8)?),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_headers_accumulate() {
        let mut message = Message::new();
        StHeader::new("X-Tag", "one").attach(&mut message).unwrap();
        StHeader::new("X-Tag", "two").attach(&mut message).unwrap();
        assert_eq!(message.headers.get_all("x-tag"), vec!["one", "two"]);
    }

    #[test]
    fn test_non_ascii_value_is_encoded() {
        let mut message = Message::new();
        StHeader::new("X-Note", "привет").attach(&mut message).unwrap();
        let raw = message.headers.get("X-Note").unwrap();
        assert!(raw.is_ascii());
        assert_eq!(Headers::decode_value(raw).unwrap(), "привет");
    }

    #[test]
    fn test_line_breaks_cannot_inject_headers() {
        let mut message = Message::new();
        StHeader::new("X-Note", "a\r\nBcc: evil@example.com")
            .attach(&mut message)
            .unwrap();
        let raw = message.headers.get("X-Note").unwrap();
        assert!(!raw.contains('\r') && !raw.contains('\n'));
    }

    #[test]
    fn test_address_headers_are_structured() {
        let mut message = Message::new();
        for (name, value) in [
            ("From", "Jeff <jeff@example.com>"),
            ("to", "a@example.com"),
            ("CC", "b@example.com"),
            ("Bcc", "c@example.com"),
            ("Reply-To", "desk@example.com"),
        ] {
            StHeader::new(name, value).attach(&mut message).unwrap();
        }

        assert_eq!(message.from()[0].name.as_deref(), Some("Jeff"));
        assert_eq!(message.recipients(RecipientType::To).count(), 1);
        assert_eq!(message.recipients(RecipientType::Cc).count(), 1);
        assert_eq!(message.recipients(RecipientType::Bcc).count(), 1);
        assert_eq!(message.reply_to()[0].address.as_str(), "desk@example.com");
        assert!(!message.headers.contains("From"));
        assert!(!message.headers.contains("Bcc"));

        let err = StHeader::new("To", "not an address")
            .attach(&mut message)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_subject_header_replaces_subject() {
        let mut message = Message::new();
        crate::stamp::StSubject::new("first")
            .attach(&mut message)
            .unwrap();
        StHeader::new("Subject", "second").attach(&mut message).unwrap();

        assert_eq!(message.headers.get_all("Subject"), vec!["second"]);
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "Bad Name", "Bad:Name"] {
            let err = StHeader::new(name, "x").attach(&mut Message::new()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Construction, "{name}");
        }
    }

    #[test]
    fn test_absent_value_fails_at_attach() {
        let stamp: StHeader = serde_json::from_str(r#"{"name":"X-Tag"}"#).unwrap();
        let err = stamp.attach(&mut Message::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }
}
