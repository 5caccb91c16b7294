//! Stamps that put mailboxes on a message.

use crate::error::{Error, Result};
use courier_mime::{Charset, Mailbox, Message, RecipientType};
use serde::{Deserialize, Serialize};

/// A mailbox rendered in header form (`addr` or `Name <addr>`, with the
/// name RFC 2047 encoded when needed), or absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
struct Email(Option<String>);

impl Email {
    fn parse(addr: &str) -> Result<Self> {
        Self::mailbox(&Mailbox::parse(addr)?)
    }

    fn named(name: &str, addr: &str, charset: &str) -> Result<Self> {
        let charset = Charset::lookup(charset)?;
        Self::mailbox(&Mailbox::with_name(name, addr)?.in_charset(charset))
    }

    fn mailbox(mailbox: &Mailbox) -> Result<Self> {
        Ok(Self(Some(mailbox.to_header()?)))
    }

    fn resolve(&self) -> Result<Mailbox> {
        let raw = self.0.as_deref().ok_or_else(|| Error::absent("Email address"))?;
        Ok(Mailbox::parse(raw)?)
    }
}

macro_rules! address_stamp {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Email);

        impl $name {
            /// Creates the stamp from `addr`, `<addr>` or `Name <addr>`.
            ///
            /// # Errors
            ///
            /// Returns a construction error if the syntax is malformed.
            pub fn new(addr: &str) -> Result<Self> {
                Email::parse(addr).map(Self)
            }

            /// Creates the stamp from a display name and an address, encoding
            /// the name in UTF-8 when needed.
            ///
            /// # Errors
            ///
            /// Returns a construction error if the address is malformed.
            pub fn named(name: &str, addr: &str) -> Result<Self> {
                Self::named_in(name, addr, "UTF-8")
            }

            /// Creates the stamp from a display name, an address and the
            /// charset used to encode the name.
            ///
            /// # Errors
            ///
            /// Returns a construction error if the address is malformed, or an
            /// encoding error if the charset is unsupported or cannot
            /// represent the name.
            pub fn named_in(name: &str, addr: &str, charset: &str) -> Result<Self> {
                Email::named(name, addr, charset).map(Self)
            }

            /// Creates the stamp from a mailbox.
            ///
            /// # Errors
            ///
            /// Returns an encoding error if the mailbox charset cannot
            /// represent its display name.
            pub fn from_mailbox(mailbox: &Mailbox) -> Result<Self> {
                Email::mailbox(mailbox).map(Self)
            }

            /// The mailbox in header form, if present.
            #[must_use]
            pub fn email(&self) -> Option<&str> {
                self.0.0.as_deref()
            }
        }
    };
}

address_stamp! {
    /// Sets the sender (`From`), replacing any previous one.
    StSender
}

address_stamp! {
    /// Adds a `To` recipient.
    StRecipient
}

address_stamp! {
    /// Adds a `Cc` recipient.
    StCc
}

address_stamp! {
    /// Adds a `Bcc` recipient. Never rendered into the message text.
    StBcc
}

address_stamp! {
    /// Sets `Reply-To`, replacing any previous value.
    StReplyTo
}

impl StSender {
    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the address is absent or malformed.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        message.set_from(self.0.resolve()?);
        Ok(())
    }
}

impl StRecipient {
    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the address is absent or malformed.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        message.add_recipient(RecipientType::To, self.0.resolve()?);
        Ok(())
    }
}

impl StCc {
    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the address is absent or malformed.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        message.add_recipient(RecipientType::Cc, self.0.resolve()?);
        Ok(())
    }
}

impl StBcc {
    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the address is absent or malformed.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        message.add_recipient(RecipientType::Bcc, self.0.resolve()?);
        Ok(())
    }
}

impl StReplyTo {
    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the address is absent or malformed.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        message.set_reply_to(vec![self.0.resolve()?]);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_sender_replaces() {
        let mut message = Message::new();
        StSender::new("first@example.com").unwrap().attach(&mut message).unwrap();
        StSender::new("Jeff <second@example.com>")
            .unwrap()
            .attach(&mut message)
            .unwrap();

        assert_eq!(message.from().len(), 1);
        assert_eq!(message.from()[0].address.as_str(), "second@example.com");
        assert_eq!(message.from()[0].name.as_deref(), Some("Jeff"));
    }

    #[test]
    fn test_recipients_accumulate() {
        let mut message = Message::new();
        let stamp = StRecipient::new("to@example.com").unwrap();
        stamp.attach(&mut message).unwrap();
        stamp.attach(&mut message).unwrap();
        StCc::new("cc@example.com").unwrap().attach(&mut message).unwrap();
        StBcc::new("bcc@example.com").unwrap().attach(&mut message).unwrap();

        assert_eq!(message.recipients(RecipientType::To).count(), 2);
        assert_eq!(message.recipients(RecipientType::Cc).count(), 1);
        assert_eq!(message.recipients(RecipientType::Bcc).count(), 1);
    }

    #[test]
    fn test_reply_to_replaces() {
        let mut message = Message::new();
        StReplyTo::new("one@example.com").unwrap().attach(&mut message).unwrap();
        StReplyTo::new("two@example.com").unwrap().attach(&mut message).unwrap();
        assert_eq!(message.reply_to().len(), 1);
        assert_eq!(message.reply_to()[0].address.as_str(), "two@example.com");
    }

    #[test]
    fn test_named_non_ascii_is_encoded() {
        let stamp = StRecipient::named("Иван Петров", "ivan@example.com").unwrap();
        let email = stamp.email().unwrap();
        assert!(email.is_ascii());
        assert!(email.starts_with("=?UTF-8?Q?"));

        let mut message = Message::new();
        stamp.attach(&mut message).unwrap();
        let to = message.recipients(RecipientType::To).next().unwrap();
        assert_eq!(to.name.as_deref(), Some("Иван Петров"));
    }

    #[test]
    fn test_named_in_latin1() {
        let stamp = StSender::named_in("José", "jose@example.com", "iso-8859-1").unwrap();
        assert!(stamp.email().unwrap().starts_with("=?ISO-8859-1?Q?"));
    }

    #[test]
    fn test_malformed_address_fails_at_construction() {
        let err = StSender::new("Jeff <broken").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
        assert!(StCc::new("no-at-sign").is_err());
    }

    #[test]
    fn test_unsupported_charset_fails_at_construction() {
        let err = StSender::named_in("Jeff", "jeff@example.com", "KOI8-R").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn test_names_resembling_encoded_words_are_kept() {
        let mut message = Message::new();

        StSender::new("Q=?A <qa@example.com>")
            .unwrap()
            .attach(&mut message)
            .unwrap();
        assert_eq!(message.from()[0].name.as_deref(), Some("Q=?A"));

        StSender::named("Who=?x?y", "qa@example.com")
            .unwrap()
            .attach(&mut message)
            .unwrap();
        assert_eq!(message.from()[0].name.as_deref(), Some("Who=?x?y"));
        assert_eq!(message.from()[0].address.as_str(), "qa@example.com");
    }

    #[test]
    fn test_absent_address_fails_at_attach() {
        let stamp: StBcc = serde_json::from_str("null").unwrap();
        let err = stamp.attach(&mut Message::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_from_mailbox() {
        let mailbox = Mailbox::with_name("Doe, Jane", "jane@example.com").unwrap();
        let stamp = StSender::from_mailbox(&mailbox).unwrap();
        assert_eq!(stamp.email(), Some("\"Doe, Jane\" <jane@example.com>"));

        let mut message = Message::new();
        stamp.attach(&mut message).unwrap();
        assert_eq!(message.from()[0], mailbox);
    }
}
