//! Stamps: header-level additions to a message.
//!
//! A stamp holds only the values it was built with, so one stamp can be
//! applied to any number of messages. Required values that are absent (for
//! example after deserializing an incomplete configuration) are reported
//! when the stamp is attached, not when it is built.

mod address;
mod header;
mod subject;

pub use address::{StBcc, StCc, StRecipient, StReplyTo, StSender};
pub use header::StHeader;
pub use subject::StSubject;

use crate::error::Result;
use courier_mime::Message;
use serde::{Deserialize, Serialize};

/// Any stamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stamp {
    /// `From`.
    Sender(StSender),
    /// `To`.
    Recipient(StRecipient),
    /// `Cc`.
    Cc(StCc),
    /// `Bcc`.
    Bcc(StBcc),
    /// `Reply-To`.
    ReplyTo(StReplyTo),
    /// `Subject`.
    Subject(StSubject),
    /// Any other header.
    Header(StHeader),
}

impl Stamp {
    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying stamp.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        match self {
            Self::Sender(st) => st.attach(message),
            Self::Recipient(st) => st.attach(message),
            Self::Cc(st) => st.attach(message),
            Self::Bcc(st) => st.attach(message),
            Self::ReplyTo(st) => st.attach(message),
            Self::Subject(st) => st.attach(message),
            Self::Header(st) => st.attach(message),
        }
    }
}

macro_rules! impl_from_stamp {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Stamp {
                fn from(stamp: $ty) -> Self {
                    Self::$variant(stamp)
                }
            }
        )*
    };
}

impl_from_stamp!(
    Sender(StSender),
    Recipient(StRecipient),
    Cc(StCc),
    Bcc(StBcc),
    ReplyTo(StReplyTo),
    Subject(StSubject),
    Header(StHeader),
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_from_configuration() {
        let json = r#"[
            {"sender": "Jeff <jeff@example.com>"},
            {"recipient": "friend@example.com"},
            {"subject": {"subject": "hello"}},
            {"header": {"name": "X-Mailer", "value": "courier"}}
        ]"#;
        let stamps: Vec<Stamp> = serde_json::from_str(json).unwrap();

        let mut message = Message::new();
        for stamp in &stamps {
            stamp.attach(&mut message).unwrap();
        }
        assert_eq!(message.from()[0].address.as_str(), "jeff@example.com");
        assert_eq!(message.all_recipients().len(), 1);
        assert_eq!(message.raw_subject(), Some("hello"));
        assert_eq!(message.headers.get("X-Mailer"), Some("courier"));
    }

    #[test]
    fn test_stamp_serializes_back() {
        let stamp = Stamp::from(StCc::new("cc@example.com").unwrap());
        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(json, r#"{"cc":"cc@example.com"}"#);
    }
}
