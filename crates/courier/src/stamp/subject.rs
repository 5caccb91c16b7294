//! Subject stamp.

use crate::error::{Error, Result};
use courier_mime::{Charset, Message};
use serde::{Deserialize, Serialize};

/// Sets the `Subject` header.
///
/// Non-ASCII subjects are written as RFC 2047 `Q` encoded words in the
/// stamp's charset (UTF-8 unless told otherwise).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StSubject {
    subject: Option<String>,
    #[serde(default)]
    charset: Option<String>,
}

impl StSubject {
    /// Creates a UTF-8 subject stamp.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            charset: None,
        }
    }

    /// Creates a subject stamp encoded in `charset`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the charset is unsupported.
    pub fn in_charset(subject: impl Into<String>, charset: &str) -> Result<Self> {
        let charset = Charset::lookup(charset)?;
        Ok(Self {
            subject: Some(subject.into()),
            charset: Some(charset.name().to_string()),
        })
    }

    /// Applies the stamp to a message.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the subject is absent, or an encoding
    /// error if the charset cannot represent it.
    pub fn attach(&self, message: &mut Message) -> Result<()> {
        let subject = self.subject.as_deref().ok_or_else(|| Error::absent("Subject"))?;
        let charset = match self.charset.as_deref() {
            Some(name) => Charset::lookup(name)?,
            None => Charset::Utf8,
        };
        message.set_subject(subject, charset)?;
        Ok(())
    }
}
