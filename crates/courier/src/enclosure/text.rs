//! Plain-text and HTML enclosures.

use crate::error::{Error, Result};
use courier_mime::{Charset, Part};
use serde::{Deserialize, Serialize};

/// A `text/plain` body part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnPlain {
    text: Option<String>,
    charset: Option<String>,
}

/// A `text/html` body part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnHtml {
    text: Option<String>,
    charset: Option<String>,
}

impl EnPlain {
    /// Creates a UTF-8 plain-text enclosure.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            charset: Some(Charset::Utf8.name().to_string()),
        }
    }

    /// Creates a plain-text enclosure in `charset`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the charset is unsupported.
    pub fn in_charset(text: impl Into<String>, charset: &str) -> Result<Self> {
        Ok(Self {
            text: Some(text.into()),
            charset: Some(Charset::lookup(charset)?.name().to_string()),
        })
    }

    /// Builds the body part.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the text or charset is absent, or an
    /// encoding error if the charset cannot represent the text.
    pub fn part(&self) -> Result<Part> {
        let (text, charset) = resolve(self.text.as_deref(), self.charset.as_deref())?;
        let content_type = format!("text/plain; charset=\"{}\"", charset.name());
        Ok(Part::text(content_type, text, charset)?)
    }
}

impl EnHtml {
    /// Creates a UTF-8 HTML enclosure.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            charset: Some(Charset::Utf8.name().to_string()),
        }
    }

    /// Creates an HTML enclosure in `charset`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the charset is unsupported.
    pub fn in_charset(text: impl Into<String>, charset: &str) -> Result<Self> {
        Ok(Self {
            text: Some(text.into()),
            charset: Some(Charset::lookup(charset)?.name().to_string()),
        })
    }

    /// Builds the body part.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the text or charset is absent, or an
    /// encoding error if the charset cannot represent the text.
    pub fn part(&self) -> Result<Part> {
        let (text, charset) = resolve(self.text.as_deref(), self.charset.as_deref())?;
        let content_type = format!("text/html;charset=\"{}\"", charset.name());
        Ok(Part::text(content_type, text, charset)?)
    }
}

fn resolve<'a>(text: Option<&'a str>, charset: Option<&str>) -> Result<(&'a str, Charset)> {
    let text = text.ok_or_else(|| Error::absent("Text"))?;
    let charset = charset.ok_or_else(|| Error::absent("Charset"))?;
    Ok((text, Charset::lookup(charset)?))
}
