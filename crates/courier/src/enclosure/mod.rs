//! Enclosures: the body parts of a message.

mod binary;
mod text;

pub use binary::EnBinary;
pub use text::{EnHtml, EnPlain};

use crate::error::Result;
use courier_mime::Part;
use serde::{Deserialize, Serialize};

/// Any enclosure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enclosure {
    /// `text/plain`.
    Plain(EnPlain),
    /// `text/html`.
    Html(EnHtml),
    /// A file attachment.
    Binary(EnBinary),
}

impl Enclosure {
    /// Builds the body part.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying enclosure.
    pub fn part(&self) -> Result<Part> {
        match self {
            Self::Plain(en) => en.part(),
            Self::Html(en) => en.part(),
            Self::Binary(en) => en.part(),
        }
    }
}

impl From<EnPlain> for Enclosure {
    fn from(en: EnPlain) -> Self {
        Self::Plain(en)
    }
}

impl From<EnHtml> for Enclosure {
    fn from(en: EnHtml) -> Self {
        Self::Html(en)
    }
}

impl From<EnBinary> for Enclosure {
    fn from(en: EnBinary) -> Self {
        Self::Binary(en)
    }
}
