//! File attachment enclosure.

use crate::error::{Error, Result};
use courier_mime::{Charset, ContentType, Headers, Part};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A file attached as a base64 body part.
///
/// The file is read when the part is built, not when the enclosure is
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnBinary {
    path: Option<PathBuf>,
    name: Option<String>,
    content_type: Option<String>,
}

impl EnBinary {
    /// Creates an attachment of the file at `path`, shown as `name`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            name: Some(name.into()),
            content_type: Some(content_type.into()),
        }
    }

    /// Path of the attached file, if present.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Builds the body part.
    ///
    /// # Errors
    ///
    /// Returns a construction error if a field is absent or the content type
    /// is malformed, or an I/O error if the file cannot be read.
    pub fn part(&self) -> Result<Part> {
        let name = self.name.as_deref().ok_or_else(|| Error::absent("Attachment name"))?;
        let ctype = self
            .content_type
            .as_deref()
            .ok_or_else(|| Error::absent("Attachment content type"))?;
        let path = self.path.as_deref().ok_or_else(|| Error::absent("Attachment path"))?;

        let content_type =
            ContentType::parse(ctype).map_err(|err| Error::Construction(err.to_string()))?;
        let data = fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "attachment read");

        let filename = Headers::encode_value(name, Charset::Utf8)?;
        let disposition = format!("attachment; filename={}", ContentType::quote(&filename));
        let content_type = content_type.with_parameter("name", filename);

        Ok(Part::attachment(&content_type, &disposition, &data))
    }
}
