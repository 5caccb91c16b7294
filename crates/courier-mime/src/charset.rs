//! Character sets usable for headers and text bodies.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A character set we can encode text into.
///
/// The set is deliberately closed: asking for anything else is an error,
/// never a silent fallback to another charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// UTF-8.
    #[default]
    Utf8,
    /// 7-bit US-ASCII.
    UsAscii,
    /// ISO-8859-1 (Latin-1).
    Latin1,
}

impl Charset {
    /// Looks up a charset by its MIME name or a common alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCharset`] for unknown names.
    pub fn lookup(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "us-ascii" | "ascii" | "ansi_x3.4-1968" => Ok(Self::UsAscii),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" => Ok(Self::Latin1),
            _ => Err(Error::UnsupportedCharset(name.to_string())),
        }
    }

    /// Canonical MIME name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::UsAscii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Encodes text into bytes of this charset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unrepresentable`] if a character does not exist in
    /// the charset.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::UsAscii => self.encode_narrow(text, 0x7F),
            Self::Latin1 => self.encode_narrow(text, 0xFF),
        }
    }

    /// Encodes a single character, appending its bytes to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unrepresentable`] if the character does not exist in
    /// the charset.
    pub fn encode_char(self, ch: char, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Utf8 => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                Ok(())
            }
            Self::UsAscii => self.push_narrow(ch, 0x7F, out),
            Self::Latin1 => self.push_narrow(ch, 0xFF, out),
        }
    }

    /// Decodes bytes of this charset into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not valid in this charset.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(Into::into),
            Self::UsAscii => {
                if let Some(b) = bytes.iter().find(|b| !b.is_ascii()) {
                    return Err(Error::InvalidEncoding(format!(
                        "byte 0x{b:02X} is not US-ASCII"
                    )));
                }
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    fn encode_narrow(self, text: &str, max: u32) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            self.push_narrow(ch, max, &mut out)?;
        }
        Ok(out)
    }

    fn push_narrow(self, ch: char, max: u32, out: &mut Vec<u8>) -> Result<()> {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) if u32::from(byte) <= max => {
                out.push(byte);
                Ok(())
            }
            _ => Err(Error::Unrepresentable {
                ch,
                charset: self.name(),
            }),
        }
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
