//! Email address and mailbox types.

use crate::charset::Charset;
use crate::encoding::{
    QContext, decode_rfc2047, encode_rfc2047, first_word_charset, needs_encoding,
};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Characters that force a display name into a quoted string (RFC 5322 specials).
const SPECIALS: &str = "()<>[]:;@\\,.\"";

/// A bare email address (`local@domain`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares two addresses the way mail systems do in practice:
    /// ignoring ASCII case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Returns a lowercase form suitable as a set key.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Validates an email address (basic validation).
    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if addr
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "<>()[],;:\\\"".contains(c))
        {
            return Err(Error::InvalidAddress(format!(
                "Address contains illegal characters: {addr}"
            )));
        }

        let Some((local, domain)) = addr.split_once('@') else {
            return Err(Error::InvalidAddress(format!("Address must contain @: {addr}")));
        };

        if domain.contains('@') {
            return Err(Error::InvalidAddress(format!(
                "Address must have exactly one @: {addr}"
            )));
        }

        if local.is_empty() || domain.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "Local and domain parts cannot be empty: {addr}"
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.trim())
    }
}

/// Mailbox (optional display name + address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name (optional, decoded).
    pub name: Option<String>,
    /// Email address.
    pub address: Address,
    /// Charset used when the display name has to be encoded.
    pub charset: Charset,
}

impl Mailbox {
    /// Creates a new mailbox with just an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(address: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: None,
            address: Address::new(address)?,
            charset: Charset::Utf8,
        })
    }

    /// Creates a new mailbox with a display name and address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Ok(Self {
            name: (!name.trim().is_empty()).then_some(name),
            address: Address::new(address)?,
            charset: Charset::Utf8,
        })
    }

    /// Returns the same mailbox with a different charset for its display name.
    #[must_use]
    pub fn in_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Parses `addr`, `<addr>`, `Name <addr>`, `"Quoted, Name" <addr>` or a
    /// display name made of RFC 2047 encoded words.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed syntax or an invalid address.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let Some(open) = input.rfind('<') else {
            if input.contains('>') {
                return Err(Error::InvalidAddress(format!("Unbalanced angle brackets: {input}")));
            }
            return Self::new(input);
        };

        let close = input
            .rfind('>')
            .filter(|&close| close > open && close == input.len() - 1)
            .ok_or_else(|| Error::InvalidAddress(format!("Unbalanced angle brackets: {input}")))?;

        let address = Address::new(input[open + 1..close].trim())?;
        let phrase = input[..open].trim();

        let (name, charset) = if phrase.is_empty() {
            (None, Charset::Utf8)
        } else if let Some(quoted) = phrase.strip_prefix('"') {
            let inner = quoted
                .strip_suffix('"')
                .ok_or_else(|| Error::InvalidAddress(format!("Unterminated quote: {input}")))?;
            (Some(inner.replace("\\\"", "\"").replace("\\\\", "\\")), Charset::Utf8)
        } else if let Some(charset) = first_word_charset(phrase)? {
            (Some(decode_rfc2047(phrase)?), charset)
        } else {
            (Some(phrase.to_string()), Charset::Utf8)
        };

        Ok(Self {
            name,
            address,
            charset,
        })
    }

    /// Renders the mailbox for use in a header, encoding the display name
    /// with RFC 2047 when it is not plain ASCII.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox charset cannot represent the name.
    pub fn to_header(&self) -> Result<String> {
        let Some(name) = &self.name else {
            return Ok(self.address.to_string());
        };

        let phrase = if needs_encoding(name) {
            encode_rfc2047(name, self.charset, QContext::Phrase)?
        } else if name.contains(|c: char| SPECIALS.contains(c)) {
            format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
        } else {
            name.clone()
        };

        Ok(format!("{phrase} <{}>", self.address))
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

impl FromStr for Mailbox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Address> for Mailbox {
    fn from(address: Address) -> Self {
        Self {
            name: None,
            address,
            charset: Charset::Utf8,
        }
    }
}
