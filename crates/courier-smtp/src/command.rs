//! SMTP command builder.

use crate::error::{Error, Result};
use crate::types::AuthMechanism;

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client hostname
        hostname: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
        /// Initial response (optional, for SASL-IR)
        initial_response: Option<String>,
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address, without angle brackets
        from: String,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address, without angle brackets
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// RSET - Reset transaction
    Rset,
    /// NOOP - No operation
    Noop,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Builds a MAIL FROM command after checking the address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot appear in an SMTP envelope.
    pub fn mail_from(from: &str) -> Result<Self> {
        Ok(Self::MailFrom {
            from: envelope_address(from)?.to_string(),
        })
    }

    /// Builds a RCPT TO command after checking the address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot appear in an SMTP envelope.
    pub fn rcpt_to(to: &str) -> Result<Self> {
        Ok(Self::RcptTo {
            to: envelope_address(to)?.to_string(),
        })
    }

    /// Returns the command verb, safe to log (never includes credentials).
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth { .. } => "AUTH",
            Self::MailFrom { .. } => "MAIL",
            Self::RcptTo { .. } => "RCPT",
            Self::Data => "DATA",
            Self::Rset => "RSET",
            Self::Noop => "NOOP",
            Self::Quit => "QUIT",
        }
    }

    /// Serializes the command to bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { hostname } => {
                buf.extend_from_slice(b"EHLO ");
                buf.extend_from_slice(hostname.as_bytes());
            }
            Self::StartTls => buf.extend_from_slice(b"STARTTLS"),
            Self::Auth {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTH ");
                buf.extend_from_slice(mechanism.as_str().as_bytes());
                if let Some(resp) = initial_response {
                    buf.push(b' ');
                    buf.extend_from_slice(resp.as_bytes());
                }
            }
            Self::MailFrom { from } => {
                buf.extend_from_slice(b"MAIL FROM:<");
                buf.extend_from_slice(from.as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:<");
                buf.extend_from_slice(to.as_bytes());
                buf.push(b'>');
            }
            Self::Data => buf.extend_from_slice(b"DATA"),
            Self::Rset => buf.extend_from_slice(b"RSET"),
            Self::Noop => buf.extend_from_slice(b"NOOP"),
            Self::Quit => buf.extend_from_slice(b"QUIT"),
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Rejects addresses that would break out of `<...>` or the command line.
fn envelope_address(address: &str) -> Result<&str> {
    let bad = address.is_empty()
        || address
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '<' || c == '>');
    if bad {
        return Err(Error::InvalidAddress(address.escape_debug().to_string()));
    }
    Ok(address)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ehlo_command() {
        let cmd = Command::Ehlo {
            hostname: "client.example.com".to_string(),
        };
        assert_eq!(cmd.serialize(), b"EHLO client.example.com\r\n");
    }

    #[test]
    fn test_auth_plain_with_initial_response() {
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some("AHVzZXIAcGFzcw==".to_string()),
        };
        assert_eq!(cmd.serialize(), b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n");
    }

    #[test]
    fn test_envelope_commands() {
        let cmd = Command::mail_from("sender@example.com").unwrap();
        assert_eq!(cmd.serialize(), b"MAIL FROM:<sender@example.com>\r\n");

        let cmd = Command::rcpt_to("rcpt@example.com").unwrap();
        assert_eq!(cmd.serialize(), b"RCPT TO:<rcpt@example.com>\r\n");
    }

    #[test]
    fn test_envelope_address_injection_rejected() {
        assert!(Command::mail_from("a@example.com>\r\nRSET").is_err());
        assert!(Command::rcpt_to("a b@example.com").is_err());
        assert!(Command::rcpt_to("").is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::StartTls.serialize(), b"STARTTLS\r\n");
        assert_eq!(Command::Data.serialize(), b"DATA\r\n");
        assert_eq!(Command::Rset.serialize(), b"RSET\r\n");
        assert_eq!(Command::Quit.serialize(), b"QUIT\r\n");
    }
}
