//! Connection settings: protocols, credentials and the sessions they make.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where and how to reach a mail server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "lowercase")]
pub enum Protocol {
    /// Plain SMTP, usually port 25 or 587.
    Smtp {
        /// Server hostname.
        host: String,
        /// Server port.
        port: u16,
    },
    /// SMTP over implicit TLS, usually port 465.
    Smtps {
        /// Server hostname.
        host: String,
        /// Server port.
        port: u16,
    },
}

impl Protocol {
    /// Session properties for this protocol, using the `mail.smtp.*` /
    /// `mail.smtps.*` names.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        let pairs: Vec<(&str, String)> = match self {
            Self::Smtp { host, port } => vec![
                ("mail.smtp.auth", "true".into()),
                ("mail.smtp.host", host.clone()),
                ("mail.smtp.port", port.to_string()),
            ],
            Self::Smtps { host, port } => vec![
                ("mail.smtps.auth", "true".into()),
                ("mail.smtps.host", host.clone()),
                ("mail.smtps.port", port.to_string()),
                ("mail.smtp.starttls.required", "true".into()),
                ("mail.smtp.ssl.protocols", "TLSv1.2".into()),
                ("mail.smtp.starttls.enable", "true".into()),
                ("mail.smtp.ssl.checkserveridentity", "true".into()),
                ("mail.smtp.socketFactory.port", port.to_string()),
                ("mail.smtp.socketFactory.fallback", "false".into()),
            ],
        };
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// User name and password for a mail server.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    user: String,
    password: String,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Combines the credentials with a protocol's properties.
    #[must_use]
    pub fn access(&self, protocol: &Protocol) -> Session {
        Session {
            properties: protocol.entries(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Properties plus credentials, ready to be handed to a
/// [`Wire`](crate::wire::Wire).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    properties: BTreeMap<String, String>,
    user: String,
    password: String,
}

impl Session {
    /// Creates a session from raw properties.
    #[must_use]
    pub fn new(
        properties: BTreeMap<String, String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            properties,
            user: user.into(),
            password: password.into(),
        }
    }

    /// Returns the session with one property added or replaced, e.g.
    /// `mail.smtp.timeout`.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Looks up a property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns true if the property is set to `true` (ignoring case).
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.property(key)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// All properties.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// User name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("properties", &self.properties)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_entries() {
        let entries = Protocol::Smtp {
            host: "mail.example.com".into(),
            port: 25,
        }
        .entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries["mail.smtp.auth"], "true");
        assert_eq!(entries["mail.smtp.host"], "mail.example.com");
        assert_eq!(entries["mail.smtp.port"], "25");
    }

    #[test]
    fn test_smtps_entries() {
        let entries = Protocol::Smtps {
            host: "mail.example.com".into(),
            port: 465,
        }
        .entries();

        assert_eq!(entries["mail.smtps.auth"], "true");
        assert_eq!(entries["mail.smtps.host"], "mail.example.com");
        assert_eq!(entries["mail.smtps.port"], "465");
        assert_eq!(entries["mail.smtp.starttls.required"], "true");
        assert_eq!(entries["mail.smtp.starttls.enable"], "true");
        assert_eq!(entries["mail.smtp.ssl.protocols"], "TLSv1.2");
        assert_eq!(entries["mail.smtp.ssl.checkserveridentity"], "true");
        assert_eq!(entries["mail.smtp.socketFactory.port"], "465");
        assert_eq!(entries["mail.smtp.socketFactory.fallback"], "false");
    }

    #[test]
    fn test_access_builds_session() {
        let protocol = Protocol::Smtp {
            host: "h".into(),
            port: 587,
        };
        let session = Token::new("jeff", "secret").access(&protocol);

        assert_eq!(session.user(), "jeff");
        assert_eq!(session.password(), "secret");
        assert!(session.flag("mail.smtp.auth"));
        assert!(!session.flag("mail.smtp.starttls.enable"));
        assert_eq!(session.properties(), &protocol.entries());
    }

    #[test]
    fn test_debug_hides_password() {
        let token = Token::new("jeff", "secret");
        assert!(!format!("{token:?}").contains("secret"));
        let session = token.access(&Protocol::Smtp {
            host: "h".into(),
            port: 25,
        });
        assert!(!format!("{session:?}").contains("secret"));
    }

    #[test]
    fn test_configuration_round_trip() {
        let json = r#"{"protocol":"smtps","host":"smtp.example.com","port":465}"#;
        let protocol: Protocol = serde_json::from_str(json).unwrap();
        assert_eq!(
            protocol,
            Protocol::Smtps {
                host: "smtp.example.com".into(),
                port: 465
            }
        );
        assert_eq!(serde_json::to_string(&protocol).unwrap(), json);

        let token: Token = serde_json::from_str(r#"{"user":"u","password":"p"}"#).unwrap();
        assert_eq!(token, Token::new("u", "p"));
    }
}
