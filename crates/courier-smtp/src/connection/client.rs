//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use std::collections::HashSet;
use std::io;
use std::marker::PhantomData;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Connected {}
    impl Sealed for super::Authenticated {}
}

/// States in which a mail transaction may be started.
pub trait Ready: sealed::Sealed {}

impl Ready for Connected {}
impl Ready for Authenticated {}

/// SMTP client with type-state pattern.
///
/// `S` is any buffered duplex byte stream; in production it is an
/// [`SmtpStream`], in tests an in-memory script.
#[derive(Debug)]
pub struct Client<S, State> {
    stream: S,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S> Client<S, Connected>
where
    S: AsyncBufRead + AsyncWrite + Unpin,
{
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server
    /// refuses service.
    pub async fn from_stream(mut stream: S) -> Result<Self> {
        let greeting = read_reply(&mut stream)
            .await?
            .expect(Some(ReplyCode::SERVICE_READY))?;

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(server = %hostname, "smtp greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: HashSet::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.hello(client_hostname).await?;
        Ok(self)
    }

    /// Authenticates using the PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not offer PLAIN or rejects the
    /// credentials.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<S, Authenticated>> {
        if !self.server_info.auth_mechanisms().contains(&AuthMechanism::Plain) {
            return Err(Error::NotSupported("AUTH PLAIN".into()));
        }

        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(encoded),
        };
        self.send_command(cmd)
            .await?
            .expect(Some(ReplyCode::AUTH_OK))?;

        Ok(Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        })
    }
}

impl Client<SmtpStream, Connected> {
    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.send_command(Command::StartTls)
            .await?
            .expect(Some(ReplyCode::SERVICE_READY))?;

        self.stream = self.stream.upgrade_to_tls(hostname).await?;
        tracing::debug!(server = %hostname, "smtp connection upgraded to TLS");

        // Capabilities learned before the handshake are discarded.
        self.hello(client_hostname).await?;
        Ok(self)
    }
}

impl<S, State> Client<S, State>
where
    S: AsyncBufRead + AsyncWrite + Unpin,
    State: Ready,
{
    /// Runs a complete mail transaction: MAIL, RCPT for each recipient,
    /// DATA and the dot-stuffed message.
    ///
    /// If the server rejects the envelope, the transaction is reset so the
    /// connection stays usable.
    ///
    /// # Errors
    ///
    /// Returns an error if an address is unusable, there are no recipients,
    /// or the server rejects any step.
    pub async fn send_mail(&mut self, from: &str, recipients: &[&str], data: &[u8]) -> Result<()> {
        let mail = Command::mail_from(from)?;
        let rcpts = recipients
            .iter()
            .map(|to| Command::rcpt_to(to))
            .collect::<Result<Vec<_>>>()?;
        if rcpts.is_empty() {
            return Err(Error::Protocol("No recipients".into()));
        }

        if let Err(err) = self.envelope(mail, rcpts).await {
            if matches!(err, Error::SmtpError { .. }) {
                // A failed RSET leaves the original rejection as the cause.
                if let Err(rset) = self.send_command(Command::Rset).await {
                    tracing::debug!(error = %rset, "smtp reset failed");
                }
            }
            return Err(err);
        }

        self.write(&dot_stuff(data)).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::debug!(code = reply.code.as_u16(), "smtp message accepted");
        reply.expect(None)?;
        Ok(())
    }

    async fn envelope(&mut self, mail: Command, rcpts: Vec<Command>) -> Result<()> {
        self.send_command(mail).await?.expect(None)?;
        for rcpt in rcpts {
            self.send_command(rcpt).await?.expect(None)?;
        }
        self.send_command(Command::Data)
            .await?
            .expect(Some(ReplyCode::START_DATA))?;
        Ok(())
    }
}

// Common implementation for all states
impl<S, State> Client<S, State>
where
    S: AsyncBufRead + AsyncWrite + Unpin,
{
    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Sends NOOP, checking the connection is still alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not answer with success.
    pub async fn noop(&mut self) -> Result<()> {
        self.send_command(Command::Noop).await?.expect(None)?;
        Ok(())
    }

    /// Sends QUIT and shuts the stream down (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn hello(&mut self, client_hostname: &str) -> Result<()> {
        let cmd = Command::Ehlo {
            hostname: client_hostname.to_string(),
        };
        let reply = self.send_command(cmd).await?.expect(None)?;

        // First line is the server's greeting, the rest are extensions.
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(())
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        self.write(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::debug!(command = cmd.verb(), code = reply.code.as_u16(), "smtp exchange");
        Ok(reply)
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

async fn read_reply<S>(stream: &mut S) -> Result<Reply>
where
    S: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if stream.read_line(&mut line).await? == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }

        let line = line.trim_end().to_string();
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}

/// Normalizes line endings to CRLF, doubles leading dots and appends the
/// terminating `.` line.
fn dot_stuff(data: &[u8]) -> Vec<u8> {
    let body = data
        .strip_suffix(b"\r\n")
        .or_else(|| data.strip_suffix(b"\n"))
        .unwrap_or(data);

    let mut out = Vec::with_capacity(data.len() + data.len() / 32 + 5);
    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_stuff() {
        assert_eq!(dot_stuff(b"a\r\n.b\nc\r\n"), b"a\r\n..b\r\nc\r\n.\r\n");
        assert_eq!(dot_stuff(b"."), b"..\r\n.\r\n");
        assert_eq!(dot_stuff(b""), b"\r\n.\r\n");
    }
}
