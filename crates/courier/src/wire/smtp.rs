//! SMTP and SMTPS wires over the async SMTP client.
//!
//! The [`Transport`] contract is synchronous, so every transport owns a
//! current-thread tokio runtime and blocks on each network call. Each call
//! is bounded by the session timeout.
//!
//! A caller already running inside a tokio runtime cannot block on another
//! one from the same thread. In that case each call runs on a scoped worker
//! thread and the caller's thread waits for it.

use super::{Transport, TransportResult, Wire};
use crate::error::TransportError;
use crate::session::Session;
use courier_mime::{Address, Message};
use courier_smtp::connection::{connect, connect_tls};
use courier_smtp::{Authenticated, Client, Connected, SmtpStream};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

/// Timeout used when the session does not set one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Plain SMTP, upgraded with STARTTLS when `mail.smtp.starttls.enable` is
/// set. Reads the `mail.smtp.*` properties.
#[derive(Debug, Clone)]
pub struct Smtp {
    session: Session,
}

impl Smtp {
    /// Creates the wire.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Wire for Smtp {
    fn connect(&self) -> TransportResult<Box<dyn Transport>> {
        let settings = Settings::read(&self.session, "mail.smtp", false)?;
        Ok(Box::new(SmtpTransport::open(&settings)?))
    }
}

/// SMTP over implicit TLS. Reads the `mail.smtps.*` properties.
#[derive(Debug, Clone)]
pub struct Smtps {
    session: Session,
}

impl Smtps {
    /// Creates the wire.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Wire for Smtps {
    fn connect(&self) -> TransportResult<Box<dyn Transport>> {
        let settings = Settings::read(&self.session, "mail.smtps", true)?;
        Ok(Box::new(SmtpTransport::open(&settings)?))
    }
}

/// Connection settings extracted from session properties.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
    host: String,
    port: u16,
    implicit_tls: bool,
    starttls: bool,
    starttls_required: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
    client_hostname: String,
}

impl Settings {
    fn read(session: &Session, prefix: &str, implicit_tls: bool) -> TransportResult<Self> {
        let key = |name: &str| format!("{prefix}.{name}");

        let host = session
            .property(&key("host"))
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| TransportError::Config(format!("{} is not set", key("host"))))?
            .to_string();

        let port = match session.property(&key("port")) {
            Some(value) => value.trim().parse::<u16>().map_err(|_| {
                TransportError::Config(format!("{} is not a port: {value}", key("port")))
            })?,
            None if implicit_tls => 465,
            None => 25,
        };

        let timeout = match session.property(&key("timeout")) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    TransportError::Config(format!("{} is not milliseconds: {value}", key("timeout")))
                })?,
            None => DEFAULT_TIMEOUT,
        };

        let credentials = session
            .flag(&key("auth"))
            .then(|| (session.user().to_string(), session.password().to_string()));

        Ok(Self {
            host,
            port,
            implicit_tls,
            starttls: !implicit_tls && session.flag("mail.smtp.starttls.enable"),
            starttls_required: session.flag("mail.smtp.starttls.required"),
            credentials,
            timeout,
            client_hostname: session
                .property(&key("localhost"))
                .unwrap_or("localhost")
                .to_string(),
        })
    }
}

/// An SMTP session in whichever state the handshake left it.
enum Link {
    Open(Client<SmtpStream, Connected>),
    Authenticated(Client<SmtpStream, Authenticated>),
}

impl Link {
    async fn send_mail(
        &mut self,
        from: &str,
        recipients: &[&str],
        data: &[u8],
    ) -> courier_smtp::Result<()> {
        match self {
            Self::Open(client) => client.send_mail(from, recipients, data).await,
            Self::Authenticated(client) => client.send_mail(from, recipients, data).await,
        }
    }

    async fn quit(self) -> courier_smtp::Result<()> {
        match self {
            Self::Open(client) => client.quit().await,
            Self::Authenticated(client) => client.quit().await,
        }
    }
}

struct SmtpTransport {
    /// Always `Some` until dropped.
    runtime: Option<Runtime>,
    link: Option<Link>,
    timeout: Duration,
}

impl SmtpTransport {
    fn open(settings: &Settings) -> TransportResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        // Built before the handshake so a failed handshake still drops the
        // runtime through `Drop`.
        let mut transport = Self {
            runtime: Some(runtime),
            link: None,
            timeout: settings.timeout,
        };
        let runtime = transport.runtime()?;
        let link = run(runtime, within(settings.timeout, handshake(settings)))?;
        tracing::debug!(host = %settings.host, port = settings.port, "smtp transport connected");

        transport.link = Some(link);
        Ok(transport)
    }

    fn runtime(&self) -> TransportResult<&Runtime> {
        self.runtime
            .as_ref()
            .ok_or_else(|| TransportError::Other("transport runtime is gone".into()))
    }
}

impl Drop for SmtpTransport {
    fn drop(&mut self) {
        drop(self.link.take());
        // A blocking shutdown panics inside an async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Transport for SmtpTransport {
    fn send(&mut self, message: &Message, recipients: &[Address]) -> TransportResult<()> {
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| TransportError::Other("transport is closed".into()))?;
        let from = message
            .from()
            .first()
            .ok_or_else(|| TransportError::Other("message has no sender".into()))?;

        let data = message.to_rfc5322()?;
        let recipients: Vec<&str> = recipients.iter().map(Address::as_str).collect();
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| TransportError::Other("transport runtime is gone".into()))?;

        run(
            runtime,
            within(
                self.timeout,
                link.send_mail(from.address.as_str(), &recipients, data.as_bytes()),
            ),
        )
    }

    fn close(&mut self) -> TransportResult<()> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };
        run(self.runtime()?, within(self.timeout, link.quit()))
    }
}

/// Blocks on `call` with `runtime`, from a worker thread when the current
/// thread is already driving a tokio runtime.
fn run<T: Send>(
    runtime: &Runtime,
    call: impl Future<Output = TransportResult<T>> + Send,
) -> TransportResult<T> {
    if Handle::try_current().is_err() {
        return runtime.block_on(call);
    }
    std::thread::scope(|scope| {
        scope
            .spawn(|| runtime.block_on(call))
            .join()
            .map_err(|_| TransportError::Other("smtp worker thread panicked".into()))?
    })
}

async fn handshake(settings: &Settings) -> courier_smtp::Result<Link> {
    let stream = if settings.implicit_tls {
        connect_tls(&settings.host, settings.port).await?
    } else {
        connect(&settings.host, settings.port).await?
    };

    let mut client = Client::from_stream(stream)
        .await?
        .ehlo(&settings.client_hostname)
        .await?;

    if settings.starttls {
        if client.server_info().supports_starttls() {
            client = client
                .starttls(&settings.host, &settings.client_hostname)
                .await?;
        } else if settings.starttls_required {
            return Err(courier_smtp::Error::NotSupported("STARTTLS".into()));
        }
    }

    match &settings.credentials {
        Some((user, password)) => Ok(Link::Authenticated(client.auth_plain(user, password).await?)),
        None => Ok(Link::Open(client)),
    }
}

async fn within<T>(
    limit: Duration,
    call: impl Future<Output = courier_smtp::Result<T>>,
) -> TransportResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(TransportError::Timeout(limit)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{Protocol, Token};

    fn session(protocol: &Protocol) -> Session {
        Token::new("jeff", "secret").access(protocol)
    }

    #[test]
    fn test_run_outside_a_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        assert_eq!(run(&runtime, async { Ok(7) }).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_run_inside_a_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let slept = run(&runtime, async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok("done")
        });
        assert_eq!(slept.unwrap(), "done");
        runtime.shutdown_background();
    }

    #[test]
    fn test_smtp_settings() {
        let session = session(&Protocol::Smtp {
            host: "mail.example.com".into(),
            port: 587,
        });
        let settings = Settings::read(&session, "mail.smtp", false).unwrap();

        assert_eq!(settings.host, "mail.example.com");
        assert_eq!(settings.port, 587);
        assert!(!settings.starttls);
        assert_eq!(
            settings.credentials,
            Some(("jeff".to_string(), "secret".to_string()))
        );
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.client_hostname, "localhost");
    }

    #[test]
    fn test_smtps_settings() {
        let session = session(&Protocol::Smtps {
            host: "mail.example.com".into(),
            port: 465,
        })
        .with_property("mail.smtps.timeout", "1500");
        let settings = Settings::read(&session, "mail.smtps", true).unwrap();

        assert!(settings.implicit_tls);
        assert!(!settings.starttls);
        assert!(settings.credentials.is_some());
        assert_eq!(settings.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_starttls_from_properties() {
        let session = session(&Protocol::Smtp {
            host: "h".into(),
            port: 25,
        })
        .with_property("mail.smtp.starttls.enable", "TRUE");
        let settings = Settings::read(&session, "mail.smtp", false).unwrap();
        assert!(settings.starttls);
        assert!(!settings.starttls_required);
    }

    #[test]
    fn test_missing_or_bad_properties() {
        let empty = Session::new(Default::default(), "u", "p");
        assert!(matches!(
            Settings::read(&empty, "mail.smtp", false),
            Err(TransportError::Config(_))
        ));

        let bad_port = empty
            .clone()
            .with_property("mail.smtp.host", "h")
            .with_property("mail.smtp.port", "99999");
        assert!(matches!(
            Settings::read(&bad_port, "mail.smtp", false),
            Err(TransportError::Config(_))
        ));

        let defaults = empty.with_property("mail.smtps.host", "h");
        let settings = Settings::read(&defaults, "mail.smtps", true).unwrap();
        assert_eq!(settings.port, 465);
        assert!(settings.credentials.is_none());
    }
}
