//! # courier-smtp
//!
//! Async SMTP client (RFC 5321) used by `courier` to deliver messages.
//!
//! ## Features
//!
//! - **Type-state connection management**: authentication happens at most
//!   once and only before the first transaction
//! - **Protocol support**: EHLO, STARTTLS, AUTH PLAIN, MAIL, RCPT, DATA, RSET
//! - **TLS support**: both implicit TLS (port 465) and STARTTLS, always
//!   verifying the server certificate against its hostname
//! - **Testable**: the client runs over any buffered duplex stream
//!
//! ## Quick Start
//!
//! ```ignore
//! use courier_smtp::Client;
//! use courier_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> courier_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.starttls("smtp.example.com", "localhost").await?;
//!     let mut client = client.auth_plain("user@example.com", "password").await?;
//!
//!     let message = b"Subject: Test\r\n\r\nHello, World!\r\n";
//!     client
//!         .send_mail("user@example.com", &["friend@example.com"], message)
//!         .await?;
//!
//!     client.quit().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_plain() ───→ Authenticated
//! └──────────────┘
//!        │                                    │
//!        └──────── send_mail() / quit() ──────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{Authenticated, Client, Connected, Ready, ServerInfo, SmtpStream};
pub use error::{Error, Result};
pub use types::{AuthMechanism, Extension, Reply, ReplyCode};
