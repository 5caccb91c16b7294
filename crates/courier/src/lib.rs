//! # courier
//!
//! Immutable MIME envelopes and the postmen that deliver them.
//!
//! ## Features
//!
//! - **Stamps** set headers: sender, recipients, reply-to, subject and
//!   arbitrary headers, with RFC 2047 encoding for non-ASCII text
//! - **Enclosures** become body parts: plain text, HTML and files
//! - **Envelopes** collect stamps and enclosures without ever changing;
//!   decorators validate, fill in, memoize or mark the assembled message
//! - **Postmen** deliver over SMTP or SMTPS, or just log; policies drop
//!   drafts and mail addressed back to its sender
//!
//! ## Quick Start
//!
//! ```ignore
//! use courier::envelope::Mime;
//! use courier::postman::{Mailer, PostNoLoops};
//! use courier::stamp::{StRecipient, StSender, StSubject};
//! use courier::enclosure::EnPlain;
//! use courier::wire::Smtps;
//! use courier::{Postman, Protocol, Token};
//!
//! fn main() -> courier::Result<()> {
//!     let session = Token::new("user", "password").access(&Protocol::Smtps {
//!         host: "smtp.example.com".into(),
//!         port: 465,
//!     });
//!     let postman = PostNoLoops::new(Mailer::new(Smtps::new(session)));
//!
//!     let envelope = Mime::new()
//!         .with(StSender::new("Jeff <jeff@example.com>")?)
//!         .with(StRecipient::new("friend@example.com")?)
//!         .with(StSubject::new("dinner?"))
//!         .with(EnPlain::new("Tomorrow at eight."));
//!
//!     postman.send(&envelope)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod enclosure;
pub mod envelope;
mod error;
pub mod postman;
mod session;
pub mod stamp;
pub mod wire;

pub use envelope::{Envelope, EnvelopeKey, Mime};
pub use error::{Error, ErrorKind, Result, TransportError};
pub use postman::Postman;
pub use session::{Protocol, Session, Token};
