//! # courier-mime
//!
//! MIME message model for outgoing mail.
//!
//! ## Features
//!
//! - **Messages**: structured senders/recipients, ordered headers, flags
//! - **Parts**: text parts (7bit or Quoted-Printable) and Base64 attachments
//! - **Encoding**: Base64, Quoted-Printable, RFC 2047 `Q` header encoding
//! - **Charsets**: UTF-8, US-ASCII and ISO-8859-1, with no silent fallback
//! - **Rendering**: RFC 5322 text with a `multipart/alternative` body
//!
//! ## Quick Start
//!
//! ```ignore
//! use courier_mime::{Charset, Mailbox, Message, Part, RecipientType};
//!
//! let mut message = Message::new();
//! message.set_from(Mailbox::parse("Jeff <jeff@example.com>")?);
//! message.add_recipient(RecipientType::To, Mailbox::parse("friend@example.com")?);
//! message.set_subject("how are you, друг?", Charset::Utf8)?;
//! message.parts.push(Part::text("text/plain", "Hello!", Charset::Utf8)?);
//!
//! println!("{}", message.to_rfc5322()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod charset;
mod content_type;
mod error;
mod flags;
mod header;
mod message;

pub mod encoding;

pub use address::{Address, Mailbox};
pub use charset::Charset;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use flags::{Flag, Flags};
pub use header::Headers;
pub use message::{Message, Part, RecipientType, TransferEncoding};
