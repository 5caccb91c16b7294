//! MIME message structure, assembly and rendering.

use crate::address::Mailbox;
use crate::charset::Charset;
use crate::content_type::ContentType;
use crate::encoding::{
    decode_base64, decode_quoted_printable, encode_base64_lines, encode_quoted_printable,
};
use crate::error::{Error, Result};
use crate::flags::{Flag, Flags};
use crate::header::Headers;
use std::fmt::{self, Write as _};

/// Longest line allowed in a 7bit body (RFC 5322, without CRLF).
const MAX_BODY_LINE: usize = 998;

/// Column after which header lines are folded.
const FOLD_COLUMN: usize = 78;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Recipient kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientType {
    /// Primary recipients.
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy; never rendered into the message text.
    Bcc,
}

impl RecipientType {
    /// Header name for this kind.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
        }
    }
}

/// MIME message part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body, already transfer-encoded.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Builds a text part.
    ///
    /// `content_type` is written verbatim. The text is encoded in `charset`
    /// and sent as `7bit` when the result is short-lined ASCII, otherwise as
    /// `quoted-printable`.
    ///
    /// # Errors
    ///
    /// Returns an error if the charset cannot represent the text.
    pub fn text(content_type: impl Into<String>, text: &str, charset: Charset) -> Result<Self> {
        let bytes = charset.encode(text)?;
        let seven_bit = bytes.is_ascii()
            && !bytes.contains(&b'\r')
            && bytes.split(|&b| b == b'\n').all(|line| line.len() <= MAX_BODY_LINE);

        let mut headers = Headers::new();
        headers.add("Content-Type", content_type);

        let body = if seven_bit {
            headers.add("Content-Transfer-Encoding", TransferEncoding::SevenBit.to_string());
            normalize_newlines(&bytes)
        } else {
            headers.add(
                "Content-Transfer-Encoding",
                TransferEncoding::QuotedPrintable.to_string(),
            );
            encode_quoted_printable(&bytes).into_bytes()
        };

        Ok(Self::new(headers, body))
    }

    /// Builds a base64 attachment part.
    #[must_use]
    pub fn attachment(content_type: &ContentType, disposition: &str, data: &[u8]) -> Self {
        let mut headers = Headers::new();
        headers.add("Content-Type", content_type.to_string());
        headers.add("Content-Disposition", disposition);
        headers.add("Content-Transfer-Encoding", TransferEncoding::Base64.to_string());
        Self::new(headers, encode_base64_lines(data).into_bytes())
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers.get("content-type").map_or_else(
            || Ok(ContentType::new("text", "plain").with_parameter("charset", "us-ascii")),
            ContentType::parse,
        )
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&String::from_utf8_lossy(&self.body)),
            TransferEncoding::QuotedPrintable => {
                decode_quoted_printable(&String::from_utf8_lossy(&self.body))
            }
            _ => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as text, honoring the declared charset.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the charset is unsupported.
    pub fn body_text(&self) -> Result<String> {
        let decoded = self.decode_body()?;
        let charset = match self.content_type()?.charset() {
            Some(name) => Charset::lookup(name)?,
            None => Charset::UsAscii,
        };
        charset.decode(&decoded)
    }
}

/// MIME message.
///
/// Address headers are kept structured so they can be inspected without
/// reparsing; everything else lives in [`Headers`] in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Headers other than From, To, Cc, Bcc and Reply-To.
    pub headers: Headers,
    /// Body parts of the `multipart/alternative` container.
    pub parts: Vec<Part>,
    /// Local flags such as [`Flag::Draft`].
    pub flags: Flags,
    from: Vec<Mailbox>,
    recipients: Vec<(RecipientType, Mailbox)>,
    reply_to: Vec<Mailbox>,
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the senders with a single mailbox.
    pub fn set_from(&mut self, mailbox: Mailbox) {
        self.from = vec![mailbox];
    }

    /// Adds another sender.
    pub fn add_from(&mut self, mailbox: Mailbox) {
        self.from.push(mailbox);
    }

    /// Returns the senders (empty if unset).
    #[must_use]
    pub fn from(&self) -> &[Mailbox] {
        &self.from
    }

    /// Adds a recipient of the given kind.
    pub fn add_recipient(&mut self, kind: RecipientType, mailbox: Mailbox) {
        self.recipients.push((kind, mailbox));
    }

    /// Returns recipients of one kind in insertion order.
    pub fn recipients(&self, kind: RecipientType) -> impl Iterator<Item = &Mailbox> {
        self.recipients
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, m)| m)
    }

    /// Returns every recipient: To, then Cc, then Bcc.
    #[must_use]
    pub fn all_recipients(&self) -> Vec<&Mailbox> {
        [RecipientType::To, RecipientType::Cc, RecipientType::Bcc]
            .into_iter()
            .flat_map(|kind| self.recipients(kind))
            .collect()
    }

    /// Replaces the Reply-To addresses.
    pub fn set_reply_to(&mut self, mailboxes: Vec<Mailbox>) {
        self.reply_to = mailboxes;
    }

    /// Adds another Reply-To address.
    pub fn add_reply_to(&mut self, mailbox: Mailbox) {
        self.reply_to.push(mailbox);
    }

    /// Returns the explicit Reply-To addresses.
    #[must_use]
    pub fn reply_to(&self) -> &[Mailbox] {
        &self.reply_to
    }

    /// Returns where replies go: Reply-To if set, otherwise From.
    #[must_use]
    pub fn effective_reply_to(&self) -> &[Mailbox] {
        if self.reply_to.is_empty() {
            &self.from
        } else {
            &self.reply_to
        }
    }

    /// Sets the Subject header, RFC 2047 encoding it in `charset` when it is
    /// not plain ASCII.
    ///
    /// # Errors
    ///
    /// Returns an error if the charset cannot represent the subject.
    pub fn set_subject(&mut self, subject: &str, charset: Charset) -> Result<()> {
        let encoded = Headers::encode_value(subject, charset)?;
        self.headers.set("Subject", encoded);
        Ok(())
    }

    /// Gets the Subject header exactly as it will be transmitted.
    #[must_use]
    pub fn raw_subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Gets the decoded Subject header.
    ///
    /// Falls back to the raw value if it cannot be decoded.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.raw_subject()
            .map(|raw| Headers::decode_value(raw).unwrap_or_else(|_| raw.to_string()))
    }

    /// Sets or clears a flag.
    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        self.flags.set(flag, on);
    }

    /// Returns true if the flag is set.
    #[must_use]
    pub fn is_set(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Gets the content type of the assembled body.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        if self.parts.is_empty() {
            ContentType::new("text", "plain").with_parameter("charset", "us-ascii")
        } else {
            ContentType::new("multipart", "alternative")
        }
    }

    /// Finds the first text/plain part.
    ///
    /// # Errors
    ///
    /// Returns an error if no text part is found or decoding fails.
    pub fn text_part(&self) -> Result<String> {
        self.find_text("plain")
    }

    /// Finds the first text/html part.
    ///
    /// # Errors
    ///
    /// Returns an error if no HTML part is found or decoding fails.
    pub fn html_part(&self) -> Result<String> {
        self.find_text("html")
    }

    fn find_text(&self, sub_type: &str) -> Result<String> {
        for part in &self.parts {
            let ct = part.content_type()?;
            if ct.is_text() && ct.sub_type == sub_type {
                return part.body_text();
            }
        }
        Err(Error::Parse(format!("No text/{sub_type} part found")))
    }

    /// Renders the message as RFC 5322 text with CRLF line endings.
    ///
    /// `Date`, `Message-ID` and `MIME-Version` are generated when absent.
    /// Bcc recipients are not rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if an address display name cannot be encoded.
    pub fn to_rfc5322(&self) -> Result<String> {
        let mut out = String::new();

        if !self.headers.contains("Date") {
            write_header(&mut out, "Date", &chrono::Utc::now().to_rfc2822());
        }
        if !self.headers.contains("Message-ID") {
            let domain = self
                .from
                .first()
                .and_then(|m| m.address.as_str().rsplit_once('@'))
                .map_or("localhost", |(_, domain)| domain);
            let id = format!("<{}@{domain}>", uuid::Uuid::new_v4().simple());
            write_header(&mut out, "Message-ID", &id);
        }

        write_mailboxes(&mut out, "From", &self.from)?;
        for kind in [RecipientType::To, RecipientType::Cc] {
            let mailboxes: Vec<Mailbox> = self.recipients(kind).cloned().collect();
            write_mailboxes(&mut out, kind.header(), &mailboxes)?;
        }
        write_mailboxes(&mut out, "Reply-To", &self.reply_to)?;

        for (name, value) in self.headers.iter() {
            write_header(&mut out, name, value);
        }
        if !self.headers.contains("MIME-Version") {
            write_header(&mut out, "MIME-Version", "1.0");
        }

        if self.parts.is_empty() {
            write_header(&mut out, "Content-Type", &self.content_type().to_string());
            out.push_str("\r\n");
            return Ok(out);
        }

        let boundary = format!("----=_Part_{}", uuid::Uuid::new_v4().simple());
        let content_type = ContentType::multipart_alternative(boundary.as_str());
        write_header(&mut out, "Content-Type", &content_type.to_string());
        out.push_str("\r\n");

        for part in &self.parts {
            let _ = write!(out, "--{boundary}\r\n{}\r\n", part.headers);
            out.push_str(&String::from_utf8_lossy(&part.body));
            if !part.body.ends_with(b"\r\n") {
                out.push_str("\r\n");
            }
        }
        let _ = write!(out, "--{boundary}--\r\n");

        Ok(out)
    }
}

fn write_mailboxes(out: &mut String, name: &str, mailboxes: &[Mailbox]) -> Result<()> {
    if mailboxes.is_empty() {
        return Ok(());
    }
    let rendered = mailboxes
        .iter()
        .map(Mailbox::to_header)
        .collect::<Result<Vec<_>>>()?;
    write_header(out, name, &rendered.join(", "));
    Ok(())
}

/// Writes one header, folding at spaces so lines stay near 78 columns.
fn write_header(out: &mut String, name: &str, value: &str) {
    let mut column = name.len() + 1;
    out.push_str(name);
    out.push(':');

    for (index, token) in value.split(' ').enumerate() {
        if index > 0 && column + 1 + token.len() > FOLD_COLUMN {
            out.push_str("\r\n");
            column = 0;
        }
        out.push(' ');
        out.push_str(token);
        column += 1 + token.len();
    }
    out.push_str("\r\n");
}

fn normalize_newlines(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 40);
    for &byte in bytes {
        if byte == b'\n' {
            out.extend_from_slice(b"\r\n");
        } else {
            out.push(byte);
        }
    }
    out
}
