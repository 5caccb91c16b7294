//! MIME encoding and decoding utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 header encoding.

use crate::charset::Charset;
use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum line length for encoded bodies (RFC 2045).
const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of a single RFC 2047 encoded word.
const MAX_ENCODED_WORD: usize = 75;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 folded into CRLF-terminated 76-column lines.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        // Base64 output is pure ASCII, so every chunk is valid UTF-8.
        result.push_str(&String::from_utf8_lossy(chunk));
        result.push_str("\r\n");
    }
    result
}

/// Decodes Base64 data, ignoring embedded whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Returns true if the text cannot travel verbatim in a header.
///
/// Text containing `=?` is included: a reader would take it for the start
/// of an encoded word.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.contains("=?")
        || text
            .chars()
            .any(|c| !c.is_ascii() || (c.is_ascii_control() && c != '\t'))
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (LF or CRLF) are kept as hard CRLF breaks;
/// long lines get soft breaks so no output line exceeds 76 characters.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::new();
    let mut lines = data.split(|&b| b == b'\n').peekable();

    while let Some(line) = lines.next() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        encode_qp_line(line, &mut result);
        if lines.peek().is_some() {
            result.push_str("\r\n");
        }
    }

    result
}

fn encode_qp_line(line: &[u8], result: &mut String) {
    let mut line_length = 0;

    for (index, byte) in line.iter().enumerate() {
        let last = index + 1 == line.len();
        let literal = match byte {
            b'!'..=b'<' | b'>'..=b'~' => true,
            // Trailing whitespace would be stripped in transit
            b' ' | b'\t' => !last,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        // Keep room for the soft break marker
        if line_length + width > MAX_LINE_LENGTH - 1 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        if literal {
            result.push(char::from(*byte));
        } else {
            let _ = write!(result, "={byte:02X}");
        }
        line_length += width;
    }
}

/// Decodes Quoted-Printable text (RFC 2045) into raw bytes.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            result.push(bytes[i]);
            i += 1;
            continue;
        }

        // Soft line break
        match bytes.get(i + 1..) {
            Some([b'\r', b'\n', ..]) => {
                i += 3;
                continue;
            }
            Some([b'\n', ..]) => {
                i += 2;
                continue;
            }
            _ => {}
        }

        let hex = bytes
            .get(i + 1..i + 3)
            .ok_or_else(|| Error::InvalidEncoding("Incomplete escape sequence".to_string()))?;
        let hex = std::str::from_utf8(hex)
            .map_err(|_| Error::InvalidEncoding("Non-ASCII escape sequence".to_string()))?;
        let byte = u8::from_str_radix(hex, 16)
            .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
        result.push(byte);
        i += 3;
    }

    Ok(result)
}

/// How strictly the Q encoding treats ASCII punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QContext {
    /// Unstructured header text such as `Subject`.
    Text,
    /// A phrase such as a display name; only RFC 2047 section 5(3)
    /// characters stay literal.
    Phrase,
}

impl QContext {
    const fn is_literal(self, byte: u8) -> bool {
        match self {
            Self::Text => matches!(byte, b'!'..=b'~') && !matches!(byte, b'=' | b'?' | b'_'),
            Self::Phrase => {
                byte.is_ascii_alphanumeric() || matches!(byte, b'!' | b'*' | b'+' | b'-' | b'/')
            }
        }
    }
}

/// Encodes header text as RFC 2047 `Q` encoded words when needed.
///
/// Plain ASCII text is returned unchanged. Otherwise the whole text is
/// encoded in `charset`, split into encoded words of at most 75 characters
/// separated by single spaces. A character is never split across words.
///
/// # Errors
///
/// Returns an error if `charset` cannot represent the text.
pub fn encode_rfc2047(text: &str, charset: Charset, context: QContext) -> Result<String> {
    if !needs_encoding(text) {
        return Ok(text.to_string());
    }

    let prefix = format!("=?{}?Q?", charset.name());
    let budget = MAX_ENCODED_WORD - prefix.len() - 2;

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut buf = Vec::with_capacity(4);

    for ch in text.chars() {
        buf.clear();
        charset.encode_char(ch, &mut buf)?;

        let mut piece = String::with_capacity(buf.len() * 3);
        for &byte in &buf {
            if byte == b' ' {
                piece.push('_');
            } else if context.is_literal(byte) {
                piece.push(char::from(byte));
            } else {
                let _ = write!(piece, "={byte:02X}");
            }
        }

        if !current.is_empty() && current.len() + piece.len() > budget {
            words.push(std::mem::take(&mut current));
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        words.push(current);
    }

    Ok(words
        .iter()
        .map(|word| format!("{prefix}{word}?="))
        .collect::<Vec<_>>()
        .join(" "))
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Whitespace between two adjacent encoded words is dropped, as the RFC
/// requires; text outside encoded words is kept verbatim.
///
/// # Errors
///
/// Returns an error if an encoded word is malformed or names an unsupported
/// charset.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut pending_space = String::new();
    let mut after_word = false;

    while !rest.is_empty() {
        if let Some(start) = rest.find("=?") {
            let (before, tail) = rest.split_at(start);
            if let Some((decoded, consumed)) = decode_word(tail)? {
                if !(after_word && before.chars().all(char::is_whitespace)) {
                    result.push_str(&pending_space);
                    result.push_str(before);
                }
                pending_space.clear();
                result.push_str(&decoded);
                rest = &tail[consumed..];
                after_word = true;

                let trimmed = rest.trim_start();
                pending_space.push_str(&rest[..rest.len() - trimmed.len()]);
                rest = trimmed;
                continue;
            }
            result.push_str(&pending_space);
            pending_space.clear();
            result.push_str(before);
            result.push_str("=?");
            rest = &tail[2..];
            after_word = false;
        } else {
            result.push_str(&pending_space);
            pending_space.clear();
            result.push_str(rest);
            rest = "";
        }
    }
    result.push_str(&pending_space);

    Ok(result)
}

/// Charset of the first well-formed encoded word in `text`, if any.
///
/// # Errors
///
/// Returns an error if that word names an unsupported charset or its
/// payload is malformed.
pub(crate) fn first_word_charset(text: &str) -> Result<Option<Charset>> {
    let mut rest = text;
    while let Some(start) = rest.find("=?") {
        let tail = &rest[start..];
        if decode_word(tail)?.is_some() {
            let name = tail[2..].split('?').next().unwrap_or_default();
            return Charset::lookup(name.split('*').next().unwrap_or(name)).map(Some);
        }
        rest = &tail[2..];
    }
    Ok(None)
}

/// Decodes one encoded word at the start of `text`, returning the decoded
/// text and the number of bytes consumed, or `None` if `text` does not start
/// with a well-formed word.
fn decode_word(text: &str) -> Result<Option<(String, usize)>> {
    let inner = &text[2..];
    let mut fields = inner.splitn(3, '?');
    let (Some(charset), Some(encoding), Some(tail)) = (fields.next(), fields.next(), fields.next())
    else {
        return Ok(None);
    };
    let Some(end) = tail.find("?=") else {
        return Ok(None);
    };
    if charset.is_empty() || charset.contains(char::is_whitespace) || tail[..end].contains(' ') {
        return Ok(None);
    }
    let payload = &tail[..end];
    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;

    // RFC 2231 language suffix: charset*lang
    let charset = charset.split('*').next().unwrap_or(charset);
    let charset = Charset::lookup(charset)?;

    let bytes = match encoding.to_ascii_uppercase().as_str() {
        "B" => decode_base64(payload)?,
        "Q" => decode_quoted_printable(&payload.replace('_', " "))?,
        other => {
            return Err(Error::InvalidEncoding(format!("Unknown encoding: {other}")));
        }
    };

    Ok(Some((charset.decode(&bytes)?, consumed)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64_lines_are_folded() {
        let data = vec![0xAB; 200];
        let encoded = encode_base64_lines(&data);
        for line in encoded.split("\r\n").filter(|l| !l.is_empty()) {
            assert!(line.len() <= 76);
        }
        assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    #[test]
    fn test_quoted_printable_encode() {
        assert_eq!(encode_quoted_printable(b"Hello, World!"), "Hello, World!");

        let encoded = encode_quoted_printable("Héllo, Wørld!".as_bytes());
        assert!(encoded.contains("=C3=A9"));
    }

    #[test]
    fn test_quoted_printable_keeps_line_breaks() {
        let encoded = encode_quoted_printable(b"one\ntwo \r\nthree");
        assert_eq!(encoded, "one\r\ntwo=20\r\nthree");
    }

    #[test]
    fn test_quoted_printable_soft_breaks() {
        let text = "x".repeat(200);
        let encoded = encode_quoted_printable(text.as_bytes());
        assert!(encoded.split("\r\n").all(|l| l.len() <= 76));
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("Hello").unwrap(), b"Hello");
        assert_eq!(
            decode_quoted_printable("H=C3=A9llo").unwrap(),
            "Héllo".as_bytes()
        );
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld").unwrap(), b"HelloWorld");
        assert!(decode_quoted_printable("bad=4").is_err());
    }

    #[test]
    fn test_rfc2047_ascii_untouched() {
        let encoded = encode_rfc2047("Hello", Charset::Utf8, QContext::Text).unwrap();
        assert_eq!(encoded, "Hello");
    }

    #[test]
    fn test_rfc2047_q_text() {
        let encoded =
            encode_rfc2047("how are you, друг?", Charset::Utf8, QContext::Text).unwrap();
        assert_eq!(encoded, "=?UTF-8?Q?how_are_you,_=D0=B4=D1=80=D1=83=D0=B3=3F?=");
    }

    #[test]
    fn test_rfc2047_q_phrase_encodes_specials() {
        let encoded = encode_rfc2047("Doe, Jöhn", Charset::Utf8, QContext::Phrase).unwrap();
        assert_eq!(encoded, "=?UTF-8?Q?Doe=2C_J=C3=B6hn?=");
    }

    #[test]
    fn test_rfc2047_words_are_bounded() {
        let text = "ж".repeat(60);
        let encoded = encode_rfc2047(&text, Charset::Utf8, QContext::Text).unwrap();
        let words: Vec<&str> = encoded.split(' ').collect();
        assert!(words.len() > 1);
        for word in &words {
            assert!(word.len() <= 75, "{word}");
            assert!(word.starts_with("=?UTF-8?Q?") && word.ends_with("?="));
        }
        assert_eq!(decode_rfc2047(&encoded).unwrap(), text);
    }

    #[test]
    fn test_rfc2047_latin1() {
        let encoded = encode_rfc2047("café", Charset::Latin1, QContext::Text).unwrap();
        assert_eq!(encoded, "=?ISO-8859-1?Q?caf=E9?=");
        assert_eq!(decode_rfc2047(&encoded).unwrap(), "café");
    }

    #[test]
    fn test_rfc2047_unrepresentable() {
        assert!(encode_rfc2047("друг", Charset::UsAscii, QContext::Text).is_err());
    }

    #[test]
    fn test_rfc2047_decode() {
        assert_eq!(decode_rfc2047("Hello").unwrap(), "Hello");
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
        assert_eq!(decode_rfc2047("=?utf-8?Q?H=C3=A9llo?=").unwrap(), "Héllo");
    }

    #[test]
    fn test_rfc2047_decode_mixed() {
        let decoded = decode_rfc2047("Re: =?UTF-8?Q?caf=C3=A9?= =?UTF-8?Q?_ok?= done").unwrap();
        assert_eq!(decoded, "Re: café ok done");
    }

    #[test]
    fn test_rfc2047_literal_marker_is_encoded() {
        assert!(needs_encoding("cost =?"));
        let encoded = encode_rfc2047("=?UTF-8?Q?hi?=", Charset::Utf8, QContext::Text).unwrap();
        assert!(encoded.starts_with("=?UTF-8?Q?=3D=3FUTF-8=3FQ=3Fhi=3F=3D"));
        assert_eq!(decode_rfc2047(&encoded).unwrap(), "=?UTF-8?Q?hi?=");
    }

    #[test]
    fn test_first_word_charset_skips_malformed_words() {
        assert_eq!(first_word_charset("Q=?A").unwrap(), None);
        assert_eq!(first_word_charset("Who=?x?y").unwrap(), None);
        assert_eq!(
            first_word_charset("a=?b =?ISO-8859-1?Q?caf=E9?=").unwrap(),
            Some(Charset::Latin1)
        );
        assert!(first_word_charset("=?x-unknown?Q?abc?=").is_err());
    }

    #[test]
    fn test_rfc2047_decode_unknown_charset() {
        assert!(decode_rfc2047("=?x-unknown?Q?abc?=").is_err());
    }
}
