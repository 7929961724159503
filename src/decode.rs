//! Content-Transfer-Encoding decoders for message parts

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use encoding_rs::WINDOWS_1252;
use quoted_printable::ParseMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::options::UnknownEncoding;

/// Base64 bodies often lose their padding when mail tools rewrap them.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Modified base64 inside UTF-7 shift sequences (RFC 2152): never padded,
/// and leftover bits must be zero.
const UTF7_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(false),
);

/// Declared transfer encoding of a message part
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferEncoding {
    Base64,
    /// `7bit`, read as UTF-7 text
    SevenBit,
    EightBit,
    QuotedPrintable,
    /// Any other token, lowercased
    Other(String),
}

impl TransferEncoding {
    /// Classify the token captured after `Content-Transfer-Encoding: `.
    ///
    /// The token stops at the first non-word character, so
    /// `quoted-printable` arrives here as `quoted`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.to_lowercase();
        match token.as_str() {
            "base64" => Self::Base64,
            "7bit" => Self::SevenBit,
            "8bit" => Self::EightBit,
            t if t.starts_with("quoted") => Self::QuotedPrintable,
            _ => Self::Other(token),
        }
    }

    /// Decode a part body whose headers have already been stripped.
    pub fn decode(&self, body: &str, unknown: UnknownEncoding) -> Result<String> {
        match self {
            Self::Base64 => decode_base64(body),
            Self::SevenBit => Ok(decode_utf7(body)),
            // No byte mapping is applied to 8bit bodies.
            Self::EightBit => Ok(body.to_owned()),
            Self::QuotedPrintable => {
                // Hard breaks come back as CRLF; part text uses LF.
                let text = bytes_to_text(decode_quoted_printable(body)?);
                Ok(text.replace("\r\n", "\n"))
            }
            Self::Other(token) => {
                warn!("Unsupported transfer encoding: {token}");
                Ok(match unknown {
                    UnknownEncoding::AppendToken => format!("{body}{token}"),
                    UnknownEncoding::Passthrough => body.to_owned(),
                })
            }
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => f.write_str("base64"),
            Self::SevenBit => f.write_str("7bit"),
            Self::EightBit => f.write_str("8bit"),
            Self::QuotedPrintable => f.write_str("quoted-printable"),
            Self::Other(token) => f.write_str(token),
        }
    }
}

/// Decode a base64 body, skipping line breaks and any other stray bytes.
pub fn decode_base64(body: &str) -> Result<String> {
    let cleaned: Vec<u8> = body
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
        .collect();

    let bytes = LENIENT_BASE64.decode(cleaned)?;
    Ok(bytes_to_text(bytes))
}

/// Decode UTF-7 (RFC 2152) text.
///
/// Permissive: a `+` that does not start a valid shift sequence is kept
/// literally, as are non-ASCII characters.
#[must_use]
pub fn decode_utf7(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('+') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let run = after.bytes().take_while(|&b| is_utf7_base64(b)).count();
        let (encoded, tail) = after.split_at(run);

        if run == 0 {
            // "+-" encodes a literal plus
            out.push('+');
            rest = tail.strip_prefix('-').unwrap_or(tail);
            continue;
        }

        if let Some(decoded) = decode_utf7_run(encoded) {
            out.push_str(&decoded);
            rest = tail.strip_prefix('-').unwrap_or(tail);
        } else {
            out.push('+');
            out.push_str(encoded);
            rest = tail;
        }
    }

    out.push_str(rest);
    out
}

/// A shift sequence only counts when it is whole UTF-16: an even byte
/// count with no unpaired surrogates. Anything else, such as `+39`, is text.
fn decode_utf7_run(encoded: &str) -> Option<String> {
    let bytes = UTF7_BASE64.decode(encoded).ok()?;
    if bytes.len() % 2 != 0 {
        return None;
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

const fn is_utf7_base64(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/'
}

/// Decode quoted-printable text (RFC 2045) into raw bytes.
///
/// Soft line breaks are removed; malformed escapes are kept as-is.
pub fn decode_quoted_printable(text: &str) -> Result<Vec<u8>> {
    quoted_printable::decode(text.as_bytes(), ParseMode::Robust)
        .map_err(|e| ParseError::Decode(format!("quoted printable decode: {e}")))
}

/// UTF-8 when valid, otherwise read as Windows-1252 (a superset of Latin-1).
#[must_use]
pub fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(err.as_bytes());
            text.into_owned()
        }
    }
}
