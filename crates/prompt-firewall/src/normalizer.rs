//! Base64 anti-obfuscation.
//!
//! Attackers can hide a banned phrase behind a base64 layer that the model
//! would happily decode.  [`normalize`] reveals that payload so it can be
//! matched against the signatures.  It decodes a single layer of standard
//! base64 and nothing else.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Inputs shorter than this (after trimming) are never treated as base64.
pub const MIN_ENCODED_LEN: usize = 8;

/// Standard alphabet, padding required, non-zero trailing bits tolerated.
/// Changing the last symbol's unused bits must not hide a payload.
const DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// Why a candidate could not be decoded.  Never surfaced to callers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum DecodeError {
    #[error("input does not look like base64")]
    Implausible,

    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("decoded bytes are not UTF-8")]
    Utf8,

    #[error("decoded text contains non-printable characters")]
    NonPrintable,
}

/// Try to reveal text hidden behind base64.
///
/// Returns `None` whenever any step fails; the caller then scans the original
/// text alone.
pub fn normalize(text: &str) -> Option<String> {
    match decode(text) {
        Ok(decoded) => {
            tracing::debug!(decoded_len = decoded.len(), "base64 payload revealed");
            Some(decoded)
        }
        Err(err) => {
            tracing::trace!(%err, "no base64 payload");
            None
        }
    }
}

pub(crate) fn decode(text: &str) -> Result<String, DecodeError> {
    let candidate = text.trim();
    if !is_plausible(candidate) {
        return Err(DecodeError::Implausible);
    }

    let bytes = DECODER.decode(candidate)?;
    let decoded = String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;

    if !decoded.chars().all(is_printable) {
        return Err(DecodeError::NonPrintable);
    }
    Ok(decoded)
}

/// Cheap shape check run before any decoding is attempted.
fn is_plausible(candidate: &str) -> bool {
    if candidate.len() < MIN_ENCODED_LEN {
        return false;
    }
    let body = candidate.trim_end_matches('=');
    if candidate.len() - body.len() > 2 {
        return false;
    }
    body.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

fn is_printable(c: char) -> bool {
    c == ' ' || !(c.is_control() || c.is_whitespace() || is_format_or_private(c))
}

/// Unicode format characters (Cf) and private-use code points (Co).
fn is_format_or_private(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}
