//! Lossy coercion: always produces UTF-8, escaping what cannot be decoded.
//!
//! Undecodable bytes become the literal token `0x` followed by two lowercase
//! hex digits, one token per byte, so nothing is silently dropped:
//!
//! ```rust
//! use utf8_coerce::coerce_utf8;
//!
//! assert_eq!(coerce_utf8(b"rubbish \x90 rubbish", None), "rubbish 0x90 rubbish");
//! ```
use std::borrow::Cow;

use tracing::debug;

use crate::bom::detect_bom;
use crate::chain::CandidateChain;
use crate::config::{default_config, CoercionConfig};
use crate::encoding::EncodingId;
use crate::strict::{reclaim, Detection, Settled, Transcoded};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Transcodes `bytes` to UTF-8 without ever failing.
///
/// - A byte-order mark (when [`CoercionConfig::detect_bom`] is set) names the
///   working encoding.
/// - Otherwise a preferred encoding, if given, is the working encoding.
/// - Otherwise the default chain is tried whole-buffer like strict mode, and
///   if nothing validates, [`CoercionConfig::lossy_fallback`] is used.
///
/// The input is then scanned under the working encoding; decodable runs pass
/// through and each byte of a malformed sequence is replaced by its escape
/// token.
///
/// # Examples
///
/// ```rust
/// use utf8_coerce::{transcode_lossy, CoercionConfig, Detection, EncodingId};
///
/// let cfg = CoercionConfig::default();
/// let out = transcode_lossy(b"maybe \xc0 rubbish", Some(EncodingId::UTF_8), &cfg);
/// assert_eq!(out.text, "maybe 0xc0 rubbish");
/// assert_eq!(out.detection, Detection::Escaped);
/// assert_eq!(out.escaped_bytes, 1);
/// ```
pub fn transcode_lossy<'a>(
    bytes: &'a [u8],
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> Transcoded<'a> {
    let transcoded = scan(bytes, preferred, cfg);
    let transcoded = if cfg.escape_control_chars {
        with_controls_escaped(transcoded)
    } else {
        transcoded
    };
    if transcoded.escaped_bytes > 0 {
        debug!(
            encoding = %transcoded.encoding,
            escaped_bytes = transcoded.escaped_bytes,
            input_len = bytes.len(),
            "escaped unmappable bytes"
        );
    }
    transcoded
}

fn scan<'a>(
    bytes: &'a [u8],
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> Transcoded<'a> {
    if cfg.detect_bom {
        if let Some((encoding, bom_len)) = detect_bom(bytes) {
            return Transcoded {
                bom_len,
                ..decode_or_escape(&bytes[bom_len..], encoding, Detection::ByteOrderMark)
            };
        }
    }

    if let Some(encoding) = preferred {
        return decode_or_escape(bytes, encoding, Detection::Preferred);
    }

    let chain = CandidateChain::new(None, &cfg.default_chain);
    for encoding in chain.iter() {
        if let Some(text) = encoding.decode(bytes) {
            return Transcoded::new(text, encoding, Detection::Candidate);
        }
    }
    escape_unmappable(bytes, cfg.lossy_fallback)
}

fn decode_or_escape(
    bytes: &[u8],
    encoding: EncodingId,
    detection: Detection,
) -> Transcoded<'_> {
    match encoding.decode(bytes) {
        Some(text) => Transcoded::new(text, encoding, detection),
        None => escape_unmappable(bytes, encoding),
    }
}

/// Scans `bytes` under `encoding`, escaping each byte of every malformed unit.
fn escape_unmappable(bytes: &[u8], encoding: EncodingId) -> Transcoded<'static> {
    let mut out = String::with_capacity(bytes.len() + bytes.len() / 4);
    let mut escaped_bytes = 0;
    let mut rest = bytes;

    while !rest.is_empty() {
        let (run_len, bad_len) = match encoding.malformed_at(rest) {
            Some((at, len)) => (at, len.min(rest.len() - at)),
            None => (rest.len(), 0),
        };
        escaped_bytes += push_run(&mut out, encoding, &rest[..run_len]);
        for &byte in &rest[run_len..run_len + bad_len] {
            push_escape(&mut out, byte);
        }
        escaped_bytes += bad_len;
        rest = &rest[run_len + bad_len..];
    }

    Transcoded {
        escaped_bytes,
        ..Transcoded::new(Cow::Owned(out), encoding, Detection::Escaped)
    }
}

/// Appends a run that decoded cleanly while scanning. Returns escaped count.
fn push_run(out: &mut String, encoding: EncodingId, run: &[u8]) -> usize {
    match encoding.decode(run) {
        Some(text) => {
            out.push_str(&text);
            0
        }
        // A stateful encoding can reject a run cut out of its context.
        None => {
            run.iter().for_each(|&byte| push_escape(out, byte));
            run.len()
        }
    }
}

fn push_escape(out: &mut String, byte: u8) {
    out.push_str("0x");
    out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
    out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
}

fn is_escaped_control(c: char) -> bool {
    c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Replaces C0 control characters (except TAB, LF, CR) and DEL with escape
/// tokens. Borrows when there is nothing to escape.
///
/// ```rust
/// use utf8_coerce::escape_control_chars;
///
/// assert_eq!(escape_control_chars("bell\u{7}\tok"), "bell0x07\tok");
/// ```
pub fn escape_control_chars(text: &str) -> Cow<'_, str> {
    escape_controls_counted(text).0
}

fn escape_controls_counted(text: &str) -> (Cow<'_, str>, usize) {
    if !text.chars().any(is_escaped_control) {
        return (Cow::Borrowed(text), 0);
    }
    let mut out = String::with_capacity(text.len() + 8);
    let mut count = 0;
    for c in text.chars() {
        if is_escaped_control(c) {
            // ASCII, so the scalar value is the byte.
            push_escape(&mut out, c as u8);
            count += 1;
        } else {
            out.push(c);
        }
    }
    (Cow::Owned(out), count)
}

fn with_controls_escaped(mut transcoded: Transcoded<'_>) -> Transcoded<'_> {
    let replaced = match escape_controls_counted(&transcoded.text) {
        (Cow::Owned(text), count) => Some((text, count)),
        (Cow::Borrowed(_), _) => None,
    };
    if let Some((text, count)) = replaced {
        transcoded.text = Cow::Owned(text);
        transcoded.escaped_bytes += count;
    }
    transcoded
}

/// Returns a newly allocated UTF-8 string; never fails.
///
/// With a preferred encoding the input is read as that encoding; without one
/// the default chain is tried and, failing that, the configured fallback is
/// scanned. Uses the process-wide default [`CoercionConfig`].
///
/// ```rust
/// use utf8_coerce::{coerce_utf8, EncodingId};
///
/// let input = b"maybe \xc0 rubbish";
/// assert_eq!(coerce_utf8(input, Some(EncodingId::WINDOWS_1252)), "maybe \u{c0} rubbish");
/// assert_eq!(coerce_utf8(input, Some(EncodingId::UTF_8)), "maybe 0xc0 rubbish");
/// ```
pub fn coerce_utf8(bytes: &[u8], preferred: Option<EncodingId>) -> String {
    coerce_utf8_with(bytes, preferred, default_config())
}

/// [`coerce_utf8`] with an explicit configuration.
pub fn coerce_utf8_with(
    bytes: &[u8],
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> String {
    transcode_lossy(bytes, preferred, cfg).text.into_owned()
}

/// Lossy counterpart of [`ensure_utf8_owned`](crate::ensure_utf8_owned):
/// reuses the buffer's allocation when the bytes need no change.
pub fn coerce_utf8_owned(bytes: Vec<u8>, preferred: Option<EncodingId>) -> String {
    coerce_utf8_owned_with(bytes, preferred, default_config())
}

/// [`coerce_utf8_owned`] with an explicit configuration.
pub fn coerce_utf8_owned_with(
    bytes: Vec<u8>,
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> String {
    let settled = transcode_lossy(&bytes, preferred, cfg).settle();
    match settled {
        Settled::Fresh(text) => text,
        Settled::Reuse { skip } => {
            reclaim(bytes, skip).unwrap_or_else(|bytes| coerce_utf8_with(&bytes, preferred, cfg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_token_is_lowercase_two_digit_hex() {
        let mut out = String::new();
        for byte in [0x00, 0x0a, 0x90, 0xff] {
            push_escape(&mut out, byte);
        }
        assert_eq!(out, "0x000x0a0x900xff");
    }

    #[test]
    fn multi_byte_sequences_escape_per_byte() {
        // A 3-byte lead followed by one continuation, then ASCII.
        let cfg = CoercionConfig::default();
        let out = transcode_lossy(b"a\xe3\x81b", Some(EncodingId::UTF_8), &cfg);
        assert_eq!(out.text, "a0xe30x81b");
        assert_eq!(out.escaped_bytes, 2);
    }

    #[test]
    fn truncated_tail_is_escaped() {
        let out = coerce_utf8(b"ok\xe2\x82", Some(EncodingId::UTF_8));
        assert_eq!(out, "ok0xe20x82");
    }

    #[test]
    fn valid_utf8_neighbours_survive_utf8_scan() {
        let mut input = "naïve ".as_bytes().to_vec();
        input.push(0xff);
        input.extend_from_slice(" café".as_bytes());
        assert_eq!(coerce_utf8(&input, Some(EncodingId::UTF_8)), "naïve 0xff café");
    }

    #[test]
    fn fallback_scans_default_legacy_encoding() {
        let out = transcode_lossy(b"\x93quoted\x94 \x81", None, &CoercionConfig::default());
        assert_eq!(out.encoding, EncodingId::WINDOWS_1252);
        assert_eq!(out.detection, Detection::Escaped);
        assert_eq!(out.text, "\u{201c}quoted\u{201d} 0x81");
    }

    #[test]
    fn fallback_encoding_is_configurable() {
        let cfg = CoercionConfig {
            lossy_fallback: EncodingId::UTF_8,
            ..Default::default()
        };
        let out = transcode_lossy(b"\x93quoted\x94 \x81", None, &cfg);
        assert_eq!(out.text, "0x93quoted0x94 0x81");
        assert_eq!(out.escaped_bytes, 3);
    }

    #[test]
    fn whole_buffer_candidate_wins_before_scanning() {
        let out = transcode_lossy(b"maybe \xc0 rubbish", None, &CoercionConfig::default());
        assert_eq!(out.detection, Detection::Candidate);
        assert_eq!(out.text, "maybe \u{c0} rubbish");
    }

    #[test]
    fn bom_remainder_is_scanned_under_bom_encoding() {
        let out = transcode_lossy(b"\xfe\xff\x03\xb1\x03", None, &CoercionConfig::default());
        assert_eq!(out.bom_len, 2);
        assert_eq!(out.encoding, EncodingId::UTF_16BE);
        assert_eq!(out.text, "\u{3b1}0x03");
    }

    #[test]
    fn all_bytes_bad_is_all_tokens() {
        assert_eq!(coerce_utf8(b"\x81\x8d\x8f", None), "0x810x8d0x8f");
        assert_eq!(coerce_utf8(b"", None), "");
    }

    #[test]
    fn control_chars_escaped_only_when_enabled() {
        let input = b"a\x07b\tc\x7f";
        assert_eq!(coerce_utf8(input, None), "a\u{7}b\tc\u{7f}");

        let cfg = CoercionConfig {
            escape_control_chars: true,
            ..Default::default()
        };
        let out = transcode_lossy(input, None, &cfg);
        assert_eq!(out.text, "a0x07b\tc0x7f");
        assert_eq!(out.escaped_bytes, 2);
        assert_eq!(out.detection, Detection::Candidate);
    }

    #[test]
    fn escape_control_chars_borrows_clean_text() {
        assert!(matches!(escape_control_chars("line\r\n"), Cow::Borrowed(_)));
        assert_eq!(escape_control_chars("\u{0}"), "0x00");
    }

    #[test]
    fn owned_reuses_allocation_for_clean_input() {
        let bytes = b"already fine".to_vec();
        let ptr = bytes.as_ptr();
        let text = coerce_utf8_owned(bytes, None);
        assert_eq!(text.as_ptr(), ptr);
    }

    #[test]
    fn owned_allocates_for_escapes() {
        let text = coerce_utf8_owned(b"rubbish \x90 rubbish".to_vec(), None);
        assert_eq!(text, "rubbish 0x90 rubbish");
    }

    #[test]
    fn reclaim_fallback_keeps_escape_tokens() {
        let cfg = CoercionConfig::default();
        let text = reclaim(b"\xef\xbb\xbfa\x90".to_vec(), 3)
            .unwrap_or_else(|bytes| coerce_utf8_with(&bytes, None, &cfg));
        assert_eq!(text, "a0x90");
        assert!(!text.contains('\u{fffd}'));
    }
}
