//! Encoding identifiers and the strict decode capability.
//!
//! [`EncodingId`] is a thin, `Copy` handle over an [`encoding_rs::Encoding`].
//! The WHATWG tables shipped by `encoding_rs` are the registry of recognized
//! encodings; this module only adds the strictness the coercion engine needs:
//!
//! - decoding never substitutes U+FFFD, a malformed unit rejects the buffer
//! - the undefined positions of the Windows code pages (which WHATWG maps onto
//!   the C1 controls, e.g. `0x90` in windows-1252) count as malformed
//!
//! # Examples
//!
//! ```rust
//! use utf8_coerce::EncodingId;
//!
//! let euc_jp: EncodingId = "EUC-JP".parse().unwrap();
//! assert_eq!(euc_jp.name(), "EUC-JP");
//!
//! assert_eq!(EncodingId::WINDOWS_1252.decode(b"caf\xe9").as_deref(), Some("café"));
//! assert!(EncodingId::WINDOWS_1252.decode(b"\x90").is_none());
//! ```
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use encoding_rs::{DecoderResult, Encoding};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ConfigError;

/// Output scratch size used while locating malformed sequences.
const SCRATCH_BYTES: usize = 4096;

/// Identifier of a character encoding recognized by the host registry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncodingId(&'static Encoding);

impl EncodingId {
    /// UTF-8.
    pub const UTF_8: EncodingId = EncodingId(&encoding_rs::UTF_8_INIT);
    /// UTF-16, little-endian.
    pub const UTF_16LE: EncodingId = EncodingId(&encoding_rs::UTF_16LE_INIT);
    /// UTF-16, big-endian.
    pub const UTF_16BE: EncodingId = EncodingId(&encoding_rs::UTF_16BE_INIT);
    /// Windows-1252, the usual legacy fallback for Western text.
    pub const WINDOWS_1252: EncodingId = EncodingId(&encoding_rs::WINDOWS_1252_INIT);

    /// Looks up an encoding by any of its WHATWG labels.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Labels
    /// that resolve to the WHATWG "replacement" encoding are not recognized,
    /// since nothing can be decoded under it.
    pub fn for_label(label: &str) -> Option<EncodingId> {
        Encoding::for_label_no_replacement(label.as_bytes()).map(EncodingId)
    }

    /// Canonical name, e.g. `"UTF-8"` or `"windows-1252"`.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// The underlying `encoding_rs` encoding.
    pub fn encoding(self) -> &'static Encoding {
        self.0
    }

    /// Decodes the whole buffer, or returns `None` if any unit is malformed.
    ///
    /// No BOM sniffing happens here. The result borrows from `bytes` when they
    /// are already the UTF-8 representation of the decoded text (pure ASCII
    /// under an ASCII-compatible encoding, or valid UTF-8 under UTF-8).
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        if self.first_undefined_byte(bytes).is_some() {
            return None;
        }
        self.0
            .decode_without_bom_handling_and_without_replacement(bytes)
    }

    /// Returns `(offset, len)` of the first malformed sequence in `bytes`.
    pub fn malformed_at(self, bytes: &[u8]) -> Option<(usize, usize)> {
        let undefined = self.first_undefined_byte(bytes).map(|at| (at, 1));
        let limit = undefined.map_or(bytes.len(), |(at, _)| at);
        self.first_decoder_error(&bytes[..limit]).or(undefined)
    }

    fn first_decoder_error(self, bytes: &[u8]) -> Option<(usize, usize)> {
        let mut decoder = self.0.new_decoder_without_bom_handling();
        let mut scratch = String::with_capacity(SCRATCH_BYTES);
        let mut consumed = 0;
        loop {
            scratch.clear();
            let (result, read) =
                decoder.decode_to_string_without_replacement(&bytes[consumed..], &mut scratch, true);
            consumed += read;
            match result {
                DecoderResult::InputEmpty => return None,
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(bad, after) => {
                    let end = consumed.saturating_sub(usize::from(after));
                    let bad = usize::from(bad).max(1);
                    return Some((end.saturating_sub(bad), bad));
                }
            }
        }
    }

    fn first_undefined_byte(self, bytes: &[u8]) -> Option<usize> {
        let mask = self.undefined_c1_mask();
        if mask == 0 {
            return None;
        }
        bytes
            .iter()
            .position(|&b| (0x80..=0x9f).contains(&b) && mask & (1 << (b - 0x80)) != 0)
    }

    /// Bit `i` is set when byte `0x80 + i` is an undefined code page position.
    fn undefined_c1_mask(self) -> u32 {
        if !self.0.is_single_byte() || !self.0.name().starts_with("windows-") {
            return 0;
        }
        windows_masks()
            .iter()
            .find(|(page, _)| std::ptr::eq(*page, self.0))
            .map_or_else(|| c1_identity_mask(self.0), |&(_, mask)| mask)
    }
}

/// Masks for the WHATWG Windows single-byte pages, computed once.
fn windows_masks() -> &'static [(&'static Encoding, u32)] {
    static MASKS: OnceLock<Vec<(&'static Encoding, u32)>> = OnceLock::new();
    MASKS.get_or_init(|| {
        [
            encoding_rs::WINDOWS_874,
            encoding_rs::WINDOWS_1250,
            encoding_rs::WINDOWS_1251,
            encoding_rs::WINDOWS_1252,
            encoding_rs::WINDOWS_1253,
            encoding_rs::WINDOWS_1254,
            encoding_rs::WINDOWS_1255,
            encoding_rs::WINDOWS_1256,
            encoding_rs::WINDOWS_1257,
            encoding_rs::WINDOWS_1258,
        ]
        .into_iter()
        .map(|page| (page, c1_identity_mask(page)))
        .collect()
    })
}

/// Positions in `0x80..=0x9f` that `page` maps onto the same-numbered C1 control.
fn c1_identity_mask(page: &'static Encoding) -> u32 {
    let high: [u8; 32] = std::array::from_fn(|i| 0x80 + i as u8);
    let (decoded, _) = page.decode_without_bom_handling(&high);
    decoded
        .chars()
        .zip(0x80u32..)
        .filter(|&(c, byte)| u32::from(c) == byte)
        .fold(0, |mask, (_, byte)| mask | 1 << (byte - 0x80))
}

impl fmt::Display for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodingId({})", self.name())
    }
}

impl FromStr for EncodingId {
    type Err = ConfigError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        EncodingId::for_label(label).ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))
    }
}

impl Serialize for EncodingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for EncodingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Formats a list of encodings as `"A, B, C"` for diagnostics.
pub(crate) fn join_names(encodings: &[EncodingId]) -> String {
    encodings
        .iter()
        .map(|encoding| encoding.name())
        .collect::<Vec<_>>()
        .join(", ")
}
