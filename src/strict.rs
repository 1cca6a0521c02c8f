//! Strict detection and transcoding.
//!
//! ```text
//! bytes
//!   │
//!   ▼
//! ┌─────────────────────────────┐
//! │ 1. BOM?                     │── yes ─▶ decode remainder, done (or fail)
//! ├─────────────────────────────┤
//! │ 2. preferred, defaults...   │── first whole-buffer decode wins
//! ├─────────────────────────────┤
//! │ 3. nothing decoded          │── Utf8CoercionError { tried }
//! └─────────────────────────────┘
//! ```
use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, trace};

use crate::bom::detect_bom;
use crate::chain::CandidateChain;
use crate::config::{default_config, CoercionConfig};
use crate::encoding::EncodingId;
use crate::error::Utf8CoercionError;

/// Which rule produced a [`Transcoded`] text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// A leading byte-order mark named the encoding.
    ByteOrderMark,
    /// The caller's preferred encoding decoded the input.
    Preferred,
    /// One of the configured default candidates decoded the input.
    Candidate,
    /// Nothing decoded the whole input; unmappable bytes were escaped.
    Escaped,
}

/// UTF-8 text together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded<'a> {
    /// The UTF-8 text. Borrowed when it is byte-identical to the input after
    /// the BOM.
    pub text: Cow<'a, str>,
    /// Encoding the input was read as.
    pub encoding: EncodingId,
    pub detection: Detection,
    /// Length of the stripped byte-order mark, `0` if none.
    pub bom_len: usize,
    /// Bytes replaced by escape tokens (lossy mode only).
    pub escaped_bytes: usize,
}

/// What the owned operations do with the caller's buffer.
pub(crate) enum Settled {
    /// Text equals the buffer minus its first `skip` bytes.
    Reuse { skip: usize },
    Fresh(String),
}

impl<'a> Transcoded<'a> {
    pub(crate) fn new(text: Cow<'a, str>, encoding: EncodingId, detection: Detection) -> Self {
        Self {
            text,
            encoding,
            detection,
            bom_len: 0,
            escaped_bytes: 0,
        }
    }

    pub(crate) fn settle(self) -> Settled {
        match self.text {
            Cow::Borrowed(_) => Settled::Reuse {
                skip: self.bom_len,
            },
            Cow::Owned(text) => Settled::Fresh(text),
        }
    }
}

/// Strict detection; on failure returns the encodings that were tried.
pub(crate) fn detect<'a>(
    bytes: &'a [u8],
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> Result<Transcoded<'a>, Vec<EncodingId>> {
    if cfg.detect_bom {
        if let Some((encoding, bom_len)) = detect_bom(bytes) {
            return match encoding.decode(&bytes[bom_len..]) {
                Some(text) => Ok(Transcoded {
                    bom_len,
                    ..Transcoded::new(text, encoding, Detection::ByteOrderMark)
                }),
                None => Err(vec![encoding]),
            };
        }
    }

    let chain = CandidateChain::new(preferred, &cfg.default_chain);
    for encoding in chain.iter() {
        match encoding.decode(bytes) {
            Some(text) => {
                let detection = if preferred == Some(encoding) {
                    Detection::Preferred
                } else {
                    Detection::Candidate
                };
                return Ok(Transcoded::new(text, encoding, detection));
            }
            None => trace!(encoding = %encoding, "candidate rejected"),
        }
    }
    Err(chain.into_vec())
}

/// Strictly transcodes `bytes` to UTF-8 and reports how.
///
/// A byte-order mark, when present (and [`CoercionConfig::detect_bom`] is
/// set), is authoritative: its encoding is the only one tried. Otherwise the
/// preferred encoding and then [`CoercionConfig::default_chain`] are tried in
/// order and the first one that decodes every byte wins.
///
/// # Examples
///
/// ```rust
/// use utf8_coerce::{transcode, CoercionConfig, Detection, EncodingId};
///
/// let out = transcode(b"dash \x96 dash", None, &CoercionConfig::default()).unwrap();
/// assert_eq!(out.text, "dash \u{2013} dash");
/// assert_eq!(out.encoding, EncodingId::WINDOWS_1252);
/// assert_eq!(out.detection, Detection::Candidate);
/// ```
pub fn transcode<'a>(
    bytes: &'a [u8],
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> Result<Transcoded<'a>, Utf8CoercionError> {
    match detect(bytes, preferred, cfg) {
        Ok(transcoded) => {
            debug!(
                encoding = %transcoded.encoding,
                detection = ?transcoded.detection,
                input_len = bytes.len(),
                "utf8 coercion succeeded"
            );
            Ok(transcoded)
        }
        Err(tried) => Err(rejected(bytes.to_vec(), tried)),
    }
}

fn rejected(bytes: Vec<u8>, tried: Vec<EncodingId>) -> Utf8CoercionError {
    let err = Utf8CoercionError::new(bytes, tried);
    debug!(error = %err, "utf8 coercion failed");
    err
}

/// Returns a newly allocated UTF-8 copy of `bytes`.
///
/// The result never shares storage with the input, even when no conversion was
/// needed. Uses the process-wide default [`CoercionConfig`].
///
/// ```rust
/// use utf8_coerce::{ensure_utf8, EncodingId};
///
/// let euc_jp = EncodingId::for_label("EUC-JP");
/// let text = ensure_utf8(b"japan \x8e\xa6 ese", euc_jp).unwrap();
/// assert_eq!(text, "japan \u{ff66} ese");
/// ```
pub fn ensure_utf8(
    bytes: &[u8],
    preferred: Option<EncodingId>,
) -> Result<String, Utf8CoercionError> {
    ensure_utf8_with(bytes, preferred, default_config())
}

/// [`ensure_utf8`] with an explicit configuration.
pub fn ensure_utf8_with(
    bytes: &[u8],
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> Result<String, Utf8CoercionError> {
    transcode(bytes, preferred, cfg).map(|transcoded| transcoded.text.into_owned())
}

/// Converts an owned buffer to UTF-8, reusing its allocation when possible.
///
/// If the bytes are already the UTF-8 form of the decoded text, the returned
/// `String` owns the very same allocation. A leading UTF-8 BOM is drained in
/// place. Only a real change of representation allocates.
///
/// ```rust
/// use utf8_coerce::ensure_utf8_owned;
///
/// let bytes = b"hello".to_vec();
/// let ptr = bytes.as_ptr();
/// let text = ensure_utf8_owned(bytes, None).unwrap();
/// assert_eq!(text.as_ptr(), ptr);
/// ```
pub fn ensure_utf8_owned(
    bytes: Vec<u8>,
    preferred: Option<EncodingId>,
) -> Result<String, Utf8CoercionError> {
    ensure_utf8_owned_with(bytes, preferred, default_config())
}

/// [`ensure_utf8_owned`] with an explicit configuration.
pub fn ensure_utf8_owned_with(
    bytes: Vec<u8>,
    preferred: Option<EncodingId>,
    cfg: &CoercionConfig,
) -> Result<String, Utf8CoercionError> {
    let settled = detect(&bytes, preferred, cfg).map(Transcoded::settle);
    match settled {
        Ok(Settled::Fresh(text)) => Ok(text),
        Ok(Settled::Reuse { skip }) => {
            reclaim(bytes, skip).or_else(|bytes| ensure_utf8_with(&bytes, preferred, cfg))
        }
        Err(tried) => Err(rejected(bytes, tried)),
    }
}

/// Turns `bytes[skip..]`, already known to be UTF-8, into a `String` in place.
///
/// Should the bytes not be UTF-8 after all, the buffer comes back unchanged,
/// prefix included, so the caller can fall back to a fresh conversion.
pub(crate) fn reclaim(mut bytes: Vec<u8>, skip: usize) -> Result<String, Vec<u8>> {
    let skip = skip.min(bytes.len());
    let prefix: Vec<u8> = bytes.drain(..skip).collect();
    String::from_utf8(bytes).map_err(|err| {
        let mut bytes = err.into_bytes();
        bytes.splice(0..0, prefix);
        bytes
    })
}
