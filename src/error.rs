//! Error type produced by strict coercion.
//!
//! Strict operations ([`ensure_utf8`](crate::ensure_utf8),
//! [`ensure_utf8_owned`](crate::ensure_utf8_owned) and, transitively,
//! [`ensure_utf8_object`](crate::ensure_utf8_object)) fail with
//! [`Utf8CoercionError`] when no candidate encoding validates the input. Lossy
//! operations have no error channel at all.
//!
//! The error keeps the original bytes, so a caller can fall back to the lossy
//! path without having cloned its buffer up front:
//!
//! ```rust
//! use utf8_coerce::{coerce_utf8_owned, ensure_utf8_owned};
//!
//! let raw = b"rubbish \x90 rubbish".to_vec();
//! let text = match ensure_utf8_owned(raw, None) {
//!     Ok(text) => text,
//!     Err(err) => coerce_utf8_owned(err.into_bytes(), None),
//! };
//! assert_eq!(text, "rubbish 0x90 rubbish");
//! ```
use thiserror::Error;

use crate::encoding::{join_names, EncodingId};

/// No candidate encoding could decode the input without loss.
///
/// # Examples
///
/// ```rust
/// use utf8_coerce::{ensure_utf8, EncodingId};
///
/// let err = ensure_utf8(b"rubbish \x90 rubbish", None).unwrap_err();
/// assert_eq!(err.tried(), &[EncodingId::UTF_8, EncodingId::WINDOWS_1252]);
/// assert_eq!(
///     err.to_string(),
///     "could not coerce 17 bytes to UTF-8 (tried UTF-8, windows-1252)"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not coerce {len} bytes to UTF-8 (tried {tried})", len = .bytes.len(), tried = join_names(.tried))]
pub struct Utf8CoercionError {
    bytes: Vec<u8>,
    tried: Vec<EncodingId>,
}

impl Utf8CoercionError {
    pub(crate) fn new(bytes: Vec<u8>, tried: Vec<EncodingId>) -> Self {
        Self { bytes, tried }
    }

    /// The input that could not be coerced.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encodings attempted, in the order they were tried.
    pub fn tried(&self) -> &[EncodingId] {
        &self.tried
    }

    /// Gives the original input back.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
