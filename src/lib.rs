//! UTF-8 coercion for bytes of unknown or untrusted encoding.
//!
//! Text arriving without reliable encoding metadata (legacy exports, old
//! databases, files of mixed provenance) goes through here on its way to
//! becoming a Rust `String`.
//!
//! ## What we do here
//!
//! - **Detect** - A UTF-8/UTF-16 byte-order mark wins outright. Otherwise the
//!   caller's preferred encoding, then UTF-8, then Windows-1252 are tried in
//!   that order; the first one that decodes every byte is used.
//! - **Strict mode** - [`ensure_utf8`] returns the text or a typed
//!   [`Utf8CoercionError`] naming every encoding that was tried.
//! - **Lossy mode** - [`coerce_utf8`] never fails. Bytes that cannot be decoded
//!   are replaced by a visible `0xHH` token, so corruption stays recoverable.
//! - **Deep normalization** - [`ensure_utf8_object`] walks a [`Value`] tree and
//!   normalizes every text leaf, leaving mapping keys alone.
//!
//! ## Copy or reuse
//!
//! Every operation comes in two flavours. The borrowing form (`ensure_utf8`,
//! `coerce_utf8`) always returns a freshly allocated `String`. The owning form
//! (`ensure_utf8_owned`, `coerce_utf8_owned`) hands the caller's own allocation
//! back whenever the bytes were already UTF-8, and only allocates when the
//! representation actually changes.
//!
//! ## Example
//!
//! ```
//! use utf8_coerce::{coerce_utf8, ensure_utf8, EncodingId};
//!
//! // Windows-1252 en dash, recognised by the default chain.
//! assert_eq!(ensure_utf8(b"dash \x96 dash", None).unwrap(), "dash \u{2013} dash");
//!
//! // Not valid under any default candidate: strict fails, lossy escapes.
//! assert!(ensure_utf8(b"rubbish \x90 rubbish", None).is_err());
//! assert_eq!(coerce_utf8(b"rubbish \x90 rubbish", None), "rubbish 0x90 rubbish");
//!
//! // A preferred encoding is tried first.
//! let euc_jp = EncodingId::for_label("EUC-JP");
//! assert_eq!(ensure_utf8(b"\x8e\xa6", euc_jp).unwrap(), "\u{ff66}");
//! ```
//!
//! All operations are pure and synchronous; they hold no shared mutable state
//! and may be called from any number of threads at once.

mod bom;
mod chain;
mod config;
mod encoding;
mod error;
mod lossy;
mod object;
mod strict;

pub use crate::bom::detect_bom;
pub use crate::chain::CandidateChain;
pub use crate::config::{CoercionConfig, ConfigError, CONFIG_VERSION};
pub use crate::encoding::EncodingId;
pub use crate::error::Utf8CoercionError;
pub use crate::lossy::{
    coerce_utf8, coerce_utf8_owned, coerce_utf8_owned_with, coerce_utf8_with,
    escape_control_chars, transcode_lossy,
};
pub use crate::object::{
    ensure_utf8_object, ensure_utf8_object_with, Atom, ByteText, Text, Value,
};
pub use crate::strict::{
    ensure_utf8, ensure_utf8_owned, ensure_utf8_owned_with, ensure_utf8_with, transcode,
    Detection, Transcoded,
};
