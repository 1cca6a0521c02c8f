//! Composite values and the deep normalizer.
//!
//! A [`Value`] is a closed tree of text leaves, other scalars, sequences and
//! ordered key/value mappings. [`ensure_utf8_object`] rewrites every text leaf
//! reachable through sequence elements and mapping *values* into validated
//! UTF-8. Mapping keys are moved through untouched.
//!
//! ```text
//! Value
//! ├── Text(Text)
//! │   ├── Raw(ByteText)   bytes + optional declared encoding
//! │   └── Utf8(String)    already validated, never re-checked
//! ├── Atom(Atom)          null / bool / int / float / symbol
//! ├── Sequence(Vec<Value>)
//! └── Mapping(Vec<(Value, Value)>)
//! ```
use crate::config::{default_config, CoercionConfig};
use crate::encoding::EncodingId;
use crate::error::Utf8CoercionError;
use crate::lossy::coerce_utf8_owned_with;
use crate::strict::ensure_utf8_owned_with;

/// Raw bytes, optionally tagged with the encoding their producer claimed.
///
/// The declared encoding is only a hint: it is tried first, ahead of the
/// default chain, exactly like a caller-supplied preferred encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteText {
    pub bytes: Vec<u8>,
    pub declared: Option<EncodingId>,
}

impl ByteText {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            declared: None,
        }
    }

    pub fn declared(bytes: impl Into<Vec<u8>>, encoding: EncodingId) -> Self {
        Self {
            bytes: bytes.into(),
            declared: Some(encoding),
        }
    }
}

/// A textual leaf: either unvalidated bytes or validated UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    Raw(ByteText),
    Utf8(String),
}

impl Text {
    /// Validated text, if this leaf has been normalized.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Text::Utf8(text) => Some(text),
            Text::Raw(_) => None,
        }
    }

    /// Strictly normalizes a raw leaf; validated leaves pass straight through.
    pub fn ensure_utf8_with(self, cfg: &CoercionConfig) -> Result<Text, Utf8CoercionError> {
        match self {
            Text::Utf8(text) => Ok(Text::Utf8(text)),
            Text::Raw(raw) => ensure_utf8_owned_with(raw.bytes, raw.declared, cfg).map(Text::Utf8),
        }
    }

    /// Lossy counterpart of [`Text::ensure_utf8_with`]; never fails.
    pub fn coerce_utf8_with(self, cfg: &CoercionConfig) -> Text {
        match self {
            Text::Utf8(text) => Text::Utf8(text),
            Text::Raw(raw) => Text::Utf8(coerce_utf8_owned_with(raw.bytes, raw.declared, cfg)),
        }
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::Utf8(text)
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::Utf8(text.to_string())
    }
}

impl From<ByteText> for Text {
    fn from(raw: ByteText) -> Self {
        Text::Raw(raw)
    }
}

/// A non-textual scalar. Passed through by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(Text),
    Atom(Atom),
    Sequence(Vec<Value>),
    /// Ordered entries; keys are expected to be unique.
    Mapping(Vec<(Value, Value)>),
}

impl Value {
    /// Unvalidated text leaf.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(Text::Raw(ByteText::new(bytes)))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Atom(Atom::Symbol(name.into()))
    }

    /// Rebuilds the value, passing each text leaf through `f` exactly once.
    ///
    /// Leaves are visited depth-first in order: sequence elements, then mapping
    /// values. Mapping keys are never passed to `f`. The first error aborts the
    /// walk.
    pub fn try_map_text<E, F>(self, f: &mut F) -> Result<Value, E>
    where
        F: FnMut(Text) -> Result<Text, E>,
    {
        match self {
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| item.try_map_text(f))
                .collect::<Result<Vec<_>, E>>()
                .map(Value::Sequence),
            Value::Mapping(entries) => entries
                .into_iter()
                .map(|(key, value)| Ok((key, value.try_map_text(f)?)))
                .collect::<Result<Vec<_>, E>>()
                .map(Value::Mapping),
            Value::Text(text) => f(text).map(Value::Text),
            atom @ Value::Atom(_) => Ok(atom),
        }
    }
}

impl From<Text> for Value {
    fn from(text: Text) -> Self {
        Value::Text(text)
    }
}

impl From<Atom> for Value {
    fn from(atom: Atom) -> Self {
        Value::Atom(atom)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

/// Strictly normalizes every text leaf of `value`; all or nothing.
///
/// Uses the process-wide default [`CoercionConfig`]. There is no lossy variant
/// of the walk: callers that want escaping should apply
/// [`Text::coerce_utf8_with`] through [`Value::try_map_text`] themselves.
///
/// # Examples
///
/// ```rust
/// use utf8_coerce::{ensure_utf8_object, Value};
///
/// let value = Value::Mapping(vec![(
///     Value::from("dash"),
///     Value::Sequence(vec![Value::raw(b"dash \x96 dash".to_vec()), Value::symbol("world")]),
/// )]);
/// let normalized = ensure_utf8_object(value).unwrap();
///
/// let Value::Mapping(entries) = normalized else { unreachable!() };
/// assert_eq!(
///     entries[0].1,
///     Value::Sequence(vec![Value::from("dash \u{2013} dash"), Value::symbol("world")])
/// );
/// ```
pub fn ensure_utf8_object(value: Value) -> Result<Value, Utf8CoercionError> {
    ensure_utf8_object_with(value, default_config())
}

/// [`ensure_utf8_object`] with an explicit configuration.
pub fn ensure_utf8_object_with(
    value: Value,
    cfg: &CoercionConfig,
) -> Result<Value, Utf8CoercionError> {
    value.try_map_text(&mut |text: Text| text.ensure_utf8_with(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_leaf_becomes_utf8() {
        let out = ensure_utf8_object(Value::raw(b"caf\xe9".to_vec())).unwrap();
        assert_eq!(out, Value::from("café"));
    }

    #[test]
    fn declared_encoding_is_preferred() {
        let euc_jp = EncodingId::for_label("EUC-JP").unwrap();
        let leaf = Value::Text(ByteText::declared(b"\x8e\xa6".to_vec(), euc_jp).into());
        let out = ensure_utf8_object(leaf).unwrap();
        assert_eq!(out, Value::from("\u{ff66}"));
    }

    #[test]
    fn atoms_pass_through() {
        for atom in [Atom::Null, Atom::Bool(true), Atom::Int(-4), Atom::Float(0.5)] {
            let value = Value::Atom(atom.clone());
            assert_eq!(ensure_utf8_object(value).unwrap(), Value::Atom(atom));
        }
    }

    #[test]
    fn validated_text_is_not_rechecked() {
        let mut calls = 0;
        let value = Value::from("already utf-8");
        let out = value
            .clone()
            .try_map_text(&mut |text: Text| {
                calls += 1;
                Ok::<_, Utf8CoercionError>(text)
            })
            .unwrap();
        assert_eq!(out, value);
        assert_eq!(calls, 1);
    }

    #[test]
    fn nested_failure_aborts_walk() {
        let value = Value::Sequence(vec![
            Value::from("fine"),
            Value::Mapping(vec![(Value::from("k"), Value::raw(b"\x90".to_vec()))]),
        ]);
        let err = ensure_utf8_object(value).unwrap_err();
        assert_eq!(err.bytes(), b"\x90");
    }

    #[test]
    fn lossy_walk_via_map_text() {
        let cfg = CoercionConfig::default();
        let value = Value::Sequence(vec![Value::raw(b"a\x90".to_vec())]);
        let out = value
            .try_map_text(&mut |text: Text| Ok::<_, Utf8CoercionError>(text.coerce_utf8_with(&cfg)))
            .unwrap();
        assert_eq!(out, Value::Sequence(vec![Value::from("a0x90")]));
    }
}
