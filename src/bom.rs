//! Byte-order-mark sniffing.
use crate::encoding::EncodingId;

/// Recognized signatures, longest first so no entry shadows a longer one.
const SIGNATURES: [(&[u8], EncodingId); 3] = [
    (&[0xef, 0xbb, 0xbf], EncodingId::UTF_8),
    (&[0xff, 0xfe], EncodingId::UTF_16LE),
    (&[0xfe, 0xff], EncodingId::UTF_16BE),
];

/// Returns the encoding announced by a leading BOM and the BOM length.
///
/// ```rust
/// use utf8_coerce::{detect_bom, EncodingId};
///
/// assert_eq!(detect_bom(b"\xff\xfe\xb1\x03"), Some((EncodingId::UTF_16LE, 2)));
/// assert_eq!(detect_bom(b"plain"), None);
/// ```
pub fn detect_bom(bytes: &[u8]) -> Option<(EncodingId, usize)> {
    SIGNATURES
        .iter()
        .find(|(signature, _)| bytes.starts_with(signature))
        .map(|&(signature, encoding)| (encoding, signature.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_signature() {
        assert_eq!(detect_bom(b"\xef\xbb\xbfhi"), Some((EncodingId::UTF_8, 3)));
        assert_eq!(detect_bom(b"\xff\xfe"), Some((EncodingId::UTF_16LE, 2)));
        assert_eq!(detect_bom(b"\xfe\xff\x03\xb1"), Some((EncodingId::UTF_16BE, 2)));
    }

    #[test]
    fn partial_or_absent_signature_is_ignored() {
        assert_eq!(detect_bom(b""), None);
        assert_eq!(detect_bom(b"\xff"), None);
        assert_eq!(detect_bom(b"\xef\xbb"), None);
        assert_eq!(detect_bom(b"hello"), None);
    }
}
