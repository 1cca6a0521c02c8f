//! Input generators shared by the coercion benchmarks.

#![allow(dead_code)]

/// Pure ASCII, valid UTF-8.
pub const SAMPLE_ASCII: &str = "The quick brown fox jumps over the lazy dog. ";

/// Windows-1252 bytes for "naïve café – déjà vu ".
pub const SAMPLE_CP1252: &[u8] = b"na\xefve caf\xe9 \x96 d\xe9j\xe0 vu ";

/// Repeat `unit` until the buffer is exactly `byte_count` bytes long.
pub fn repeat_to(unit: &[u8], byte_count: usize) -> Vec<u8> {
    unit.iter().copied().cycle().take(byte_count).collect()
}

/// Valid multi-byte UTF-8 of roughly `byte_count` bytes, cut on a char boundary.
pub fn generate_utf8(byte_count: usize) -> Vec<u8> {
    let sentence = "Grüße aus 東京, naïve café. ";
    let mut text = String::with_capacity(byte_count + sentence.len());
    while text.len() < byte_count {
        text.push_str(sentence);
    }
    let mut end = byte_count.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.into_bytes()
}

/// ASCII text with one undecodable byte every `stride` bytes.
pub fn generate_corrupt(byte_count: usize, stride: usize) -> Vec<u8> {
    let mut bytes = repeat_to(SAMPLE_ASCII.as_bytes(), byte_count);
    for i in (0..bytes.len()).step_by(stride.max(1)) {
        bytes[i] = 0x90;
    }
    bytes
}
