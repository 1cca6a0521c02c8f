//! Ordered candidate encodings for strict detection.
use crate::encoding::EncodingId;

/// Encodings to try, in priority order, without repeats.
///
/// The caller's preferred encoding (if any) comes first, then the configured
/// defaults. An encoding that already appears earlier is skipped.
///
/// ```rust
/// use utf8_coerce::{CandidateChain, EncodingId};
///
/// let defaults = [EncodingId::UTF_8, EncodingId::WINDOWS_1252];
/// let chain = CandidateChain::new(Some(EncodingId::UTF_8), &defaults);
/// assert_eq!(chain.as_slice(), &defaults);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateChain {
    candidates: Vec<EncodingId>,
}

impl CandidateChain {
    pub fn new(preferred: Option<EncodingId>, defaults: &[EncodingId]) -> Self {
        let mut candidates = Vec::with_capacity(defaults.len() + 1);
        for encoding in preferred.into_iter().chain(defaults.iter().copied()) {
            if !candidates.contains(&encoding) {
                candidates.push(encoding);
            }
        }
        Self { candidates }
    }

    pub fn iter(&self) -> impl Iterator<Item = EncodingId> + '_ {
        self.candidates.iter().copied()
    }

    pub fn as_slice(&self) -> &[EncodingId] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_vec(self) -> Vec<EncodingId> {
        self.candidates
    }
}
