// ============================================================
// Layer 3 — Example and BucketSpec Domain Types
// ============================================================
// An Example is one conversational turn in token-id form:
//   source: the prompt, e.g. [17, 4, 52]
//   target: the reply, with the end-of-sequence id appended
//
// A BucketSpec is the pair of length limits that decides
// which bucket an Example lands in. Buckets are listed in
// increasing size order and an Example goes to the FIRST one
// that fits both sequences.
//
// Reference: Sutskever et al. (2014) Sequence to Sequence Learning
//            Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::error::CorpusError;

/// A loaded (source, target) pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Token ids of the input utterance
    pub source: Vec<u32>,

    /// Token ids of the response, EOS included
    pub target: Vec<u32>,
}

impl Example {
    pub fn new(source: Vec<u32>, target: Vec<u32>) -> Self {
        Self { source, target }
    }
}

/// Maximum source and target lengths accepted by one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub max_source_len: usize,
    pub max_target_len: usize,
}

impl BucketSpec {
    pub fn new(max_source_len: usize, max_target_len: usize) -> Self {
        Self { max_source_len, max_target_len }
    }

    /// True when both sequences fit inside this bucket's limits.
    pub fn fits(&self, source_len: usize, target_len: usize) -> bool {
        source_len <= self.max_source_len && target_len <= self.max_target_len
    }
}

impl fmt::Display for BucketSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.max_source_len, self.max_target_len)
    }
}

/// Parses the `SRC:TGT` form used on the command line, e.g. `5:10`.
impl FromStr for BucketSpec {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CorpusError::InvalidBucket(s.to_string());

        let (src, tgt) = s.trim().split_once(':').ok_or_else(invalid)?;
        let max_source_len: usize = src.trim().parse().map_err(|_| invalid())?;
        let max_target_len: usize = tgt.trim().parse().map_err(|_| invalid())?;

        if max_source_len == 0 || max_target_len == 0 {
            return Err(invalid());
        }
        Ok(Self::new(max_source_len, max_target_len))
    }
}

/// Check that a bucket list is non-empty and grows in both dimensions,
/// so that "first bucket that fits" is also the smallest one.
pub fn validate_buckets(buckets: &[BucketSpec]) -> Result<(), CorpusError> {
    if buckets.is_empty() {
        return Err(CorpusError::InvalidBucket("no buckets configured".into()));
    }
    for pair in buckets.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.max_source_len < a.max_source_len || b.max_target_len < a.max_target_len {
            return Err(CorpusError::InvalidBucket(format!(
                "buckets must be listed in increasing size order ({a} before {b})"
            )));
        }
    }
    Ok(())
}
