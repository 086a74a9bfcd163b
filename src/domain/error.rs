// ============================================================
// Layer 3 — Corpus Errors
// ============================================================
// Typed failures raised while loading or sampling the corpus.
// Both are fatal to a run; the application layer wraps them
// in anyhow with context and surfaces them immediately.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    /// Building a bucket distribution over zero training examples.
    #[error("training corpus is empty: no example fits any bucket")]
    EmptyCorpus,

    /// Source/target streams that cannot be paired, or unparsable ids.
    #[error("malformed {split} data at line {line}: {reason}")]
    DataFormat {
        split:  String,
        line:   usize,
        reason: String,
    },

    /// A bucket spec that is not `SRC:TGT` or breaks the size ordering.
    #[error("invalid bucket spec '{0}' (expected SRC:TGT, e.g. 5:10)")]
    InvalidBucket(String),

    #[error("I/O error while reading corpus")]
    Io(#[from] std::io::Error),
}
