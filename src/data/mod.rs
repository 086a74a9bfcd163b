// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From raw parallel text to padded tensor batches:
//
//   raw text (train_from.txt / train_to.txt, ...)
//       │
//       ▼
//   Vocabulary        → word-level vocab, special ids 0..=3
//       │
//       ▼
//   DataSource        → ToyCorpus or FileDataSource, serves
//       │               token-id lines for each split
//       ▼
//   load_corpus       → (source, target + EOS) pairs sorted
//       │               into the first bucket they fit
//       ▼
//   DistributionTable → cumulative bucket sizes for sampling
//       │
//       ▼
//   PaddedBatch       → padded, reversed encoder rows, GO-
//                       prefixed decoder rows, target weights
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Word-level tokenizer and vocabulary
pub mod tokenizer;

/// Reads parallel token-id files into buckets
pub mod loader;

/// Bucket sampling table
pub mod sampler;

/// Built-in toy corpus and on-disk datasets
pub mod sources;

/// Padding and tensor conversion for one bucket batch
pub mod batcher;
