// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums, and traits that define what the
// training driver works with:
//
//   example.rs — one (source ids, target ids) pair and the
//                length limits of a bucket
//   corpus.rs  — examples grouped by bucket, for the training
//                and held-out splits
//   traits.rs  — the DataSource and Seq2SeqModel contracts the
//                other layers implement
//   error.rs   — typed corpus errors
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod example;

pub mod corpus;

pub mod traits;

pub mod error;
