// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the other
// layers:
//
//   checkpoint.rs  — Model + optimiser records via Burn's
//                    full-precision MessagePack, checkpoint.json (latest
//                    step, learning rate), train_config.json
//
//   vocab_store.rs — Builds vocab{N}.txt and the token-id files
//                    from raw parallel text, only when they are
//                    not already on disk
//
//   metrics.rs     — SummaryWriter: every summary scalar as a
//                    step,tag,value CSV row
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary and token-id file preparation
pub mod vocab_store;

/// Training summary CSV writer
pub mod metrics;
