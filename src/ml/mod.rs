// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives in model.rs and chatbot.rs. The
// training loop and the checkpoint evaluator only see the
// Seq2SeqModel trait, so they are tested with scripted mocks
// and never need a GPU.
//
//   model.rs     — LSTM encoder/decoder with dot-product attention
//   chatbot.rs   — BurnChatbot: Seq2SeqModel over the model and
//                  an Adam optimiser
//   trainer.rs   — run_training: bucket sampling, step-time and
//                  loss averaging, checkpoint cadence, interrupt
//   evaluator.rs — on_checkpoint: perplexity, learning-rate
//                  decay, save, per-bucket dev evaluation
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation

/// LSTM encoder-decoder with attention
pub mod model;

/// Seq2SeqModel implementation on Burn
pub mod chatbot;

/// Main training loop
pub mod trainer;

/// Checkpoint-boundary reporting, decay and evaluation
pub mod evaluator;

#[cfg(test)]
pub mod mock;
