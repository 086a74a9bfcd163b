// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training driver only ever talks to these contracts:
//
//   DataSource   — vocabulary mappings plus parallel id files
//                  (ToyCorpus, FileDataSource)
//   Seq2SeqModel — batching, one optimisation/eval step,
//                  learning rate, global step, checkpointing
//                  (BurnChatbot, and scripted mocks in tests)
//   SummarySink  — where per-step summaries are written
//                  (SummaryWriter)
//
// The loop in ml::trainer is generic over Seq2SeqModel, so it
// never sees a tensor.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;
use std::{
    collections::HashMap,
    io::BufRead,
    path::Path,
};

use crate::domain::corpus::BucketedSet;

// ─── DataSource ───────────────────────────────────────────────────────────────

/// Which half of the dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Valid,
}

impl Split {
    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
        }
    }
}

/// Line readers over the source and target files of a split.
/// Line N of `source` pairs with line N of `target`; every line
/// is a whitespace-separated list of token ids.
pub struct ParallelReaders {
    pub source: Box<dyn BufRead>,
    pub target: Box<dyn BufRead>,
}

/// Anything that can supply a vocabulary and token-id data.
pub trait DataSource {
    /// Short dataset name, used to name checkpoint files.
    fn name(&self) -> &str;

    fn word_to_idx(&self) -> &HashMap<String, u32>;

    /// Position in the slice is the token id.
    fn idx_to_word(&self) -> &[String];

    fn data_dir(&self) -> &Path;

    fn open_split(&self, split: Split) -> Result<ParallelReaders>;

    /// Render ids back to a sentence; unknown ids become `_UNK`.
    fn translate(&self, ids: &[u32]) -> String {
        let words = self.idx_to_word();
        ids.iter()
            .map(|&id| words.get(id as usize).map(String::as_str).unwrap_or("_UNK"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─── Summaries ────────────────────────────────────────────────────────────────

/// Tagged scalar values, e.g. ("loss", 3.2) from a model step or
/// ("eval/bucket_1/perplexity", 41.0) from a checkpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub scalars: Vec<(String, f64)>,
}

impl Summary {
    pub fn scalar(mut self, tag: impl Into<String>, value: f64) -> Self {
        self.scalars.push((tag.into(), value));
        self
    }
}

/// Destination for step summaries. Must be flushed by `close`.
pub trait SummarySink {
    fn add_summary(&mut self, summary: &Summary, step: usize) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

// ─── Seq2SeqModel ─────────────────────────────────────────────────────────────

/// Output of one `step` call.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub summary: Summary,
    pub loss:    f64,
}

/// The external model collaborator. Batch construction, padding
/// and target-weight masking all live behind this trait.
pub trait Seq2SeqModel {
    type Batch;

    /// Assemble a batch of examples from one bucket of `set`.
    fn get_batch(&mut self, set: &BucketedSet, bucket_id: usize) -> Result<Self::Batch>;

    /// Forward pass, plus backward pass and parameter update unless
    /// `forward_only`. Forward-only calls never change parameters
    /// or the global step.
    fn step(
        &mut self,
        batch: Self::Batch,
        bucket_id: usize,
        forward_only: bool,
    ) -> Result<StepOutput>;

    fn learning_rate(&self) -> f64;

    /// Apply the model's multiplicative learning-rate decay once.
    fn decay_learning_rate(&mut self);

    /// Number of parameter updates applied so far (restored with
    /// the checkpoint).
    fn global_step(&self) -> usize;

    /// Persist model and optimiser state under `path`, tagged `step`.
    fn save(&self, path: &Path, step: usize) -> Result<()>;
}
