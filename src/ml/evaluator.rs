// ============================================================
// Layer 5 — Checkpoint Evaluator
// ============================================================
// Runs at every checkpoint boundary of the training loop:
//
//   1. report global step, learning rate, step time, perplexity
//   2. decay the learning rate if the loss stopped improving
//   3. remember this checkpoint's loss
//   4. save model + optimiser state at the current global step
//   5. one forward-only step per dev bucket, report perplexity
//
// The decay rule is reactive, not a schedule: once more than
// four checkpoint losses are on record, a loss above the best
// of the last four triggers one multiplicative decay.

use anyhow::Result;
use std::path::Path;

use crate::domain::{
    corpus::BucketedSet,
    traits::{Seq2SeqModel, Summary},
};

/// Losses at or above this are reported as infinite perplexity.
pub const MAX_EXP_LOSS: f64 = 300.0;

/// Number of recent checkpoint losses the decay rule looks at.
const DECAY_WINDOW: usize = 4;

pub fn perplexity(loss: f64) -> f64 {
    if loss < MAX_EXP_LOSS {
        loss.exp()
    } else {
        f64::INFINITY
    }
}

/// True when `loss` is worse than the best of the last four
/// recorded losses and more than four losses are recorded.
pub fn should_decay(loss: f64, previous_losses: &[f64]) -> bool {
    if previous_losses.len() <= DECAY_WINDOW {
        return false;
    }
    let recent = &previous_losses[previous_losses.len() - DECAY_WINDOW..];
    let best = recent.iter().copied().fold(f64::INFINITY, f64::min);
    loss > best
}

/// Outcome of evaluating one dev bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketEval {
    Empty { bucket_id: usize },
    Perplexity { bucket_id: usize, perplexity: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointReport {
    pub global_step:   usize,
    pub learning_rate: f64,
    pub step_time:     f64,
    pub perplexity:    f64,
    pub decayed:       bool,
    pub evals:         Vec<BucketEval>,
}

impl CheckpointReport {
    /// Flatten into summary scalars for the summary writer.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default()
            .scalar("checkpoint/learning_rate", self.learning_rate)
            .scalar("checkpoint/step_time", self.step_time)
            .scalar("checkpoint/perplexity", self.perplexity);
        for eval in &self.evals {
            if let BucketEval::Perplexity { bucket_id, perplexity } = eval {
                summary = summary.scalar(format!("eval/bucket_{bucket_id}/perplexity"), *perplexity);
            }
        }
        summary
    }
}

/// Everything that happens on a checkpoint boundary. `previous_losses`
/// gains `avg_loss` at the end of the call.
pub fn on_checkpoint<M: Seq2SeqModel>(
    model:           &mut M,
    checkpoint_path: &Path,
    step_time:       f64,
    avg_loss:        f64,
    previous_losses: &mut Vec<f64>,
    dev:             &BucketedSet,
) -> Result<CheckpointReport> {
    let global_step = model.global_step();
    let learning_rate = model.learning_rate();
    let ppx = perplexity(avg_loss);
    tracing::info!(
        "global step {}  learning rate {:.4}  step time {:.2}  perplexity {:.2}",
        global_step,
        learning_rate,
        step_time,
        ppx
    );

    let decayed = should_decay(avg_loss, previous_losses);
    if decayed {
        model.decay_learning_rate();
        tracing::info!("Loss plateaued, learning rate now {:.4}", model.learning_rate());
    }
    previous_losses.push(avg_loss);

    model.save(checkpoint_path, global_step)?;

    let mut evals = Vec::with_capacity(dev.num_buckets());
    for bucket_id in 0..dev.num_buckets() {
        if dev.bucket(bucket_id).is_empty() {
            tracing::info!("  eval: empty bucket {}", bucket_id);
            evals.push(BucketEval::Empty { bucket_id });
            continue;
        }
        let batch = model.get_batch(dev, bucket_id)?;
        let out = model.step(batch, bucket_id, true)?;
        let eval_ppx = perplexity(out.loss);
        tracing::info!("  eval: bucket {} perplexity {:.2}", bucket_id, eval_ppx);
        evals.push(BucketEval::Perplexity { bucket_id, perplexity: eval_ppx });
    }

    Ok(CheckpointReport {
        global_step,
        learning_rate,
        step_time,
        perplexity: ppx,
        decayed,
        evals,
    })
}
