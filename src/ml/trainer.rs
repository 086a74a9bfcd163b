// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One synchronous loop, generic over Seq2SeqModel:
//
//   repeat until max_steps or interrupted:
//     r ~ U[0, 1)              → bucket = table.sample(r)
//     batch = model.get_batch(train, bucket)
//     loss  = model.step(batch, bucket, forward_only = false)
//     step_time += elapsed / steps_per_ckpt
//     loss_avg  += loss    / steps_per_ckpt
//     on every multiple of steps_per_ckpt → on_checkpoint(),
//                                           reset accumulators
//
// The interrupt flag is only checked between steps, so a step
// is either fully counted or never started. On interrupt the
// summary writer is closed and one final checkpoint is saved
// at the model's current global step.
//
// Step 0 is a multiple of every interval, so by default the
// first step is followed immediately by a checkpoint; set
// `checkpoint_at_step_zero = false` to skip it.

use anyhow::{ensure, Result};
use rand::Rng;
use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use crate::data::sampler::DistributionTable;
use crate::domain::{
    corpus::Corpus,
    traits::{Seq2SeqModel, SummarySink},
};
use crate::ml::evaluator::on_checkpoint;

#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub max_steps:               usize,
    pub steps_per_checkpoint:    usize,
    pub checkpoint_at_step_zero: bool,
    /// Prefix every checkpoint is saved under.
    pub checkpoint_path:         PathBuf,
}

/// Mutable state owned by the loop for the length of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingState {
    /// Loop iterations completed in this run
    pub step:            usize,
    /// Running per-step average of wall-clock seconds
    pub step_time:       f64,
    /// Running per-step average of the training loss
    pub loss:            f64,
    /// Average loss of every checkpoint so far
    pub previous_losses: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { global_step: usize },
    Interrupted { global_step: usize },
}

#[allow(clippy::too_many_arguments)]
pub fn run_training<M, R>(
    model:     &mut M,
    corpus:    &Corpus,
    table:     &DistributionTable,
    settings:  &LoopSettings,
    state:     &mut TrainingState,
    rng:       &mut R,
    interrupt: &AtomicBool,
    summaries: &mut dyn SummarySink,
) -> Result<RunOutcome>
where
    M: Seq2SeqModel,
    R: Rng,
{
    ensure!(settings.steps_per_checkpoint > 0, "steps_per_checkpoint must be positive");
    let interval = settings.steps_per_checkpoint as f64;

    while state.step < settings.max_steps {
        if interrupt.load(Ordering::SeqCst) {
            return shutdown(model, settings, summaries);
        }

        let i_step = state.step;
        let bucket_id = table.sample(rng.gen::<f64>());

        let start = Instant::now();
        let batch = model.get_batch(&corpus.train, bucket_id)?;
        let out = model.step(batch, bucket_id, false)?;
        summaries.add_summary(&out.summary, i_step)?;

        state.step_time += start.elapsed().as_secs_f64() / interval;
        state.loss += out.loss / interval;
        state.step += 1;

        let boundary = i_step % settings.steps_per_checkpoint == 0;
        if boundary && (i_step > 0 || settings.checkpoint_at_step_zero) {
            let report = on_checkpoint(
                model,
                &settings.checkpoint_path,
                state.step_time,
                state.loss,
                &mut state.previous_losses,
                &corpus.dev,
            )?;
            summaries.add_summary(&report.summary(), i_step)?;
            state.step_time = 0.0;
            state.loss = 0.0;
        }
    }

    summaries.close()?;
    let global_step = model.global_step();
    model.save(&settings.checkpoint_path, global_step)?;
    tracing::info!("Reached {} steps, final checkpoint at global step {}", state.step, global_step);
    Ok(RunOutcome::Completed { global_step })
}

fn shutdown<M: Seq2SeqModel>(
    model:     &mut M,
    settings:  &LoopSettings,
    summaries: &mut dyn SummarySink,
) -> Result<RunOutcome> {
    tracing::warn!("Training halted. Cleaning up . . .");
    summaries.close()?;
    let global_step = model.global_step();
    model.save(&settings.checkpoint_path, global_step)?;
    tracing::info!("Done. Saved checkpoint at global step {}", global_step);
    Ok(RunOutcome::Interrupted { global_step })
}
