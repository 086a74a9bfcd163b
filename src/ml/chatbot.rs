// ============================================================
// Layer 5 — Burn Chatbot (Seq2SeqModel implementation)
// ============================================================
// Wraps the attention model, its optimiser and the learning
// rate behind the Seq2SeqModel trait the training loop uses.
//
//   get_batch → random examples (with replacement) from one
//               bucket, padded by PaddedBatch
//   step      → training: forward + backward + Adam update
//               forward-only: model.valid() on the inner
//               backend, no gradients, nothing mutated
//   save      → model + optimiser records via infra::checkpoint
//
// Key Burn insight (same as any Autodiff training loop):
//   - Training uses B (Autodiff<...>) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - Evaluation batches must be built on the inner backend too
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;

use crate::data::batcher::PaddedBatch;
use crate::domain::{
    corpus::BucketedSet,
    example::Example,
    traits::{Seq2SeqModel, StepOutput, Summary},
};
use crate::infra::checkpoint::{self, CheckpointState};
use crate::ml::model::Seq2SeqAttention;

/// Runtime knobs that are not part of the model architecture.
#[derive(Debug, Clone)]
pub struct ChatbotSettings {
    pub batch_size:      usize,
    pub learning_rate:   f64,
    pub lr_decay_factor: f64,
    pub seed:            u64,
}

pub struct BurnChatbot<B: AutodiffBackend, O> {
    model:           Seq2SeqAttention<B>,
    optim:           O,
    device:          B::Device,
    batch_size:      usize,
    learning_rate:   f64,
    lr_decay_factor: f64,
    global_step:     usize,
    rng:             StdRng,
}

impl<B, O> BurnChatbot<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Seq2SeqAttention<B>, B>,
{
    pub fn new(
        model:    Seq2SeqAttention<B>,
        optim:    O,
        device:   B::Device,
        settings: &ChatbotSettings,
    ) -> Self {
        Self {
            model,
            optim,
            device,
            batch_size:      settings.batch_size,
            learning_rate:   settings.learning_rate,
            lr_decay_factor: settings.lr_decay_factor,
            global_step:     0,
            rng:             StdRng::seed_from_u64(settings.seed),
        }
    }

    /// Load parameters, optimiser state, global step and learning
    /// rate from a saved checkpoint.
    pub fn restore(self, state: &CheckpointState) -> Result<Self> {
        let model = checkpoint::load_model::<B, _>(self.model, state, &self.device)?;
        let record = checkpoint::load_optimizer::<B, O::Record>(state, &self.device)?;
        let optim = self.optim.load_record(record);

        tracing::info!(
            "Restored checkpoint at step {} (learning rate {:.4})",
            state.latest_step,
            state.learning_rate
        );
        Ok(Self {
            model,
            optim,
            global_step: state.latest_step,
            learning_rate: state.learning_rate,
            ..self
        })
    }
}

impl<B, O> Seq2SeqModel for BurnChatbot<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Seq2SeqAttention<B>, B>,
{
    type Batch = PaddedBatch;

    fn get_batch(&mut self, set: &BucketedSet, bucket_id: usize) -> Result<PaddedBatch> {
        let examples = set.bucket(bucket_id);
        if examples.is_empty() {
            bail!("Cannot build a batch from empty bucket {bucket_id}");
        }
        let picked: Vec<&Example> = (0..self.batch_size)
            .map(|_| &examples[self.rng.gen_range(0..examples.len())])
            .collect();
        Ok(PaddedBatch::from_examples(&picked, set.spec(bucket_id)))
    }

    fn step(
        &mut self,
        batch: PaddedBatch,
        bucket_id: usize,
        forward_only: bool,
    ) -> Result<StepOutput> {
        if forward_only {
            // Inner backend: no autodiff graph, no parameter update
            let model_valid = self.model.valid();
            let loss = model_valid.forward_loss(batch.to_tensors::<B::InnerBackend>(&self.device));
            let loss: f64 = loss.into_scalar().elem::<f64>();
            return Ok(StepOutput {
                summary: Summary::default()
                    .scalar(format!("eval/bucket_{bucket_id}/loss"), loss),
                loss,
            });
        }

        let loss = self.model.forward_loss(batch.to_tensors::<B>(&self.device));
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(self.learning_rate, self.model.clone(), grads);
        self.global_step += 1;

        Ok(StepOutput {
            summary: Summary::default()
                .scalar("loss", loss_val)
                .scalar("learning_rate", self.learning_rate)
                .scalar("bucket", bucket_id as f64),
            loss: loss_val,
        })
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn decay_learning_rate(&mut self) {
        self.learning_rate *= self.lr_decay_factor;
        tracing::debug!("Learning rate decayed to {:.6}", self.learning_rate);
    }

    fn global_step(&self) -> usize {
        self.global_step
    }

    fn save(&self, path: &Path, step: usize) -> Result<()> {
        checkpoint::save_checkpoint::<B, _, _>(
            &self.model,
            self.optim.to_record(),
            path,
            step,
            self.learning_rate,
        )?;
        Ok(())
    }
}
