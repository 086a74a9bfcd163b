// Test doubles for the training loop: a model that replays scripted
// losses and records every call, and an in-memory summary sink.

use anyhow::{ensure, Result};
use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::domain::{
    corpus::BucketedSet,
    traits::{Seq2SeqModel, StepOutput, Summary, SummarySink},
};

pub struct ScriptedModel {
    /// Training losses, replayed in order and cycled.
    pub losses:        Vec<f64>,
    pub eval_loss:     f64,
    pub learning_rate: f64,
    pub global_step:   usize,
    pub decays:        usize,
    /// `save` takes &self, so calls are recorded through a RefCell.
    pub saves:         RefCell<Vec<(PathBuf, usize)>>,
    pub train_buckets: Vec<usize>,
    pub eval_buckets:  Vec<usize>,
    /// Raise the flag once this many training steps have completed.
    pub interrupt_after: Option<(usize, Arc<AtomicBool>)>,
}

impl ScriptedModel {
    pub fn new(losses: Vec<f64>) -> Self {
        Self {
            losses,
            eval_loss: 1.0,
            learning_rate: 0.5,
            global_step: 0,
            decays: 0,
            saves: RefCell::default(),
            train_buckets: Vec::new(),
            eval_buckets: Vec::new(),
            interrupt_after: None,
        }
    }
}

impl Seq2SeqModel for ScriptedModel {
    type Batch = usize;

    fn get_batch(&mut self, set: &BucketedSet, bucket_id: usize) -> Result<usize> {
        ensure!(!set.bucket(bucket_id).is_empty(), "empty bucket {bucket_id}");
        Ok(bucket_id)
    }

    fn step(&mut self, batch: usize, bucket_id: usize, forward_only: bool) -> Result<StepOutput> {
        assert_eq!(batch, bucket_id);
        if forward_only {
            self.eval_buckets.push(bucket_id);
            return Ok(StepOutput { summary: Summary::default(), loss: self.eval_loss });
        }

        let loss = self.losses[self.train_buckets.len() % self.losses.len()];
        self.train_buckets.push(bucket_id);
        self.global_step += 1;
        if let Some((after, flag)) = &self.interrupt_after {
            if self.train_buckets.len() == *after {
                flag.store(true, Ordering::SeqCst);
            }
        }
        Ok(StepOutput { summary: Summary::default().scalar("loss", loss), loss })
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn decay_learning_rate(&mut self) {
        self.learning_rate *= 0.5;
        self.decays += 1;
    }

    fn global_step(&self) -> usize {
        self.global_step
    }

    fn save(&self, path: &Path, step: usize) -> Result<()> {
        self.saves.borrow_mut().push((path.to_path_buf(), step));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub rows:   Vec<(usize, String, f64)>,
    pub closed: bool,
}

impl SummarySink for MemorySink {
    fn add_summary(&mut self, summary: &Summary, step: usize) -> Result<()> {
        ensure!(!self.closed, "summary sink already closed");
        for (tag, value) in &summary.scalars {
            self.rows.push((step, tag.clone(), *value));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
