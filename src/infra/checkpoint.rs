// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores training state with Burn's named MessagePack
// recorder. Records are kept at full precision: a resumed run must
// see exactly the parameters and Adam moments that were saved.
//
// What gets saved per checkpoint (prefix = ckpt_dir/<data>.ckpt):
//   1. <data>_ckpt-<step>.mpk        — model parameters
//   2. <data>_ckpt-<step>-optim.mpk  — optimiser state (Adam moments)
//   3. checkpoint.json               — latest step, learning rate, paths
//   4. train_config.json             — written once, before training
//
// checkpoint.json is rewritten after every save, so it always
// points at the newest complete checkpoint. Restoring reads it
// back and loads both records into freshly initialised modules.
//
// File naming convention:
//   checkpoints/
//     toy_ckpt-1.mpk
//     toy_ckpt-1-optim.mpk
//     toy_ckpt-201.mpk
//     ...
//     checkpoint.json
//     train_config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Record, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;

/// Model and optimiser records are both stored with this.
type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

const STATE_FILE: &str = "checkpoint.json";
const CONFIG_FILE: &str = "train_config.json";

/// Contents of checkpoint.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub latest_step:    usize,
    pub learning_rate:  f64,
    pub model_path:     PathBuf,
    pub optimizer_path: PathBuf,
}

/// Owns the checkpoint directory layout for one dataset.
pub struct CheckpointManager {
    dir:       PathBuf,
    data_name: String,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>, data_name: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir, data_name: data_name.into() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<ckpt_dir>/<data_name>.ckpt`, the prefix every save is keyed by.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.dir.join(format!("{}.ckpt", self.data_name))
    }

    /// The latest checkpoint, or None before the first save.
    pub fn latest(&self) -> Result<Option<CheckpointState>> {
        let path = self.dir.join(STATE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let state = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt checkpoint state in '{}'", path.display()))?;
        Ok(Some(state))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Record file for `prefix` at `step`. The recorder swaps in its own
/// extension, so dots in the prefix's file name become underscores.
fn step_path(prefix: &Path, step: usize, suffix: &str) -> PathBuf {
    let stem = prefix
        .file_name()
        .map(|n| n.to_string_lossy().replace('.', "_"))
        .unwrap_or_else(|| "model".to_string());
    let dir = prefix.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}-{step}{suffix}"))
}

/// Record model and optimiser state under `prefix`, tagged `step`,
/// then point checkpoint.json at it.
pub fn save_checkpoint<B, M, R>(
    model:         &M,
    optimizer:     R,
    prefix:        &Path,
    step:          usize,
    learning_rate: f64,
) -> Result<CheckpointState>
where
    B: Backend,
    M: Module<B>,
    R: Record<B>,
{
    let model_path = step_path(prefix, step, "");
    let optimizer_path = step_path(prefix, step, "-optim");

    CheckpointRecorder::new()
        .record(model.clone().into_record(), model_path.clone())
        .with_context(|| format!("Failed to save checkpoint to '{}'", model_path.display()))?;
    CheckpointRecorder::new()
        .record(optimizer, optimizer_path.clone())
        .with_context(|| {
            format!("Failed to save optimizer state to '{}'", optimizer_path.display())
        })?;

    let state = CheckpointState { latest_step: step, learning_rate, model_path, optimizer_path };
    write_state(prefix, &state)?;
    tracing::debug!("Saved checkpoint: step {}", step);
    Ok(state)
}

fn write_state(prefix: &Path, state: &CheckpointState) -> Result<()> {
    let dir = prefix.parent().unwrap_or_else(|| Path::new("."));
    let path = dir.join(STATE_FILE);
    fs::write(&path, serde_json::to_string_pretty(state)?)
        .with_context(|| format!("Failed to write '{}'", path.display()))
}

/// Load model parameters recorded by `save_checkpoint`.
pub fn load_model<B: Backend, M: Module<B>>(
    model:  M,
    state:  &CheckpointState,
    device: &B::Device,
) -> Result<M> {
    let record = CheckpointRecorder::new()
        .load(state.model_path.clone(), device)
        .with_context(|| {
            format!("Cannot load checkpoint '{}'", state.model_path.display())
        })?;
    Ok(model.load_record(record))
}

/// Load an optimiser record recorded by `save_checkpoint`.
pub fn load_optimizer<B: Backend, R: Record<B>>(
    state:  &CheckpointState,
    device: &B::Device,
) -> Result<R> {
    CheckpointRecorder::new()
        .load(state.optimizer_path.clone(), device)
        .with_context(|| {
            format!("Cannot load optimizer state '{}'", state.optimizer_path.display())
        })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "seq2seq-chatbot-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_checkpoint_path_uses_data_name() {
        let dir = scratch_dir("ckpt-path");
        let mgr = CheckpointManager::new(&dir, "toy").unwrap();
        assert_eq!(mgr.checkpoint_path(), dir.join("toy.ckpt"));
        assert_eq!(
            step_path(&mgr.checkpoint_path(), 42, "-optim"),
            dir.join("toy_ckpt-42-optim")
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_latest_is_none_before_first_save() {
        let dir = scratch_dir("ckpt-empty");
        let mgr = CheckpointManager::new(&dir, "toy").unwrap();
        assert!(mgr.latest().unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_state_and_config_round_trip() {
        let dir = scratch_dir("ckpt-state");
        let mgr = CheckpointManager::new(&dir, "toy").unwrap();

        let state = CheckpointState {
            latest_step:    7,
            learning_rate:  0.25,
            model_path:     dir.join("toy_ckpt-7"),
            optimizer_path: dir.join("toy_ckpt-7-optim"),
        };
        write_state(&mgr.checkpoint_path(), &state).unwrap();
        assert_eq!(mgr.latest().unwrap(), Some(state));

        let cfg = TrainConfig { steps_per_ckpt: 3, ..TrainConfig::default() };
        mgr.save_config(&cfg).unwrap();
        assert_eq!(mgr.load_config().unwrap().steps_per_ckpt, 3);

        fs::remove_dir_all(&dir).ok();
    }
}
