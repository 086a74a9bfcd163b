// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Validate bucket sizes          (Layer 3 - domain)
//   Step 2: Open the data source           (Layer 4 - data)
//   Step 3: Read dev + train into buckets  (Layer 4 - data)
//   Step 4: Build the sampling table       (Layer 4 - data)
//   Step 5: Save config                    (Layer 6 - infra)
//   Step 6: Create or restore the model    (Layer 5 - ml)
//   Step 7: Install the interrupt handler
//   Step 8: Run the training loop          (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::optim::AdamConfig;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::data::{
    loader::load_corpus,
    sampler::DistributionTable,
    sources::open_data_source,
    tokenizer::EOS_ID,
};
use crate::domain::example::{validate_buckets, BucketSpec};
use crate::infra::{checkpoint::CheckpointManager, metrics::SummaryWriter};
use crate::ml::{
    chatbot::{BurnChatbot, ChatbotSettings},
    model::{Seq2SeqAttention, Seq2SeqConfig},
    trainer::{run_training, LoopSettings, RunOutcome, TrainingState},
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Saved as train_config.json next to the
// checkpoints so a run can be inspected or repeated later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_name:         String,
    pub data_dir:          String,
    pub ckpt_dir:          String,
    /// 0 reads the whole training split
    pub max_train_samples: usize,
    pub steps_per_ckpt:    usize,
    pub max_steps:         usize,
    pub batch_size:        usize,
    pub learning_rate:     f64,
    pub lr_decay:          f64,
    pub buckets:           Vec<BucketSpec>,
    pub vocab_size:        usize,
    pub embed_dim:         usize,
    pub hidden_dim:        usize,
    pub seed:              u64,
    pub checkpoint_at_step_zero: bool,
    /// Ignore any checkpoint already in ckpt_dir
    pub fresh:             bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_name:         "toy".to_string(),
            data_dir:          "data".to_string(),
            ckpt_dir:          "checkpoints".to_string(),
            max_train_samples: 0,
            steps_per_ckpt:    200,
            max_steps:         100_000,
            batch_size:        64,
            learning_rate:     0.5,
            lr_decay:          0.99,
            buckets:           default_buckets(),
            vocab_size:        40_000,
            embed_dim:         128,
            hidden_dim:        256,
            seed:              42,
            checkpoint_at_step_zero: true,
            fresh:             false,
        }
    }
}

pub fn default_buckets() -> Vec<BucketSpec> {
    vec![
        BucketSpec::new(5, 10),
        BucketSpec::new(10, 15),
        BucketSpec::new(20, 25),
        BucketSpec::new(40, 50),
    ]
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run until `max_steps` loop iterations or an interrupt.
    pub fn execute(&self) -> Result<RunOutcome> {
        let cfg = &self.config;

        // ── Step 1: Bucket sizes must be sorted ───────────────────────────────
        validate_buckets(&cfg.buckets)?;

        // ── Step 2: Vocabulary + token-id files ───────────────────────────────
        let data_dir = PathBuf::from(&cfg.data_dir);
        let source = open_data_source(&cfg.data_name, &data_dir, cfg.vocab_size)?;
        let vocab_size = source.idx_to_word().len();
        tracing::info!(
            "Dataset '{}' in '{}' with {} vocabulary entries",
            source.name(),
            source.data_dir().display(),
            vocab_size
        );

        // ── Step 3: Dev split uncapped, train split capped ────────────────────
        let corpus = load_corpus(source.as_ref(), &cfg.buckets, EOS_ID, cfg.max_train_samples)?;

        // ── Step 4: Cumulative bucket distribution ────────────────────────────
        let table = DistributionTable::build(&corpus.train)
            .context("No training example fits any bucket")?;
        tracing::info!("Bucket distribution: {:?}", table.as_slice());

        // ── Step 5: Checkpoint dir + config ────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.ckpt_dir, source.name())?;
        if let Ok(previous) = ckpt.load_config() {
            if previous.vocab_size != cfg.vocab_size || previous.hidden_dim != cfg.hidden_dim {
                tracing::warn!("Model settings differ from the run saved in '{}'", cfg.ckpt_dir);
            }
        }
        ckpt.save_config(cfg)?;

        // ── Step 6: Model, fresh or from the latest checkpoint ────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        let model = Seq2SeqConfig::new(vocab_size, cfg.embed_dim, cfg.hidden_dim)
            .init::<MyBackend>(&device);
        let settings = ChatbotSettings {
            batch_size:      cfg.batch_size,
            learning_rate:   cfg.learning_rate,
            lr_decay_factor: cfg.lr_decay,
            seed:            cfg.seed,
        };
        let optim = AdamConfig::new().init::<MyBackend, Seq2SeqAttention<MyBackend>>();
        let mut chatbot = BurnChatbot::new(model, optim, device, &settings);

        match ckpt.latest()? {
            Some(state) if !cfg.fresh => {
                tracing::info!("Reading model parameters from '{}'", state.model_path.display());
                chatbot = chatbot.restore(&state)?;
            }
            _ => tracing::info!("Created model with fresh parameters"),
        }

        // ── Step 7: SIGINT / SIGTERM stop the loop between steps ──────────────
        let interrupt = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupt);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Cannot install interrupt handler")?;

        // ── Step 8: Train ─────────────────────────────────────────────────────
        let mut summaries = SummaryWriter::new(ckpt.dir())?;
        let loop_settings = LoopSettings {
            max_steps:               cfg.max_steps,
            steps_per_checkpoint:    cfg.steps_per_ckpt,
            checkpoint_at_step_zero: cfg.checkpoint_at_step_zero,
            checkpoint_path:         ckpt.checkpoint_path(),
        };
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut state = TrainingState::default();

        run_training(
            &mut chatbot,
            &corpus,
            &table,
            &loop_settings,
            &mut state,
            &mut rng,
            &interrupt,
            &mut summaries,
        )
    }
}
