// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Two subcommands: `train` and `buckets`.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{inspect_use_case::InspectConfig, train_use_case::TrainConfig};
use crate::domain::example::BucketSpec;

const DEFAULT_BUCKETS: &str = "5:10,10:15,20:25,40:50";

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the chatbot, resuming from the latest checkpoint if one exists
    Train(TrainArgs),

    /// Show how a dataset spreads over the buckets, without training
    Buckets(BucketsArgs),
}

/// Where the data comes from and how it is bucketed.
/// Shared by both subcommands.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// `toy` for the built-in corpus, or a dataset directory under --data-dir
    #[arg(long, default_value = "toy")]
    pub data_name: String,

    /// Parent directory of dataset directories
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Cap on training pairs read (0 = no cap); the dev split is never capped
    #[arg(long, default_value_t = 0)]
    pub max_train_samples: usize,

    /// Comma-separated SRC:TGT bucket sizes, smallest first
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_BUCKETS)]
    pub buckets: Vec<BucketSpec>,

    /// Vocabulary size used when building vocab files
    #[arg(long, default_value_t = 40_000)]
    pub vocab_size: usize,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory for checkpoints, summaries and train_config.json
    #[arg(long, default_value = "checkpoints")]
    pub ckpt_dir: String,

    /// Training steps between checkpoints
    #[arg(long, default_value_t = 200)]
    pub steps_per_ckpt: usize,

    /// Loop iterations before training stops
    #[arg(long, default_value_t = 100_000)]
    pub max_steps: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 0.5)]
    pub learning_rate: f64,

    /// Factor applied to the learning rate when the loss stops improving
    #[arg(long, default_value_t = 0.99)]
    pub lr_decay: f64,

    #[arg(long, default_value_t = 128)]
    pub embed_dim: usize,

    #[arg(long, default_value_t = 256)]
    pub hidden_dim: usize,

    /// Seed for bucket draws and batch sampling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Do not checkpoint right after the very first step
    #[arg(long)]
    pub skip_initial_checkpoint: bool,

    /// Start from fresh parameters even if a checkpoint exists
    #[arg(long)]
    pub fresh: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_name:         a.data.data_name,
            data_dir:          a.data.data_dir,
            ckpt_dir:          a.ckpt_dir,
            max_train_samples: a.data.max_train_samples,
            steps_per_ckpt:    a.steps_per_ckpt,
            max_steps:         a.max_steps,
            batch_size:        a.batch_size,
            learning_rate:     a.learning_rate,
            lr_decay:          a.lr_decay,
            buckets:           a.data.buckets,
            vocab_size:        a.data.vocab_size,
            embed_dim:         a.embed_dim,
            hidden_dim:        a.hidden_dim,
            seed:              a.seed,
            checkpoint_at_step_zero: !a.skip_initial_checkpoint,
            fresh:             a.fresh,
        }
    }
}

#[derive(Args, Debug)]
pub struct BucketsArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

impl From<BucketsArgs> for InspectConfig {
    fn from(a: BucketsArgs) -> Self {
        InspectConfig {
            data_name:         a.data.data_name,
            data_dir:          a.data.data_dir,
            vocab_size:        a.data.vocab_size,
            max_train_samples: a.data.max_train_samples,
            buckets:           a.data.buckets,
        }
    }
}
