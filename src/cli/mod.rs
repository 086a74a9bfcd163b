// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `train`   — train (or resume training) the chatbot
//   2. `buckets` — report bucket counts for a dataset
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BucketsArgs, Commands, TrainArgs};

use crate::ml::trainer::RunOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-chatbot",
    version = "0.1.0",
    about = "Train a bucketed sequence-to-sequence chatbot with periodic checkpoints."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routing only.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Buckets(args) => run_buckets(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on dataset '{}'", args.data.data_name);
    let ckpt_dir = args.ckpt_dir.clone();

    match TrainUseCase::new(args.into()).execute()? {
        RunOutcome::Completed { global_step } => {
            println!("Training complete at global step {global_step}. Checkpoints in '{ckpt_dir}'.");
        }
        RunOutcome::Interrupted { global_step } => {
            println!("Training interrupted at global step {global_step}. Checkpoint saved in '{ckpt_dir}'.");
        }
    }
    Ok(())
}

fn run_buckets(args: BucketsArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let report = InspectUseCase::new(args.into()).execute()?;
    println!("vocabulary: {} entries", report.vocab_size);

    println!("{:<8} {:>10} {:>10} {:>10}", "bucket", "train", "dev", "cdf");
    for (i, spec) in report.buckets.iter().enumerate() {
        let cdf = report
            .cumulative
            .as_ref()
            .map(|c| format!("{:.4}", c[i]))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>10} {:>10} {:>10}",
            spec.to_string(),
            report.train_sizes[i],
            report.dev_sizes[i],
            cdf
        );
    }
    for (spec, sample) in report.buckets.iter().zip(&report.samples) {
        if let Some((src, tgt)) = sample {
            println!("  {spec}  {src}  =>  {tgt}");
        }
    }
    if report.cumulative.is_none() {
        println!("No training example fits any bucket.");
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::domain::example::BucketSpec;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["seq2seq-chatbot", "train"]).unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        let cfg: TrainConfig = args.into();
        let defaults = TrainConfig::default();
        assert_eq!(cfg.buckets, defaults.buckets);
        assert_eq!(cfg.max_steps, defaults.max_steps);
        assert!(cfg.checkpoint_at_step_zero);
        assert!(!cfg.fresh);
    }

    #[test]
    fn test_bucket_list_and_flags_parse() {
        let cli = Cli::try_parse_from([
            "seq2seq-chatbot",
            "train",
            "--buckets",
            "2:3,4:6",
            "--skip-initial-checkpoint",
            "--steps-per-ckpt",
            "10",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else {
            panic!("expected train");
        };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.buckets, vec![BucketSpec::new(2, 3), BucketSpec::new(4, 6)]);
        assert!(!cfg.checkpoint_at_step_zero);
        assert_eq!(cfg.steps_per_ckpt, 10);
    }

    #[test]
    fn test_malformed_bucket_is_a_usage_error() {
        assert!(Cli::try_parse_from(["seq2seq-chatbot", "buckets", "--buckets", "5x10"]).is_err());
    }
}
