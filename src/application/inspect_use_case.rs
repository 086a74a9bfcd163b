// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Loads a dataset into buckets exactly as training would, then
// reports how the examples spread over the buckets and the
// cumulative table the loop would sample from. Nothing is
// trained or written apart from the token-id files a directory
// dataset may need on first use.

use anyhow::Result;
use std::path::PathBuf;

use crate::data::{
    loader::load_corpus,
    sampler::DistributionTable,
    sources::open_data_source,
    tokenizer::EOS_ID,
};
use crate::domain::example::{validate_buckets, BucketSpec};

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub data_name:         String,
    pub data_dir:          String,
    pub vocab_size:        usize,
    pub max_train_samples: usize,
    pub buckets:           Vec<BucketSpec>,
}

/// Per-bucket counts and the sampling table.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketReport {
    pub vocab_size:  usize,
    pub buckets:     Vec<BucketSpec>,
    pub train_sizes: Vec<usize>,
    pub dev_sizes:   Vec<usize>,
    /// None when no training example fits any bucket
    pub cumulative:  Option<Vec<f64>>,
    /// First training pair of each bucket, rendered back to words
    pub samples:     Vec<Option<(String, String)>>,
}

pub struct InspectUseCase {
    config: InspectConfig,
}

impl InspectUseCase {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<BucketReport> {
        let cfg = &self.config;
        validate_buckets(&cfg.buckets)?;

        let source = open_data_source(&cfg.data_name, &PathBuf::from(&cfg.data_dir), cfg.vocab_size)?;
        tracing::info!("Reading '{}' from '{}'", source.name(), source.data_dir().display());
        let corpus = load_corpus(source.as_ref(), &cfg.buckets, EOS_ID, cfg.max_train_samples)?;

        let cumulative = match DistributionTable::build(&corpus.train) {
            Ok(table) => Some(table.as_slice().to_vec()),
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        };

        let samples = (0..corpus.train.num_buckets())
            .map(|i| {
                corpus.train.bucket(i).first().map(|ex| {
                    (source.translate(&ex.source), source.translate(&ex.target))
                })
            })
            .collect();

        Ok(BucketReport {
            vocab_size:  source.word_to_idx().len(),
            buckets:     cfg.buckets.clone(),
            train_sizes: corpus.train.bucket_sizes(),
            dev_sizes:   corpus.dev.bucket_sizes(),
            cumulative,
            samples,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sources::TOY_DATA_NAME;

    fn toy_config(buckets: Vec<BucketSpec>) -> InspectConfig {
        InspectConfig {
            data_name: TOY_DATA_NAME.to_string(),
            data_dir: "data".to_string(),
            vocab_size: 100,
            max_train_samples: 0,
            buckets,
        }
    }

    #[test]
    fn test_toy_corpus_report() {
        let buckets = vec![BucketSpec::new(5, 10), BucketSpec::new(10, 15)];
        let report = InspectUseCase::new(toy_config(buckets)).execute().unwrap();

        assert_eq!(report.train_sizes.len(), 2);
        assert!(report.train_sizes.iter().sum::<usize>() > 0);
        let cumulative = report.cumulative.unwrap();
        assert_eq!(cumulative.len(), 2);
        assert!((cumulative[1] - 1.0).abs() < 1e-12);
        assert!(report.vocab_size > 4);

        // first toy pair lands in the smallest bucket, EOS appended
        let (src, tgt) = report.samples[0].clone().unwrap();
        assert_eq!(src, "hi");
        assert_eq!(tgt, "hello . _EOS");
    }

    #[test]
    fn test_buckets_too_small_for_any_example() {
        let report = InspectUseCase::new(toy_config(vec![BucketSpec::new(1, 1)]))
            .execute()
            .unwrap();
        assert_eq!(report.train_sizes, vec![0]);
        assert!(report.cumulative.is_none());
        assert_eq!(report.samples, vec![None]);
    }

    #[test]
    fn test_unsorted_buckets_are_rejected() {
        let buckets = vec![BucketSpec::new(10, 15), BucketSpec::new(5, 10)];
        assert!(InspectUseCase::new(toy_config(buckets)).execute().is_err());
    }
}
