// ============================================================
// Layer 4 — Bucket Distribution Sampler
// ============================================================
// Training draws one bucket per step, proportionally to how
// much of the training data lives in that bucket.
//
// The table stores cumulative fractions:
//   sizes [3, 0, 7]  →  table [0.3, 0.3, 1.0]
//
// Sampling takes a uniform r in [0, 1) and returns the first
// bucket whose cumulative fraction is STRICTLY greater than r,
// so an empty bucket (zero-width interval) is never chosen.
// A linear scan is enough: there are only a handful of buckets.

use crate::domain::{corpus::BucketedSet, error::CorpusError};

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionTable {
    cumulative: Vec<f64>,
}

impl DistributionTable {
    /// Build the cumulative table from the bucket sizes of `train`.
    pub fn build(train: &BucketedSet) -> Result<Self, CorpusError> {
        Self::from_sizes(&train.bucket_sizes())
    }

    pub fn from_sizes(sizes: &[usize]) -> Result<Self, CorpusError> {
        let total: usize = sizes.iter().sum();
        if total == 0 {
            return Err(CorpusError::EmptyCorpus);
        }

        let total = total as f64;
        let mut running = 0usize;
        let cumulative = sizes
            .iter()
            .map(|&n| {
                running += n;
                running as f64 / total
            })
            .collect();

        Ok(Self { cumulative })
    }

    /// Smallest bucket index `i` with `table[i] > r`.
    pub fn sample(&self, r: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&c| c > r)
            // r < 1.0 always hits; guard against r == 1.0 from a bad source
            .unwrap_or(self.cumulative.len() - 1)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.cumulative
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_table_from_sizes() {
        let table = DistributionTable::from_sizes(&[3, 0, 7]).unwrap();
        let t = table.as_slice();
        assert!((t[0] - 0.3).abs() < EPS);
        assert!((t[1] - 0.3).abs() < EPS);
        assert!((t[2] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_table_is_monotone_and_ends_at_one() {
        for sizes in [vec![1], vec![5, 1, 0, 9, 2], vec![0, 0, 4], vec![7, 0, 0]] {
            let table = DistributionTable::from_sizes(&sizes).unwrap();
            let t = table.as_slice();
            assert!(t.windows(2).all(|w| w[0] <= w[1]), "{sizes:?}");
            assert!((t[t.len() - 1] - 1.0).abs() < EPS, "{sizes:?}");

            let total: usize = sizes.iter().sum();
            for i in 1..t.len() {
                let width = t[i] - t[i - 1];
                assert!((width - sizes[i] as f64 / total as f64).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        assert!(matches!(
            DistributionTable::from_sizes(&[0, 0]),
            Err(CorpusError::EmptyCorpus)
        ));
        assert!(matches!(
            DistributionTable::from_sizes(&[]),
            Err(CorpusError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_sample_uses_strict_comparison() {
        let table = DistributionTable::from_sizes(&[3, 0, 7]).unwrap();
        assert_eq!(table.sample(0.3), 2);
        assert_eq!(table.sample(0.29), 0);
        assert_eq!(table.sample(0.0), 0);
        assert_eq!(table.sample(0.999), 2);
    }

    #[test]
    fn test_sample_skips_empty_leading_bucket() {
        let table = DistributionTable::from_sizes(&[0, 5]).unwrap();
        assert_eq!(table.sample(0.0), 1);
    }

    #[test]
    fn test_sample_around_boundary() {
        let table = DistributionTable::from_sizes(&[1, 1, 2]).unwrap();
        // boundaries at 0.25 and 0.5
        assert_eq!(table.sample(0.25 - 1e-9), 0);
        assert_eq!(table.sample(0.25 + 1e-9), 1);
        assert_eq!(table.sample(0.5 - 1e-9), 1);
        assert_eq!(table.sample(0.5 + 1e-9), 2);
    }
}
