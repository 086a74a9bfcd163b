// ============================================================
// Layer 3 — Bucketed Corpus
// ============================================================
// A BucketedSet holds the examples of one split (training or
// held-out), grouped by bucket index. A Corpus is the pair of
// splits, which always share the same bucket schema.
//
// Lifecycle: examples are appended while loading, then the
// Corpus is only read for the rest of the run.

use crate::domain::example::{BucketSpec, Example};

#[derive(Debug, Clone)]
pub struct BucketedSet {
    buckets: Vec<BucketSpec>,
    examples: Vec<Vec<Example>>,
}

impl BucketedSet {
    /// An empty set with one (empty) example list per bucket.
    pub fn new(buckets: &[BucketSpec]) -> Self {
        Self {
            buckets:  buckets.to_vec(),
            examples: vec![Vec::new(); buckets.len()],
        }
    }

    /// Append `example` to the first bucket that fits it.
    /// Returns the bucket index, or None when the pair was dropped.
    pub fn insert(&mut self, example: Example) -> Option<usize> {
        let bucket_id = self
            .buckets
            .iter()
            .position(|b| b.fits(example.source.len(), example.target.len()))?;
        self.examples[bucket_id].push(example);
        Some(bucket_id)
    }

    pub fn bucket(&self, bucket_id: usize) -> &[Example] {
        &self.examples[bucket_id]
    }

    pub fn spec(&self, bucket_id: usize) -> BucketSpec {
        self.buckets[bucket_id]
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Number of examples in each bucket, in bucket order.
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.examples.iter().map(Vec::len).collect()
    }

    pub fn total(&self) -> usize {
        self.examples.iter().map(Vec::len).sum()
    }
}

/// Training and held-out splits with an identical bucket schema.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub train: BucketedSet,
    pub dev:   BucketedSet,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn buckets() -> Vec<BucketSpec> {
        vec![BucketSpec::new(2, 3), BucketSpec::new(4, 6)]
    }

    #[test]
    fn test_insert_picks_smallest_fitting_bucket() {
        let mut set = BucketedSet::new(&buckets());
        assert_eq!(set.insert(Example::new(vec![1, 2], vec![3, 4, 2])), Some(0));
        assert_eq!(set.insert(Example::new(vec![1, 2, 3], vec![4, 2])), Some(1));
        assert_eq!(set.bucket_sizes(), vec![1, 1]);
    }

    #[test]
    fn test_insert_drops_oversized_pairs() {
        let mut set = BucketedSet::new(&buckets());
        assert_eq!(set.insert(Example::new(vec![1; 5], vec![2])), None);
        assert_eq!(set.total(), 0);
    }
}
