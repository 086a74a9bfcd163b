// ============================================================
// Layer 4 — Bucketed Corpus Loader
// ============================================================
// Reads parallel source/target id files from a DataSource and
// sorts every pair into the smallest bucket that can hold it.
//
// File format (one example per line pair):
//   source: "17 4 52"
//   target: "9 31"       → loaded as [9, 31, EOS]
//
// Pairs too long for every bucket are dropped. Reading stops
// at the sample cap or when either stream runs out; if one
// stream still has a line left at that point the files are
// out of sync and loading fails.
//
// Reference: Rust Book §12 (I/O), §9 (Error Handling)

use anyhow::{Context, Result};
use std::io::{BufRead, Lines};

use crate::domain::{
    corpus::{BucketedSet, Corpus},
    error::CorpusError,
    example::{BucketSpec, Example},
    traits::{DataSource, ParallelReaders, Split},
};

/// Load both splits of `source` into buckets.
/// `max_train_samples == 0` reads the whole training split.
pub fn load_corpus(
    source:            &dyn DataSource,
    buckets:           &[BucketSpec],
    eos_id:            u32,
    max_train_samples: usize,
) -> Result<Corpus> {
    tracing::info!(
        "Reading development and training data (limit: {})",
        max_train_samples
    );

    let dev_readers = source.open_split(Split::Valid)?;
    let dev = read_buckets(dev_readers, buckets, eos_id, 0, Split::Valid)
        .with_context(|| format!("Cannot load dev split of '{}'", source.name()))?;

    let train_readers = source.open_split(Split::Train)?;
    let train = read_buckets(train_readers, buckets, eos_id, max_train_samples, Split::Train)
        .with_context(|| format!("Cannot load train split of '{}'", source.name()))?;

    tracing::info!(
        "Loaded {} training and {} dev examples into {} buckets",
        train.total(),
        dev.total(),
        buckets.len()
    );
    Ok(Corpus { train, dev })
}

/// Read line pairs into a BucketedSet. `max_size == 0` means no cap.
pub fn read_buckets(
    readers:  ParallelReaders,
    buckets:  &[BucketSpec],
    eos_id:   u32,
    max_size: usize,
    split:    Split,
) -> Result<BucketedSet, CorpusError> {
    let mut set = BucketedSet::new(buckets);
    let mut source_lines = readers.source.lines();
    let mut target_lines = readers.target.lines();
    let mut counter = 0usize;
    let mut dropped = 0usize;

    while max_size == 0 || counter < max_size {
        let (source, target) = match (source_lines.next(), target_lines.next()) {
            (Some(s), Some(t)) => (s?, t?),
            (None, None) => break,
            (Some(s), None) => {
                check_leftover(split, counter, "target", s?, &mut source_lines)?;
                break;
            }
            (None, Some(t)) => {
                check_leftover(split, counter, "source", t?, &mut target_lines)?;
                break;
            }
        };
        counter += 1;
        if counter % 100_000 == 0 {
            tracing::debug!("  reading {} data line {}", split.name(), counter);
        }

        let source_ids = parse_ids(&source, split, counter)?;
        let mut target_ids = parse_ids(&target, split, counter)?;
        target_ids.push(eos_id);

        if set.insert(Example::new(source_ids, target_ids)).is_none() {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::debug!(
            "Dropped {} {} pairs too long for every bucket",
            dropped,
            split.name()
        );
    }
    Ok(set)
}

/// One stream ended while the other still holds `first` and `rest`.
/// Trailing blank lines are tolerated; anything else is an error.
fn check_leftover(
    split: Split,
    pairs: usize,
    ended: &str,
    first: String,
    rest:  &mut Lines<Box<dyn BufRead>>,
) -> Result<(), CorpusError> {
    let mut offset = 1;
    let mut line = first;
    loop {
        if !line.trim().is_empty() {
            return Err(CorpusError::DataFormat {
                split:  split.name().to_string(),
                line:   pairs + offset,
                reason: format!(
                    "{ended} stream ended after {pairs} lines but the other stream continues ('{}')",
                    line.trim()
                ),
            });
        }
        match rest.next() {
            Some(next) => {
                line = next?;
                offset += 1;
            }
            None => return Ok(()),
        }
    }
}

fn parse_ids(line: &str, split: Split, line_no: usize) -> Result<Vec<u32>, CorpusError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<u32>().map_err(|_| CorpusError::DataFormat {
                split:  split.name().to_string(),
                line:   line_no,
                reason: format!("'{tok}' is not a token id"),
            })
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn readers(source: &str, target: &str) -> ParallelReaders {
        ParallelReaders {
            source: Box::new(Cursor::new(source.to_string())),
            target: Box::new(Cursor::new(target.to_string())),
        }
    }

    #[test]
    fn test_oversized_pair_is_dropped() {
        let set = read_buckets(
            readers("1 2\n3 4 5\n", "6 7\n8\n"),
            &[BucketSpec::new(2, 3)],
            9,
            0,
            Split::Train,
        )
        .unwrap();

        assert_eq!(set.bucket(0), &[Example::new(vec![1, 2], vec![6, 7, 9])]);
        assert_eq!(set.total(), 1);
    }

    #[test]
    fn test_pairs_go_to_first_fitting_bucket() {
        let set = read_buckets(
            readers("1\n1 2 3 4\n", "2\n3 4 5\n"),
            &[BucketSpec::new(2, 2), BucketSpec::new(5, 5)],
            9,
            0,
            Split::Train,
        )
        .unwrap();

        assert_eq!(set.bucket_sizes(), vec![1, 1]);
        assert_eq!(set.bucket(1)[0].target, vec![3, 4, 5, 9]);
    }

    #[test]
    fn test_sample_cap_stops_reading() {
        let set = read_buckets(
            readers("1\n2\n3\n", "4\n5\n6\n"),
            &[BucketSpec::new(5, 5)],
            9,
            2,
            Split::Train,
        )
        .unwrap();
        assert_eq!(set.total(), 2);
    }

    #[test]
    fn test_cap_reached_before_desync_is_not_an_error() {
        let set = read_buckets(
            readers("1\n2\n3\n", "4\n"),
            &[BucketSpec::new(5, 5)],
            9,
            1,
            Split::Train,
        )
        .unwrap();
        assert_eq!(set.total(), 1);
    }

    #[test]
    fn test_unmatched_line_is_a_format_error() {
        let err = read_buckets(
            readers("1\n2\n3\n", "4\n5\n"),
            &[BucketSpec::new(5, 5)],
            9,
            0,
            Split::Valid,
        )
        .unwrap_err();

        match err {
            CorpusError::DataFormat { split, line, .. } => {
                assert_eq!(split, "valid");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trailing_blank_line_is_tolerated() {
        let set = read_buckets(
            readers("1\n2\n\n", "4\n5\n"),
            &[BucketSpec::new(5, 5)],
            9,
            0,
            Split::Train,
        )
        .unwrap();
        assert_eq!(set.total(), 2);
    }

    #[test]
    fn test_non_numeric_token_is_a_format_error() {
        let err = read_buckets(
            readers("1 x\n", "2\n"),
            &[BucketSpec::new(5, 5)],
            9,
            0,
            Split::Train,
        )
        .unwrap_err();
        assert!(matches!(err, CorpusError::DataFormat { line: 1, .. }));
    }
}
