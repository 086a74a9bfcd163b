// ============================================================
// Layer 4 — Concrete Data Sources
// ============================================================
// Two implementations of the DataSource trait:
//
//   ToyCorpus       — a fixed handful of chat turns kept in
//                     memory; good for smoke runs and tests
//   FileDataSource  — a directory of raw train/valid text
//                     files, tokenized once by VocabStore
//
// The application layer picks one by dataset name through
// open_data_source() and only ever sees `dyn DataSource`.

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Cursor},
    path::{Path, PathBuf},
};

use crate::data::tokenizer::Vocabulary;
use crate::domain::traits::{DataSource, ParallelReaders, Split};
use crate::infra::vocab_store::{PreparedDataset, VocabStore};

/// Dataset name that selects the built-in toy corpus.
pub const TOY_DATA_NAME: &str = "toy";

/// Pick a data source by name: `toy`, or a directory
/// `data_dir/<data_name>` holding raw text files.
pub fn open_data_source(
    data_name:  &str,
    data_dir:   &Path,
    vocab_size: usize,
) -> Result<Box<dyn DataSource>> {
    if data_name == TOY_DATA_NAME {
        return Ok(Box::new(ToyCorpus::new(data_dir.join(TOY_DATA_NAME))));
    }
    let dir = data_dir.join(data_name);
    let source = FileDataSource::open(data_name, &dir, vocab_size)
        .with_context(|| format!("Cannot open dataset '{}'", dir.display()))?;
    Ok(Box::new(source))
}

// ─── ToyCorpus ────────────────────────────────────────────────────────────────

const TOY_TRAIN: &[(&str, &str)] = &[
    ("hi", "hello ."),
    ("hello", "hi there ."),
    ("how are you ?", "i am fine , thanks ."),
    ("what is your name ?", "i am a chatbot ."),
    ("where are you from ?", "i live in a computer ."),
    ("do you like music ?", "yes , i like music a lot ."),
    ("what time is it ?", "time for training ."),
    ("good night", "good night , sleep well ."),
    ("thanks", "you are welcome ."),
    ("bye", "bye , see you soon ."),
    ("can you tell me a joke ?", "my loss went up , that is the joke ."),
    ("are you a robot ?", "i am a small sequence to sequence model ."),
];

const TOY_VALID: &[(&str, &str)] = &[
    ("hi there", "hello ."),
    ("how are you doing ?", "i am fine ."),
    ("what is your name ?", "i am a chatbot ."),
];

/// Mock dataset with a handful of sentences.
pub struct ToyCorpus {
    vocab: Vocabulary,
    data_dir: PathBuf,
}

impl ToyCorpus {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let lines = TOY_TRAIN
            .iter()
            .chain(TOY_VALID)
            .flat_map(|(q, a)| [*q, *a]);
        Self {
            vocab: Vocabulary::build(lines, usize::MAX, false),
            data_dir: data_dir.into(),
        }
    }

    fn id_lines(&self, sentences: impl Iterator<Item = &'static str>) -> String {
        sentences
            .map(|s| Vocabulary::ids_line(&self.vocab.sentence_to_ids(s, false)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DataSource for ToyCorpus {
    fn name(&self) -> &str {
        TOY_DATA_NAME
    }

    fn word_to_idx(&self) -> &HashMap<String, u32> {
        self.vocab.index()
    }

    fn idx_to_word(&self) -> &[String] {
        self.vocab.words()
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn open_split(&self, split: Split) -> Result<ParallelReaders> {
        let pairs = match split {
            Split::Train => TOY_TRAIN,
            Split::Valid => TOY_VALID,
        };
        let source = self.id_lines(pairs.iter().map(|(q, _)| *q));
        let target = self.id_lines(pairs.iter().map(|(_, a)| *a));
        Ok(ParallelReaders {
            source: Box::new(Cursor::new(source)),
            target: Box::new(Cursor::new(target)),
        })
    }
}

// ─── FileDataSource ───────────────────────────────────────────────────────────

/// A dataset directory prepared into vocabulary + id files.
pub struct FileDataSource {
    name: String,
    data_dir: PathBuf,
    prepared: PreparedDataset,
}

impl FileDataSource {
    pub fn open(name: impl Into<String>, data_dir: &Path, vocab_size: usize) -> Result<Self> {
        let prepared = VocabStore::new(data_dir).prepare(vocab_size)?;
        Ok(Self {
            name: name.into(),
            data_dir: data_dir.to_path_buf(),
            prepared,
        })
    }
}

impl DataSource for FileDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn word_to_idx(&self) -> &HashMap<String, u32> {
        self.prepared.vocab.index()
    }

    fn idx_to_word(&self) -> &[String] {
        self.prepared.vocab.words()
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn open_split(&self, split: Split) -> Result<ParallelReaders> {
        let (src, tgt) = self.prepared.ids_paths(split);
        let open = |p: &Path| -> Result<BufReader<File>> {
            let f = File::open(p).with_context(|| format!("Cannot open '{}'", p.display()))?;
            Ok(BufReader::new(f))
        };
        Ok(ParallelReaders {
            source: Box::new(open(src)?),
            target: Box::new(open(tgt)?),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_corpus, read_buckets};
    use crate::data::tokenizer::EOS_ID;
    use crate::domain::example::BucketSpec;

    #[test]
    fn test_toy_vocab_round_trips_a_sentence() {
        let toy = ToyCorpus::new("data/toy");
        let ids: Vec<u32> = ["how", "are", "you", "?"]
            .iter()
            .map(|w| toy.word_to_idx()[*w])
            .collect();
        assert_eq!(toy.translate(&ids), "how are you ?");
        assert_eq!(toy.data_dir(), Path::new("data/toy"));
    }

    #[test]
    fn test_toy_splits_load_into_buckets() {
        let toy = ToyCorpus::new("data/toy");
        let buckets = [BucketSpec::new(5, 10), BucketSpec::new(10, 15)];

        let train = read_buckets(toy.open_split(Split::Train).unwrap(), &buckets, EOS_ID, 0, Split::Train)
            .unwrap();
        let valid = read_buckets(toy.open_split(Split::Valid).unwrap(), &buckets, EOS_ID, 0, Split::Valid)
            .unwrap();

        assert_eq!(train.total(), TOY_TRAIN.len());
        assert_eq!(valid.total(), TOY_VALID.len());
        assert!(train
            .bucket(0)
            .iter()
            .all(|e| e.target.last() == Some(&EOS_ID)));
    }

    #[test]
    fn test_sample_cap_applies_to_train_split_only() {
        let toy = ToyCorpus::new("data/toy");
        let buckets = [BucketSpec::new(5, 10), BucketSpec::new(10, 15)];

        let corpus = load_corpus(&toy, &buckets, EOS_ID, 1).unwrap();

        assert_eq!(corpus.train.total(), 1);
        assert_eq!(corpus.dev.total(), TOY_VALID.len());
    }

    #[test]
    fn test_open_data_source_selects_toy() {
        let source = open_data_source("toy", Path::new("data"), 100).unwrap();
        assert_eq!(source.name(), "toy");
    }
}
