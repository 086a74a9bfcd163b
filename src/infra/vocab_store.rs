// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Prepares a directory dataset for training:
//
//   data_dir/
//     train_from.txt  train_to.txt     ← raw chat lines (input)
//     valid_from.txt  valid_to.txt
//     vocab{N}.txt                     ← one token per line, id = line
//     train_from.ids{N} ...            ← token-id lines, one per raw line
//
// Both the vocabulary and the id files are only built when
// missing, so a second run reuses them. The vocabulary is
// shared by prompts and replies since both are the same
// language.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::data::tokenizer::Vocabulary;
use crate::domain::traits::Split;

/// Paths of the prepared id files and the loaded vocabulary.
pub struct PreparedDataset {
    pub vocab: Vocabulary,
    pub vocab_path: PathBuf,
    train_ids: (PathBuf, PathBuf),
    valid_ids: (PathBuf, PathBuf),
}

impl PreparedDataset {
    /// (source ids path, target ids path) for a split.
    pub fn ids_paths(&self, split: Split) -> (&Path, &Path) {
        let (src, tgt) = match split {
            Split::Train => &self.train_ids,
            Split::Valid => &self.valid_ids,
        };
        (src.as_path(), tgt.as_path())
    }
}

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Build (or reuse) the vocabulary and id files for this directory.
    pub fn prepare(&self, vocab_size: usize) -> Result<PreparedDataset> {
        let vocab_path = self.dir.join(format!("vocab{vocab_size}.txt"));
        let vocab = self.load_or_build(&vocab_path, vocab_size)?;

        let ids_for = |stem: &str| -> Result<PathBuf> {
            let raw = self.dir.join(format!("{stem}.txt"));
            let ids = self.dir.join(format!("{stem}.ids{vocab_size}"));
            if !ids.exists() {
                data_to_token_ids(&raw, &ids, &vocab)?;
            }
            Ok(ids)
        };

        let train_ids = (ids_for("train_from")?, ids_for("train_to")?);
        let valid_ids = (ids_for("valid_from")?, ids_for("valid_to")?);

        Ok(PreparedDataset { vocab, vocab_path, train_ids, valid_ids })
    }

    fn load_or_build(&self, vocab_path: &Path, vocab_size: usize) -> Result<Vocabulary> {
        if vocab_path.exists() {
            tracing::info!("Loading vocabulary from '{}'", vocab_path.display());
            return load_vocabulary(vocab_path);
        }

        tracing::info!("Building vocabulary (max {} entries)", vocab_size);
        let mut lines = Vec::new();
        for stem in ["train_from", "train_to"] {
            let path = self.dir.join(format!("{stem}.txt"));
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Cannot read '{}'", path.display()))?;
            lines.extend(text.lines().map(str::to_string));
        }

        let vocab = Vocabulary::build(lines.iter().map(String::as_str), vocab_size, true);
        save_vocabulary(&vocab, vocab_path)?;
        tracing::info!(
            "Vocabulary of {} words saved to '{}'",
            vocab.len(),
            vocab_path.display()
        );
        Ok(vocab)
    }
}

pub fn save_vocabulary(vocab: &Vocabulary, path: &Path) -> Result<()> {
    let mut f = BufWriter::new(
        File::create(path).with_context(|| format!("Cannot create '{}'", path.display()))?,
    );
    for word in vocab.words() {
        writeln!(f, "{word}")?;
    }
    f.flush()?;
    Ok(())
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    let f = File::open(path)
        .with_context(|| format!("Vocabulary file '{}' not found", path.display()))?;
    let words = BufReader::new(f)
        .lines()
        .map(|l| l.map(|w| w.trim().to_string()))
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(Vocabulary::from_words(words))
}

/// Tokenize every line of `raw` into an id line of `ids`.
fn data_to_token_ids(raw: &Path, ids: &Path, vocab: &Vocabulary) -> Result<()> {
    tracing::info!("Tokenizing '{}'", raw.display());
    let input = BufReader::new(
        File::open(raw).with_context(|| format!("Cannot read '{}'", raw.display()))?,
    );
    let mut out = BufWriter::new(
        File::create(ids).with_context(|| format!("Cannot create '{}'", ids.display()))?,
    );
    for line in input.lines() {
        let token_ids = vocab.sentence_to_ids(&line?, true);
        writeln!(out, "{}", Vocabulary::ids_line(&token_ids))?;
    }
    out.flush()?;
    Ok(())
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
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_prepare_builds_vocab_and_ids() {
        let dir = scratch_dir("vocab-store");
        fs::write(dir.join("train_from.txt"), "hi there\nhow are you ?\n").unwrap();
        fs::write(dir.join("train_to.txt"), "hello\ni am fine .\n").unwrap();
        fs::write(dir.join("valid_from.txt"), "hi\n").unwrap();
        fs::write(dir.join("valid_to.txt"), "hello stranger\n").unwrap();

        let prepared = VocabStore::new(&dir).prepare(100).unwrap();
        assert!(prepared.vocab_path.exists());

        let (src, tgt) = prepared.ids_paths(Split::Valid);
        let hi = prepared.vocab.index()["hi"];
        assert_eq!(fs::read_to_string(src).unwrap().trim(), hi.to_string());
        // "stranger" never appears in training text
        assert!(fs::read_to_string(tgt).unwrap().trim().ends_with(" 3"));

        // Second run reloads the same vocabulary from disk
        let again = VocabStore::new(&dir).prepare(100).unwrap();
        assert_eq!(again.vocab.words(), prepared.vocab.words());

        fs::remove_dir_all(&dir).ok();
    }
}
