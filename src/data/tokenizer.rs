// ============================================================
// Layer 4 — Word-Level Tokenizer and Vocabulary
// ============================================================
// Turns raw chat lines into token ids and back.
//
// Tokenisation is deliberately simple:
//   "Hi, how are you?"  →  ["Hi", ",", "how", "are", "you", "?"]
// i.e. split on whitespace, then split off punctuation.
//
// Ids 0..=3 are reserved for the special tokens below; the
// remaining ids are assigned by descending word frequency.
//
// Reference: Rust Book §8 (Collections — HashMap)
//            regex crate documentation

use regex::Regex;
use std::{collections::HashMap, sync::LazyLock};

pub const PAD: &str = "_PAD";
pub const GO:  &str = "_GO";
pub const EOS: &str = "_EOS";
pub const UNK: &str = "_UNK";

pub const PAD_ID: u32 = 0;
pub const GO_ID:  u32 = 1;
pub const EOS_ID: u32 = 2;
pub const UNK_ID: u32 = 3;

/// Special tokens in id order.
pub const SPECIAL_TOKENS: [&str; 4] = [PAD, GO, EOS, UNK];

static WORD_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.,!?"':;)(]"#).expect("static regex"));

static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("static regex"));

/// Split a sentence into word and punctuation tokens.
pub fn basic_tokenize(sentence: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for fragment in sentence.split_whitespace() {
        let mut last = 0;
        for m in WORD_SPLIT.find_iter(fragment) {
            if m.start() > last {
                tokens.push(fragment[last..m.start()].to_string());
            }
            tokens.push(m.as_str().to_string());
            last = m.end();
        }
        if last < fragment.len() {
            tokens.push(fragment[last..].to_string());
        }
    }
    tokens
}

/// Replace every digit with `0` so numbers share vocabulary entries.
pub fn normalize_digits(token: &str) -> String {
    DIGIT.replace_all(token, "0").into_owned()
}

/// Bidirectional word ↔ id mapping.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build from raw lines, keeping at most `max_size` entries
    /// (special tokens included). Ties in frequency are broken
    /// alphabetically so the same corpus always yields the same ids.
    pub fn build<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        max_size: usize,
        normalize: bool,
    ) -> Self {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for line in lines {
            for token in basic_tokenize(line) {
                let token = if normalize { normalize_digits(&token) } else { token };
                *freq.entry(token).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = freq
            .into_iter()
            .filter(|(w, _)| !SPECIAL_TOKENS.contains(&w.as_str()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let words = SPECIAL_TOKENS
            .iter()
            .map(|s| s.to_string())
            .chain(ranked.into_iter().map(|(w, _)| w))
            .take(max_size.max(SPECIAL_TOKENS.len()))
            .collect();

        Self::from_words(words)
    }

    /// Rebuild from an id-ordered word list (e.g. a vocab file).
    pub fn from_words(words: Vec<String>) -> Self {
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u32))
            .collect();
        Self { words, index }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn index(&self) -> &HashMap<String, u32> {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Tokenize `sentence` and map each token to its id (UNK if absent).
    pub fn sentence_to_ids(&self, sentence: &str, normalize: bool) -> Vec<u32> {
        basic_tokenize(sentence)
            .into_iter()
            .map(|t| {
                let t = if normalize { normalize_digits(&t) } else { t };
                self.index.get(&t).copied().unwrap_or(UNK_ID)
            })
            .collect()
    }

    /// Render ids as a space-separated id line, the on-disk format.
    pub fn ids_line(ids: &[u32]) -> String {
        ids.iter().map(u32::to_string).collect::<Vec<_>>().join(" ")
    }
}
