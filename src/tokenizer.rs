//! Whitespace tokenizer shared by the index, the ranker and the answerer.
//!
//! Splitting is on the ASCII space only. Tabs and newlines stay inside
//! fragments, so `"end\nnext"` is one token. The index and both ranking modes
//! depend on this exact behavior.

use std::collections::{BTreeSet, HashMap};

/// Words that never become tokens, regardless of length.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "the", "is", "and", "in", "it", "of", "to", "for", "with", "on", "at", "by", "from", "up",
    "about", "into", "over", "after",
];

/// Tokens must be strictly longer than this many characters.
const MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: BTreeSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(default_stopwords())
    }
}

pub fn default_stopwords() -> BTreeSet<String> {
    DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect()
}

impl Tokenizer {
    pub fn new(stopwords: BTreeSet<String>) -> Self {
        Self { stopwords }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Lowercased tokens in input order, duplicates kept.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(' ')
            .filter(|fragment| !fragment.is_empty())
            .filter_map(|fragment| self.accept(fragment.to_lowercase()))
            .collect()
    }

    /// Question tokens: same rules as [`Tokenizer::tokenize`], but leading and
    /// trailing ASCII punctuation is stripped first so `"notes?"` looks up
    /// `notes`. Duplicates are dropped, first occurrence wins.
    pub fn tokenize_question(&self, question: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        question
            .split(' ')
            .map(|fragment| fragment.trim_matches(|c: char| c.is_ascii_punctuation()))
            .filter(|fragment| !fragment.is_empty())
            .filter_map(|fragment| self.accept(fragment.to_lowercase()))
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }

    /// Distinct tokens with their in-text counts, in first-occurrence order.
    pub fn term_counts(&self, text: &str) -> Vec<(String, usize)> {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for token in self.tokenize(text) {
            match slots.get(&token) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    slots.insert(token.clone(), order.len());
                    order.push((token, 1));
                }
            }
        }
        order
    }

    fn accept(&self, lowered: String) -> Option<String> {
        if lowered.chars().count() > MIN_TOKEN_CHARS && !self.is_stopword(&lowered) {
            Some(lowered)
        } else {
            None
        }
    }
}
