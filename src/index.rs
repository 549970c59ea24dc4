//! Token → files map, rebuilt wholesale from a corpus.

use crate::corpus::Corpus;
use crate::tokenizer::Tokenizer;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: BTreeMap<String, BTreeSet<PathBuf>>,
}

impl InvertedIndex {
    /// Each file contributes one membership per distinct token it contains.
    /// There is no incremental update: edits only show up after the next build.
    pub fn build(corpus: &Corpus, tokenizer: &Tokenizer) -> Self {
        let mut postings: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();
        for record in corpus.iter() {
            let distinct: BTreeSet<String> = tokenizer.tokenize(&record.content).into_iter().collect();
            for token in distinct {
                postings
                    .entry(token)
                    .or_default()
                    .insert(record.path.clone());
            }
        }
        log::debug!(
            "built inverted index: {} tokens over {} files",
            postings.len(),
            corpus.len()
        );
        Self { postings }
    }

    /// Files containing `token`, in path order. Empty for unknown tokens.
    pub fn lookup(&self, token: &str) -> impl Iterator<Item = &Path> {
        self.postings
            .get(token)
            .into_iter()
            .flat_map(|paths| paths.iter().map(PathBuf::as_path))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.postings.contains_key(token)
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}
