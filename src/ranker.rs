//! Raw-frequency keyword ranking within a single file.

use crate::tokenizer::Tokenizer;

/// Shown in place of an empty top-words list.
pub const NO_RELATED_WORDS: &str = "No related words found";

/// Default number of rare words taken as cluster seeds.
pub const RARE_WORDS: usize = 10;

/// `k` least frequent tokens of `content`. Ties keep first-occurrence order.
pub fn rare_words(tokenizer: &Tokenizer, content: &str, k: usize) -> Vec<String> {
    let mut counts = tokenizer.term_counts(content);
    // Stable: equal counts stay in first-occurrence order.
    counts.sort_by_key(|(_, count)| *count);
    counts.into_iter().take(k).map(|(word, _)| word).collect()
}

/// `k` most frequent tokens of `content`, skipping `exclude` (case-insensitive).
/// Never empty: falls back to [`NO_RELATED_WORDS`].
pub fn top_words(tokenizer: &Tokenizer, content: &str, k: usize, exclude: &str) -> Vec<String> {
    let exclude = exclude.to_lowercase();
    let mut counts: Vec<(String, usize)> = tokenizer
        .term_counts(content)
        .into_iter()
        .filter(|(word, _)| *word != exclude)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let words: Vec<String> = counts.into_iter().take(k).map(|(word, _)| word).collect();
    if words.is_empty() {
        vec![NO_RELATED_WORDS.to_string()]
    } else {
        words
    }
}
