//! Case-insensitive substring search over the corpus.
//!
//! Matching here is a raw substring test over the full content and the file
//! name. It is intentionally independent of the inverted index: `"apple"`
//! matches inside `"pineapple"` here, but never in the index.

use crate::corpus::{Corpus, FileRecord};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Literal, case-insensitive matcher for one search term.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    lowered: String,
    pattern: Option<Regex>,
}

impl TermMatcher {
    pub fn new(term: &str) -> Self {
        let pattern = if term.is_empty() {
            None
        } else {
            match RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some(re),
                Err(err) => {
                    log::warn!("cannot compile pattern for '{}': {}", term, err);
                    None
                }
            }
        };
        Self {
            term: term.to_string(),
            lowered: term.to_lowercase(),
            pattern,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Case-insensitive containment. The empty term matches nothing here;
    /// callers decide what an empty query means.
    pub fn is_match(&self, haystack: &str) -> bool {
        if self.term.is_empty() {
            return false;
        }
        match &self.pattern {
            Some(re) => re.is_match(haystack),
            None => haystack.to_lowercase().contains(&self.lowered),
        }
    }

    /// Non-overlapping match count. Zero for the empty term, and zero when the
    /// pattern could not be compiled.
    pub fn count(&self, haystack: &str) -> usize {
        match &self.pattern {
            Some(re) => re.find_iter(haystack).count(),
            None => 0,
        }
    }

    /// A file matches on its content or on its file name.
    pub fn matches_file(&self, record: &FileRecord) -> bool {
        self.is_match(&record.content) || self.is_match(&record.file_name())
    }
}

/// Number of case-insensitive, non-overlapping occurrences of `term`.
pub fn count_instances(content: &str, term: &str) -> usize {
    TermMatcher::new(term).count(content)
}

/// Aggregate counters for one completed search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub files_scanned: usize,
    pub files_matched: usize,
    pub instances: usize,
    #[serde(rename = "elapsed_ms")]
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

impl SearchStats {
    pub fn status_line(&self, term: &str) -> String {
        format!(
            "Searched {} files in {}ms – {} matches, {} instances of '{}'",
            self.files_scanned,
            self.elapsed.as_millis(),
            self.files_matched,
            self.instances,
            term
        )
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<'a> {
    pub files: Vec<&'a FileRecord>,
    pub stats: SearchStats,
}

/// All files for an empty term; otherwise every file whose content or name
/// contains `term`. Result order is corpus order.
pub fn search<'a>(corpus: &'a Corpus, term: &str) -> SearchOutcome<'a> {
    let started = Instant::now();
    let matcher = TermMatcher::new(term);
    let mut stats = SearchStats::default();
    let mut files = Vec::new();

    for record in corpus.iter() {
        stats.files_scanned += 1;
        if matcher.is_empty() || matcher.matches_file(record) {
            stats.files_matched += 1;
            stats.instances += matcher.count(&record.content);
            files.push(record);
        }
    }

    stats.elapsed = started.elapsed();
    log::debug!("{}", stats.status_line(term));
    SearchOutcome { files, stats }
}
