//! Rule-based answers grounded in the inverted index.
//!
//! No language understanding: the question is tokenized to find files, and a
//! fixed rule table keyed on raw keywords picks the response template.

use crate::corpus::{Corpus, FileRecord};
use crate::display::format_modified;
use crate::index::InvertedIndex;
use crate::tokenizer::Tokenizer;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const ASK_MORE_SPECIFIC: &str = "Please ask a more specific question.";
pub const NOTHING_RELEVANT: &str = "I couldn't find any relevant information in your files.";

/// Files quoted in the context.
pub const CONTEXT_FILES: usize = 5;
/// Characters quoted per file.
pub const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    Describe,
    Author,
    Dates,
    General,
}

struct Rule {
    predicate: fn(&str) -> bool,
    template: Template,
}

fn asks_what(q: &str) -> bool {
    q.contains("what") || q.contains("describe")
}

fn asks_who(q: &str) -> bool {
    q.contains("who") || q.contains("author")
}

fn asks_when(q: &str) -> bool {
    q.contains("when") || q.contains("date")
}

fn always(_: &str) -> bool {
    true
}

// Evaluated top to bottom; first match wins.
const RULES: &[Rule] = &[
    Rule {
        predicate: asks_what,
        template: Template::Describe,
    },
    Rule {
        predicate: asks_who,
        template: Template::Author,
    },
    Rule {
        predicate: asks_when,
        template: Template::Dates,
    },
    Rule {
        predicate: always,
        template: Template::General,
    },
];

/// Keywords are plain substring checks on the untokenized question, so
/// "update" triggers the date rule. Only the letter case is normalized.
fn select_template(question: &str) -> Template {
    let question = question.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.predicate)(&question))
        .map(|rule| rule.template)
        .unwrap_or(Template::General)
}

/// Distinct files for `tokens`, in first-seen order over the tokens.
fn candidate_files<'a>(index: &'a InvertedIndex, tokens: &[String]) -> Vec<&'a Path> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for token in tokens {
        for path in index.lookup(token) {
            if seen.insert(path) {
                files.push(path);
            }
        }
    }
    files
}

fn snippet(record: &FileRecord) -> String {
    let quoted: String = record.content.chars().take(SNIPPET_CHARS).collect();
    format!("From {}: {}…", record.file_name(), quoted)
}

pub fn answer(
    corpus: &Corpus,
    index: &InvertedIndex,
    tokenizer: &Tokenizer,
    question: &str,
) -> Answer {
    let tokens = tokenizer.tokenize_question(question);
    if tokens.is_empty() {
        return Answer::new(ASK_MORE_SPECIFIC);
    }

    // The index may name a path the corpus has since dropped; skip those.
    let top: Vec<&FileRecord> = candidate_files(index, &tokens)
        .into_iter()
        .filter_map(|path| corpus.get(path))
        .take(CONTEXT_FILES)
        .collect();
    if top.is_empty() {
        return Answer::new(NOTHING_RELEVANT);
    }

    let context = top.iter().map(|r| snippet(r)).collect::<Vec<_>>().join("\n");
    let context = context.trim();
    log::debug!("answering from {} files ({} tokens)", top.len(), tokens.len());

    let text = match select_template(question) {
        Template::Describe => format!("Based on your files, here's what I found:\n\n{context}"),
        Template::Author => format!(
            "I can't determine authorship from the file contents alone, but here is the related information:\n\n{context}"
        ),
        Template::Dates => {
            let dates: Vec<String> = top.iter().map(|r| format_modified(r.modified_at)).collect();
            format!("The relevant files were last modified on: {}", dates.join(", "))
        }
        Template::General => format!("Here's what I found in your files:\n\n{context}"),
    };
    Answer::new(text)
}
