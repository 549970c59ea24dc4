//! Groups files that match a term by the rare words they share.
//!
//! Two passes over the matching files. The first counts, per word, how many
//! files have it among their rare seeds. The second groups files under every
//! seed counted in more than one file, so a word rare in a single file never
//! forms a cluster of one.

use crate::corpus::{Corpus, FileRecord};
use crate::ranker::{rare_words, top_words, RARE_WORDS};
use crate::search::TermMatcher;
use crate::tokenizer::Tokenizer;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Member files shown per cluster.
pub const MAX_CLUSTER_FILES: usize = 6;
/// Related words shown per member file.
pub const RELATED_WORDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMember {
    pub path: PathBuf,
    pub file_name: String,
    pub related_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub seed: String,
    pub members: Vec<ClusterMember>,
}

/// One display row: a file under one seed, its related words comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub related_words: String,
}

/// Clusters for `term`, sorted by seed. Empty when `term` is empty.
pub fn cluster(corpus: &Corpus, tokenizer: &Tokenizer, term: &str) -> Vec<Cluster> {
    let matcher = TermMatcher::new(term);
    if matcher.is_empty() {
        return Vec::new();
    }

    let matches: Vec<(&FileRecord, Vec<String>)> = corpus
        .iter()
        .filter(|record| !record.content.is_empty() && matcher.is_match(&record.content))
        .map(|record| (record, rare_words(tokenizer, &record.content, RARE_WORDS)))
        .collect();

    let mut seed_files: HashMap<&str, usize> = HashMap::new();
    for (_, seeds) in &matches {
        for word in seeds {
            *seed_files.entry(word.as_str()).or_default() += 1;
        }
    }

    let mut groups: BTreeMap<&str, Vec<&FileRecord>> = BTreeMap::new();
    for (record, seeds) in &matches {
        for word in seeds {
            if seed_files.get(word.as_str()).copied().unwrap_or(0) > 1 {
                groups.entry(word.as_str()).or_default().push(*record);
            }
        }
    }

    let clusters: Vec<Cluster> = groups
        .into_iter()
        .map(|(seed, files)| Cluster {
            seed: seed.to_string(),
            members: files
                .into_iter()
                .filter(|record| matcher.is_match(&record.content))
                .filter(|record| !record.file_name().is_empty())
                .take(MAX_CLUSTER_FILES)
                .map(|record| ClusterMember {
                    path: record.path.clone(),
                    file_name: record.file_name(),
                    related_words: top_words(tokenizer, &record.content, RELATED_WORDS, term),
                })
                .collect(),
        })
        .collect();

    log::debug!(
        "clustered {} matching files into {} groups for '{}'",
        matches.len(),
        clusters.len(),
        term
    );
    clusters
}

/// Flattened rows, one per (cluster, member) pair. A file may appear under
/// several seeds.
pub fn related_files(corpus: &Corpus, tokenizer: &Tokenizer, term: &str) -> Vec<RelatedFile> {
    cluster(corpus, tokenizer, term)
        .into_iter()
        .flat_map(|cluster| cluster.members)
        .map(|member| RelatedFile {
            path: member.path,
            file_name: member.file_name,
            related_words: member.related_words.join(", "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citrus() -> Corpus {
        Corpus::from_records([
            FileRecord::new("/n/a.txt", "orange mango orange grape"),
            FileRecord::new("/n/b.txt", "orange kiwi grape grape"),
        ])
    }

    #[test]
    fn shared_rare_word_forms_cluster() {
        let tok = Tokenizer::default();
        let clusters = cluster(&citrus(), &tok, "orange");
        let grape = clusters.iter().find(|c| c.seed == "grape").expect("grape cluster");
        let names: Vec<&str> = grape.members.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn single_file_seeds_are_dropped() {
        let tok = Tokenizer::default();
        let clusters = cluster(&citrus(), &tok, "orange");
        let seeds: Vec<&str> = clusters.iter().map(|c| c.seed.as_str()).collect();
        // mango and kiwi are rare in only one file each.
        assert_eq!(seeds, vec!["grape", "orange"]);
    }

    #[test]
    fn related_words_exclude_the_term() {
        let tok = Tokenizer::default();
        let rows = related_files(&citrus(), &tok, "orange");
        assert_eq!(
            rows[0],
            RelatedFile {
                path: "/n/a.txt".into(),
                file_name: "a.txt".into(),
                related_words: "mango, grape".into()
            }
        );
        assert!(rows.iter().all(|r| !r.related_words.contains("orange")));
        // Two clusters, two members each.
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn same_named_files_keep_distinct_paths() {
        let tok = Tokenizer::default();
        let corpus = Corpus::from_records([
            FileRecord::new("/work/todo.txt", "orange grape"),
            FileRecord::new("/home/todo.txt", "orange grape"),
        ]);
        let clusters = cluster(&corpus, &tok, "orange");
        let grape = &clusters[0];
        assert_eq!(grape.seed, "grape");
        let paths: Vec<&PathBuf> = grape.members.iter().map(|m| &m.path).collect();
        assert_eq!(
            paths,
            vec![&PathBuf::from("/home/todo.txt"), &PathBuf::from("/work/todo.txt")]
        );
        assert!(grape.members.iter().all(|m| m.file_name == "todo.txt"));

        let rows = related_files(&corpus, &tok, "orange");
        assert_eq!(rows[0].path, PathBuf::from("/home/todo.txt"));
        assert_eq!(rows[1].path, PathBuf::from("/work/todo.txt"));
    }

    #[test]
    fn empty_term_yields_nothing() {
        let tok = Tokenizer::default();
        assert!(cluster(&citrus(), &tok, "").is_empty());
    }

    #[test]
    fn no_matching_files_yields_nothing() {
        let tok = Tokenizer::default();
        assert!(cluster(&citrus(), &tok, "papaya").is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let tok = Tokenizer::default();
        let corpus = Corpus::from_records((0..20).map(|i| {
            FileRecord::new(
                format!("/n/{i:02}.txt"),
                format!("shared term{} common alpha{} beta gamma delta", i % 3, i % 4),
            )
        }));
        let first = cluster(&corpus, &tok, "shared");
        let second = cluster(&corpus, &tok, "shared");
        assert_eq!(first, second);
        assert!(first.iter().all(|c| c.members.len() <= MAX_CLUSTER_FILES));
    }
}
