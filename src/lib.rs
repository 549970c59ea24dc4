//! Lexical indexing, search and clustering over a corpus of plain-text files.
//!
//! The [`Engine`] owns the current [`Snapshot`] (corpus + inverted index).
//! Everything else is a pure function over a snapshot: substring search,
//! keyword ranking, rare-word clustering and rule-based answers.

pub mod answer;
pub mod cluster;
pub mod config;
pub mod corpus;
pub mod display;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
pub mod ranker;
pub mod search;
pub mod store;
pub mod tokenizer;

pub use answer::Answer;
pub use cluster::{Cluster, ClusterMember, RelatedFile};
pub use config::EngineConfig;
pub use corpus::{Corpus, FileItem, FileRecord};
pub use engine::{Engine, LoadSummary, Snapshot, SortKey, TodaysNote};
pub use error::{EngineError, Result};
pub use index::InvertedIndex;
pub use search::{count_instances, SearchStats};
pub use tokenizer::Tokenizer;
