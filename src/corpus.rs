//! In-memory snapshot of every loaded file.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub content: String,
    pub size_bytes: u64,
    pub modified_at: SystemTime,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            size_bytes: content.len() as u64,
            content,
            modified_at: SystemTime::now(),
        }
    }

    pub fn with_modified(mut self, modified_at: SystemTime) -> Self {
        self.modified_at = modified_at;
        self
    }

    /// Last path component, lossy. Empty for paths without one.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Display row for one file (the list view's model).
#[derive(Debug, Clone, Serialize)]
pub struct FileItem {
    pub file_name: String,
    pub full_path: String,
    pub size: String,
    pub size_bytes: u64,
    pub modified: String,
}

impl From<&FileRecord> for FileItem {
    fn from(record: &FileRecord) -> Self {
        Self {
            file_name: record.file_name(),
            full_path: record.path.display().to_string(),
            size: crate::display::format_file_size(record.size_bytes),
            size_bytes: record.size_bytes,
            modified: crate::display::format_modified(record.modified_at),
        }
    }
}

/// Path-keyed map of records. Iteration is by path, so every scan over the
/// corpus is deterministic. Records sit behind `Arc` so a write-through edit
/// can clone the map without copying file contents.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    files: BTreeMap<PathBuf, Arc<FileRecord>>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut corpus = Self::new();
        for record in records {
            corpus.insert(record);
        }
        corpus
    }

    /// Insert or replace the record for its path.
    pub fn insert(&mut self, record: FileRecord) {
        self.files.insert(record.path.clone(), Arc::new(record));
    }

    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.files.get(path).map(Arc::as_ref)
    }

    /// First record (in corpus order) whose file name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&FileRecord> {
        self.iter().find(|record| record.file_name() == name)
    }

    /// Exact path first, then bare file name.
    pub fn resolve(&self, key: &str) -> Option<&FileRecord> {
        self.get(Path::new(key)).or_else(|| self.find_by_name(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
