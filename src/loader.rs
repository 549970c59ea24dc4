//! Folder scan: enumerate matching files, read them, build a fresh corpus.
//!
//! A scan never aborts on a single bad file or folder. Failures are collected
//! and returned next to the corpus. The only early exit is supersession,
//! checked between enumeration steps and between read batches.

use crate::config::EngineConfig;
use crate::corpus::{Corpus, FileRecord};
use crate::error::{EngineError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, UNIX_EPOCH};
use walkdir::WalkDir;

/// Files read in parallel between supersession checks.
const READ_BATCH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub corpus: Corpus,
    pub failures: Vec<LoadFailure>,
    pub elapsed: Duration,
}

/// Case-insensitive suffix match against every configured extension.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_lowercase(),
        None => return false,
    };
    extensions
        .iter()
        .any(|ext| !ext.is_empty() && name.ends_with(&ext.to_lowercase()))
}

/// True if a scan under `config` would pick up `path`.
pub fn covers(config: &EngineConfig, path: &Path) -> bool {
    has_extension(path, &config.extensions)
        && config.folders.iter().any(|folder| path.starts_with(folder))
}

pub fn read_record(path: &Path) -> std::result::Result<FileRecord, LoadFailure> {
    let failure = |err: std::io::Error| LoadFailure {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let meta = fs::metadata(path).map_err(failure)?;
    let content = fs::read_to_string(path).map_err(failure)?;
    Ok(FileRecord {
        path: path.to_path_buf(),
        content,
        size_bytes: meta.len(),
        modified_at: meta.modified().unwrap_or(UNIX_EPOCH),
    })
}

fn discover(
    config: &EngineConfig,
    failures: &mut Vec<LoadFailure>,
    is_current: &(dyn Fn() -> bool + Sync),
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for folder in &config.folders {
        for entry in WalkDir::new(folder) {
            if !is_current() {
                return Err(EngineError::Superseded);
            }
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_extension(entry.path(), &config.extensions) {
                        paths.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| folder.clone());
                    log::warn!("Unable to read the files from folder: {}: {}", folder.display(), err);
                    failures.push(LoadFailure {
                        path,
                        message: format!("Unable to read the files from folder: {} ({})", folder.display(), err),
                    });
                }
            }
        }
    }
    Ok(paths)
}

/// Scan every configured folder into a new corpus. `is_current` returning
/// false aborts the scan with [`EngineError::Superseded`].
pub fn scan(config: &EngineConfig, is_current: &(dyn Fn() -> bool + Sync)) -> Result<ScanOutcome> {
    let started = Instant::now();
    let mut failures = Vec::new();
    let paths = discover(config, &mut failures, is_current)?;
    log::info!(
        "discovered {} files in {} folders",
        paths.len(),
        config.folders.len()
    );

    let mut corpus = Corpus::new();
    for batch in paths.chunks(READ_BATCH) {
        if !is_current() {
            return Err(EngineError::Superseded);
        }
        let results: Vec<_> = batch.par_iter().map(|path| read_record(path)).collect();
        for result in results {
            match result {
                Ok(record) => corpus.insert(record),
                Err(failure) => {
                    log::warn!("Error reading {}: {}", failure.path.display(), failure.message);
                    failures.push(failure);
                }
            }
        }
    }

    Ok(ScanOutcome {
        corpus,
        failures,
        elapsed: started.elapsed(),
    })
}
