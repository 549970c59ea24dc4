//! Whole-file writes for saves and new files.

use crate::error::{EngineError, Result};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Replace `path` with `content` via temp file + rename in the same
/// directory, so readers never see a half-written file.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    // Relative paths like "a.txt" have an empty parent.
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| EngineError::io(parent, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        writer
            .write_all(content.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| EngineError::io(path, e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| EngineError::io(path, e))?;

    if let Ok(meta) = fs::metadata(path) {
        // Keep the original file's mode across the rename.
        fs::set_permissions(temp.path(), meta.permissions())
            .map_err(|e| EngineError::io(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| EngineError::io(path, e.error))?;
    Ok(())
}

/// Create an empty file. `Ok(false)` if something already exists there.
pub fn create_empty(path: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(EngineError::io(path, err)),
    }
}
