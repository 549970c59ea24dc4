use crate::error::{EngineError, Result};
use crate::tokenizer::{default_stopwords, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSION: &str = ".txt";

/// On-disk shape: a keyed document with two list fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "Folders", default)]
    pub folders: Vec<PathBuf>,
    #[serde(rename = "Extensions", default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![DEFAULT_EXTENSION.to_string()]
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

/// Everything a scan and the tokenizer need, passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub folders: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub stopwords: BTreeSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(ConfigDocument::default())
    }
}

impl From<ConfigDocument> for EngineConfig {
    fn from(doc: ConfigDocument) -> Self {
        Self {
            folders: doc.folders,
            extensions: doc.extensions,
            stopwords: default_stopwords(),
        }
    }
}

impl EngineConfig {
    pub fn new(folders: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            folders,
            extensions,
            stopwords: default_stopwords(),
        }
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.stopwords.clone())
    }

    pub fn document(&self) -> ConfigDocument {
        ConfigDocument {
            folders: self.folders.clone(),
            extensions: self.extensions.clone(),
        }
    }

    /// Missing or malformed documents fall back to defaults; never fails.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        let parsed = fs::read_to_string(path)
            .map_err(|e| EngineError::io(path, e))
            .and_then(|raw| serde_json::from_str::<ConfigDocument>(&raw).map_err(EngineError::from));
        match parsed {
            Ok(doc) => Self::from(doc),
            Err(err) => {
                log::warn!("Configuration error: {}. Using default settings.", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
            }
        }
        let content = serde_json::to_string_pretty(&self.document())?;
        fs::write(path, content).map_err(|e| EngineError::io(path, e))?;
        Ok(())
    }

    /// Returns false if the folder was already configured.
    pub fn add_folder(&mut self, folder: PathBuf) -> bool {
        if self.folders.contains(&folder) {
            return false;
        }
        self.folders.push(folder);
        true
    }

    pub fn remove_folder(&mut self, folder: &Path) -> bool {
        let before = self.folders.len();
        self.folders.retain(|f| f != folder);
        self.folders.len() != before
    }

    /// Extensions must start with `.`; duplicates are refused.
    pub fn add_extension(&mut self, ext: &str) -> Result<bool> {
        if ext.len() < 2 || !ext.starts_with('.') {
            return Err(EngineError::Config(format!(
                "extension must start with '.', e.g. .md (got '{}')",
                ext
            )));
        }
        if self.extensions.iter().any(|e| e == ext) {
            return Ok(false);
        }
        self.extensions.push(ext.to_string());
        Ok(true)
    }

    pub fn remove_extension(&mut self, ext: &str) -> bool {
        let before = self.extensions.len();
        self.extensions.retain(|e| e != ext);
        self.extensions.len() != before
    }
}

pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("texthive").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_no_folders_and_txt() {
        let cfg = EngineConfig::default();
        assert!(cfg.folders.is_empty());
        assert_eq!(cfg.extensions, vec![".txt"]);
        assert!(cfg.stopwords.contains("after"));
    }

    #[test]
    fn missing_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let cfg = EngineConfig::load(&tmp.path().join("absent.json"));
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn malformed_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(EngineConfig::load(&path), EngineConfig::default());
    }

    #[test]
    fn reads_keyed_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"Folders":["/notes"],"Extensions":[".md",".txt"]}"#).unwrap();
        let cfg = EngineConfig::load(&path);
        assert_eq!(cfg.folders, vec![PathBuf::from("/notes")]);
        assert_eq!(cfg.extensions, vec![".md", ".txt"]);
    }

    #[test]
    fn missing_extensions_key_defaults_to_txt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"Folders":["/notes"]}"#).unwrap();
        assert_eq!(EngineConfig::load(&path).extensions, vec![".txt"]);
    }

    #[test]
    fn save_then_load_keeps_lists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut cfg = EngineConfig::default();
        cfg.add_folder(PathBuf::from("/a"));
        cfg.add_extension(".md").unwrap();
        cfg.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"Folders\""));
        assert!(raw.contains("\"Extensions\""));
        assert_eq!(EngineConfig::load(&path), cfg);
    }

    #[test]
    fn extension_edits_validate_and_dedup() {
        let mut cfg = EngineConfig::default();
        assert!(cfg.add_extension("md").is_err());
        assert!(cfg.add_extension(".").is_err());
        assert!(!cfg.add_extension(".txt").unwrap());
        assert!(cfg.add_extension(".log").unwrap());
        assert!(cfg.remove_extension(".txt"));
        assert_eq!(cfg.extensions, vec![".log"]);
    }

    #[test]
    fn folder_edits_dedup() {
        let mut cfg = EngineConfig::default();
        assert!(cfg.add_folder(PathBuf::from("/x")));
        assert!(!cfg.add_folder(PathBuf::from("/x")));
        assert!(cfg.remove_folder(Path::new("/x")));
        assert!(!cfg.remove_folder(Path::new("/x")));
    }
}
