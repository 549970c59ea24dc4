//! Snapshot ownership: one writer rebuilds, any number of readers query.
//!
//! Readers clone an `Arc<Snapshot>` and never hold a lock while they work.
//! A reload builds corpus + index off to the side and swaps the whole
//! snapshot in one step. Every reload takes a new generation number. A scan
//! that sees a newer generation stops, and publishing re-checks it under the
//! write lock, so the last reload started is the one that wins.
//!
//! Saves go through the same write lock. Each one is logged, and a reload
//! replays the edits made after it started, so a scan that read a file just
//! before it was saved cannot bring the old bytes back.

use crate::answer::{self, Answer};
use crate::cluster::{self, Cluster, RelatedFile};
use crate::config::EngineConfig;
use crate::corpus::{Corpus, FileItem, FileRecord};
use crate::error::{EngineError, Result};
use crate::index::InvertedIndex;
use crate::loader::{self, LoadFailure};
use crate::search::{self, SearchOutcome};
use crate::store;
use crate::tokenizer::Tokenizer;
use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

/// Column to order the file list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    /// Corpus order (by path)
    #[default]
    Path,
    Name,
    Size,
    Modified,
}

/// One generation of corpus + index, immutable once published.
#[derive(Debug, Default)]
pub struct Snapshot {
    generation: u64,
    config: EngineConfig,
    tokenizer: Tokenizer,
    corpus: Corpus,
    index: Arc<InvertedIndex>,
}

impl Snapshot {
    pub fn build(config: EngineConfig, corpus: Corpus) -> Self {
        let tokenizer = config.tokenizer();
        let index = InvertedIndex::build(&corpus, &tokenizer);
        Self {
            generation: 0,
            config,
            tokenizer,
            corpus,
            index: Arc::new(index),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn search(&self, term: &str) -> SearchOutcome<'_> {
        search::search(&self.corpus, term)
    }

    pub fn cluster(&self, term: &str) -> Vec<Cluster> {
        cluster::cluster(&self.corpus, &self.tokenizer, term)
    }

    pub fn related_files(&self, term: &str) -> Vec<RelatedFile> {
        cluster::related_files(&self.corpus, &self.tokenizer, term)
    }

    pub fn answer(&self, question: &str) -> Answer {
        answer::answer(&self.corpus, &self.index, &self.tokenizer, question)
    }

    pub fn list(&self, sort: SortKey, descending: bool) -> Vec<FileItem> {
        let mut records: Vec<&FileRecord> = self.corpus.iter().collect();
        match sort {
            SortKey::Path => {}
            SortKey::Name => records.sort_by_key(|r| r.file_name()),
            SortKey::Size => records.sort_by_key(|r| r.size_bytes),
            SortKey::Modified => records.sort_by_key(|r| r.modified_at),
        }
        if descending {
            records.reverse();
        }
        records.into_iter().map(FileItem::from).collect()
    }

    /// Record by full path, or by bare file name.
    pub fn content(&self, key: &str) -> Result<&FileRecord> {
        self.corpus
            .resolve(key)
            .ok_or_else(|| EngineError::UnknownFile(key.to_string()))
    }

    /// Same generation with one record replaced. The index is shared, not
    /// rebuilt, so it stays stale for that file until the next reload.
    fn with_record(&self, record: FileRecord) -> Self {
        let mut corpus = self.corpus.clone();
        corpus.insert(record);
        Self {
            generation: self.generation,
            config: self.config.clone(),
            tokenizer: self.tokenizer.clone(),
            corpus,
            index: Arc::clone(&self.index),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub generation: u64,
    pub files_loaded: usize,
    pub failures: Vec<LoadFailure>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// A file written through the engine, kept until every reload that might
/// have scanned the old bytes has published.
#[derive(Debug)]
struct Edit {
    seq: u64,
    record: FileRecord,
}

#[derive(Debug, Default)]
struct Slot {
    snapshot: Arc<Snapshot>,
    edits: Vec<Edit>,
    edit_seq: u64,
}

impl Slot {
    fn write_through(&mut self, record: FileRecord) {
        log::debug!("write-through {}", record.path.display());
        self.edit_seq += 1;
        self.edits.push(Edit {
            seq: self.edit_seq,
            record: record.clone(),
        });
        self.snapshot = Arc::new(self.snapshot.with_record(record));
    }
}

#[derive(Debug, Default)]
struct Shared {
    current: RwLock<Slot>,
    generation: AtomicU64,
}

/// Result of [`Engine::create_todays_note`].
#[derive(Debug, Clone, Serialize)]
pub struct TodaysNote {
    pub item: FileItem,
    pub content: String,
    /// False when the note already existed and was only loaded.
    pub created: bool,
}

/// `MM-dd-yyNotes.txt` for `date`.
pub fn todays_note_name(date: NaiveDate) -> String {
    date.format("%m-%d-%yNotes.txt").to_string()
}

/// Cheap to clone; clones share the same snapshot slot.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine over records supplied by the caller instead of a folder scan.
    pub fn with_corpus(config: EngineConfig, corpus: Corpus) -> Self {
        let engine = Self::new();
        engine.publish(config, corpus);
        engine
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Slot> {
        self.shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Slot> {
        self.shared
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The current snapshot. Holding it keeps that generation alive.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.read_slot().snapshot)
    }

    fn next_generation(&self) -> u64 {
        self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.shared.generation.load(Ordering::SeqCst) == generation
    }

    /// Publish `snapshot` if `generation` is still the newest. With
    /// `edits_seen`, edits made after the scan started are replayed on top
    /// when the new configuration still covers their path.
    fn install(&self, mut snapshot: Snapshot, generation: u64, edits_seen: Option<u64>) -> Result<()> {
        let mut slot = self.write_slot();
        if !self.is_current(generation) {
            return Err(EngineError::Superseded);
        }
        match edits_seen {
            Some(seen) => {
                for edit in slot.edits.iter().filter(|e| e.seq > seen) {
                    if loader::covers(&snapshot.config, &edit.record.path) {
                        log::debug!("replaying edit of {}", edit.record.path.display());
                        snapshot.corpus.insert(edit.record.clone());
                    }
                }
                slot.edits.retain(|e| e.seq > seen);
            }
            None => slot.edits.clear(),
        }
        snapshot.generation = generation;
        slot.snapshot = Arc::new(snapshot);
        Ok(())
    }

    /// Replace the corpus wholesale with caller-supplied records.
    pub fn publish(&self, config: EngineConfig, corpus: Corpus) -> u64 {
        let generation = self.next_generation();
        let snapshot = Snapshot::build(config, corpus);
        // Nothing can supersede between taking the number and installing
        // except another publish/reload, which then rightly wins.
        if let Err(err) = self.install(snapshot, generation, None) {
            log::debug!("publish of generation {} dropped: {}", generation, err);
        }
        generation
    }

    /// Scan the configured folders and publish the result. Returns
    /// [`EngineError::Superseded`] if a newer reload started meanwhile.
    pub fn reload(&self, config: EngineConfig) -> Result<LoadSummary> {
        let generation = self.next_generation();
        // Every edit up to here is already on disk, so the scan sees it.
        let edits_seen = self.read_slot().edit_seq;
        log::info!("reload #{} over {} folders", generation, config.folders.len());

        let is_current = || self.is_current(generation);
        let outcome = loader::scan(&config, &is_current)?;
        let files_loaded = outcome.corpus.len();
        let snapshot = Snapshot::build(config, outcome.corpus);
        self.install(snapshot, generation, Some(edits_seen))?;

        log::info!(
            "Loaded {} files ({} failures) in {}ms",
            files_loaded,
            outcome.failures.len(),
            outcome.elapsed.as_millis()
        );
        Ok(LoadSummary {
            generation,
            files_loaded,
            failures: outcome.failures,
            elapsed: outcome.elapsed,
        })
    }

    /// [`Engine::reload`] on a worker thread.
    pub fn reload_in_background(&self, config: EngineConfig) -> JoinHandle<Result<LoadSummary>> {
        let engine = self.clone();
        thread::spawn(move || engine.reload(config))
    }

    /// Write `content` to a loaded file, then update only that corpus entry.
    /// The in-memory copy changes only after the write succeeded. Lookup,
    /// write and update happen under one write lock.
    pub fn save(&self, key: &str, content: &str) -> Result<FileItem> {
        let mut slot = self.write_slot();
        let path = slot.snapshot.content(key)?.path.clone();
        store::write_text(&path, content)?;

        let modified_at = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let record = FileRecord::new(path, content).with_modified(modified_at);
        let item = FileItem::from(&record);
        slot.write_through(record);
        Ok(item)
    }

    /// Create an empty file in the first configured folder. `Ok(None)` when
    /// a file of that name already exists there.
    pub fn create_file(&self, name: &str) -> Result<Option<FileItem>> {
        let mut slot = self.write_slot();
        let path = first_folder(&slot.snapshot)?.join(name);
        if !store::create_empty(&path)? {
            return Ok(None);
        }
        let record = FileRecord::new(path, String::new());
        let item = FileItem::from(&record);
        slot.write_through(record);
        Ok(Some(item))
    }

    /// Today's note in the first configured folder: created empty when
    /// missing, otherwise its current content is loaded into the corpus.
    pub fn create_todays_note(&self) -> Result<TodaysNote> {
        self.open_note(&todays_note_name(Local::now().date_naive()))
    }

    fn open_note(&self, name: &str) -> Result<TodaysNote> {
        let mut slot = self.write_slot();
        let path = first_folder(&slot.snapshot)?.join(name);
        let created = store::create_empty(&path)?;

        let content = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
        let modified_at = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let record = FileRecord::new(path, content).with_modified(modified_at);
        let note = TodaysNote {
            item: FileItem::from(&record),
            content: record.content.clone(),
            created,
        };
        slot.write_through(record);
        Ok(note)
    }

    /// True if `path` is part of the current corpus.
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.snapshot().corpus().get(path).is_some()
    }
}

fn first_folder(snapshot: &Snapshot) -> Result<PathBuf> {
    snapshot
        .config()
        .folders
        .first()
        .cloned()
        .ok_or(EngineError::NoFolders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn engine_over(dir: &Path) -> Engine {
        let engine = Engine::new();
        engine
            .reload(EngineConfig::new(vec![dir.to_path_buf()], vec![".txt".into()]))
            .unwrap();
        engine
    }

    #[test]
    fn empty_engine_has_empty_snapshot() {
        let engine = Engine::new();
        let snap = engine.snapshot();
        assert!(snap.corpus().is_empty());
        assert_eq!(snap.index().token_count(), 0);
        assert_eq!(snap.generation(), 0);
    }

    #[test]
    fn reload_publishes_new_generation() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "apple banana").unwrap();
        let engine = engine_over(tmp.path());
        let snap = engine.snapshot();
        assert_eq!(snap.corpus().len(), 1);
        assert!(snap.index().contains("apple"));
        assert_eq!(snap.generation(), 1);
    }

    #[test]
    fn old_snapshot_survives_reload() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "apple").unwrap();
        let engine = engine_over(tmp.path());
        let before = engine.snapshot();

        fs::write(tmp.path().join("b.txt"), "banana").unwrap();
        engine
            .reload(before.config().clone())
            .unwrap();

        assert_eq!(before.corpus().len(), 1);
        assert_eq!(engine.snapshot().corpus().len(), 2);
    }

    #[test]
    fn save_updates_corpus_but_not_index() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "apple").unwrap();
        let engine = engine_over(tmp.path());

        engine.save("a.txt", "zucchini").unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "zucchini");

        let snap = engine.snapshot();
        assert_eq!(snap.corpus().get(&file).unwrap().content, "zucchini");
        // Index is stale until the next reload.
        assert!(snap.index().contains("apple"));
        assert!(!snap.index().contains("zucchini"));
        assert_eq!(snap.search("zucchini").files.len(), 1);
    }

    #[test]
    fn save_of_unknown_file_is_rejected() {
        let engine = Engine::new();
        assert!(matches!(
            engine.save("ghost.txt", "boo"),
            Err(EngineError::UnknownFile(_))
        ));
    }

    #[test]
    fn failed_save_keeps_memory_copy() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        fs::create_dir(&dir).unwrap();
        let file = dir.join("a.txt");
        fs::write(&file, "apple").unwrap();
        let engine = engine_over(&dir);

        fs::remove_dir_all(&dir).unwrap();
        assert!(engine.save("a.txt", "zucchini").is_err());
        assert_eq!(engine.snapshot().corpus().get(&file).unwrap().content, "apple");
    }

    #[test]
    fn create_file_needs_a_folder() {
        let engine = Engine::new();
        assert!(matches!(engine.create_file("x.txt"), Err(EngineError::NoFolders)));
    }

    #[test]
    fn create_file_goes_to_first_folder() {
        let tmp = TempDir::new().unwrap();
        let engine = engine_over(tmp.path());
        let item = engine.create_file("new.txt").unwrap().expect("created");
        assert_eq!(item.file_name, "new.txt");
        assert_eq!(item.size, "0.0B");
        assert!(tmp.path().join("new.txt").exists());
        assert!(engine.is_loaded(&tmp.path().join("new.txt")));
        // Second attempt is a no-op.
        assert!(engine.create_file("new.txt").unwrap().is_none());
    }

    #[test]
    fn superseded_reload_does_not_publish() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "apple").unwrap();
        let engine = Engine::new();
        let config = EngineConfig::new(vec![tmp.path().to_path_buf()], vec![".txt".into()]);

        let stale = engine.next_generation();
        engine.publish(EngineConfig::default(), Corpus::new());
        let snapshot = Snapshot::build(config, Corpus::new());
        assert!(matches!(
            engine.install(snapshot, stale, None),
            Err(EngineError::Superseded)
        ));
        assert_eq!(engine.snapshot().generation(), stale + 1);
    }

    #[test]
    fn save_during_reload_survives_publish() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "apple").unwrap();
        let engine = engine_over(tmp.path());
        let config = engine.snapshot().config().clone();

        // Reload scans the old bytes, then a save lands before it publishes.
        let generation = engine.next_generation();
        let edits_seen = engine.read_slot().edit_seq;
        let scanned = loader::scan(&config, &|| true).unwrap();
        engine.save("a.txt", "zucchini").unwrap();
        engine
            .install(Snapshot::build(config, scanned.corpus), generation, Some(edits_seen))
            .unwrap();

        let snap = engine.snapshot();
        assert_eq!(snap.corpus().get(&file).unwrap().content, "zucchini");
        assert_eq!(snap.generation(), generation);
    }

    #[test]
    fn save_is_not_replayed_into_folder_dropped_by_reload() {
        let tmp = TempDir::new().unwrap();
        let old = tmp.path().join("old");
        let new = tmp.path().join("new");
        fs::create_dir(&old).unwrap();
        fs::create_dir(&new).unwrap();
        let file = old.join("a.txt");
        fs::write(&file, "apple").unwrap();
        let engine = engine_over(&old);

        let config = EngineConfig::new(vec![new.clone()], vec![".txt".into()]);
        let generation = engine.next_generation();
        let edits_seen = engine.read_slot().edit_seq;
        let scanned = loader::scan(&config, &|| true).unwrap();
        engine.save("a.txt", "zucchini").unwrap();
        engine
            .install(Snapshot::build(config, scanned.corpus), generation, Some(edits_seen))
            .unwrap();

        assert!(!engine.is_loaded(&file));
        assert!(matches!(
            engine.save("a.txt", "again"),
            Err(EngineError::UnknownFile(_))
        ));
        assert_eq!(fs::read_to_string(&file).unwrap(), "zucchini");
    }

    #[test]
    fn edits_older_than_a_finished_reload_are_dropped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "apple").unwrap();
        let engine = engine_over(tmp.path());
        engine.save("a.txt", "zucchini").unwrap();
        assert_eq!(engine.read_slot().edits.len(), 1);

        engine.reload(engine.snapshot().config().clone()).unwrap();
        assert!(engine.read_slot().edits.is_empty());
    }

    #[test]
    fn todays_note_name_is_month_day_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(todays_note_name(date), "03-07-24Notes.txt");
    }

    #[test]
    fn todays_note_is_created_then_reopened() {
        let tmp = TempDir::new().unwrap();
        let engine = engine_over(tmp.path());

        let first = engine.create_todays_note().unwrap();
        assert!(first.created);
        assert_eq!(first.content, "");
        assert_eq!(first.item.file_name, todays_note_name(Local::now().date_naive()));
        let path = tmp.path().join(&first.item.file_name);
        assert!(engine.is_loaded(&path));

        fs::write(&path, "standup at nine").unwrap();
        let second = engine.create_todays_note().unwrap();
        assert!(!second.created);
        assert_eq!(second.content, "standup at nine");
        assert_eq!(engine.snapshot().corpus().get(&path).unwrap().content, "standup at nine");
    }

    #[test]
    fn existing_note_is_loaded_not_truncated() {
        let tmp = TempDir::new().unwrap();
        let note = tmp.path().join("03-07-24Notes.txt");
        fs::write(&note, "kept").unwrap();
        let engine = engine_over(tmp.path());

        let opened = engine.open_note("03-07-24Notes.txt").unwrap();
        assert!(!opened.created);
        assert_eq!(opened.content, "kept");
        assert_eq!(fs::read_to_string(&note).unwrap(), "kept");
    }

    #[test]
    fn todays_note_needs_a_folder() {
        let engine = Engine::new();
        assert!(matches!(engine.create_todays_note(), Err(EngineError::NoFolders)));
    }

    #[test]
    fn background_reload_joins_with_summary() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "apple").unwrap();
        let engine = Engine::new();
        let handle = engine.reload_in_background(EngineConfig::new(
            vec![tmp.path().to_path_buf()],
            vec![".txt".into()],
        ));
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.files_loaded, 1);
        assert_eq!(engine.snapshot().generation(), summary.generation);
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        let records = |n: usize| {
            Corpus::from_records(
                (0..n).map(|i| FileRecord::new(PathBuf::from(format!("/n/{i}.txt")), "alpha")),
            )
        };
        let engine = Engine::with_corpus(EngineConfig::default(), records(10));
        let reader = {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let snap = engine.snapshot();
                    let n = snap.corpus().len();
                    assert!(n == 10 || n == 20);
                    assert_eq!(snap.index().lookup("alpha").count(), n);
                }
            })
        };
        for _ in 0..20 {
            engine.publish(EngineConfig::default(), records(20));
            engine.publish(EngineConfig::default(), records(10));
        }
        reader.join().unwrap();
    }

    #[test]
    fn list_sorts_by_column() {
        let corpus = Corpus::from_records([
            FileRecord::new("/n/b.txt", "xx"),
            FileRecord::new("/n/a.txt", "xxxx"),
            FileRecord::new("/n/c.txt", "x"),
        ]);
        let snap = Snapshot::build(EngineConfig::default(), corpus);
        let names = |items: Vec<FileItem>| items.into_iter().map(|i| i.file_name).collect::<Vec<_>>();
        assert_eq!(names(snap.list(SortKey::Size, false)), vec!["c.txt", "b.txt", "a.txt"]);
        assert_eq!(names(snap.list(SortKey::Name, true)), vec!["c.txt", "b.txt", "a.txt"]);
        assert_eq!(names(snap.list(SortKey::Path, false)), vec!["a.txt", "b.txt", "c.txt"]);
    }
}
