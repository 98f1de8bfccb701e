//! Cached dataset reader
//!
//! Each distinct file is read and parsed at most once per store. The cache
//! map lock is only held to find or create a path's slot; the slot itself
//! is a `OnceCell`, so concurrent first reads of one path block on a single
//! populate and every later call gets the same `Arc`.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::models::{DatabaseTable, Dialogue};
use super::{Domain, Split};
use crate::error::{GalleryError, Result};

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Populate-once cache of parsed JSON documents keyed by resolved path.
pub struct JsonCache<T> {
    slots: Mutex<HashMap<PathBuf, Slot<T>>>,
    reads: AtomicUsize,
}

impl<T> Default for JsonCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
        }
    }
}

impl<T: DeserializeOwned> JsonCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached document for `path`, reading it on first access.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<T>> {
        let key = resolve(path);
        let slot = {
            // The map only ever gains entries, so a poisoned lock is still usable.
            let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
            slots.entry(key.clone()).or_default().clone()
        };

        if let Some(doc) = slot.get() {
            debug!("Cache hit: {}", key.display());
            return Ok(doc.clone());
        }

        slot.get_or_try_init(|| -> Result<Arc<T>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let doc = read_json::<T>(&key)?;
            info!("Loaded {}", key.display());
            Ok(Arc::new(doc))
        })
        .cloned()
    }

    /// Number of times a file was actually opened.
    pub fn disk_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of paths with a populated entry.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| GalleryError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            GalleryError::io(path, e.into())
        } else {
            GalleryError::json(path, e)
        }
    })
}

/// Read-only access to the CrossWOZ files under one data directory.
pub struct DatasetStore {
    root: PathBuf,
    dialogues: JsonCache<Dialogue>,
    databases: JsonCache<DatabaseTable>,
}

impl DatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dialogues: JsonCache::new(),
            databases: JsonCache::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a split file, `<root>/<split>.json`.
    pub fn dataset_path(&self, split: Split) -> PathBuf {
        self.root.join(split.file_name())
    }

    /// Path of a database file, `<root>/database/<domain>_db.json`.
    pub fn database_path(&self, domain: Domain) -> PathBuf {
        self.root.join("database").join(domain.file_name())
    }

    pub fn read_dataset(&self, split: Split) -> Result<Arc<Dialogue>> {
        self.dialogues.get_or_load(&self.dataset_path(split))
    }

    pub fn read_database(&self, domain: Domain) -> Result<Arc<DatabaseTable>> {
        self.databases.get_or_load(&self.database_path(domain))
    }

    /// Read every split and database file, failing on the first bad file.
    pub fn preload(&self) -> Result<()> {
        for split in Split::ALL {
            let dialogue = self.read_dataset(split)?;
            info!("{}: {} examples", split.file_name(), dialogue.len());
        }
        for domain in Domain::ALL {
            let table = self.read_database(domain)?;
            info!("{}: {} records", domain.file_name(), table.len());
        }
        Ok(())
    }

    /// Total files opened so far, across splits and databases.
    pub fn disk_reads(&self) -> usize {
        self.dialogues.disk_reads() + self.databases.disk_reads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_second_read_is_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "train.json", json!({}));
        let store = DatasetStore::new(dir.path());

        let first = store.read_dataset(Split::Train).unwrap();
        let second = store.read_dataset(Split::Train).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.disk_reads(), 1);
    }

    #[test]
    fn test_cached_read_survives_file_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "database/hotel_db.json",
            json!([["a", {"名称": "a"}]]),
        );
        let store = DatasetStore::new(dir.path());

        assert_eq!(store.read_database(Domain::Hotel).unwrap().len(), 1);
        fs::remove_file(path).unwrap();
        assert_eq!(store.read_database(Domain::Hotel).unwrap().len(), 1);
        assert_eq!(store.disk_reads(), 1);
    }

    #[test]
    fn test_equivalent_paths_share_entry() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "val.json", json!({}));
        let cache: JsonCache<Dialogue> = JsonCache::new();

        let direct = cache.get_or_load(&dir.path().join("val.json")).unwrap();
        let dotted = cache
            .get_or_load(&dir.path().join(".").join("val.json"))
            .unwrap();

        assert!(Arc::ptr_eq(&direct, &dotted));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        let err = store.read_dataset(Split::Test).unwrap_err();
        assert!(matches!(err, GalleryError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.json"), "{ not json").unwrap();
        let store = DatasetStore::new(dir.path());
        let err = store.read_dataset(Split::Test).unwrap_err();
        assert!(matches!(err, GalleryError::Json { .. }));
    }

    #[test]
    fn test_concurrent_first_reads_populate_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "train.json", json!({}));
        let store = Arc::new(DatasetStore::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.read_dataset(Split::Train).unwrap())
            })
            .collect();
        let docs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(docs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(store.disk_reads(), 1);
    }
}
