//! Record cache
//!
//! Whole-directory memoization: records are rebuilt from every document in a
//! folder when the requested folder string differs from the cached one or the
//! cache is empty, and reused unchanged otherwise. There is no per-file
//! freshness check. Rebuilds are serialized by the cache's mutex.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{info, warn};

use crate::document::{list_documents, ListError};
use crate::normalize::normalize_file;
use crate::record::Record;

/// Warning appended to a record that replaced another with the same identifier
const DUPLICATE_NOTE: &str = "Duplicate ID.";

/// One cache generation: all records built from one folder
#[derive(Debug, Default)]
pub struct CacheSnapshot {
    /// Folder string the snapshot was built for
    pub folder: String,
    /// Records by identifier
    pub records: BTreeMap<String, Record>,
    /// Identifier collision warnings
    pub warnings: Vec<String>,
}

impl CacheSnapshot {
    /// Normalize `files` in order; later records win identifier collisions
    pub fn build(folder: &str, files: &[PathBuf]) -> Self {
        let mut records: BTreeMap<String, Record> = BTreeMap::new();
        let mut sources: HashMap<String, Vec<String>> = HashMap::new();

        for path in files {
            let mut record = normalize_file(path);
            let filenames = sources.entry(record.id.clone()).or_default();
            if !filenames.is_empty() {
                warn!(
                    "Duplicate ID '{}': file '{}' replaces previously processed {:?}",
                    record.id, record.source_filename, filenames
                );
                record.push_warning(DUPLICATE_NOTE);
            }
            filenames.push(record.source_filename.clone());
            records.insert(record.id.clone(), record);
        }

        let mut warnings: Vec<String> = sources
            .iter()
            .filter(|(_, filenames)| filenames.len() > 1)
            .map(|(id, filenames)| collision_warning(id, filenames))
            .collect();
        warnings.sort();

        CacheSnapshot {
            folder: folder.to_string(),
            records,
            warnings,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn collision_warning(id: &str, filenames: &[String]) -> String {
    let quoted: Vec<String> = filenames.iter().map(|f| format!("'{}'", f)).collect();
    format!(
        "Duplicate ID '{}' derived from files {}; only '{}' is kept.",
        id,
        quoted.join(", "),
        filenames.last().map(String::as_str).unwrap_or_default()
    )
}

/// Shared cache of normalized records
///
/// The rebuild guard serializes clear + rebuild. The snapshot slot is only
/// locked to swap or clone the `Arc`, so lookups never wait for a rebuild.
#[derive(Debug, Default)]
pub struct RecordCache {
    rebuild_guard: Mutex<()>,
    current: RwLock<Option<Arc<CacheSnapshot>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Snapshots are swapped whole, so a poisoned lock still holds a consistent value
    fn read(&self) -> Option<Arc<CacheSnapshot>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, snapshot: Option<Arc<CacheSnapshot>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Return the records for `folder`, rebuilding if needed
    ///
    /// Reuses the current snapshot when it was built for the same folder string
    /// and is non-empty. Otherwise the cache is cleared and every document in
    /// the folder is normalized. Listing failures leave the cache empty.
    /// Blocking: call from a blocking context.
    pub fn rebuild(&self, folder: &str) -> Result<Arc<CacheSnapshot>, ListError> {
        let _guard = self.rebuild_guard.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(snapshot) = self.read() {
            if snapshot.folder == folder && !snapshot.is_empty() {
                return Ok(snapshot);
            }
        }

        info!("Folder path changed to '{}' or cache empty. Reparsing all files.", folder);
        self.store(None);

        let files = list_documents(Path::new(folder))?;
        let snapshot = Arc::new(CacheSnapshot::build(folder, &files));

        info!(
            "Parsed and cached {} records from {} files in {}",
            snapshot.len(),
            files.len(),
            folder
        );
        if !snapshot.warnings.is_empty() {
            warn!("Total identifier collisions during load: {}", snapshot.warnings.len());
        }

        self.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// Look up a record in the current snapshot (no re-parse on miss)
    ///
    /// Misses while a rebuild is in progress.
    pub fn get(&self, id: &str) -> Option<Record> {
        self.read()?.get(id).cloned()
    }

    /// Drop all records; the next `rebuild` re-parses
    pub fn clear(&self) {
        let _guard = self.rebuild_guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, title: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("---\ntitle: {}\n---\n", title)).unwrap();
        path
    }

    #[test]
    fn test_build_detects_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.md", "Foo Bar"),
            write(dir.path(), "b.md", "foo_bar"),
            write(dir.path(), "c.md", "Other"),
        ];
        let snapshot = CacheSnapshot::build("x", &files);

        assert_eq!(snapshot.len(), 2);
        let kept = snapshot.get("foo-bar").unwrap();
        assert_eq!(kept.source_filename, "b.md");
        assert!(kept.parse_warning.as_deref().unwrap().contains("Duplicate ID"));
        assert_eq!(snapshot.get("other").unwrap().parse_warning, None);

        assert_eq!(snapshot.warnings.len(), 1);
        assert!(snapshot.warnings[0].contains("'a.md'"));
        assert!(snapshot.warnings[0].contains("'b.md'"));
    }

    #[test]
    fn test_rebuild_missing_folder_is_error_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "A");
        let cache = RecordCache::new();
        cache.rebuild(dir.path().to_str().unwrap()).unwrap();
        assert!(cache.get("a").is_some());

        assert!(cache.rebuild("/nonexistent/gamedex").is_err());
        assert!(cache.read().is_none());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_lookup_does_not_wait_for_rebuild_guard() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "A");
        let cache = RecordCache::new();
        cache.rebuild(dir.path().to_str().unwrap()).unwrap();

        // Same thread: a lookup that touched the guard would deadlock here
        let _rebuilding = cache.rebuild_guard.lock().unwrap();
        assert_eq!(cache.get("a").unwrap().source_filename, "a.md");
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_lookup_during_rebuild_returns_promptly() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..200 {
            let body = "## 游戏简介\n".to_string() + &"Long description line.\n".repeat(200);
            fs::write(
                dir.path().join(format!("{:03}.md", i)),
                format!("---\ntitle: Title {}\n---\n{}", i, body),
            )
            .unwrap();
        }
        let cache = Arc::new(RecordCache::new());
        let folder = dir.path().to_str().unwrap().to_string();

        let rebuilding = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.rebuild(&folder).unwrap())
        };

        // Lookups while the rebuild runs only ever see "no snapshot yet" or the finished one
        while !rebuilding.is_finished() {
            let started = std::time::Instant::now();
            let found = cache.get("title-1");
            assert!(started.elapsed() < std::time::Duration::from_millis(500));
            if let Some(record) = found {
                assert_eq!(record.source_filename, "001.md");
            }
        }

        let snapshot = rebuilding.join().unwrap();
        assert_eq!(snapshot.len(), 200);
        assert!(cache.get("title-1").is_some());
    }

    #[test]
    fn test_clear_forces_reparse() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "A");
        let folder = dir.path().to_str().unwrap();
        let cache = RecordCache::new();
        let first = cache.rebuild(folder).unwrap();
        cache.clear();
        assert!(cache.get("a").is_none());
        let second = cache.rebuild(folder).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
