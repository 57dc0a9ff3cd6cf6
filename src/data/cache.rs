use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::derive::derive;
use super::loader::{load_file, LoadError};
use super::model::MovieTable;

/// Identifies one version of a file on disk without reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Fingerprint {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CacheEntry {
    path: PathBuf,
    fingerprint: Fingerprint,
    table: Arc<MovieTable>,
}

/// Memoizes load + derive for the most recently requested path.
///
/// Asking for another path drops the previous entry; asking again for the
/// same path returns the same snapshot until the file changes on disk.
/// Failed loads are never cached.
#[derive(Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<MovieTable>, LoadError> {
        let fingerprint = Fingerprint::of(path);

        if let (Some(entry), Some(fp)) = (&self.entry, fingerprint) {
            if entry.path == path && entry.fingerprint == fp {
                log::debug!("dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.table));
            }
        }

        if self.entry.as_ref().is_some_and(|e| e.path != path) {
            log::info!("dataset path changed, dropping cached table");
        }
        self.entry = None;

        self.load_and_store(path, fingerprint)
    }

    /// Read `path` and cache it under `fingerprint`, the stat taken before
    /// the read. A file rewritten during the read then no longer matches
    /// and is reloaded on the next call.
    fn load_and_store(
        &mut self,
        path: &Path,
        fingerprint: Option<Fingerprint>,
    ) -> Result<Arc<MovieTable>, LoadError> {
        let raw = load_file(path)?;
        let derived = derive(raw);
        if !derived.warnings.is_empty() {
            log::warn!(
                "{}: {} row(s) without a usable genre list",
                path.display(),
                derived.warnings.len()
            );
            for w in &derived.warnings {
                log::debug!("{w}");
            }
        }
        log::info!(
            "loaded {} movies ({} genres) from {}",
            derived.table.len(),
            derived.table.genres.len(),
            path.display()
        );

        let table = Arc::new(derived.table);
        // No stat before the read: leave it uncached so the next call reloads.
        if let Some(fp) = fingerprint {
            self.entry = Some(CacheEntry {
                path: path.to_path_buf(),
                fingerprint: fp,
                table: Arc::clone(&table),
            });
        }
        Ok(table)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Path of the cached table, if any.
    pub fn cached_path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|e| e.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "title,genres,vote_average,popularity\nA,[Action],5.0,10\nB,\"Action,Drama\",8.0,50\n";

    fn dataset(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn same_path_returns_same_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dataset(&dir, "m.csv", CSV);
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(cache.cached_path(), Some(path.as_path()));
    }

    #[test]
    fn new_path_replaces_entry() {
        let dir = TempDir::new().unwrap();
        let a = dataset(&dir, "a.csv", CSV);
        let b = dataset(&dir, "b.csv", CSV);
        let mut cache = DatasetCache::new();

        let from_a = cache.get_or_load(&a).unwrap();
        let from_b = cache.get_or_load(&b).unwrap();
        assert!(!Arc::ptr_eq(&from_a, &from_b));
        assert_eq!(*from_a, *from_b);
        assert_eq!(cache.cached_path(), Some(b.as_path()));
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = TempDir::new().unwrap();
        let path = dataset(&dir, "m.csv", CSV);
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load(&path).unwrap();
        cache.invalidate();
        assert_eq!(cache.cached_path(), None);
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn rewritten_file_is_reloaded() {
        let dir = TempDir::new().unwrap();
        let path = dataset(&dir, "m.csv", CSV);
        let mut cache = DatasetCache::new();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 2);

        // Different length, so the fingerprint changes whatever the mtime
        // resolution of the filesystem.
        std::fs::write(&path, format!("{CSV}C,[Drama],6.0,5\n")).unwrap();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 3);
    }

    #[test]
    fn entry_keeps_the_fingerprint_seen_before_the_read() {
        let dir = TempDir::new().unwrap();
        let path = dataset(&dir, "m.csv", CSV);
        let before = Fingerprint::of(&path);

        // The file changes between the stat and the read.
        std::fs::write(&path, format!("{CSV}C,[Drama],6.0,5\n")).unwrap();
        let mut cache = DatasetCache::new();
        let first = cache.load_and_store(&path, before).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(cache.entry.as_ref().map(|e| e.fingerprint), before);

        // The stored key no longer matches the file, so it is read again.
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.entry.as_ref().map(|e| e.fingerprint), Fingerprint::of(&path));
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let good = dataset(&dir, "m.csv", CSV);
        let mut cache = DatasetCache::new();
        cache.get_or_load(&good).unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            cache.get_or_load(&missing),
            Err(LoadError::NotFound { .. })
        ));
        assert_eq!(cache.cached_path(), None);
    }
}
