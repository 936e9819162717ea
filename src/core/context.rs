//! Serialization context.
//!
//! A [`Context`] bundles the files registered for a session, the selected
//! level settings, and the cache of decoded top-level records. It is the only
//! way the loader touches the file system.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::cache::RecordCache;
use super::settings::Ray1Settings;
use crate::format::{from_bytes, to_bytes, FileArchive, LinearFile, Record};
use crate::util::{Error, Result};

/// Registered files, settings and decoded records for one editor session.
pub struct Context {
    base_path: PathBuf,
    use_mmap: bool,
    files: RwLock<HashMap<String, Arc<LinearFile>>>,
    settings: RwLock<Option<Ray1Settings>>,
    cache: RecordCache,
}

impl Context {
    /// Create a context rooted at the game directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            use_mmap: cfg!(feature = "mmap"),
            files: RwLock::new(HashMap::new()),
            settings: RwLock::new(None),
            cache: RecordCache::new(),
        }
    }

    /// Choose memory-mapped or buffered access for files registered later.
    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    #[inline]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute path of a game-relative path.
    pub fn abs_path(&self, rel_path: &str) -> PathBuf {
        self.base_path.join(rel_path)
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Register a game-relative path as a lazily read file.
    ///
    /// Registering is cheap; nothing is opened until the first read. Paths
    /// that are already registered keep their cached record.
    pub fn add_file(&self, rel_path: &str) -> Arc<LinearFile> {
        let mut files = self.files.write();
        files
            .entry(rel_path.to_string())
            .or_insert_with(|| {
                tracing::debug!(path = rel_path, "registered file");
                Arc::new(LinearFile::new(rel_path, self.abs_path(rel_path), self.use_mmap))
            })
            .clone()
    }

    pub fn is_registered(&self, rel_path: &str) -> bool {
        self.files.read().contains_key(rel_path)
    }

    /// A registered file.
    pub fn file(&self, rel_path: &str) -> Result<Arc<LinearFile>> {
        self.files
            .read()
            .get(rel_path)
            .cloned()
            .ok_or_else(|| Error::NotRegistered(rel_path.to_string()))
    }

    /// Registered paths, sorted.
    pub fn registered_files(&self) -> Vec<String> {
        let mut paths: Vec<_> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn add_settings(&self, settings: Ray1Settings) {
        *self.settings.write() = Some(settings);
    }

    /// Settings of the level being loaded.
    pub fn settings(&self) -> Result<Ray1Settings> {
        (*self.settings.read()).ok_or_else(|| Error::other("no level settings declared"))
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Decode the record stored in a registered file.
    ///
    /// The first read decodes and caches the record; later reads of the same
    /// path return the cached one.
    pub fn read<T: Record + Send + Sync + 'static>(&self, rel_path: &str) -> Result<Arc<T>> {
        if let Some(record) = self.cache.get::<T>(rel_path)? {
            return Ok(record);
        }
        let file = self.file(rel_path)?;
        let bytes = file.bytes()?;
        let record: T = from_bytes(&bytes).map_err(|e| {
            tracing::error!(path = rel_path, record = T::NAME, error = %e, "failed to decode");
            e
        })?;
        tracing::debug!(path = rel_path, record = T::NAME, size = bytes.len(), "decoded file");
        self.cache.insert(rel_path, record)
    }

    /// Cached record for a path without decoding, if it was read before.
    pub fn main_file_object<T: Record + Send + Sync + 'static>(
        &self,
        rel_path: &str,
    ) -> Result<Option<Arc<T>>> {
        self.cache.get(rel_path)
    }

    /// Encode `record` and replace the registered file with it.
    pub fn write<T: Record + Send + Sync + 'static>(&self, rel_path: &str, record: T) -> Result<()> {
        let file = self.file(rel_path)?;
        let bytes = to_bytes(&record)?;
        file.write_all(&bytes)?;
        self.cache.replace(rel_path, Arc::new(record));
        tracing::info!(path = rel_path, record = T::NAME, size = bytes.len(), "wrote record");
        Ok(())
    }

    /// Decode entry `index` of an archive as a record.
    ///
    /// Returns `Ok(None)` when the archive was never registered. A registered
    /// archive that is missing or malformed is an error.
    pub fn read_archive_file<T: Record>(&self, archive_path: &str, index: usize) -> Result<Option<T>> {
        if !self.is_registered(archive_path) {
            tracing::warn!(path = archive_path, index, "archive not registered");
            return Ok(None);
        }
        let archive = self.read::<FileArchive>(archive_path)?;
        archive.read_file(archive_path, index).map(Some)
    }

    /// Forget all registered files, settings and cached records.
    pub fn clear(&self) {
        self.files.write().clear();
        *self.settings.write() = None;
        self.cache.clear();
    }

    /// Cached record count.
    pub fn cached_records(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("base_path", &self.base_path)
            .field("use_mmap", &self.use_mmap)
            .field("files", &self.files.read().len())
            .field("settings", &*self.settings.read())
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Eta;

    #[test]
    fn test_read_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.ETA"), to_bytes(&Eta::default()).unwrap()).unwrap();

        let ctx = Context::new(dir.path());
        assert!(matches!(ctx.read::<Eta>("A.ETA"), Err(Error::NotRegistered(_))));

        ctx.add_file("A.ETA");
        let first = ctx.read::<Eta>("A.ETA").unwrap();
        let second = ctx.read::<Eta>("A.ETA").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(ctx.main_file_object::<Eta>("A.ETA").unwrap().is_some());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(dir.path()).with_mmap(false);
        ctx.add_file("GONE.DAT");
        assert!(matches!(ctx.read::<Eta>("GONE.DAT"), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_archive_soft_miss() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(dir.path());
        assert!(ctx.read_archive_file::<Eta>("VIGNET.DAT", 0).unwrap().is_none());

        let eta = to_bytes(&Eta::default()).unwrap();
        let archive = FileArchive::from_files([("E", 0x33, eta.as_slice())]).unwrap();
        std::fs::write(dir.path().join("VIGNET.DAT"), to_bytes(&archive).unwrap()).unwrap();
        ctx.add_file("VIGNET.DAT");
        assert_eq!(ctx.read_archive_file::<Eta>("VIGNET.DAT", 0).unwrap(), Some(Eta::default()));
        assert!(ctx.read_archive_file::<Eta>("VIGNET.DAT", 1).is_err());
    }

    #[test]
    fn test_write_replaces_cache() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(dir.path());
        ctx.add_file("OUT/B.ETA");
        let eta = Eta { states: vec![vec![Default::default()]] };
        ctx.write("OUT/B.ETA", eta.clone()).unwrap();
        assert_eq!(*ctx.read::<Eta>("OUT/B.ETA").unwrap(), eta);

        let on_disk = std::fs::read(dir.path().join("OUT/B.ETA")).unwrap();
        assert_eq!(from_bytes::<Eta>(&on_disk).unwrap(), eta);

        ctx.clear();
        assert!(!ctx.is_registered("OUT/B.ETA"));
        assert_eq!(ctx.cached_records(), 0);
    }
}
