//! Decoded record cache.
//!
//! Each registered file is decoded at most once per context; later reads
//! share the same `Arc`. Entries are type-erased and checked on retrieval.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::util::{Error, Result};

type Entry = Arc<dyn Any + Send + Sync>;

/// Thread-safe cache of decoded records keyed by relative path.
#[derive(Default)]
pub struct RecordCache {
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached record for `path`, `Ok(None)` if nothing is cached.
    ///
    /// Fails if the path was cached as another record type.
    pub fn get<T: Any + Send + Sync>(&self, path: &str) -> Result<Option<Arc<T>>> {
        let entry = match self.entries.read().get(path) {
            Some(entry) => Arc::clone(entry),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        };
        let record = entry
            .downcast::<T>()
            .map_err(|_| Error::RecordTypeMismatch { path: path.to_string() })?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(record))
    }

    /// Insert a record, returning the one that ends up cached.
    ///
    /// If another thread cached the path first its record wins.
    pub fn insert<T: Any + Send + Sync>(&self, path: &str, record: T) -> Result<Arc<T>> {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(record) as Entry);
        Arc::clone(entry)
            .downcast::<T>()
            .map_err(|_| Error::RecordTypeMismatch { path: path.to_string() })
    }

    /// Replace the cached record for `path`.
    pub fn replace<T: Any + Send + Sync>(&self, path: &str, record: Arc<T>) {
        self.entries.write().insert(path.to_string(), record);
    }

    pub fn remove(&self, path: &str) -> bool {
        self.entries.write().remove(path).is_some()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.read().contains_key(path)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since creation or the last [`Self::clear`].
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

impl std::fmt::Debug for RecordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hits, misses) = self.stats();
        f.debug_struct("RecordCache")
            .field("entries", &self.len())
            .field("hits", &hits)
            .field("misses", &misses)
            .finish()
    }
}
