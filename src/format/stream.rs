//! Game files on disk.
//!
//! A [`LinearFile`] is opened lazily on first access and either memory-mapped
//! (feature `mmap`) or read into a buffer.

use std::fs::File;
use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use parking_lot::Mutex;

use crate::util::{Error, Result};

/// Contents of an opened file.
pub enum FileData {
    /// Memory-mapped file
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
    /// File read into memory (fallback, and for empty files)
    Buffer(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            FileData::Mmap(mmap) => mmap,
            FileData::Buffer(buf) => buf,
        }
    }
}

/// A file read front to back as a single record.
pub struct LinearFile {
    /// Path relative to the game directory, as registered
    rel_path: String,
    abs_path: PathBuf,
    use_mmap: bool,
    data: Mutex<Option<Arc<FileData>>>,
}

impl LinearFile {
    pub fn new(rel_path: impl Into<String>, abs_path: impl Into<PathBuf>, use_mmap: bool) -> Self {
        Self {
            rel_path: rel_path.into(),
            abs_path: abs_path.into(),
            use_mmap,
            data: Mutex::new(None),
        }
    }

    #[inline]
    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    #[inline]
    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }

    /// File contents, opening the file on first use.
    pub fn bytes(&self) -> Result<Arc<FileData>> {
        let mut guard = self.data.lock();
        if let Some(data) = guard.as_ref() {
            return Ok(data.clone());
        }
        let data = Arc::new(self.open()?);
        tracing::debug!(path = %self.rel_path, size = data.len(), "opened file");
        *guard = Some(data.clone());
        Ok(data)
    }

    fn open(&self) -> Result<FileData> {
        let file = File::open(&self.abs_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(self.abs_path.clone())
            } else {
                Error::Io(e)
            }
        })?;

        #[cfg(feature = "mmap")]
        if self.use_mmap && file.metadata()?.len() > 0 {
            // Safety: mapped read-only; writes go through a temp file and rename
            let mmap = unsafe { Mmap::map(&file) }?;
            return Ok(FileData::Mmap(mmap));
        }

        let mut file = file;
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut buf)?;
        Ok(FileData::Buffer(buf))
    }

    /// Drop the cached contents so the next access re-reads the file.
    pub fn invalidate(&self) {
        *self.data.lock() = None;
    }

    /// Replace the file with `bytes`.
    ///
    /// Written to a sibling temp file and renamed over the target so readers
    /// holding the old mapping are unaffected.
    pub fn write_all(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.abs_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = self.abs_path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut file = File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.abs_path)?;
        self.invalidate();
        tracing::debug!(path = %self.rel_path, size = bytes.len(), "wrote file");
        Ok(())
    }
}

impl std::fmt::Debug for LinearFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearFile")
            .field("rel_path", &self.rel_path)
            .field("abs_path", &self.abs_path)
            .field("use_mmap", &self.use_mmap)
            .field("loaded", &self.data.lock().is_some())
            .finish()
    }
}
