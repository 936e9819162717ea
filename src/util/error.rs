//! Error types for the r1edit library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loading and saving game data.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A path was requested that was never registered with the context
    #[error("File not registered with the context: {0}")]
    NotRegistered(String),

    /// Record is truncated
    #[error("Unexpected end of data at position {pos:#x} (need {need} bytes)")]
    UnexpectedEof { pos: u64, need: usize },

    /// Invalid data structure in a record
    #[error("Invalid record structure: {0}")]
    InvalidStructure(String),

    /// A record references an entry outside a previously built table
    #[error("{table} index {index} out of bounds (count: {count})")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        count: usize,
    },

    /// The tile offset table lists an offset with no texture record
    #[error("No tile texture found at offset {0:#x}")]
    TileTextureNotFound(u32),

    /// Archive entry failed its checksum after decoding
    #[error("Checksum mismatch in {path} entry {index}: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        path: String,
        index: usize,
        expected: u8,
        actual: u8,
    },

    /// Record was requested with a different type than the cached one
    #[error("Record at {path} was decoded as a different type")]
    RecordTypeMismatch { path: String },

    /// Platform variant the decoder cannot read
    #[error("Unsupported game version: {0}")]
    UnsupportedVersion(String),

    /// Field editor was given a value outside its domain
    #[error("Invalid value {value} for field '{field}'")]
    InvalidFieldValue { field: &'static str, value: i64 },

    /// Texture handle does not belong to the texture manager
    #[error("Unknown texture handle {0}")]
    UnknownTexture(u32),

    /// Operation requires a loaded level
    #[error("No level is loaded")]
    NoLevelLoaded,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Layer export failed
    #[error("Image export error: {0}")]
    Image(#[from] image::ImageError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an index-resolution error.
    pub fn out_of_range(table: &'static str, index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { table, index, count }
    }
}

/// Result type alias for r1edit operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::out_of_range("DES", 9, 4);
        let msg = e.to_string();
        assert!(msg.contains("DES"));
        assert!(msg.contains('9'));
        assert!(msg.contains('4'));

        let e = Error::TileTextureNotFound(0x1f0);
        assert!(e.to_string().contains("0x1f0"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
