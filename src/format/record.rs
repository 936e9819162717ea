//! The [`Record`] trait implemented by every binary structure.

use super::{Reader, Writer};
use crate::util::Result;

/// A binary structure that can be decoded from and re-encoded to bytes.
///
/// Writing a record that was just read must reproduce the bytes it was read
/// from; records keep any unparsed regions verbatim to guarantee this.
pub trait Record: Sized {
    /// Human-readable name used in decode logs.
    const NAME: &'static str;

    /// Decode the record at the reader's current position.
    fn read(r: &mut Reader<'_>) -> Result<Self>;

    /// Encode the record at the writer's current position.
    fn write(&self, w: &mut Writer) -> Result<()>;
}

/// Decode a top-level record from a complete byte buffer.
pub fn from_bytes<T: Record>(data: &[u8]) -> Result<T> {
    let mut r = Reader::new(data);
    let record = T::read(&mut r)?;
    tracing::trace!(record = T::NAME, size = data.len(), end = r.pos(), "decoded record");
    Ok(record)
}

/// Encode a top-level record into a new byte buffer.
pub fn to_bytes<T: Record>(record: &T) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    record.write(&mut w)?;
    Ok(w.into_bytes())
}
