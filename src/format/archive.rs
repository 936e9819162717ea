//! Encoded file archives (`VIGNET.DAT`).
//!
//! An archive starts with an entry table; each entry locates an XOR-encoded
//! payload and carries a byte checksum of the decoded data.
//!
//! ```text
//! count: u16
//! entry[count]: xor_key u8, checksum u8, offset u32, size u32, name [u8; 9]
//! payloads...
//! ```

use super::write_util::count_as;
use super::{from_bytes, Reader, Record, Writer};
use crate::util::{Error, Result};

/// Serialized size of an [`ArchiveEntry`].
pub const ENTRY_SIZE: usize = 19;

/// Length of the fixed name field.
pub const NAME_LEN: usize = 9;

/// One entry in the archive table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub xor_key: u8,
    pub checksum: u8,
    /// Absolute offset of the payload in the archive
    pub file_offset: u32,
    pub file_size: u32,
    pub name: [u8; NAME_LEN],
}

impl ArchiveEntry {
    /// Entry name with NUL padding stripped.
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

impl Record for ArchiveEntry {
    const NAME: &'static str = "ArchiveEntry";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            xor_key: r.read_u8()?,
            checksum: r.read_u8()?,
            file_offset: r.read_u32()?,
            file_size: r.read_u32()?,
            name: r.read_array()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u8(self.xor_key)?;
        w.write_u8(self.checksum)?;
        w.write_u32(self.file_offset)?;
        w.write_u32(self.file_size)?;
        w.write_bytes(&self.name)
    }
}

/// Wrapping byte sum used as the entry checksum.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// XOR every byte with `key`. Encoding and decoding are the same operation.
pub fn xor_in_place(data: &mut [u8], key: u8) {
    if key != 0 {
        data.iter_mut().for_each(|b| *b ^= key);
    }
}

/// An archive of encoded files. The payload area is kept as-is so a read
/// archive writes back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileArchive {
    pub entries: Vec<ArchiveEntry>,
    /// Everything after the entry table
    body: Vec<u8>,
}

impl FileArchive {
    /// Build an archive from `(name, xor_key, decoded payload)` triples.
    pub fn from_files<'a, I>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, u8, &'a [u8])>,
    {
        let files: Vec<_> = files.into_iter().collect();
        let header_len = 2 + files.len() * ENTRY_SIZE;
        let mut entries = Vec::with_capacity(files.len());
        let mut body = Vec::new();

        for (name, xor_key, data) in files {
            if name.len() > NAME_LEN {
                return Err(Error::invalid(format!("archive entry name too long: {}", name)));
            }
            let mut name_buf = [0u8; NAME_LEN];
            name_buf[..name.len()].copy_from_slice(name.as_bytes());

            let file_offset: u32 = count_as(header_len + body.len(), "archive bytes")?;
            let mut encoded = data.to_vec();
            xor_in_place(&mut encoded, xor_key);
            entries.push(ArchiveEntry {
                xor_key,
                checksum: checksum(data),
                file_offset,
                file_size: count_as(data.len(), "entry bytes")?,
                name: name_buf,
            });
            body.extend_from_slice(&encoded);
        }

        Ok(Self { entries, body })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn header_len(&self) -> usize {
        2 + self.entries.len() * ENTRY_SIZE
    }

    /// Decode entry `index`, verifying its checksum. `path` is only used in
    /// the error.
    pub fn decode_entry(&self, path: &str, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| Error::out_of_range("archive entry", index, self.entries.len()))?;

        let start = (entry.file_offset as usize)
            .checked_sub(self.header_len())
            .ok_or_else(|| {
                Error::invalid(format!(
                    "archive entry {} points into the entry table ({:#x})",
                    index, entry.file_offset
                ))
            })?;
        let end = start + entry.file_size as usize;
        let encoded = self.body.get(start..end).ok_or(Error::UnexpectedEof {
            pos: entry.file_offset as u64,
            need: entry.file_size as usize,
        })?;

        let mut data = encoded.to_vec();
        xor_in_place(&mut data, entry.xor_key);

        let actual = checksum(&data);
        if actual != entry.checksum {
            return Err(Error::ChecksumMismatch {
                path: path.to_string(),
                index,
                expected: entry.checksum,
                actual,
            });
        }
        tracing::trace!(path, index, name = %entry.name(), size = data.len(), "decoded archive entry");
        Ok(data)
    }

    /// Decode entry `index` and parse it as a record.
    pub fn read_file<T: Record>(&self, path: &str, index: usize) -> Result<T> {
        from_bytes(&self.decode_entry(path, index)?)
    }
}

impl Record for FileArchive {
    const NAME: &'static str = "FileArchive";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let count = r.read_u16()? as usize;
        let entries = r.read_records(count)?;
        Ok(Self {
            entries,
            body: r.read_to_end(),
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u16(count_as(self.entries.len(), "archive entries")?)?;
        w.write_records(&self.entries)?;
        w.write_bytes(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::to_bytes;

    #[test]
    fn test_decode_entries() {
        let archive = FileArchive::from_files([
            ("FOO", 0x5A, &b"hello"[..]),
            ("BAR", 0x00, &b"world!"[..]),
        ])
        .unwrap();
        let bytes = to_bytes(&archive).unwrap();
        assert_eq!(bytes.len(), 2 + 2 * ENTRY_SIZE + 11);

        let back: FileArchive = from_bytes(&bytes).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.entries[0].name(), "FOO");
        assert_eq!(back.decode_entry("X", 0).unwrap(), b"hello");
        assert_eq!(back.decode_entry("X", 1).unwrap(), b"world!");
        assert_eq!(to_bytes(&back).unwrap(), bytes);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut archive = FileArchive::from_files([("FOO", 0x11, &b"abc"[..])]).unwrap();
        archive.entries[0].checksum = archive.entries[0].checksum.wrapping_add(1);
        match archive.decode_entry("VIGNET.DAT", 0) {
            Err(Error::ChecksumMismatch { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected checksum mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_out_of_range() {
        let archive = FileArchive::default();
        assert!(matches!(
            archive.decode_entry("VIGNET.DAT", 3),
            Err(Error::IndexOutOfRange { index: 3, count: 0, .. })
        ));
    }
}
