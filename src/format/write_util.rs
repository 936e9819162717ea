//! Little-endian record writer.

use byteorder::{LittleEndian, WriteBytesExt};

use super::Record;
use crate::util::{Error, Result};

/// Output buffer for encoding records.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    /// Current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.buf.write_i8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buf.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.buf.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Write a sequence of records back to back.
    pub fn write_records<T: Record>(&mut self, records: &[T]) -> Result<()> {
        for record in records {
            record.write(self)?;
        }
        Ok(())
    }

    /// Write a zeroed pointer slot and return its position for [`Self::patch_pointer`].
    pub fn reserve_pointer(&mut self) -> Result<u64> {
        let pos = self.pos();
        self.write_u32(0)?;
        Ok(pos)
    }

    /// Fill a reserved pointer slot with the current position.
    pub fn patch_pointer(&mut self, slot: u64) -> Result<()> {
        let target = u32::try_from(self.pos())
            .map_err(|_| Error::invalid("record exceeds 4 GiB pointer range"))?;
        let slot = slot as usize;
        if slot + 4 > self.buf.len() {
            return Err(Error::invalid(format!("pointer slot {:#x} out of range", slot)));
        }
        self.buf[slot..slot + 4].copy_from_slice(&target.to_le_bytes());
        Ok(())
    }

    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Check a count fits the on-disk counter width before writing it.
pub(crate) fn count_as<T: TryFrom<usize>>(count: usize, what: &str) -> Result<T> {
    T::try_from(count).map_err(|_| Error::invalid(format!("too many {}: {}", what, count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_primitives() {
        let mut w = Writer::new();
        w.write_u8(1).unwrap();
        w.write_u16(0x1234).unwrap();
        w.write_i16(-2).unwrap();
        w.write_u32(0xAABBCCDD).unwrap();
        assert_eq!(
            w.as_bytes(),
            &[0x01, 0x34, 0x12, 0xFE, 0xFF, 0xDD, 0xCC, 0xBB, 0xAA]
        );
    }

    #[test]
    fn test_pointer_patch() {
        let mut w = Writer::new();
        let slot = w.reserve_pointer().unwrap();
        w.write_bytes(&[9, 9, 9]).unwrap();
        w.patch_pointer(slot).unwrap();
        assert_eq!(&w.as_bytes()[..4], &7u32.to_le_bytes());
    }

    #[test]
    fn test_count_overflow() {
        assert_eq!(count_as::<u8>(255, "states").unwrap(), 255u8);
        assert!(count_as::<u8>(256, "states").is_err());
    }
}
