//! Little-endian record reader.
//!
//! Thin wrapper over `byteorder` that turns short reads into
//! [`Error::UnexpectedEof`] carrying the failing position.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::Record;
use crate::util::{Error, Result};

/// Read cursor over a decoded file or archive entry.
pub struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data) }
    }

    /// Current byte position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.cursor.position()
    }

    /// Total length of the underlying data.
    #[inline]
    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left after the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.pos()) as usize
    }

    /// Seek to an absolute position (a pointer read earlier from the file).
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.len() {
            return Err(Error::invalid(format!(
                "pointer {:#x} past end of data ({:#x})",
                pos,
                self.len()
            )));
        }
        self.cursor.set_position(pos);
        Ok(())
    }

    fn ensure(&self, need: usize) -> Result<()> {
        if self.remaining() < need {
            return Err(Error::UnexpectedEof { pos: self.pos(), need });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.cursor.read_i8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.cursor.read_i16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// Read a boolean stored as a single 0/1 byte.
    pub fn read_bool(&mut self) -> Result<bool> {
        let pos = self.pos();
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(Error::invalid(format!("invalid boolean {} at {:#x}", v, pos))),
        }
    }

    /// Read a file pointer (absolute offset).
    #[inline]
    pub fn read_pointer(&mut self) -> Result<u32> {
        self.read_u32()
    }

    /// Borrow the next `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.pos() as usize;
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + n) as u64);
        Ok(&data[start..start + n])
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut buf = [0u8; N];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read `count` consecutive records.
    pub fn read_records<T: Record>(&mut self, count: usize) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            out.push(T::read(self)?);
        }
        Ok(out)
    }

    /// Read a `u16` array.
    pub fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>> {
        self.ensure(count.saturating_mul(2))?;
        let mut out = vec![0u16; count];
        self.cursor.read_u16_into::<LittleEndian>(&mut out)?;
        Ok(out)
    }

    /// Read a `u32` array.
    pub fn read_u32_array(&mut self, count: usize) -> Result<Vec<u32>> {
        self.ensure(count.saturating_mul(4))?;
        let mut out = vec![0u32; count];
        self.cursor.read_u32_into::<LittleEndian>(&mut out)?;
        Ok(out)
    }

    /// Copy everything from the current position to the end.
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let start = self.pos() as usize;
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position(data.len() as u64);
        data[start..].to_vec()
    }
}
