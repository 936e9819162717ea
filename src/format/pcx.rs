//! ZSoft PCX images, 8-bit single plane, as used for level backgrounds.
//!
//! The encoded image data is kept verbatim next to the decoded scanlines so
//! a file that was read writes back byte for byte.

use super::{Reader, Record, Writer};
use crate::util::{Error, Result};

/// Size of the fixed header.
pub const HEADER_SIZE: usize = 128;

const MANUFACTURER: u8 = 0x0A;
const ENCODING_RLE: u8 = 1;
const RUN_FLAG: u8 = 0xC0;
const MAX_RUN: usize = 0x3F;

/// Fixed 128-byte PCX header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcxHeader {
    pub version: u8,
    pub bits_per_pixel: u8,
    pub x_min: u16,
    pub y_min: u16,
    pub x_max: u16,
    pub y_max: u16,
    pub h_dpi: u16,
    pub v_dpi: u16,
    pub ega_palette: [u8; 48],
    pub reserved: u8,
    pub color_planes: u8,
    pub bytes_per_line: u16,
    pub palette_info: u16,
    pub h_screen_size: u16,
    pub v_screen_size: u16,
    pub filler: [u8; 54],
}

impl PcxHeader {
    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        (self.x_max as u32 + 1).saturating_sub(self.x_min as u32)
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        (self.y_max as u32 + 1).saturating_sub(self.y_min as u32)
    }

    fn decoded_len(&self) -> usize {
        self.height() as usize * self.color_planes as usize * self.bytes_per_line as usize
    }
}

impl Record for PcxHeader {
    const NAME: &'static str = "PcxHeader";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let manufacturer = r.read_u8()?;
        let version = r.read_u8()?;
        let encoding = r.read_u8()?;
        if manufacturer != MANUFACTURER || encoding != ENCODING_RLE {
            return Err(Error::invalid(format!(
                "not a PCX image (manufacturer {:#04x}, encoding {})",
                manufacturer, encoding
            )));
        }
        let header = Self {
            version,
            bits_per_pixel: r.read_u8()?,
            x_min: r.read_u16()?,
            y_min: r.read_u16()?,
            x_max: r.read_u16()?,
            y_max: r.read_u16()?,
            h_dpi: r.read_u16()?,
            v_dpi: r.read_u16()?,
            ega_palette: r.read_array()?,
            reserved: r.read_u8()?,
            color_planes: r.read_u8()?,
            bytes_per_line: r.read_u16()?,
            palette_info: r.read_u16()?,
            h_screen_size: r.read_u16()?,
            v_screen_size: r.read_u16()?,
            filler: r.read_array()?,
        };
        if header.bits_per_pixel != 8 || header.color_planes != 1 {
            return Err(Error::invalid(format!(
                "unsupported PCX layout: {} bpp, {} planes",
                header.bits_per_pixel, header.color_planes
            )));
        }
        if (header.bytes_per_line as u32) < header.width() {
            return Err(Error::invalid(format!(
                "PCX scanline of {} bytes is shorter than width {}",
                header.bytes_per_line,
                header.width()
            )));
        }
        Ok(header)
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u8(MANUFACTURER)?;
        w.write_u8(self.version)?;
        w.write_u8(ENCODING_RLE)?;
        w.write_u8(self.bits_per_pixel)?;
        w.write_u16(self.x_min)?;
        w.write_u16(self.y_min)?;
        w.write_u16(self.x_max)?;
        w.write_u16(self.y_max)?;
        w.write_u16(self.h_dpi)?;
        w.write_u16(self.v_dpi)?;
        w.write_bytes(&self.ega_palette)?;
        w.write_u8(self.reserved)?;
        w.write_u8(self.color_planes)?;
        w.write_u16(self.bytes_per_line)?;
        w.write_u16(self.palette_info)?;
        w.write_u16(self.h_screen_size)?;
        w.write_u16(self.v_screen_size)?;
        w.write_bytes(&self.filler)
    }
}

/// A decoded 8-bit PCX image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcx {
    pub header: PcxHeader,
    /// `height * bytes_per_line` decoded bytes
    scan_lines: Vec<u8>,
    encoded: Vec<u8>,
    /// Data after the image (usually the 769-byte VGA palette), kept raw
    pub trailing: Vec<u8>,
}

impl Pcx {
    /// Encode a row-major indexed image.
    pub fn from_indexed(width: u16, height: u16, pixels: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(Error::invalid(format!(
                "{} pixels for a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }
        // Scanlines are padded to an even length.
        let bytes_per_line = width
            .checked_add(width & 1)
            .ok_or_else(|| Error::invalid(format!("PCX width {} cannot be padded", width)))?;
        let mut scan_lines = Vec::with_capacity(bytes_per_line as usize * height as usize);
        for row in pixels.chunks(width as usize) {
            scan_lines.extend_from_slice(row);
            scan_lines.resize(scan_lines.len() + (bytes_per_line - width) as usize, 0);
        }
        let encoded = scan_lines
            .chunks(bytes_per_line as usize)
            .flat_map(encode_scanline)
            .collect();

        Ok(Self {
            header: PcxHeader {
                version: 5,
                bits_per_pixel: 8,
                x_min: 0,
                y_min: 0,
                x_max: width - 1,
                y_max: height - 1,
                h_dpi: 72,
                v_dpi: 72,
                ega_palette: [0; 48],
                reserved: 0,
                color_planes: 1,
                bytes_per_line,
                palette_info: 1,
                h_screen_size: 0,
                v_screen_size: 0,
                filler: [0; 54],
            },
            scan_lines,
            encoded,
            trailing: Vec::new(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.header.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.header.height()
    }

    /// Palette indices of row `y`, without scanline padding.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height() {
            return None;
        }
        let start = y as usize * self.header.bytes_per_line as usize;
        self.scan_lines.get(start..start + self.width() as usize)
    }

    /// All rows concatenated, `width * height` indices.
    pub fn indexed_pixels(&self) -> Vec<u8> {
        (0..self.height())
            .filter_map(|y| self.row(y))
            .flatten()
            .copied()
            .collect()
    }
}

impl Record for Pcx {
    const NAME: &'static str = "PCX";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let header = PcxHeader::read(r)?;
        let start = r.pos();
        let scan_lines = decode_rle(r, header.decoded_len())?;
        let encoded_len = (r.pos() - start) as usize;
        r.seek(start)?;
        let encoded = r.read_bytes(encoded_len)?.to_vec();
        tracing::trace!(
            width = header.width(),
            height = header.height(),
            encoded_len,
            "decoded PCX"
        );
        Ok(Self {
            header,
            scan_lines,
            encoded,
            trailing: r.read_to_end(),
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        self.header.write(w)?;
        w.write_bytes(&self.encoded)?;
        w.write_bytes(&self.trailing)
    }
}

/// Decode one continuous RLE stream until `len` bytes are produced.
fn decode_rle(r: &mut Reader<'_>, len: usize) -> Result<Vec<u8>> {
    // Two input bytes yield at most MAX_RUN output bytes.
    let mut out = Vec::with_capacity(len.min(r.remaining().saturating_mul(MAX_RUN)));
    while out.len() < len {
        let b = r.read_u8()?;
        if b & RUN_FLAG == RUN_FLAG {
            let count = (b & !RUN_FLAG) as usize;
            let value = r.read_u8()?;
            out.resize(out.len() + count, value);
        } else {
            out.push(b);
        }
    }
    // A run may cross the end of the image.
    out.truncate(len);
    Ok(out)
}

/// RLE-encode a single scanline. Runs never cross scanline boundaries.
fn encode_scanline(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    let mut i = 0;
    while i < line.len() {
        let value = line[i];
        let run = line[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();
        if run > 1 || value & RUN_FLAG == RUN_FLAG {
            out.push(RUN_FLAG | run as u8);
        }
        out.push(value);
        i += run;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{from_bytes, to_bytes};

    #[test]
    fn test_header_size() {
        let pcx = Pcx::from_indexed(1, 1, &[0]).unwrap();
        let mut w = Writer::new();
        pcx.header.write(&mut w).unwrap();
        assert_eq!(w.as_bytes().len(), HEADER_SIZE);
    }

    #[test]
    fn test_encode_runs_and_literals() {
        assert_eq!(encode_scanline(&[1, 1, 1, 2]), vec![0xC3, 1, 2]);
        // Literal with the run bits set must be escaped
        assert_eq!(encode_scanline(&[0xC5]), vec![0xC1, 0xC5]);
        let long = vec![7u8; 70];
        assert_eq!(encode_scanline(&long), vec![0xFF, 7, 0xC7, 7]);
    }

    #[test]
    fn test_indexed_roundtrip_odd_width() {
        let pixels: Vec<u8> = (0..15u8).map(|i| i / 4 + 0xC0 * (i % 2)).collect();
        let mut pcx = Pcx::from_indexed(5, 3, &pixels).unwrap();
        pcx.trailing = vec![0x0C; 4];
        assert_eq!(pcx.header.bytes_per_line, 6);

        let bytes = to_bytes(&pcx).unwrap();
        let back: Pcx = from_bytes(&bytes).unwrap();
        assert_eq!(back.width(), 5);
        assert_eq!(back.height(), 3);
        assert_eq!(back.indexed_pixels(), pixels);
        assert_eq!(back.row(1).unwrap(), &pixels[5..10]);
        assert!(back.row(3).is_none());
        assert_eq!(back.trailing, vec![0x0C; 4]);
        assert_eq!(to_bytes(&back).unwrap(), bytes);
    }

    #[test]
    fn test_run_across_scanlines_decodes() {
        // 2x2 image with one run covering both rows
        let mut pcx = Pcx::from_indexed(2, 2, &[9, 9, 9, 9]).unwrap();
        pcx.encoded = vec![0xC4, 9];
        let back: Pcx = from_bytes(&to_bytes(&pcx).unwrap()).unwrap();
        assert_eq!(back.indexed_pixels(), vec![9; 4]);
    }

    #[test]
    fn test_from_indexed_rejects_max_width() {
        assert!(Pcx::from_indexed(u16::MAX, 1, &vec![0; u16::MAX as usize]).is_err());
        assert!(Pcx::from_indexed(u16::MAX - 1, 1, &vec![0; u16::MAX as usize - 1]).is_ok());
    }

    #[test]
    fn test_oversized_dimensions_fail() {
        let mut pcx = Pcx::from_indexed(2, 2, &[1, 2, 3, 4]).unwrap();
        pcx.header.x_min = 0;
        pcx.header.y_min = 0;
        pcx.header.x_max = u16::MAX - 1;
        pcx.header.y_max = u16::MAX;
        pcx.header.bytes_per_line = u16::MAX;
        pcx.trailing.clear();
        let bytes = to_bytes(&pcx).unwrap();
        assert!(matches!(from_bytes::<Pcx>(&bytes), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = to_bytes(&Pcx::from_indexed(1, 1, &[0]).unwrap()).unwrap();
        bytes[0] = 0;
        assert!(from_bytes::<Pcx>(&bytes).is_err());
    }
}
