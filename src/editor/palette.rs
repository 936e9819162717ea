//! Active palette and indexed pixel expansion.

use crate::format::RawPalette;
use crate::util::{Error, Result, Rgba};

/// 256 RGBA colors used to expand indexed pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgba; 256],
}

impl Palette {
    /// Expand a raw VGA palette.
    pub fn from_raw(raw: &RawPalette) -> Result<Self> {
        if raw.colors.len() != 256 {
            return Err(Error::invalid(format!("palette has {} colors", raw.colors.len())));
        }
        let mut colors = [Rgba::TRANSPARENT; 256];
        for (dst, &[r, g, b]) in colors.iter_mut().zip(&raw.colors) {
            *dst = Rgba::from_vga(r, g, b);
        }
        Ok(Self { colors })
    }

    /// Palette used for a level: the first stored palette with index 0 made
    /// transparent.
    pub fn for_level(palettes: &[RawPalette]) -> Result<Self> {
        let raw = palettes
            .first()
            .ok_or_else(|| Error::invalid("level has no palettes"))?;
        let mut palette = Self::from_raw(raw)?;
        palette.set_first_to_transparent();
        Ok(palette)
    }

    pub fn set_first_to_transparent(&mut self) {
        self.colors[0] = Rgba::TRANSPARENT;
    }

    #[inline]
    pub fn color(&self, index: u8) -> Rgba {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgba; 256] {
        &self.colors
    }

    /// Expand indexed pixels to RGBA.
    pub fn expand(&self, indices: &[u8]) -> Vec<Rgba> {
        indices.iter().map(|&i| self.color(i)).collect()
    }

    /// Expand indexed pixels, transforming each index first.
    pub fn expand_with(&self, indices: &[u8], f: impl Fn(u8) -> u8) -> Vec<Rgba> {
        indices.iter().map(|&i| self.color(f(i))).collect()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("first", &self.colors[0])
            .field("last", &self.colors[255])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_gray() -> RawPalette {
        RawPalette {
            colors: (0..=255u8).map(|i| [i / 4; 3]).collect(),
        }
    }

    #[test]
    fn test_first_entry_transparent() {
        let palette = Palette::for_level(&[raw_gray(), RawPalette::default()]).unwrap();
        assert!(palette.color(0).is_transparent());
        assert_eq!(palette.color(255), Rgba::from_vga(63, 63, 63));
        assert!(!palette.color(4).is_transparent());
    }

    #[test]
    fn test_expand() {
        let palette = Palette::for_level(&[raw_gray()]).unwrap();
        let px = palette.expand(&[0, 255]);
        assert_eq!(px, vec![Rgba::TRANSPARENT, Rgba::rgb(255, 255, 255)]);
        let inverted = palette.expand_with(&[0], |i| 255 - i);
        assert_eq!(inverted[0], Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn test_no_palette() {
        assert!(Palette::for_level(&[]).is_err());
    }
}
