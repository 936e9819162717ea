//! RGBA color type shared by palettes and textures.

use bytemuck::{Pod, Zeroable};

/// 8-bit RGBA color, laid out so pixel buffers can be cast to bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Expand a 6-bit VGA triple (0..=63 per channel) to an opaque color.
    #[inline]
    pub const fn from_vga(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(vga_to_8bit(r), vga_to_8bit(g), vga_to_8bit(b))
    }

    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

#[inline]
const fn vga_to_8bit(v: u8) -> u8 {
    let v = v & 0x3F;
    (v << 2) | (v >> 4)
}

/// View a pixel buffer as raw RGBA bytes.
pub fn as_bytes(pixels: &[Rgba]) -> &[u8] {
    bytemuck::cast_slice(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vga_expansion() {
        assert_eq!(Rgba::from_vga(0, 0, 0), Rgba::rgb(0, 0, 0));
        assert_eq!(Rgba::from_vga(63, 63, 63), Rgba::rgb(255, 255, 255));
        assert_eq!(Rgba::from_vga(32, 1, 16).r, 130);
    }

    #[test]
    fn test_as_bytes() {
        let px = [Rgba::new(1, 2, 3, 4), Rgba::new(5, 6, 7, 8)];
        assert_eq!(as_bytes(&px), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
