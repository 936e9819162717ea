//! Descriptor sets (DES): sprite tables, pixel buffers and animations.

use super::write_util::count_as;
use super::{Reader, Record, Writer};
use crate::util::Result;

/// Size of a serialized [`Sprite`].
pub const SPRITE_SIZE: usize = 12;

/// Pixel value that marks cleared background in sprite buffers.
pub const BACKGROUND_CLEAR_MARKER: u8 = 0xA1;

/// Sprite definition: a rectangle of indexed pixels inside the DES buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sprite {
    /// Byte offset of the first pixel in the image buffer
    pub image_buffer_offset: u32,
    pub index: u8,
    pub width: u8,
    pub height: u8,
    pub visual_width: u8,
    pub visual_height: u8,
    pub hit_box_y: u8,
    pub unknown: u8,
    pub flags: u8,
}

impl Sprite {
    /// Zero-area placeholder sprites have no pixels and are never drawn.
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixel bytes this sprite occupies.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Record for Sprite {
    const NAME: &'static str = "Sprite";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            image_buffer_offset: r.read_u32()?,
            index: r.read_u8()?,
            width: r.read_u8()?,
            height: r.read_u8()?,
            visual_width: r.read_u8()?,
            visual_height: r.read_u8()?,
            hit_box_y: r.read_u8()?,
            unknown: r.read_u8()?,
            flags: r.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.image_buffer_offset)?;
        w.write_u8(self.index)?;
        w.write_u8(self.width)?;
        w.write_u8(self.height)?;
        w.write_u8(self.visual_width)?;
        w.write_u8(self.visual_height)?;
        w.write_u8(self.hit_box_y)?;
        w.write_u8(self.unknown)?;
        w.write_u8(self.flags)
    }
}

/// One sprite drawn as part of an animation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationLayer {
    pub flags: u8,
    pub x: u8,
    pub y: u8,
    pub sprite_index: u8,
}

impl AnimationLayer {
    const FLIP_X: u8 = 1 << 0;
    const FLIP_Y: u8 = 1 << 1;

    #[inline]
    pub fn is_flipped_x(&self) -> bool {
        self.flags & Self::FLIP_X != 0
    }

    #[inline]
    pub fn is_flipped_y(&self) -> bool {
        self.flags & Self::FLIP_Y != 0
    }
}

impl Record for AnimationLayer {
    const NAME: &'static str = "AnimationLayer";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            flags: r.read_u8()?,
            x: r.read_u8()?,
            y: r.read_u8()?,
            sprite_index: r.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u8(self.flags)?;
        w.write_u8(self.x)?;
        w.write_u8(self.y)?;
        w.write_u8(self.sprite_index)
    }
}

/// Frame bounds within an animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationFrame {
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
}

impl Record for AnimationFrame {
    const NAME: &'static str = "AnimationFrame";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            x: r.read_u8()?,
            y: r.read_u8()?,
            width: r.read_u8()?,
            height: r.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u8(self.x)?;
        w.write_u8(self.y)?;
        w.write_u8(self.width)?;
        w.write_u8(self.height)
    }
}

/// Serialized animation.
///
/// The counters are stored with engine flags in their high byte, so the raw
/// values are kept for writing and the real counts come from the low byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Animation {
    pub layers_per_frame_serialized: u16,
    pub frame_count_serialized: u16,
    /// `layers_per_frame * frame_count` layers, grouped by frame
    pub layers: Vec<AnimationLayer>,
    pub frames: Vec<AnimationFrame>,
}

impl Animation {
    /// Build an animation with plain counters from per-frame layer lists.
    pub fn from_frames(frames: Vec<(AnimationFrame, Vec<AnimationLayer>)>) -> Result<Self> {
        let layers_per_frame = frames.first().map_or(0, |(_, l)| l.len());
        if frames.iter().any(|(_, l)| l.len() != layers_per_frame) {
            return Err(crate::util::Error::invalid(
                "every animation frame must have the same layer count",
            ));
        }
        let frame_count: u8 = count_as(frames.len(), "animation frames")?;
        let lpf: u8 = count_as(layers_per_frame, "animation layers")?;
        let mut anim = Self {
            layers_per_frame_serialized: lpf as u16,
            frame_count_serialized: frame_count as u16,
            ..Default::default()
        };
        for (frame, layers) in frames {
            anim.frames.push(frame);
            anim.layers.extend(layers);
        }
        Ok(anim)
    }

    #[inline]
    pub fn layers_per_frame(&self) -> usize {
        (self.layers_per_frame_serialized & 0xFF) as usize
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        (self.frame_count_serialized & 0xFF) as usize
    }

    /// Layers of one frame.
    pub fn frame_layers(&self, frame: usize) -> &[AnimationLayer] {
        let lpf = self.layers_per_frame();
        let start = (frame * lpf).min(self.layers.len());
        let end = (start + lpf).min(self.layers.len());
        &self.layers[start..end]
    }
}

impl Record for Animation {
    const NAME: &'static str = "Animation";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let layers_per_frame_serialized = r.read_u16()?;
        let frame_count_serialized = r.read_u16()?;
        let lpf = (layers_per_frame_serialized & 0xFF) as usize;
        let frame_count = (frame_count_serialized & 0xFF) as usize;

        let layers = r.read_records(lpf * frame_count)?;
        let frames = r.read_records(frame_count)?;

        Ok(Self {
            layers_per_frame_serialized,
            frame_count_serialized,
            layers,
            frames,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        if self.layers.len() != self.layers_per_frame() * self.frame_count()
            || self.frames.len() != self.frame_count()
        {
            return Err(crate::util::Error::invalid(format!(
                "animation counters ({} x {}) disagree with {} layers / {} frames",
                self.layers_per_frame(),
                self.frame_count(),
                self.layers.len(),
                self.frames.len()
            )));
        }
        w.write_u16(self.layers_per_frame_serialized)?;
        w.write_u16(self.frame_count_serialized)?;
        w.write_records(&self.layers)?;
        w.write_records(&self.frames)
    }
}

/// A descriptor set: pixel buffer, sprites cut from it, and animations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Des {
    /// Buffer must go through [`process_image_data`] before slicing sprites
    pub requires_background_clearing: bool,
    pub image_data: Vec<u8>,
    pub sprites: Vec<Sprite>,
    pub animations: Vec<Animation>,
}

impl Des {
    /// Pixel buffer as it should be sliced into sprites.
    pub fn processed_image_data(&self) -> std::borrow::Cow<'_, [u8]> {
        if self.requires_background_clearing {
            std::borrow::Cow::Owned(process_image_data(&self.image_data))
        } else {
            std::borrow::Cow::Borrowed(&self.image_data)
        }
    }
}

impl Record for Des {
    const NAME: &'static str = "DES";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let requires_background_clearing = r.read_bool()?;
        let image_data_len = r.read_u32()? as usize;
        let image_data = r.read_bytes(image_data_len)?.to_vec();
        let sprites_count = r.read_u16()? as usize;
        let sprites = r.read_records(sprites_count)?;
        let animations_count = r.read_u8()? as usize;
        let animations = r.read_records(animations_count)?;

        Ok(Self {
            requires_background_clearing,
            image_data,
            sprites,
            animations,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_bool(self.requires_background_clearing)?;
        w.write_u32(count_as(self.image_data.len(), "image bytes")?)?;
        w.write_bytes(&self.image_data)?;
        w.write_u16(count_as(self.sprites.len(), "sprites")?)?;
        w.write_records(&self.sprites)?;
        w.write_u8(count_as(self.animations.len(), "animations")?)?;
        w.write_records(&self.animations)
    }
}

/// Clear background pixels in a sprite buffer.
///
/// Buffers flagged for clearing mark the pixels behind the sprite with
/// [`BACKGROUND_CLEAR_MARKER`]; those become palette index 0 (transparent).
pub fn process_image_data(image_data: &[u8]) -> Vec<u8> {
    image_data
        .iter()
        .map(|&b| if b == BACKGROUND_CLEAR_MARKER { 0 } else { b })
        .collect()
}

/// Read a DES block: `u16` count followed by the sets.
pub fn read_des_block(r: &mut Reader<'_>) -> Result<Vec<Des>> {
    let count = r.read_u16()? as usize;
    tracing::trace!(count, pos = r.pos(), "reading DES block");
    r.read_records(count)
}

/// Write a DES block.
pub fn write_des_block(w: &mut Writer, des: &[Des]) -> Result<()> {
    w.write_u16(count_as(des.len(), "descriptor sets")?)?;
    w.write_records(des)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{from_bytes, to_bytes};

    fn sample_des() -> Des {
        let layer = AnimationLayer { flags: 1, x: 2, y: 3, sprite_index: 1 };
        let frame = AnimationFrame { x: 0, y: 0, width: 4, height: 4 };
        Des {
            requires_background_clearing: true,
            image_data: vec![1, 2, BACKGROUND_CLEAR_MARKER, 4],
            sprites: vec![
                Sprite::default(),
                Sprite { width: 2, height: 2, ..Default::default() },
            ],
            animations: vec![Animation::from_frames(vec![(frame, vec![layer])]).unwrap()],
        }
    }

    #[test]
    fn test_dummy_sprite() {
        assert!(Sprite::default().is_dummy());
        assert!(Sprite { width: 4, ..Default::default() }.is_dummy());
        assert!(!Sprite { width: 4, height: 1, ..Default::default() }.is_dummy());
    }

    #[test]
    fn test_des_roundtrip() {
        let des = sample_des();
        let bytes = to_bytes(&des).unwrap();
        assert_eq!(bytes.len(), 1 + 4 + 4 + 2 + 2 * SPRITE_SIZE + 1 + 4 + 4 + 4);
        let back: Des = from_bytes(&bytes).unwrap();
        assert_eq!(back, des);
    }

    #[test]
    fn test_serialized_counters_keep_flags() {
        let mut w = Writer::new();
        w.write_u16(0x8001).unwrap(); // 1 layer per frame, flag bit set
        w.write_u16(0x0102).unwrap(); // 2 frames
        for i in 0..2u8 {
            AnimationLayer { sprite_index: i, ..Default::default() }.write(&mut w).unwrap();
        }
        for _ in 0..2 {
            AnimationFrame::default().write(&mut w).unwrap();
        }
        let bytes = w.into_bytes();

        let anim: Animation = from_bytes(&bytes).unwrap();
        assert_eq!(anim.layers_per_frame(), 1);
        assert_eq!(anim.frame_count(), 2);
        assert_eq!(anim.frame_layers(1)[0].sprite_index, 1);
        assert_eq!(to_bytes(&anim).unwrap(), bytes);
    }

    #[test]
    fn test_background_clearing() {
        let des = sample_des();
        assert_eq!(&*des.processed_image_data(), &[1, 2, 0, 4]);
        let plain = Des { requires_background_clearing: false, ..des };
        assert_eq!(&*plain.processed_image_data(), &[1, 2, BACKGROUND_CLEAR_MARKER, 4]);
    }
}
