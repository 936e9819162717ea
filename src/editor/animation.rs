//! Normalized animations.
//!
//! Serialized animations store layers in one flat array grouped by frame.
//! [`CommonAnimation`] splits them into frames, and keeps the serialized
//! counters so nothing is lost when the original is not at hand.

use smallvec::SmallVec;

use crate::format::Animation;
use crate::util::{IVec2, Rect, UVec2};

/// One sprite placed in a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonLayer {
    /// Index into the DES sprite table
    pub sprite_index: u16,
    pub position: IVec2,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// A single animation frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonFrame {
    pub layers: SmallVec<[CommonLayer; 4]>,
    pub bounds: Rect,
}

/// Animation split into frames of layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonAnimation {
    pub frames: Vec<CommonFrame>,
    pub layers_per_frame_serialized: u16,
    pub frame_count_serialized: u16,
}

impl CommonAnimation {
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Normalize a serialized animation.
pub fn to_common(anim: &Animation) -> CommonAnimation {
    let frames = (0..anim.frame_count())
        .map(|i| {
            let layers = anim
                .frame_layers(i)
                .iter()
                .map(|l| CommonLayer {
                    sprite_index: l.sprite_index as u16,
                    position: IVec2::new(l.x as i32, l.y as i32),
                    flip_x: l.is_flipped_x(),
                    flip_y: l.is_flipped_y(),
                })
                .collect();
            let bounds = anim
                .frames
                .get(i)
                .map(|f| {
                    Rect::new(
                        IVec2::new(f.x as i32, f.y as i32),
                        UVec2::new(f.width as u32, f.height as u32),
                    )
                })
                .unwrap_or_default();
            CommonFrame { layers, bounds }
        })
        .collect();

    CommonAnimation {
        frames,
        layers_per_frame_serialized: anim.layers_per_frame_serialized,
        frame_count_serialized: anim.frame_count_serialized,
    }
}

/// The animations of one descriptor set, serialized and normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationSet {
    pub serialized: Vec<Animation>,
    pub common: Vec<CommonAnimation>,
}

impl AnimationSet {
    pub fn new(serialized: Vec<Animation>) -> Self {
        let common = serialized.iter().map(to_common).collect();
        Self { serialized, common }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.common.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.common.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CommonAnimation> {
        self.common.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{AnimationFrame, AnimationLayer};

    #[test]
    fn test_to_common() {
        let frames = vec![
            (
                AnimationFrame { x: 1, y: 2, width: 8, height: 9 },
                vec![
                    AnimationLayer { flags: 0, x: 3, y: 4, sprite_index: 1 },
                    AnimationLayer { flags: 3, x: 5, y: 6, sprite_index: 2 },
                ],
            ),
            (
                AnimationFrame::default(),
                vec![
                    AnimationLayer { flags: 1, x: 0, y: 0, sprite_index: 7 },
                    AnimationLayer::default(),
                ],
            ),
        ];
        let mut anim = Animation::from_frames(frames).unwrap();
        anim.frame_count_serialized |= 0x4000;

        let common = to_common(&anim);
        assert_eq!(common.frame_count(), 2);
        assert_eq!(common.frame_count_serialized, 0x4002);
        assert_eq!(common.layers_per_frame_serialized, 2);

        let second = &common.frames[0].layers[1];
        assert_eq!(second.sprite_index, 2);
        assert_eq!(second.position, IVec2::new(5, 6));
        assert!(second.flip_x && second.flip_y);
        assert_eq!(common.frames[0].bounds.size, UVec2::new(8, 9));

        let flipped = &common.frames[1].layers[0];
        assert!(flipped.flip_x && !flipped.flip_y);
    }

    #[test]
    fn test_animation_set() {
        let set = AnimationSet::new(vec![Animation::default(), Animation::default()]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).map(|a| a.frame_count()), Some(0));
        assert!(set.get(2).is_none());
    }
}
