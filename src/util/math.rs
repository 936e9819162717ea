//! Math type re-exports and editor-specific geometry.
//!
//! Positions and sizes are integer pixels, so the integer `glam` vectors are
//! used throughout.

pub use glam::{IVec2, UVec2};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Axis-aligned integer rectangle in pixels.
#[derive(Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    pub origin: IVec2,
    pub size: UVec2,
}

impl Rect {
    /// Create a rectangle from an origin and a size.
    #[inline]
    pub const fn new(origin: IVec2, size: UVec2) -> Self {
        Self { origin, size }
    }

    /// Create a rectangle at the origin.
    #[inline]
    pub const fn from_size(size: UVec2) -> Self {
        Self { origin: IVec2::ZERO, size }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.origin.y
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.origin.x + self.size.x as i32
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.y as i32
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }

    /// Check if a point lies inside the rectangle.
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.left() && p.y >= self.top() && p.x < self.right() && p.y < self.bottom()
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.origin.x, self.origin.y, self.size.x, self.size.y
        )
    }
}
