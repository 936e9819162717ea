//! Texture allocation and sprite sheets.
//!
//! Pixel storage belongs to a [`TextureManager`] owned by the editing
//! session. Loaders only hold [`TextureId`] handles and pack sprites into
//! [`TextureSheet`]s, one texture per sheet.

use std::collections::HashMap;

use crate::util::{Error, IVec2, Rect, Result, Rgba, UVec2};

/// Handle to a texture owned by a [`TextureManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Session-scoped texture allocator.
pub trait TextureManager {
    /// Allocate a transparent texture.
    fn create_texture(&mut self, size: UVec2) -> Result<TextureId>;

    /// Fill `rect` of a texture with row-major pixels.
    fn set_data(&mut self, id: TextureId, rect: Rect, pixels: &[Rgba]) -> Result<()>;

    /// Release one texture. Unknown handles are ignored.
    fn release(&mut self, id: TextureId);

    /// Release every texture allocated so far. Handles become invalid.
    fn release_all(&mut self);

    /// Number of live textures.
    fn texture_count(&self) -> usize;
}

// ============================================================================
// In-memory manager
// ============================================================================

/// CPU-side RGBA texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTexture {
    pub size: UVec2,
    pub pixels: Vec<Rgba>,
}

impl MemoryTexture {
    /// Copy out a sub-rectangle, `None` if it is not inside the texture.
    pub fn crop(&self, rect: Rect) -> Option<Vec<Rgba>> {
        if !fits(self.size, rect) {
            return None;
        }
        let mut out = Vec::with_capacity((rect.size.x * rect.size.y) as usize);
        for y in 0..rect.size.y {
            let start = ((rect.top() as u32 + y) * self.size.x + rect.left() as u32) as usize;
            out.extend_from_slice(&self.pixels[start..start + rect.size.x as usize]);
        }
        Some(out)
    }
}

/// [`TextureManager`] keeping textures in main memory.
///
/// Used by the CLI for export and by tests; a renderer would upload instead.
#[derive(Debug, Default)]
pub struct MemoryTextureManager {
    textures: HashMap<TextureId, MemoryTexture>,
    next_id: u32,
}

impl MemoryTextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self, id: TextureId) -> Option<&MemoryTexture> {
        self.textures.get(&id)
    }

    /// Total allocated pixels.
    pub fn pixel_count(&self) -> usize {
        self.textures.values().map(|t| t.pixels.len()).sum()
    }
}

impl TextureManager for MemoryTextureManager {
    fn create_texture(&mut self, size: UVec2) -> Result<TextureId> {
        if size.x == 0 || size.y == 0 {
            return Err(Error::invalid(format!("empty texture {}x{}", size.x, size.y)));
        }
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(
            id,
            MemoryTexture {
                size,
                pixels: vec![Rgba::TRANSPARENT; size.x as usize * size.y as usize],
            },
        );
        Ok(id)
    }

    fn set_data(&mut self, id: TextureId, rect: Rect, pixels: &[Rgba]) -> Result<()> {
        let tex = self.textures.get_mut(&id).ok_or(Error::UnknownTexture(id.0))?;
        if !fits(tex.size, rect) {
            return Err(Error::invalid(format!("{:?} outside texture {:?}", rect, tex.size)));
        }
        let width = rect.size.x as usize;
        if pixels.len() != width * rect.size.y as usize {
            return Err(Error::invalid(format!(
                "{} pixels for {}x{} region",
                pixels.len(),
                rect.size.x,
                rect.size.y
            )));
        }
        for (y, row) in pixels.chunks(width.max(1)).enumerate() {
            let start = (rect.top() as usize + y) * tex.size.x as usize + rect.left() as usize;
            tex.pixels[start..start + width].copy_from_slice(row);
        }
        Ok(())
    }

    fn release(&mut self, id: TextureId) {
        self.textures.remove(&id);
    }

    fn release_all(&mut self) {
        if !self.textures.is_empty() {
            tracing::debug!(count = self.textures.len(), "releasing textures");
        }
        self.textures.clear();
    }

    fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

fn fits(size: UVec2, rect: Rect) -> bool {
    rect.left() >= 0
        && rect.top() >= 0
        && rect.right() as u32 <= size.x
        && rect.bottom() as u32 <= size.y
}

// ============================================================================
// Release guard
// ============================================================================

/// Releases the textures it created on drop unless [`TextureScope::commit`]
/// was called.
///
/// Wraps the manager for the duration of a load so that any early return
/// leaves no textures behind. Textures that existed before the scope are
/// left alone.
pub struct TextureScope<'a, M: TextureManager + ?Sized> {
    manager: &'a mut M,
    created: Vec<TextureId>,
    committed: bool,
}

impl<'a, M: TextureManager + ?Sized> TextureScope<'a, M> {
    pub fn new(manager: &'a mut M) -> Self {
        Self {
            manager,
            created: Vec::new(),
            committed: false,
        }
    }

    /// Keep the textures allocated in this scope.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl<M: TextureManager + ?Sized> TextureManager for TextureScope<'_, M> {
    fn create_texture(&mut self, size: UVec2) -> Result<TextureId> {
        let id = self.manager.create_texture(size)?;
        self.created.push(id);
        Ok(id)
    }

    fn set_data(&mut self, id: TextureId, rect: Rect, pixels: &[Rgba]) -> Result<()> {
        self.manager.set_data(id, rect, pixels)
    }

    fn release(&mut self, id: TextureId) {
        self.created.retain(|&c| c != id);
        self.manager.release(id);
    }

    fn release_all(&mut self) {
        self.created.clear();
        self.manager.release_all();
    }

    fn texture_count(&self) -> usize {
        self.manager.texture_count()
    }
}

impl<M: TextureManager + ?Sized> Drop for TextureScope<'_, M> {
    fn drop(&mut self) {
        if !self.committed && !self.created.is_empty() {
            tracing::debug!(count = self.created.len(), "load did not complete, releasing textures");
            for id in self.created.drain(..) {
                self.manager.release(id);
            }
        }
    }
}

// ============================================================================
// Sprite sheet
// ============================================================================

/// Gap between packed entries.
const PADDING: u32 = 1;

/// One packed entry of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetEntry {
    pub rect: Rect,
}

/// Several images packed into a single texture. Entries may be null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSheet {
    /// `None` when the sheet has no non-null entries
    pub texture: Option<TextureId>,
    pub size: UVec2,
    pub entries: Vec<Option<SheetEntry>>,
}

impl TextureSheet {
    /// Allocate a sheet with one entry per size. `None` and zero-area sizes
    /// stay null.
    pub fn new<M: TextureManager + ?Sized>(manager: &mut M, sizes: &[Option<UVec2>]) -> Result<Self> {
        let (size, rects) = pack(sizes);
        let texture = if size.x > 0 && size.y > 0 {
            Some(manager.create_texture(size)?)
        } else {
            None
        };
        Ok(Self {
            texture,
            size,
            entries: rects.into_iter().map(|r| r.map(|rect| SheetEntry { rect })).collect(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&SheetEntry> {
        self.entries.get(index)?.as_ref()
    }

    /// Upload the pixels of a non-null entry.
    pub fn init_entry<M: TextureManager + ?Sized>(
        &self,
        manager: &mut M,
        index: usize,
        pixels: &[Rgba],
    ) -> Result<()> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| Error::out_of_range("sheet entry", index, self.entries.len()))?
            .ok_or_else(|| Error::invalid(format!("sheet entry {} is null", index)))?;
        let texture = self
            .texture
            .ok_or_else(|| Error::invalid("sheet has no texture"))?;
        manager.set_data(texture, entry.rect, pixels)
    }
}

/// Shelf-pack sizes into rows no wider than roughly the square root of the
/// total area.
fn pack(sizes: &[Option<UVec2>]) -> (UVec2, Vec<Option<Rect>>) {
    let live = || sizes.iter().flatten().filter(|s| s.x > 0 && s.y > 0);
    let area: u64 = live().map(|s| (s.x + PADDING) as u64 * (s.y + PADDING) as u64).sum();
    let widest = live().map(|s| s.x).max().unwrap_or(0);
    if widest == 0 {
        return (UVec2::ZERO, vec![None; sizes.len()]);
    }
    let max_width = widest.max((area as f64).sqrt().ceil() as u32);

    let mut rects = Vec::with_capacity(sizes.len());
    let (mut x, mut y, mut row_height, mut width) = (0u32, 0u32, 0u32, 0u32);
    for &size in sizes {
        let Some(size) = size.filter(|s| s.x > 0 && s.y > 0) else {
            rects.push(None);
            continue;
        };
        if x > 0 && x + size.x > max_width {
            y += row_height + PADDING;
            x = 0;
            row_height = 0;
        }
        rects.push(Some(Rect::new(IVec2::new(x as i32, y as i32), size)));
        width = width.max(x + size.x);
        row_height = row_height.max(size.y);
        x += size.x + PADDING;
    }
    (UVec2::new(width, y + row_height), rects)
}
