//! Renderable scene layers.

use super::texture::{TextureId, TextureSheet};
use crate::format::MapTile;
use crate::util::{Error, IVec2, Rect, Result, UVec2};

/// Tile textures of a map, one sheet entry per offset table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    pub sheet: TextureSheet,
    /// Edge length of a tile in pixels
    pub cell_size: u32,
}

impl TileSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.sheet.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sheet.is_empty()
    }
}

/// Grid of tiles drawn from a [`TileSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMapLayer {
    pub origin: IVec2,
    /// Map size in cells
    pub map_size: UVec2,
    /// Row-major tiles, `map_size.x * map_size.y`
    pub tiles: Vec<MapTile>,
    pub tile_set: TileSet,
    pub visible: bool,
}

impl TileMapLayer {
    pub fn new(map_size: UVec2, tiles: Vec<MapTile>, tile_set: TileSet) -> Result<Self> {
        if tiles.len() != (map_size.x * map_size.y) as usize {
            return Err(Error::invalid(format!(
                "{} tiles for a {}x{} map",
                tiles.len(),
                map_size.x,
                map_size.y
            )));
        }
        Ok(Self {
            origin: IVec2::ZERO,
            map_size,
            tiles,
            tile_set,
            visible: true,
        })
    }

    fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.map_size.x && y < self.map_size.y).then(|| (y * self.map_size.x + x) as usize)
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<&MapTile> {
        self.tiles.get(self.cell_index(x, y)?)
    }

    /// Replace one cell. The tile must reference an entry of the tile set.
    pub fn set_tile(&mut self, x: u32, y: u32, tile: MapTile) -> Result<()> {
        let cell = self
            .cell_index(x, y)
            .ok_or_else(|| {
                let cell = y as usize * self.map_size.x as usize + x as usize;
                Error::out_of_range("map cell", cell, self.tiles.len())
            })?;
        if tile.tile_index as usize >= self.tile_set.len() {
            return Err(Error::out_of_range("tile", tile.tile_index as usize, self.tile_set.len()));
        }
        self.tiles[cell] = tile;
        Ok(())
    }

    /// Size in pixels.
    pub fn pixel_size(&self) -> UVec2 {
        self.map_size * self.tile_set.cell_size
    }
}

/// A full-screen static image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundLayer {
    pub texture: TextureId,
    pub size: UVec2,
    pub origin: IVec2,
    pub name: Option<String>,
    pub visible: bool,
}

impl BackgroundLayer {
    pub fn new(texture: TextureId, size: UVec2) -> Self {
        Self {
            texture,
            size,
            origin: IVec2::ZERO,
            name: None,
            visible: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A layer of the scene, in draw order within [`crate::editor::GameData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    TileMap(TileMapLayer),
    Background(BackgroundLayer),
}

impl Layer {
    /// Display name; tile maps are unnamed.
    pub fn name(&self) -> Option<&str> {
        match self {
            Layer::TileMap(_) => None,
            Layer::Background(bg) => bg.name.as_deref(),
        }
    }

    pub fn origin(&self) -> IVec2 {
        match self {
            Layer::TileMap(map) => map.origin,
            Layer::Background(bg) => bg.origin,
        }
    }

    /// Bounding rectangle in pixels.
    pub fn rect(&self) -> Rect {
        match self {
            Layer::TileMap(map) => Rect::new(map.origin, map.pixel_size()),
            Layer::Background(bg) => Rect::new(bg.origin, bg.size),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Layer::TileMap(map) => map.visible,
            Layer::Background(bg) => bg.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Layer::TileMap(map) => map.visible = visible,
            Layer::Background(bg) => bg.visible = visible,
        }
    }

    pub fn as_tile_map(&self) -> Option<&TileMapLayer> {
        match self {
            Layer::TileMap(map) => Some(map),
            Layer::Background(_) => None,
        }
    }

    pub fn as_tile_map_mut(&mut self) -> Option<&mut TileMapLayer> {
        match self {
            Layer::TileMap(map) => Some(map),
            Layer::Background(_) => None,
        }
    }

    pub fn as_background(&self) -> Option<&BackgroundLayer> {
        match self {
            Layer::Background(bg) => Some(bg),
            Layer::TileMap(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CELL_SIZE;

    fn tile_set(entries: usize) -> TileSet {
        TileSet {
            sheet: TextureSheet {
                texture: None,
                size: UVec2::ZERO,
                entries: vec![None; entries],
            },
            cell_size: CELL_SIZE,
        }
    }

    #[test]
    fn test_tile_map_rect() {
        let layer = Layer::TileMap(
            TileMapLayer::new(UVec2::new(3, 2), vec![MapTile::default(); 6], tile_set(1)).unwrap(),
        );
        assert_eq!(layer.rect(), Rect::from_size(UVec2::new(48, 32)));
        assert!(layer.is_visible());
        assert!(layer.name().is_none());
    }

    #[test]
    fn test_set_tile() {
        let mut map = TileMapLayer::new(UVec2::new(2, 2), vec![MapTile::default(); 4], tile_set(2)).unwrap();
        let tile = MapTile { tile_index: 1, collision_type: 3, transparency_mode: 0 };
        map.set_tile(1, 1, tile).unwrap();
        assert_eq!(map.tile(1, 1), Some(&tile));
        assert!(map.tile(2, 0).is_none());
        assert!(map.set_tile(2, 0, tile).is_err());
        assert!(map.set_tile(0, 0, MapTile { tile_index: 2, ..tile }).is_err());
    }

    #[test]
    fn test_background_visibility() {
        let mut layer = Layer::Background(
            BackgroundLayer::new(TextureId(0), UVec2::new(320, 200))
                .with_name("Parallax Background")
                .hidden(),
        );
        assert_eq!(layer.name(), Some("Parallax Background"));
        assert!(!layer.is_visible());
        layer.set_visible(true);
        assert!(layer.is_visible());
        assert!(TileMapLayer::new(UVec2::new(2, 2), vec![], tile_set(0)).is_err());
    }
}
