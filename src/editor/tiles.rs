//! Tile set and tile map assembly.

use super::layer::{TileMapLayer, TileSet};
use super::palette::Palette;
use super::texture::{TextureManager, TextureSheet};
use crate::core::CELL_SIZE;
use crate::format::{MapData, TileTextureData};
use crate::util::{Error, Result, UVec2};

/// Build the tile set: one entry per offset table entry, each matched to
/// the first texture stored at that offset.
///
/// Tile pixels are stored inverted (`255 - index`).
#[tracing::instrument(skip_all, fields(offsets = data.textures_offset_table.len()))]
pub fn load_tile_set<M: TextureManager + ?Sized>(
    manager: &mut M,
    palette: &Palette,
    data: &TileTextureData,
) -> Result<TileSet> {
    let textures = data
        .textures_offset_table
        .iter()
        .map(|&offset| data.find(offset).ok_or(Error::TileTextureNotFound(offset)))
        .collect::<Result<Vec<_>>>()?;

    let sizes = vec![Some(UVec2::splat(CELL_SIZE)); textures.len()];
    let sheet = TextureSheet::new(manager, &sizes)?;
    for (i, tex) in textures.iter().enumerate() {
        sheet.init_entry(manager, i, &palette.expand_with(&tex.img_data, |p| 255 - p))?;
    }

    tracing::debug!(
        tiles = textures.len(),
        opaque = data.non_transparent_textures.len(),
        transparent = data.transparent_textures.len(),
        "built tile set"
    );
    Ok(TileSet {
        sheet,
        cell_size: CELL_SIZE,
    })
}

/// Wrap the map grid in a layer. Every tile must reference the tile set.
pub fn load_tile_map(map: &MapData, tile_set: TileSet) -> Result<TileMapLayer> {
    if let Some(bad) = map
        .tiles
        .iter()
        .find(|t| t.tile_index as usize >= tile_set.len())
    {
        return Err(Error::out_of_range("tile", bad.tile_index as usize, tile_set.len()));
    }
    TileMapLayer::new(
        UVec2::new(map.width as u32, map.height as u32),
        map.tiles.clone(),
        tile_set,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::texture::MemoryTextureManager;
    use crate::format::level::TILE_PIXELS;
    use crate::format::{RawPalette, TileTexture};

    fn palette() -> Palette {
        let raw = RawPalette {
            colors: (0..=255u8).map(|i| [i % 64, i % 64, 0]).collect(),
        };
        Palette::for_level(&[raw]).unwrap()
    }

    fn texture_data() -> TileTextureData {
        TileTextureData::new(
            vec![TileTexture::opaque(vec![255; TILE_PIXELS])],
            vec![TileTexture::transparent(vec![250; TILE_PIXELS], vec![0; TILE_PIXELS])],
        )
    }

    #[test]
    fn test_one_entry_per_offset() {
        let mut data = texture_data();
        let first = data.textures_offset_table[0];
        data.textures_offset_table.push(first);

        let mut mgr = MemoryTextureManager::new();
        let pal = palette();
        let set = load_tile_set(&mut mgr, &pal, &data).unwrap();
        assert_eq!(set.len(), 3);

        let tex = mgr.texture(set.sheet.texture.unwrap()).unwrap();
        // 255 inverts to index 0, which is transparent
        let px = tex.crop(set.sheet.entries[0].unwrap().rect).unwrap();
        assert!(px.iter().all(|c| c.is_transparent()));
        let px = tex.crop(set.sheet.entries[1].unwrap().rect).unwrap();
        assert_eq!(px[0], pal.color(5));
    }

    #[test]
    fn test_unmatched_offset_fails() {
        let mut data = texture_data();
        data.textures_offset_table.push(0x7777);
        let mut mgr = MemoryTextureManager::new();
        assert!(matches!(
            load_tile_set(&mut mgr, &palette(), &data),
            Err(Error::TileTextureNotFound(0x7777))
        ));
    }

    #[test]
    fn test_tile_map_layer() {
        let mut mgr = MemoryTextureManager::new();
        let set = load_tile_set(&mut mgr, &palette(), &texture_data()).unwrap();
        let mut map = MapData::new(4, 3);
        map.tiles[5].tile_index = 1;
        let layer = load_tile_map(&map, set.clone()).unwrap();
        assert_eq!(layer.map_size, UVec2::new(4, 3));
        assert_eq!(layer.pixel_size(), UVec2::new(64, 48));
        assert_eq!(layer.tile(1, 1).unwrap().tile_index, 1);

        map.tiles[0].tile_index = 2;
        assert!(load_tile_map(&map, set).is_err());
    }
}
