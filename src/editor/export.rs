//! PNG export of layers, for inspecting levels without a renderer.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::data::GameData;
use super::layer::{Layer, TileMapLayer};
use super::texture::{MemoryTexture, MemoryTextureManager};
use crate::util::{as_bytes, Error, IVec2, Rect, Result, Rgba, UVec2};

fn to_image(size: UVec2, pixels: &[Rgba]) -> Result<RgbaImage> {
    RgbaImage::from_raw(size.x, size.y, as_bytes(pixels).to_vec())
        .ok_or_else(|| Error::invalid(format!("{} pixels for {}x{} image", pixels.len(), size.x, size.y)))
}

/// Buffer index of pixel `(x, y)` in an image `width` pixels wide.
#[inline]
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

fn texture(textures: &MemoryTextureManager, id: super::texture::TextureId) -> Result<&MemoryTexture> {
    textures.texture(id).ok_or(Error::UnknownTexture(id.0))
}

fn render_tile_map(textures: &MemoryTextureManager, map: &TileMapLayer) -> Result<RgbaImage> {
    let size = map.pixel_size();
    let cell = map.tile_set.cell_size;
    let mut pixels = vec![Rgba::TRANSPARENT; pixel_index(0, size.y, size.x)];
    let sheet = &map.tile_set.sheet;
    let Some(sheet_texture) = sheet.texture else {
        return to_image(size, &pixels);
    };
    let sheet_texture = texture(textures, sheet_texture)?;

    for cy in 0..map.map_size.y {
        for cx in 0..map.map_size.x {
            let Some(tile) = map.tile(cx, cy) else { continue };
            let Some(entry) = sheet.entry(tile.tile_index as usize) else { continue };
            let src = sheet_texture
                .crop(entry.rect)
                .ok_or_else(|| Error::invalid("tile entry outside its sheet"))?;
            for (row, line) in src.chunks(entry.rect.size.x.max(1) as usize).enumerate() {
                let start = pixel_index(cx * cell, cy * cell + row as u32, size.x);
                pixels[start..start + line.len()].copy_from_slice(line);
            }
        }
    }
    to_image(size, &pixels)
}

/// Render one layer as an image of its own size.
pub fn render_layer(textures: &MemoryTextureManager, layer: &Layer) -> Result<RgbaImage> {
    match layer {
        Layer::TileMap(map) => render_tile_map(textures, map),
        Layer::Background(bg) => {
            let tex = texture(textures, bg.texture)?;
            let pixels = tex
                .crop(Rect::new(IVec2::ZERO, bg.size))
                .ok_or_else(|| Error::invalid("background larger than its texture"))?;
            to_image(bg.size, &pixels)
        }
    }
}

/// File name used for layer `index`.
pub fn layer_file_name(index: usize, layer: &Layer) -> String {
    let kind = match layer {
        Layer::TileMap(_) => "map".to_string(),
        Layer::Background(bg) => bg
            .name
            .as_deref()
            .unwrap_or("background")
            .to_ascii_lowercase()
            .replace(' ', "_"),
    };
    format!("layer{}_{}.png", index, kind)
}

/// Write every layer to `out_dir` as PNG. Returns the written paths.
pub fn export_layers(
    textures: &MemoryTextureManager,
    data: &GameData,
    out_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(data.layers.len());
    for (i, layer) in data.layers.iter().enumerate() {
        let path = out_dir.join(layer_file_name(i, layer));
        render_layer(textures, layer)?.save(&path)?;
        tracing::info!(path = %path.display(), "exported layer");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::layer::{BackgroundLayer, TileSet};
    use crate::editor::texture::{TextureManager, TextureSheet};
    use crate::format::MapTile;

    #[test]
    fn test_render_tile_map() {
        let mut mgr = MemoryTextureManager::new();
        let sheet = TextureSheet::new(&mut mgr, &[Some(UVec2::splat(2)), Some(UVec2::splat(2))]).unwrap();
        let red = Rgba::rgb(255, 0, 0);
        sheet.init_entry(&mut mgr, 1, &[red; 4]).unwrap();

        let tiles = vec![MapTile::default(), MapTile { tile_index: 1, ..Default::default() }];
        let map = TileMapLayer::new(UVec2::new(2, 1), tiles, TileSet { sheet, cell_size: 2 }).unwrap();
        let img = render_layer(&mgr, &Layer::TileMap(map)).unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(3, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_index_large_image() {
        assert_eq!(pixel_index(0, 70_000, 70_000), 4_900_000_000);
        assert_eq!(pixel_index(3, 2, 10), 23);
    }

    #[test]
    fn test_layer_file_name() {
        let mut mgr = MemoryTextureManager::new();
        let id = mgr.create_texture(UVec2::splat(1)).unwrap();
        let bg = Layer::Background(BackgroundLayer::new(id, UVec2::splat(1)).with_name("Parallax Background"));
        assert_eq!(layer_file_name(1, &bg), "layer1_parallax_background.png");
        assert_eq!(render_layer(&mgr, &bg).unwrap().dimensions(), (1, 1));
    }
}
