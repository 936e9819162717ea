//! Level data (`RAY{n}.LEV`): map, palettes, tile textures and objects.
//!
//! ```text
//! +---------------------+
//! | obj pointer         |  u32
//! | texture pointer     |  u32
//! +---------------------+
//! | map block           |  size, 3 palettes, tiles, FND indices
//! +---------------------+
//! | texture block       |  offset table, opaque + transparent textures
//! +---------------------+
//! | object block        |  count, link table, objects
//! | commands            |  verbatim to EOF
//! +---------------------+
//! ```

use super::write_util::count_as;
use super::{Reader, Record, Writer};
use crate::util::{Error, Result};

/// Number of palettes stored per level.
pub const PALETTE_COUNT: usize = 3;

/// Colors per palette.
pub const PALETTE_SIZE: usize = 256;

/// Width and height of a tile in pixels.
pub const TILE_SIZE: usize = 16;

/// Bytes in a tile's pixel data.
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;

/// Serialized size of an opaque tile texture.
pub const OPAQUE_TEXTURE_SIZE: u32 = TILE_PIXELS as u32 + 8;

/// Serialized size of a transparent tile texture.
pub const TRANSPARENT_TEXTURE_SIZE: u32 = OPAQUE_TEXTURE_SIZE + TILE_PIXELS as u32;

/// Serialized size of [`ObjData`].
pub const OBJ_DATA_SIZE: usize = 36;

// ============================================================================
// Map block
// ============================================================================

/// 256 colors as 6-bit VGA triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPalette {
    pub colors: Vec<[u8; 3]>,
}

impl Default for RawPalette {
    fn default() -> Self {
        Self { colors: vec![[0; 3]; PALETTE_SIZE] }
    }
}

impl Record for RawPalette {
    const NAME: &'static str = "Palette";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let mut colors = Vec::with_capacity(PALETTE_SIZE);
        for _ in 0..PALETTE_SIZE {
            colors.push(r.read_array::<3>()?);
        }
        Ok(Self { colors })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        if self.colors.len() != PALETTE_SIZE {
            return Err(Error::invalid(format!(
                "palette has {} colors, expected {}",
                self.colors.len(),
                PALETTE_SIZE
            )));
        }
        for c in &self.colors {
            w.write_bytes(c)?;
        }
        Ok(())
    }
}

/// One map cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapTile {
    /// Index into the level's texture offset table
    pub tile_index: u16,
    pub collision_type: u8,
    pub transparency_mode: u8,
}

impl Record for MapTile {
    const NAME: &'static str = "MapTile";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            tile_index: r.read_u16()?,
            collision_type: r.read_u8()?,
            transparency_mode: r.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u16(self.tile_index)?;
        w.write_u8(self.collision_type)?;
        w.write_u8(self.transparency_mode)
    }
}

/// Map dimensions, palettes and the tile grid (row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapData {
    pub width: u16,
    pub height: u16,
    pub color_palettes: Vec<RawPalette>,
    pub last_plan1_palette: u8,
    pub tiles: Vec<MapTile>,
}

impl MapData {
    /// Empty map of the given size with default palettes.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            color_palettes: vec![RawPalette::default(); PALETTE_COUNT],
            last_plan1_palette: 0,
            tiles: vec![MapTile::default(); width as usize * height as usize],
        }
    }
}

impl Record for MapData {
    const NAME: &'static str = "MapData";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let width = r.read_u16()?;
        let height = r.read_u16()?;
        let color_palettes = r.read_records(PALETTE_COUNT)?;
        let last_plan1_palette = r.read_u8()?;
        let tiles = r.read_records(width as usize * height as usize)?;
        Ok(Self {
            width,
            height,
            color_palettes,
            last_plan1_palette,
            tiles,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        if self.color_palettes.len() != PALETTE_COUNT {
            return Err(Error::invalid(format!(
                "map has {} palettes, expected {}",
                self.color_palettes.len(),
                PALETTE_COUNT
            )));
        }
        if self.tiles.len() != self.width as usize * self.height as usize {
            return Err(Error::invalid(format!(
                "map is {}x{} but has {} tiles",
                self.width,
                self.height,
                self.tiles.len()
            )));
        }
        w.write_u16(self.width)?;
        w.write_u16(self.height)?;
        w.write_records(&self.color_palettes)?;
        w.write_u8(self.last_plan1_palette)?;
        w.write_records(&self.tiles)
    }
}

// ============================================================================
// Texture block
// ============================================================================

/// 16x16 tile texture. Transparent textures carry an alpha plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileTexture {
    /// Position of the record relative to the texture block. Not serialized;
    /// set when read and used as the key in the offset table.
    pub offset: u32,
    pub img_data: Vec<u8>,
    pub transparency_mode: u32,
    pub unknown: u32,
    pub alpha: Option<Vec<u8>>,
}

impl TileTexture {
    /// Opaque texture from pixel data.
    pub fn opaque(img_data: Vec<u8>) -> Self {
        Self {
            offset: 0,
            img_data,
            transparency_mode: 0,
            unknown: 0,
            alpha: None,
        }
    }

    /// Transparent texture from pixel and alpha data.
    pub fn transparent(img_data: Vec<u8>, alpha: Vec<u8>) -> Self {
        Self {
            transparency_mode: 1,
            alpha: Some(alpha),
            ..Self::opaque(img_data)
        }
    }

    fn read_at(r: &mut Reader<'_>, block_start: u64, transparent: bool) -> Result<Self> {
        let offset = u32::try_from(r.pos() - block_start)
            .map_err(|_| Error::invalid("texture offset out of range"))?;
        let img_data = r.read_bytes(TILE_PIXELS)?.to_vec();
        let transparency_mode = r.read_u32()?;
        let unknown = r.read_u32()?;
        let alpha = if transparent {
            Some(r.read_bytes(TILE_PIXELS)?.to_vec())
        } else {
            None
        };
        Ok(Self {
            offset,
            img_data,
            transparency_mode,
            unknown,
            alpha,
        })
    }

    fn write_to(&self, w: &mut Writer, transparent: bool) -> Result<()> {
        if self.img_data.len() != TILE_PIXELS {
            return Err(Error::invalid("tile texture must have 256 pixels"));
        }
        w.write_bytes(&self.img_data)?;
        w.write_u32(self.transparency_mode)?;
        w.write_u32(self.unknown)?;
        match (&self.alpha, transparent) {
            (Some(alpha), true) if alpha.len() == TILE_PIXELS => w.write_bytes(alpha),
            (None, false) => Ok(()),
            _ => Err(Error::invalid("tile texture alpha does not match its group")),
        }
    }
}

/// Tile textures keyed by block-relative offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileTextureData {
    /// Offset of the texture used by each tile index
    pub textures_offset_table: Vec<u32>,
    pub non_transparent_textures: Vec<TileTexture>,
    pub transparent_textures: Vec<TileTexture>,
}

impl TileTextureData {
    /// Lay out textures and build an offset table listing them in order
    /// (opaque first).
    pub fn new(opaque: Vec<TileTexture>, transparent: Vec<TileTexture>) -> Self {
        let mut data = Self {
            textures_offset_table: vec![0; opaque.len() + transparent.len()],
            non_transparent_textures: opaque,
            transparent_textures: transparent,
        };
        data.assign_offsets();
        data.textures_offset_table = data
            .non_transparent_textures
            .iter()
            .chain(&data.transparent_textures)
            .map(|t| t.offset)
            .collect();
        data
    }

    /// Recompute every texture's offset from the current layout.
    pub fn assign_offsets(&mut self) {
        let mut offset = 4 + 4 * self.textures_offset_table.len() as u32 + 8;
        for tex in &mut self.non_transparent_textures {
            tex.offset = offset;
            offset += OPAQUE_TEXTURE_SIZE;
        }
        for tex in &mut self.transparent_textures {
            tex.offset = offset;
            offset += TRANSPARENT_TEXTURE_SIZE;
        }
    }

    /// Find the texture stored at `offset`, opaque textures first.
    pub fn find(&self, offset: u32) -> Option<&TileTexture> {
        self.non_transparent_textures
            .iter()
            .chain(&self.transparent_textures)
            .find(|t| t.offset == offset)
    }

    /// Total number of texture records.
    pub fn textures_count(&self) -> usize {
        self.non_transparent_textures.len() + self.transparent_textures.len()
    }
}

impl Record for TileTextureData {
    const NAME: &'static str = "TileTextureData";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let block_start = r.pos();
        let offset_count = r.read_u32()? as usize;
        let textures_offset_table = r.read_u32_array(offset_count)?;
        let textures_count = r.read_u32()? as usize;
        let opaque_count = r.read_u32()? as usize;
        if opaque_count > textures_count {
            return Err(Error::invalid(format!(
                "{} opaque textures out of {} total",
                opaque_count, textures_count
            )));
        }

        // Counts come from the file; size allocations by what is left to read.
        let max_opaque = r.remaining() / OPAQUE_TEXTURE_SIZE as usize;
        let mut non_transparent_textures = Vec::with_capacity(opaque_count.min(max_opaque));
        for _ in 0..opaque_count {
            non_transparent_textures.push(TileTexture::read_at(r, block_start, false)?);
        }
        let max_transparent = r.remaining() / TRANSPARENT_TEXTURE_SIZE as usize;
        let mut transparent_textures =
            Vec::with_capacity((textures_count - opaque_count).min(max_transparent));
        for _ in opaque_count..textures_count {
            transparent_textures.push(TileTexture::read_at(r, block_start, true)?);
        }

        Ok(Self {
            textures_offset_table,
            non_transparent_textures,
            transparent_textures,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(count_as(self.textures_offset_table.len(), "texture offsets")?)?;
        for &offset in &self.textures_offset_table {
            w.write_u32(offset)?;
        }
        w.write_u32(count_as(self.textures_count(), "tile textures")?)?;
        w.write_u32(count_as(self.non_transparent_textures.len(), "opaque textures")?)?;
        for tex in &self.non_transparent_textures {
            tex.write_to(w, false)?;
        }
        for tex in &self.transparent_textures {
            tex.write_to(w, true)?;
        }
        Ok(())
    }
}

// ============================================================================
// Object block
// ============================================================================

/// Placed object record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjData {
    /// DES index for sprites (0 = none)
    pub des_index: u32,
    /// DES index for animations (0 = none)
    pub anim_index: u32,
    pub image_buffer_index: u32,
    pub eta_index: u32,
    pub x: i16,
    pub y: i16,
    pub obj_type: u16,
    pub etat: u8,
    pub sub_etat: u8,
    pub offset_bx: u8,
    pub offset_by: u8,
    pub offset_hy: u8,
    pub hit_points: u8,
    pub init_hit_points: u8,
    pub hit_sprite: u8,
    pub follow_sprite: u8,
    pub display_prio: u8,
    pub flags: u8,
    pub unknown: [u8; 3],
}

impl Record for ObjData {
    const NAME: &'static str = "ObjData";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            des_index: r.read_u32()?,
            anim_index: r.read_u32()?,
            image_buffer_index: r.read_u32()?,
            eta_index: r.read_u32()?,
            x: r.read_i16()?,
            y: r.read_i16()?,
            obj_type: r.read_u16()?,
            etat: r.read_u8()?,
            sub_etat: r.read_u8()?,
            offset_bx: r.read_u8()?,
            offset_by: r.read_u8()?,
            offset_hy: r.read_u8()?,
            hit_points: r.read_u8()?,
            init_hit_points: r.read_u8()?,
            hit_sprite: r.read_u8()?,
            follow_sprite: r.read_u8()?,
            display_prio: r.read_u8()?,
            flags: r.read_u8()?,
            unknown: r.read_array()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.des_index)?;
        w.write_u32(self.anim_index)?;
        w.write_u32(self.image_buffer_index)?;
        w.write_u32(self.eta_index)?;
        w.write_i16(self.x)?;
        w.write_i16(self.y)?;
        w.write_u16(self.obj_type)?;
        w.write_u8(self.etat)?;
        w.write_u8(self.sub_etat)?;
        w.write_u8(self.offset_bx)?;
        w.write_u8(self.offset_by)?;
        w.write_u8(self.offset_hy)?;
        w.write_u8(self.hit_points)?;
        w.write_u8(self.init_hit_points)?;
        w.write_u8(self.hit_sprite)?;
        w.write_u8(self.follow_sprite)?;
        w.write_u8(self.display_prio)?;
        w.write_u8(self.flags)?;
        w.write_bytes(&self.unknown)
    }
}

// ============================================================================
// Level file
// ============================================================================

/// A complete level file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevFile {
    pub map_data: MapData,
    /// Index into the world's background table
    pub fnd_index: u8,
    pub scroll_diff_fnd_index: u8,
    pub tile_texture_data: TileTextureData,
    /// Successor index per object; `link[i] == i` means unlinked
    pub obj_linking_table: Vec<u16>,
    pub objects: Vec<ObjData>,
    /// Object command stream, kept verbatim
    pub commands: Vec<u8>,
}

impl Record for LevFile {
    const NAME: &'static str = "LevFile";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let obj_pointer = r.read_pointer()?;
        let texture_pointer = r.read_pointer()?;

        let map_data = MapData::read(r)?;
        let fnd_index = r.read_u8()?;
        let scroll_diff_fnd_index = r.read_u8()?;
        tracing::trace!(
            width = map_data.width,
            height = map_data.height,
            end = r.pos(),
            "read map block"
        );

        r.seek(texture_pointer as u64)?;
        let tile_texture_data = TileTextureData::read(r)?;
        tracing::trace!(
            offsets = tile_texture_data.textures_offset_table.len(),
            textures = tile_texture_data.textures_count(),
            end = r.pos(),
            "read texture block"
        );

        r.seek(obj_pointer as u64)?;
        let count = r.read_u16()? as usize;
        let obj_linking_table = r.read_u16_array(count)?;
        let objects = r.read_records(count)?;
        tracing::trace!(count, end = r.pos(), "read object block");

        Ok(Self {
            map_data,
            fnd_index,
            scroll_diff_fnd_index,
            tile_texture_data,
            obj_linking_table,
            objects,
            commands: r.read_to_end(),
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        if self.obj_linking_table.len() != self.objects.len() {
            return Err(Error::invalid(format!(
                "link table has {} entries for {} objects",
                self.obj_linking_table.len(),
                self.objects.len()
            )));
        }

        let obj_slot = w.reserve_pointer()?;
        let texture_slot = w.reserve_pointer()?;

        self.map_data.write(w)?;
        w.write_u8(self.fnd_index)?;
        w.write_u8(self.scroll_diff_fnd_index)?;

        w.patch_pointer(texture_slot)?;
        self.tile_texture_data.write(w)?;

        w.patch_pointer(obj_slot)?;
        w.write_u16(count_as(self.objects.len(), "objects")?)?;
        for &link in &self.obj_linking_table {
            w.write_u16(link)?;
        }
        w.write_records(&self.objects)?;
        w.write_bytes(&self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{from_bytes, to_bytes};

    fn sample_level() -> LevFile {
        let mut map_data = MapData::new(2, 1);
        map_data.tiles[1].tile_index = 1;
        LevFile {
            map_data,
            fnd_index: 0,
            scroll_diff_fnd_index: 1,
            tile_texture_data: TileTextureData::new(
                vec![TileTexture::opaque(vec![3; TILE_PIXELS])],
                vec![TileTexture::transparent(vec![4; TILE_PIXELS], vec![0xFF; TILE_PIXELS])],
            ),
            obj_linking_table: vec![0],
            objects: vec![ObjData { x: -5, y: 12, hit_points: 3, ..Default::default() }],
            commands: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_obj_data_size() {
        let bytes = to_bytes(&ObjData::default()).unwrap();
        assert_eq!(bytes.len(), OBJ_DATA_SIZE);
    }

    #[test]
    fn test_texture_offsets_survive_roundtrip() {
        let lev = sample_level();
        let table = &lev.tile_texture_data.textures_offset_table;
        // count + 2 offsets + textures_count + opaque_count
        assert_eq!(table[0], 4 + 8 + 8);
        assert_eq!(table[1], table[0] + OPAQUE_TEXTURE_SIZE);

        let bytes = to_bytes(&lev).unwrap();
        let back: LevFile = from_bytes(&bytes).unwrap();
        assert_eq!(back, lev);
        assert_eq!(to_bytes(&back).unwrap(), bytes);
    }

    #[test]
    fn test_find_prefers_opaque() {
        let mut data = sample_level().tile_texture_data;
        let first = data.textures_offset_table[0];
        data.transparent_textures[0].offset = first;
        assert!(data.find(first).unwrap().alpha.is_none());
        assert!(data.find(0xDEAD).is_none());
    }

    #[test]
    fn test_oversized_texture_counts_fail() {
        let bytes: Vec<u8> = [0u32, u32::MAX, u32::MAX]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        assert!(from_bytes::<TileTextureData>(&bytes).is_err());
    }

    #[test]
    fn test_link_table_mismatch() {
        let mut lev = sample_level();
        lev.obj_linking_table.push(1);
        assert!(to_bytes(&lev).is_err());
    }
}
