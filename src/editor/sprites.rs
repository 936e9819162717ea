//! Descriptor set assembly.
//!
//! Fix and world descriptor sets are merged into one table. Index 0 is a
//! reserved null entry, so object DES indices can be used directly.

use std::sync::Arc;

use super::animation::AnimationSet;
use super::palette::Palette;
use super::texture::{TextureManager, TextureSheet};
use crate::format::{Des, Sprite};
use crate::util::{Error, Result, UVec2};

/// A descriptor set with its sprites packed into a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDes {
    pub sprites: Vec<Sprite>,
    /// Pixel buffer after background clearing
    pub image_data: Vec<u8>,
    /// One entry per sprite; zero-area sprites are null
    pub sheet: TextureSheet,
}

impl LoadedDes {
    /// Indexed pixels of sprite `index`, `None` for dummy sprites.
    pub fn sprite_pixels(&self, index: usize) -> Result<Option<&[u8]>> {
        let sprite = self
            .sprites
            .get(index)
            .ok_or_else(|| Error::out_of_range("sprite", index, self.sprites.len()))?;
        sprite_slice(&self.image_data, sprite, index)
    }
}

fn sprite_slice<'a>(image_data: &'a [u8], sprite: &Sprite, index: usize) -> Result<Option<&'a [u8]>> {
    if sprite.is_dummy() {
        return Ok(None);
    }
    let start = sprite.image_buffer_offset as usize;
    image_data
        .get(start..start + sprite.pixel_count())
        .map(Some)
        .ok_or_else(|| {
            Error::invalid(format!(
                "sprite {} ({}x{} at {:#x}) exceeds image buffer of {} bytes",
                index,
                sprite.width,
                sprite.height,
                start,
                image_data.len()
            ))
        })
}

/// Build a sheet for one descriptor set and upload its sprites.
pub fn load_des<M: TextureManager + ?Sized>(
    manager: &mut M,
    palette: &Palette,
    des: &Des,
) -> Result<LoadedDes> {
    let image_data = des.processed_image_data().into_owned();
    let sizes: Vec<Option<UVec2>> = des
        .sprites
        .iter()
        .map(|s| (!s.is_dummy()).then(|| UVec2::new(s.width as u32, s.height as u32)))
        .collect();
    let sheet = TextureSheet::new(manager, &sizes)?;

    for (i, sprite) in des.sprites.iter().enumerate() {
        if let Some(pixels) = sprite_slice(&image_data, sprite, i)? {
            sheet.init_entry(manager, i, &palette.expand(pixels))?;
        }
    }

    Ok(LoadedDes {
        sprites: des.sprites.clone(),
        image_data,
        sheet,
    })
}

/// DES and animation tables, aligned by index. Entry 0 of both is `None`.
#[derive(Debug, Clone, Default)]
pub struct DesTables {
    pub des: Vec<Option<Arc<LoadedDes>>>,
    pub animations: Vec<Option<Arc<AnimationSet>>>,
}

impl DesTables {
    #[inline]
    pub fn len(&self) -> usize {
        self.des.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.des.is_empty()
    }
}

/// Assemble fix sets then world sets, behind a null entry.
#[tracing::instrument(skip_all, fields(fix = fix.len(), world = world.len()))]
pub fn load_des_tables<M: TextureManager + ?Sized>(
    manager: &mut M,
    palette: &Palette,
    fix: &[Des],
    world: &[Des],
) -> Result<DesTables> {
    let count = 1 + fix.len() + world.len();
    let mut tables = DesTables {
        des: Vec::with_capacity(count),
        animations: Vec::with_capacity(count),
    };
    tables.des.push(None);
    tables.animations.push(None);

    for (i, des) in fix.iter().chain(world).enumerate() {
        let loaded = load_des(manager, palette, des).map_err(|e| {
            tracing::error!(des = i + 1, error = %e, "failed to load descriptor set");
            e
        })?;
        tracing::trace!(
            des = i + 1,
            sprites = loaded.sprites.len(),
            animations = des.animations.len(),
            "loaded descriptor set"
        );
        tables.des.push(Some(Arc::new(loaded)));
        tables.animations.push(Some(Arc::new(AnimationSet::new(des.animations.clone()))));
    }

    tracing::debug!(count = tables.len(), "assembled DES table");
    Ok(tables)
}
