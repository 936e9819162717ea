//! Background (FND) assembly.
//!
//! Levels reference up to two backgrounds through the world's PCX table: the
//! normal one and a parallax one. Both live in the background archive.

use super::layer::BackgroundLayer;
use super::palette::Palette;
use super::texture::TextureManager;
use crate::core::{paths, Context};
use crate::format::{LevFile, Pcx, WorldFile};
use crate::util::{Error, IVec2, Rect, Result, UVec2};

/// Display name of the parallax layer.
pub const PARALLAX_NAME: &str = "Parallax Background";

/// Upload a PCX image, one scanline at a time, through the palette.
pub fn load_pcx_texture<M: TextureManager + ?Sized>(
    manager: &mut M,
    palette: &Palette,
    pcx: &Pcx,
) -> Result<BackgroundLayer> {
    let size = UVec2::new(pcx.width(), pcx.height());
    let texture = manager.create_texture(size)?;
    for y in 0..pcx.height() {
        let row = pcx
            .row(y)
            .ok_or_else(|| Error::invalid(format!("PCX is missing scanline {}", y)))?;
        let rect = Rect::new(IVec2::new(0, y as i32), UVec2::new(size.x, 1));
        manager.set_data(texture, rect, &palette.expand(row))?;
    }
    Ok(BackgroundLayer::new(texture, size))
}

/// Decode the background referenced by a level FND index.
///
/// `Ok(None)` when the background archive is not registered.
fn load_fnd<M: TextureManager + ?Sized>(
    ctx: &Context,
    manager: &mut M,
    palette: &Palette,
    wld: &WorldFile,
    fnd_index: u8,
) -> Result<Option<BackgroundLayer>> {
    let entry = wld.background_entry(fnd_index).ok_or_else(|| {
        Error::out_of_range("background", fnd_index as usize, wld.plan0_num_pcx.len())
    })?;
    let Some(pcx) = ctx.read_archive_file::<Pcx>(paths::VIG_FILE, entry)? else {
        return Ok(None);
    };
    tracing::debug!(fnd_index, entry, width = pcx.width(), height = pcx.height(), "loaded background");
    load_pcx_texture(manager, palette, &pcx).map(Some)
}

/// Normal background, followed by the parallax one when it differs.
///
/// The parallax layer is hidden by default.
#[tracing::instrument(skip_all, fields(fnd = lev.fnd_index, scroll_diff = lev.scroll_diff_fnd_index))]
pub fn load_backgrounds<M: TextureManager + ?Sized>(
    ctx: &Context,
    manager: &mut M,
    palette: &Palette,
    wld: &WorldFile,
    lev: &LevFile,
) -> Result<Vec<BackgroundLayer>> {
    let mut layers = Vec::with_capacity(2);

    match load_fnd(ctx, manager, palette, wld, lev.fnd_index)? {
        Some(normal) => layers.push(normal),
        None => tracing::warn!("background archive not registered, level has no background"),
    }

    if lev.scroll_diff_fnd_index != lev.fnd_index {
        if let Some(parallax) = load_fnd(ctx, manager, palette, wld, lev.scroll_diff_fnd_index)? {
            layers.push(parallax.with_name(PARALLAX_NAME).hidden());
        }
    }

    Ok(layers)
}
