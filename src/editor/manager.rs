//! Game managers: level discovery, load and save for a game variant.

use std::path::Path;
use std::sync::Arc;

use super::background::load_backgrounds;
use super::data::GameData;
use super::fields::{object_fields, FieldDescriptor};
use super::layer::Layer;
use super::link::build_link_table;
use super::object::load_objects;
use super::palette::Palette;
use super::sprites::load_des_tables;
use super::texture::{TextureManager, TextureScope};
use super::tiles::{load_tile_map, load_tile_set};
use crate::core::{paths, Context, Ray1Settings, World};
use crate::format::{AllfixFile, LevFile, WorldFile};
use crate::util::{Error, Result};

/// Loads and saves levels of one game variant.
pub trait GameManager {
    /// Levels present in a game directory.
    fn levels(&self, game_dir: &Path) -> Result<Vec<Ray1Settings>>;

    /// Load a level. On error no textures allocated by the load remain.
    fn load(
        &self,
        context: Arc<Context>,
        settings: Ray1Settings,
        textures: &mut dyn TextureManager,
    ) -> Result<GameData>;

    /// Write the level back through the context.
    fn save(&self, data: &GameData) -> Result<()>;

    /// Editable object fields.
    fn object_fields(&self) -> Vec<FieldDescriptor>;
}

/// Manager for the PC release.
#[derive(Debug, Default, Clone, Copy)]
pub struct R1PcManager;

impl R1PcManager {
    pub fn new() -> Self {
        Self
    }
}

/// Parse `RAY{n}.LEV` (any case) into `n`.
fn level_number(file_name: &str) -> Option<u32> {
    let upper = file_name.to_ascii_uppercase();
    upper.strip_prefix("RAY")?.strip_suffix(".LEV")?.parse().ok()
}

impl GameManager for R1PcManager {
    fn levels(&self, game_dir: &Path) -> Result<Vec<Ray1Settings>> {
        let mut levels = Vec::new();
        for world in World::ALL {
            let dir = game_dir.join(paths::level_dir(&Ray1Settings::new(world, 0)));
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let mut numbers: Vec<u32> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| level_number(&e.file_name().to_string_lossy()))
                .collect();
            numbers.sort_unstable();
            levels.extend(numbers.into_iter().map(|n| Ray1Settings::new(world, n)));
        }
        tracing::debug!(dir = %game_dir.display(), count = levels.len(), "found levels");
        Ok(levels)
    }

    #[tracing::instrument(skip_all, fields(level = %settings))]
    fn load(
        &self,
        context: Arc<Context>,
        settings: Ray1Settings,
        textures: &mut dyn TextureManager,
    ) -> Result<GameData> {
        settings.check_version()?;
        context.add_settings(settings);

        let fix_path = paths::FIX_FILE;
        let world_path = paths::world_file(&settings);
        let level_path = paths::level_file(&settings);
        for path in [paths::VIG_FILE, fix_path, world_path.as_str(), level_path.as_str()] {
            context.add_file(path);
        }
        tracing::debug!(files = ?context.registered_files(), "registered level files");

        let fix = context.read::<AllfixFile>(fix_path)?;
        let wld = context.read::<WorldFile>(&world_path)?;
        let lev = context.read::<LevFile>(&level_path)?;
        tracing::info!(
            fix_des = fix.des_items.len(),
            world_des = wld.des_items.len(),
            objects = lev.objects.len(),
            "read level files"
        );

        let palette = Palette::for_level(&lev.map_data.color_palettes)?;

        // Everything below allocates textures; the scope releases the ones it
        // created if any step fails.
        let mut scope = TextureScope::new(textures);

        let mut layers: Vec<Layer> = load_backgrounds(&context, &mut scope, &palette, &wld, &lev)?
            .into_iter()
            .map(Layer::Background)
            .collect();
        tracing::info!(count = layers.len(), "loaded backgrounds");

        let tile_set = load_tile_set(&mut scope, &palette, &lev.tile_texture_data)?;
        layers.push(Layer::TileMap(load_tile_map(&lev.map_data, tile_set)?));
        tracing::info!(
            width = lev.map_data.width,
            height = lev.map_data.height,
            "loaded map"
        );

        let des = load_des_tables(&mut scope, &palette, &fix.des_items, &wld.des_items)?;
        tracing::info!(count = des.len() - 1, "loaded sprites");

        let eta: Vec<_> = fix.eta.iter().chain(&wld.eta).cloned().map(Arc::new).collect();
        tracing::info!(count = eta.len(), "loaded states");

        let objects = load_objects(&lev.objects, &lev.obj_linking_table, &des, &eta)?;
        tracing::info!(count = objects.len(), "loaded objects");

        scope.commit();

        let loaded_link_groups = objects.iter().map(|o| o.link_group).collect();
        Ok(GameData {
            context,
            settings,
            objects,
            layers,
            palette,
            des,
            eta,
            loaded_link_groups,
        })
    }

    #[tracing::instrument(skip_all, fields(level = %data.settings))]
    fn save(&self, data: &GameData) -> Result<()> {
        let settings = data.context.settings()?;
        let level_path = paths::level_file(&settings);
        let mut lev = (*data.context.read::<LevFile>(&level_path)?).clone();

        let map = data.tile_map()?;
        if map.tiles.len() != lev.map_data.tiles.len() {
            return Err(Error::invalid(format!(
                "tile map has {} cells, level has {}",
                map.tiles.len(),
                lev.map_data.tiles.len()
            )));
        }
        lev.map_data.tiles.clone_from(&map.tiles);

        lev.objects = data.objects.iter().map(|o| o.data.clone()).collect();
        if data.links_changed() {
            lev.obj_linking_table = build_link_table(&data.link_groups())?;
            tracing::debug!("rebuilt link table");
        }

        data.context.write(&level_path, lev)
    }

    fn object_fields(&self) -> Vec<FieldDescriptor> {
        object_fields()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_number() {
        assert_eq!(level_number("RAY12.LEV"), Some(12));
        assert_eq!(level_number("ray3.lev"), Some(3));
        assert_eq!(level_number("RAY.LEV"), None);
        assert_eq!(level_number("RAY1.WLD"), None);
    }

    #[test]
    fn test_levels() {
        let dir = tempfile::tempdir().unwrap();
        let jungle = dir.path().join("PCMAP/Jungle");
        std::fs::create_dir_all(&jungle).unwrap();
        for name in ["RAY10.LEV", "RAY2.LEV", "NOTES.TXT"] {
            std::fs::write(jungle.join(name), b"").unwrap();
        }
        std::fs::create_dir_all(dir.path().join("PCMAP/Cake")).unwrap();
        std::fs::write(dir.path().join("PCMAP/Cake/RAY1.LEV"), b"").unwrap();

        let levels = R1PcManager.levels(dir.path()).unwrap();
        assert_eq!(
            levels,
            vec![
                Ray1Settings::new(World::Jungle, 2),
                Ray1Settings::new(World::Jungle, 10),
                Ray1Settings::new(World::Cake, 1),
            ]
        );
    }
}
