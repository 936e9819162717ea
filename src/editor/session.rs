//! Editing session: one game directory, one texture manager, at most one
//! loaded level.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::data::GameData;
use super::fields::{FieldDescriptor, StateItem, StateItemCache};
use super::manager::{GameManager, R1PcManager};
use super::texture::TextureManager;
use crate::core::{Context, EditorConfig, Ray1Settings};
use crate::util::{Error, Result};

/// Owns the texture manager and the loaded level.
///
/// Loading a level unloads the previous one first. Textures are released on
/// unload, on a failed load and when the session is dropped.
pub struct EditorSession<M: TextureManager> {
    game_dir: PathBuf,
    use_mmap: bool,
    manager: R1PcManager,
    textures: M,
    data: Option<GameData>,
    fields: Vec<FieldDescriptor>,
    state_items: StateItemCache,
}

impl<M: TextureManager> EditorSession<M> {
    pub fn new(game_dir: impl Into<PathBuf>, textures: M) -> Self {
        let manager = R1PcManager::new();
        Self {
            game_dir: game_dir.into(),
            use_mmap: cfg!(feature = "mmap"),
            fields: manager.object_fields(),
            manager,
            textures,
            data: None,
            state_items: StateItemCache::new(),
        }
    }

    /// Session for the configured game directory.
    pub fn from_config(config: &EditorConfig, textures: M) -> Result<Self> {
        let game_dir = config
            .game_dir
            .clone()
            .ok_or_else(|| Error::other("no game directory configured"))?;
        let mut session = Self::new(game_dir, textures);
        session.use_mmap = config.use_mmap;
        Ok(session)
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    /// Levels available in the game directory.
    pub fn levels(&self) -> Result<Vec<Ray1Settings>> {
        self.manager.levels(&self.game_dir)
    }

    /// Load a level, replacing the current one.
    ///
    /// On failure the session is left with no level loaded.
    pub fn load(&mut self, settings: Ray1Settings) -> Result<&mut GameData> {
        self.unload();
        let context = Arc::new(Context::new(&self.game_dir).with_mmap(self.use_mmap));
        match self.manager.load(context, settings, &mut self.textures) {
            Ok(data) => {
                tracing::info!(
                    level = %settings,
                    objects = data.objects.len(),
                    layers = data.layers.len(),
                    textures = self.textures.texture_count(),
                    "level loaded"
                );
                Ok(self.data.insert(data))
            }
            Err(e) => {
                tracing::error!(level = %settings, error = %e, "failed to load level");
                Err(e)
            }
        }
    }

    /// Save the loaded level.
    pub fn save(&self) -> Result<()> {
        let data = self.data.as_ref().ok_or(Error::NoLevelLoaded)?;
        self.manager.save(data)
    }

    /// Drop the loaded level and release its textures.
    pub fn unload(&mut self) {
        if let Some(data) = self.data.take() {
            tracing::debug!(level = %data.settings, "unloading level");
            data.context.clear();
        }
        self.state_items.clear();
        self.textures.release_all();
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&GameData> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut GameData> {
        self.data.as_mut()
    }

    pub fn textures(&self) -> &M {
        &self.textures
    }

    /// Editable object fields.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn field(&self, name: &str) -> Result<FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .copied()
            .ok_or_else(|| Error::other(format!("unknown field '{}'", name)))
    }

    /// Read a field of object `index`.
    pub fn get_field(&self, index: usize, name: &str) -> Result<i64> {
        let field = self.field(name)?;
        let data = self.data.as_ref().ok_or(Error::NoLevelLoaded)?;
        Ok(field.get(data.object(index)?))
    }

    /// Edit a field of object `index`.
    pub fn set_field(&mut self, index: usize, name: &str, value: i64) -> Result<()> {
        let field = self.field(name)?;
        let data = self.data.as_mut().ok_or(Error::NoLevelLoaded)?;
        field.set(data.object_mut(index)?, value)?;
        tracing::debug!(object = index, field = name, value, "edited field");
        Ok(())
    }

    /// Selectable states of object `index`.
    pub fn state_items(&mut self, index: usize) -> Result<Arc<[StateItem]>> {
        let data = self.data.as_ref().ok_or(Error::NoLevelLoaded)?;
        let eta = data.object(index)?.eta.clone();
        Ok(self.state_items.items(&eta))
    }
}

impl<M: TextureManager> Drop for EditorSession<M> {
    fn drop(&mut self) {
        self.unload();
    }
}
