//! Persistent editor configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::settings::{PcVersion, Ray1Settings, World};
use crate::util::Result;

const MAX_RECENT_LEVELS: usize = 10;

/// Editor settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    // Game
    pub game_dir: Option<PathBuf>,
    pub version: PcVersion,

    // Last opened level
    pub last_world: Option<World>,
    pub last_level: Option<u32>,

    // Recent levels (most recent first)
    pub recent_levels: Vec<Ray1Settings>,

    // I/O
    pub use_mmap: bool,
    /// Log every decoded record at trace level
    pub serializer_log: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            game_dir: None,
            version: PcVersion::default(),
            last_world: None,
            last_level: None,
            recent_levels: Vec::new(),
            use_mmap: cfg!(feature = "mmap"),
            serializer_log: false,
        }
    }
}

impl EditorConfig {
    /// Load the config file.
    ///
    /// A missing file gives defaults. A file that cannot be parsed is logged
    /// and replaced by defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to read config, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "invalid config, resetting to defaults");
                Self::default()
            }
        }
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Remember a level as the last opened one (moves to top if already present).
    pub fn add_recent(&mut self, settings: Ray1Settings) {
        self.recent_levels
            .retain(|s| (s.world, s.level) != (settings.world, settings.level));
        self.recent_levels.insert(0, settings);
        self.recent_levels.truncate(MAX_RECENT_LEVELS);

        self.last_world = Some(settings.world);
        self.last_level = Some(settings.level);
    }

    /// Settings for the last opened level, if any.
    pub fn last_settings(&self) -> Option<Ray1Settings> {
        Some(Ray1Settings {
            world: self.last_world?,
            level: self.last_level?,
            version: self.version,
        })
    }
}
