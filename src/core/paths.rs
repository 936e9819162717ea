//! Game-relative file paths.
//!
//! Paths always use `/` so they double as context registration keys.

use super::settings::Ray1Settings;

/// Background image archive.
pub const VIG_FILE: &str = "VIGNET.DAT";

/// Directory holding fix, world and level data.
pub const DATA_DIR: &str = "PCMAP";

/// Shared sprites and states.
pub const FIX_FILE: &str = "PCMAP/ALLFIX.DAT";

/// World file for the selected world, e.g. `PCMAP/RAY1.WLD`.
pub fn world_file(settings: &Ray1Settings) -> String {
    format!("{}/RAY{}.WLD", DATA_DIR, settings.world.number())
}

/// Level file for the selected level, e.g. `PCMAP/Jungle/RAY1.LEV`.
pub fn level_file(settings: &Ray1Settings) -> String {
    format!("{}/{}/RAY{}.LEV", DATA_DIR, settings.world.name(), settings.level)
}

/// Directory holding a world's level files.
pub fn level_dir(settings: &Ray1Settings) -> String {
    format!("{}/{}", DATA_DIR, settings.world.name())
}
