//! # r1edit
//!
//! Level data pipeline for the PC release of Rayman 1 (version 1.21).
//!
//! Reads the shared fix file, the per-world file and a level file, decodes
//! their palettes, backgrounds, tiles, sprite descriptors, state tables and
//! objects, and builds an editable scene that can be saved back.
//!
//! ## Modules
//!
//! - [`util`] - Errors, colors and integer rectangles
//! - [`format`] - Binary records: archives, PCX, DES, ETA, fix/world/level files
//! - [`core`] - File context, record cache, game settings and editor config
//! - [`editor`] - Palettes, texture sheets, layers, objects and the load/save pipeline
//!
//! ## Example
//!
//! ```ignore
//! use r1edit::prelude::*;
//!
//! let mut session = EditorSession::new("C:/RAYMAN", MemoryTextureManager::new());
//! let data = session.load(Ray1Settings::new(World::Jungle, 1))?;
//! println!("{} objects", data.objects.len());
//! session.set_field(0, "HitPoints", 3)?;
//! session.save()?;
//! ```

pub mod util;
pub mod format;
pub mod core;
pub mod editor;

pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Rect, Rgba, IVec2, UVec2};
    pub use crate::core::{Context, EditorConfig, PcVersion, Ray1Settings, World};
    pub use crate::editor::{
        EditorSession, GameData, GameManager, GameObject, Layer, MemoryTextureManager, R1PcManager,
        TextureManager,
    };
    pub use crate::format::{LevFile, Record};
}
