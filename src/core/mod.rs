//! Core layer - serialization context, settings and configuration.
//!
//! This module provides:
//! - [`Context`] - registered files, settings and the decoded record cache
//! - [`Ray1Settings`] / [`World`] / [`PcVersion`] - level selection
//! - [`paths`] - game-relative file layout
//! - [`EditorConfig`] - persisted editor configuration

mod cache;
mod config;
mod context;
pub mod paths;
mod settings;

pub use cache::RecordCache;
pub use config::EditorConfig;
pub use context::Context;
pub use settings::{PcVersion, Ray1Settings, World, CELL_SIZE};
