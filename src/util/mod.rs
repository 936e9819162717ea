//! Utility types shared by every layer of the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Rgba`] - Palette and texture color
//! - Integer math types re-exported from glam, plus [`Rect`]

mod color;
mod error;
mod math;

pub use color::*;
pub use error::*;
pub use math::*;
