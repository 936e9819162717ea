//! The loaded level.

use std::sync::Arc;

use super::layer::{Layer, TileMapLayer};
use super::object::GameObject;
use super::palette::Palette;
use super::sprites::DesTables;
use crate::core::{Context, Ray1Settings};
use crate::format::Eta;
use crate::util::{Error, Result, UVec2};

/// Everything the editor shows and edits for one level.
///
/// Owned by the editing session; the save path reads it back.
#[derive(Debug)]
pub struct GameData {
    pub context: Arc<Context>,
    pub settings: Ray1Settings,
    pub objects: Vec<GameObject>,
    /// Backgrounds first, then the tile map
    pub layers: Vec<Layer>,
    pub palette: Palette,
    pub des: DesTables,
    pub eta: Vec<Arc<Eta>>,
    /// Link groups as loaded, to detect link edits on save
    pub(crate) loaded_link_groups: Vec<u32>,
}

impl GameData {
    /// Scene size: the furthest right and bottom edge over all layers.
    pub fn map_size(&self) -> UVec2 {
        let (right, bottom) = self
            .layers
            .iter()
            .map(Layer::rect)
            .fold((0, 0), |(r, b), rect| (r.max(rect.right()), b.max(rect.bottom())));
        UVec2::new(right.max(0) as u32, bottom.max(0) as u32)
    }

    /// Palettes in use. Only the first level palette is active.
    pub fn palettes(&self) -> impl Iterator<Item = &Palette> {
        std::iter::once(&self.palette)
    }

    pub fn tile_map(&self) -> Result<&TileMapLayer> {
        self.layers
            .iter()
            .find_map(Layer::as_tile_map)
            .ok_or_else(|| Error::invalid("level has no tile map layer"))
    }

    pub fn tile_map_mut(&mut self) -> Result<&mut TileMapLayer> {
        self.layers
            .iter_mut()
            .find_map(Layer::as_tile_map_mut)
            .ok_or_else(|| Error::invalid("level has no tile map layer"))
    }

    pub fn object(&self, index: usize) -> Result<&GameObject> {
        self.objects
            .get(index)
            .ok_or_else(|| Error::out_of_range("object", index, self.objects.len()))
    }

    pub fn object_mut(&mut self, index: usize) -> Result<&mut GameObject> {
        let count = self.objects.len();
        self.objects
            .get_mut(index)
            .ok_or_else(|| Error::out_of_range("object", index, count))
    }

    /// Current link group of every object.
    pub fn link_groups(&self) -> Vec<u32> {
        self.objects.iter().map(|o| o.link_group).collect()
    }

    /// Whether links differ from the loaded ones.
    pub fn links_changed(&self) -> bool {
        self.link_groups() != self.loaded_link_groups
    }

    /// Objects sharing a non-zero link group, in index order.
    pub fn linked_objects(&self, group: u32) -> Vec<usize> {
        if group == 0 {
            return Vec::new();
        }
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.link_group == group)
            .map(|(i, _)| i)
            .collect()
    }
}
