//! Editor layer - assembles decoded records into an editable scene.
//!
//! Load order for a level: palette, backgrounds, tile map, descriptor sets,
//! state tables, objects. See [`R1PcManager`].

mod animation;
mod background;
mod data;
mod export;
mod fields;
mod layer;
mod link;
mod manager;
mod object;
mod palette;
mod session;
mod sprites;
mod texture;
mod tiles;

pub use animation::{to_common, AnimationSet, CommonAnimation, CommonFrame, CommonLayer};
pub use background::{load_backgrounds, load_pcx_texture, PARALLAX_NAME};
pub use data::GameData;
pub use export::{export_layers, layer_file_name, render_layer};
pub use fields::{object_fields, state_items, state_value, FieldDescriptor, FieldKind, StateItem, StateItemCache};
pub use layer::{BackgroundLayer, Layer, TileMapLayer, TileSet};
pub use link::{build_link_table, init_link_groups};
pub use manager::{GameManager, R1PcManager};
pub use object::{load_objects, GameObject};
pub use palette::Palette;
pub use session::EditorSession;
pub use sprites::{load_des, load_des_tables, DesTables, LoadedDes};
pub use texture::{
    MemoryTexture, MemoryTextureManager, SheetEntry, TextureId, TextureManager, TextureScope, TextureSheet,
};
pub use tiles::{load_tile_map, load_tile_set};
