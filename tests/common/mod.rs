//! Synthetic game directory for integration tests.
//!
//! Everything is produced with the crate's own record writers: one fix file,
//! one world file (Jungle), one level and an optional background archive.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use r1edit::core::{paths, Ray1Settings, World};
use r1edit::format::level::TILE_PIXELS;
use r1edit::format::{
    to_bytes, AllfixFile, Animation, AnimationFrame, AnimationLayer, Des, Eta, EtaState, FileArchive, LevFile,
    MapData, ObjData, Pcx, RawPalette, Sprite, TileTexture, TileTextureData, WorldFile,
};
use tempfile::TempDir;

pub const NORMAL_BG: (u16, u16) = (64, 40);
pub const PARALLAX_BG: (u16, u16) = (32, 16);
pub const MAP_CELLS: (u16, u16) = (3, 2);

pub fn settings() -> Ray1Settings {
    Ray1Settings::new(World::Jungle, 1)
}

/// Palette with a distinct color per index (6-bit channels).
pub fn raw_palette() -> RawPalette {
    RawPalette {
        colors: (0..=255u8).map(|i| [i % 64, (i / 4) % 64, 63 - i % 64]).collect(),
    }
}

fn sprite(offset: u32, width: u8, height: u8) -> Sprite {
    Sprite {
        image_buffer_offset: offset,
        width,
        height,
        visual_width: width,
        visual_height: height,
        ..Default::default()
    }
}

/// Descriptor set with a dummy sprite, two real sprites and one animation.
pub fn des(clear: bool, fill: u8) -> Des {
    let mut image_data = vec![fill; 10];
    image_data[1] = 0xA1;
    let animation = Animation::from_frames(vec![
        (
            AnimationFrame { x: 0, y: 0, width: 2, height: 2 },
            vec![AnimationLayer { flags: 0, x: 0, y: 0, sprite_index: 1 }],
        ),
        (
            AnimationFrame { x: 1, y: 0, width: 3, height: 2 },
            vec![AnimationLayer { flags: 1, x: 1, y: 0, sprite_index: 2 }],
        ),
    ])
    .expect("animation");
    Des {
        requires_background_clearing: clear,
        image_data,
        sprites: vec![sprite(0, 0, 0), sprite(0, 2, 2), sprite(4, 3, 2)],
        animations: vec![animation],
    }
}

/// State table with `etats` primary states of two sub-states each.
pub fn eta(etats: u8) -> Eta {
    Eta {
        states: (0..etats)
            .map(|e| {
                (0..2)
                    .map(|s| EtaState { animation_index: e + s, animation_speed: 4, ..Default::default() })
                    .collect()
            })
            .collect(),
    }
}

pub fn fix_file() -> AllfixFile {
    AllfixFile {
        des_items: vec![des(true, 7)],
        eta: vec![eta(2)],
        trailing: vec![0xDE, 0xAD],
    }
}

pub fn world_file() -> WorldFile {
    WorldFile {
        plan0_num_pcx: vec![0, 1],
        des_items: vec![des(false, 9)],
        eta: vec![eta(1)],
        trailing: Vec::new(),
    }
}

fn indexed(width: u16, height: u16) -> Vec<u8> {
    (0..height as usize)
        .flat_map(|y| (0..width as usize).map(move |x| ((x + y) % 256) as u8))
        .collect()
}

pub fn background_archive() -> FileArchive {
    let normal = to_bytes(&Pcx::from_indexed(NORMAL_BG.0, NORMAL_BG.1, &indexed(NORMAL_BG.0, NORMAL_BG.1)).expect("pcx"))
        .expect("pcx bytes");
    let parallax = to_bytes(
        &Pcx::from_indexed(PARALLAX_BG.0, PARALLAX_BG.1, &indexed(PARALLAX_BG.0, PARALLAX_BG.1)).expect("pcx"),
    )
    .expect("pcx bytes");
    FileArchive::from_files([("FND00.PCX", 0x00, normal.as_slice()), ("FND01.PCX", 0x5A, parallax.as_slice())])
        .expect("archive")
}

/// Three objects: 0 and 1 linked, 2 unlinked.
pub fn objects() -> (Vec<u16>, Vec<ObjData>) {
    let objects = vec![
        ObjData { des_index: 1, anim_index: 1, eta_index: 0, x: 10, y: 20, obj_type: 3, hit_points: 2, ..Default::default() },
        ObjData { des_index: 2, anim_index: 2, eta_index: 1, x: -4, y: 8, obj_type: 5, etat: 0, sub_etat: 1, ..Default::default() },
        ObjData { des_index: 0, anim_index: 0, eta_index: 0, x: 100, y: 0, obj_type: 7, etat: 1, ..Default::default() },
    ];
    (vec![1, 0, 2], objects)
}

pub fn level_file(fnd_index: u8, scroll_diff_fnd_index: u8) -> LevFile {
    let mut map_data = MapData::new(MAP_CELLS.0, MAP_CELLS.1);
    map_data.color_palettes[0] = raw_palette();
    for (i, tile) in map_data.tiles.iter_mut().enumerate() {
        tile.tile_index = (i % 2) as u16;
        tile.collision_type = i as u8;
    }
    let (obj_linking_table, objects) = objects();
    LevFile {
        map_data,
        fnd_index,
        scroll_diff_fnd_index,
        tile_texture_data: TileTextureData::new(
            vec![TileTexture::opaque(vec![250; TILE_PIXELS])],
            vec![TileTexture::transparent(vec![255; TILE_PIXELS], vec![0xFF; TILE_PIXELS])],
        ),
        obj_linking_table,
        objects,
        commands: vec![0x01, 0x02, 0xFF],
    }
}

/// A game directory on disk.
pub struct GameDir {
    pub dir: TempDir,
}

impl GameDir {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn level_path(&self) -> PathBuf {
        self.file(&paths::level_file(&settings()))
    }

    pub fn level_bytes(&self) -> Vec<u8> {
        std::fs::read(self.level_path()).expect("read level")
    }
}

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    std::fs::write(path, bytes).expect("write file");
}

/// Write a game directory holding `level`.
pub fn game_dir_with(level: &LevFile, with_backgrounds: bool) -> GameDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();
    let settings = settings();
    write(root, paths::FIX_FILE, &to_bytes(&fix_file()).expect("fix"));
    write(root, &paths::world_file(&settings), &to_bytes(&world_file()).expect("world"));
    write(root, &paths::level_file(&settings), &to_bytes(level).expect("level"));
    if with_backgrounds {
        write(root, paths::VIG_FILE, &to_bytes(&background_archive()).expect("archive"));
    }
    GameDir { dir }
}

/// Game directory with a level using both backgrounds.
pub fn game_dir() -> GameDir {
    game_dir_with(&level_file(0, 1), true)
}
