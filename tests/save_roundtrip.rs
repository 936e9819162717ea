//! Integration tests for saving edited levels.

mod common;

use r1edit::editor::{build_link_table, state_value, EditorSession, MemoryTextureManager};
use r1edit::format::{from_bytes, to_bytes, LevFile, MapTile};
use r1edit::util::IVec2;
use r1edit::Error;

fn load(game: &common::GameDir) -> EditorSession<MemoryTextureManager> {
    let mut session = EditorSession::new(game.path(), MemoryTextureManager::new());
    session.load(common::settings()).expect("load");
    session
}

fn saved_level(game: &common::GameDir) -> LevFile {
    from_bytes(&game.level_bytes()).expect("decode saved level")
}

#[test]
fn test_save_unchanged_is_identical() {
    let game = common::game_dir();
    let before = game.level_bytes();

    let session = load(&game);
    session.save().expect("save");
    assert_eq!(game.level_bytes(), before);
}

#[test]
fn test_save_without_level() {
    let game = common::game_dir();
    let session = EditorSession::new(game.path(), MemoryTextureManager::new());
    assert!(matches!(session.save(), Err(Error::NoLevelLoaded)));
}

#[test]
fn test_field_edits_persist() {
    let game = common::game_dir();
    let mut session = load(&game);

    session.set_field(0, "HitPoints", 7).expect("hit points");
    session.set_field(0, "Position X", -300).expect("x");
    session.set_field(2, "State", state_value(1, 1)).expect("state");
    session.set_field(1, "Type", 42).expect("type");
    session.save().expect("save");

    let lev = saved_level(&game);
    assert_eq!(lev.objects[0].hit_points, 7);
    assert_eq!(lev.objects[0].x, -300);
    assert_eq!((lev.objects[2].etat, lev.objects[2].sub_etat), (1, 1));
    assert_eq!(lev.objects[1].obj_type, 42);

    // Untouched parts survive
    let original = common::level_file(0, 1);
    assert_eq!(lev.obj_linking_table, original.obj_linking_table);
    assert_eq!(lev.commands, original.commands);
    assert_eq!(lev.tile_texture_data, original.tile_texture_data);
    assert_eq!(lev.map_data, original.map_data);

    // A fresh session sees the edits
    drop(session);
    let session = load(&game);
    assert_eq!(session.get_field(0, "HitPoints").expect("get"), 7);
    assert_eq!(session.get_field(0, "Position X").expect("get"), -300);
}

#[test]
fn test_invalid_field_values() {
    let game = common::game_dir();
    let mut session = load(&game);

    assert!(matches!(
        session.set_field(0, "HitPoints", 300),
        Err(Error::InvalidFieldValue { field: "HitPoints", value: 300 })
    ));
    assert!(session.set_field(0, "Position Y", 40_000).is_err());
    // Object 1 uses the world table, which has no etat 1
    assert!(session.set_field(1, "State", state_value(1, 0)).is_err());
    assert!(session.set_field(5, "HitPoints", 1).is_err());
    assert!(session.set_field(0, "Speed", 1).is_err());

    assert_eq!(session.get_field(0, "HitPoints").expect("get"), 2);
    let before = game.level_bytes();
    session.save().expect("save");
    assert_eq!(game.level_bytes(), before);
}

#[test]
fn test_tile_and_position_edits() {
    let game = common::game_dir();
    let mut session = load(&game);
    {
        let data = session.data_mut().expect("loaded");
        let map = data.tile_map_mut().expect("map");
        map.set_tile(2, 1, MapTile { tile_index: 0, collision_type: 9, transparency_mode: 0 })
            .expect("set tile");
        assert!(map.set_tile(3, 0, MapTile::default()).is_err());
        data.object_mut(2).expect("object").set_position(IVec2::new(5, -6)).expect("move");
        assert!(data.object_mut(2).expect("object").set_position(IVec2::new(70_000, 0)).is_err());
    }
    session.save().expect("save");

    let lev = saved_level(&game);
    let tile = lev.map_data.tiles[common::MAP_CELLS.0 as usize + 2];
    assert_eq!((tile.tile_index, tile.collision_type), (0, 9));
    assert_eq!((lev.objects[2].x, lev.objects[2].y), (5, -6));
}

#[test]
fn test_link_edit_rebuilds_table() {
    let game = common::game_dir();
    let mut session = load(&game);
    {
        let data = session.data_mut().expect("loaded");
        let group = data.objects[0].link_group;
        data.objects[2].link_group = group;
        assert!(data.links_changed());
        assert_eq!(data.linked_objects(group), vec![0, 1, 2]);
    }
    session.save().expect("save");

    let lev = saved_level(&game);
    assert_eq!(lev.obj_linking_table, vec![1, 2, 0]);
    assert_eq!(lev.obj_linking_table, build_link_table(&[1, 1, 1]).expect("table"));

    // Reloading recovers a single group of three
    drop(session);
    let session = load(&game);
    let data = session.data().expect("loaded");
    let groups = data.link_groups();
    assert!(groups.iter().all(|&g| g != 0 && g == groups[0]));
}

#[test]
fn test_unlink_all() {
    let game = common::game_dir();
    let mut session = load(&game);
    session
        .data_mut()
        .expect("loaded")
        .objects
        .iter_mut()
        .for_each(|o| o.link_group = 0);
    session.save().expect("save");
    assert_eq!(saved_level(&game).obj_linking_table, vec![0, 1, 2]);
}

#[test]
fn test_resave_written_level() {
    // A level written by the encoder reads back to the same record
    let level = common::level_file(1, 0);
    let game = common::game_dir_with(&level, true);
    assert_eq!(game.level_bytes(), to_bytes(&level).expect("encode"));
    let session = load(&game);
    session.save().expect("save");
    assert_eq!(saved_level(&game), level);
}
