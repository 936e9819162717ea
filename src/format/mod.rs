//! Binary records of the PC game data.
//!
//! Every structure implements [`Record`], reading from a [`Reader`] and
//! writing to a [`Writer`]. All values are little-endian.
//!
//! - [`fix`] - `ALLFIX.DAT` and `RAY{n}.WLD`
//! - [`level`] - `RAY{n}.LEV`
//! - [`des`] / [`eta`] - sprite sets and state tables shared by both
//! - [`archive`] - encoded multi-file archives such as `VIGNET.DAT`
//! - [`pcx`] - background images stored in archives

mod read_util;
mod record;
mod stream;
mod write_util;

pub mod archive;
pub mod des;
pub mod eta;
pub mod fix;
pub mod level;
pub mod pcx;

pub use archive::{ArchiveEntry, FileArchive};
pub use des::{Animation, AnimationFrame, AnimationLayer, Des, Sprite};
pub use eta::{Eta, EtaState};
pub use fix::{AllfixFile, WorldFile};
pub use level::{LevFile, MapData, MapTile, ObjData, RawPalette, TileTexture, TileTextureData};
pub use pcx::Pcx;
pub use read_util::Reader;
pub use record::{from_bytes, to_bytes, Record};
pub use stream::{FileData, LinearFile};
pub use write_util::Writer;
