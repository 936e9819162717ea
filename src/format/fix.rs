//! Fix data (`ALLFIX.DAT`) and world data (`RAY{n}.WLD`).
//!
//! Both files start with a pointer header locating a DES block and an ETA
//! block. World files additionally carry the per-level background table.

use super::des::{read_des_block, write_des_block, Des};
use super::eta::{read_eta_block, write_eta_block, Eta};
use super::write_util::count_as;
use super::{Reader, Record, Writer};
use crate::util::Result;

/// Globally shared sprites and states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllfixFile {
    pub des_items: Vec<Des>,
    pub eta: Vec<Eta>,
    /// Unparsed data after the ETA block
    pub trailing: Vec<u8>,
}

impl Record for AllfixFile {
    const NAME: &'static str = "AllfixFile";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let des_pointer = r.read_pointer()?;
        let eta_pointer = r.read_pointer()?;

        r.seek(des_pointer as u64)?;
        let des_items = read_des_block(r)?;

        r.seek(eta_pointer as u64)?;
        let eta = read_eta_block(r)?;

        Ok(Self {
            des_items,
            eta,
            trailing: r.read_to_end(),
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        let des_slot = w.reserve_pointer()?;
        let eta_slot = w.reserve_pointer()?;

        w.patch_pointer(des_slot)?;
        write_des_block(w, &self.des_items)?;

        w.patch_pointer(eta_slot)?;
        write_eta_block(w, &self.eta)?;

        w.write_bytes(&self.trailing)
    }
}

/// Per-world sprites, states and background table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldFile {
    /// Background archive entry for each level FND index
    pub plan0_num_pcx: Vec<u8>,
    pub des_items: Vec<Des>,
    pub eta: Vec<Eta>,
    pub trailing: Vec<u8>,
}

impl WorldFile {
    /// Archive entry index for a level's FND index.
    pub fn background_entry(&self, fnd_index: u8) -> Option<usize> {
        self.plan0_num_pcx.get(fnd_index as usize).map(|&i| i as usize)
    }
}

impl Record for WorldFile {
    const NAME: &'static str = "WorldFile";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let des_pointer = r.read_pointer()?;
        let eta_pointer = r.read_pointer()?;
        let plan0_count = r.read_u8()? as usize;
        let plan0_num_pcx = r.read_bytes(plan0_count)?.to_vec();

        r.seek(des_pointer as u64)?;
        let des_items = read_des_block(r)?;

        r.seek(eta_pointer as u64)?;
        let eta = read_eta_block(r)?;

        Ok(Self {
            plan0_num_pcx,
            des_items,
            eta,
            trailing: r.read_to_end(),
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        let des_slot = w.reserve_pointer()?;
        let eta_slot = w.reserve_pointer()?;
        w.write_u8(count_as(self.plan0_num_pcx.len(), "background entries")?)?;
        w.write_bytes(&self.plan0_num_pcx)?;

        w.patch_pointer(des_slot)?;
        write_des_block(w, &self.des_items)?;

        w.patch_pointer(eta_slot)?;
        write_eta_block(w, &self.eta)?;

        w.write_bytes(&self.trailing)
    }
}
