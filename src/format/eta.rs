//! State tables (ETA).

use super::write_util::count_as;
use super::{Reader, Record, Writer};
use crate::util::Result;

/// One (etat, sub-etat) entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EtaState {
    pub right_speed: i8,
    pub left_speed: i8,
    /// Animation played while in this state
    pub animation_index: u8,
    pub linked_etat: u8,
    pub linked_sub_etat: u8,
    pub animation_speed: u8,
    pub sound_index: u8,
    pub interaction_type: u8,
}

impl Record for EtaState {
    const NAME: &'static str = "EtaState";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            right_speed: r.read_i8()?,
            left_speed: r.read_i8()?,
            animation_index: r.read_u8()?,
            linked_etat: r.read_u8()?,
            linked_sub_etat: r.read_u8()?,
            animation_speed: r.read_u8()?,
            sound_index: r.read_u8()?,
            interaction_type: r.read_u8()?,
        })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_i8(self.right_speed)?;
        w.write_i8(self.left_speed)?;
        w.write_u8(self.animation_index)?;
        w.write_u8(self.linked_etat)?;
        w.write_u8(self.linked_sub_etat)?;
        w.write_u8(self.animation_speed)?;
        w.write_u8(self.sound_index)?;
        w.write_u8(self.interaction_type)
    }
}

/// State table indexed by primary state (etat) then sub-state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eta {
    pub states: Vec<Vec<EtaState>>,
}

impl Eta {
    /// Look up a state, `None` if either index is out of range.
    pub fn state(&self, etat: u8, sub_etat: u8) -> Option<&EtaState> {
        self.states.get(etat as usize)?.get(sub_etat as usize)
    }

    /// Total number of (etat, sub-etat) entries.
    pub fn num_states(&self) -> usize {
        self.states.iter().map(Vec::len).sum()
    }
}

impl Record for Eta {
    const NAME: &'static str = "ETA";

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let etat_count = r.read_u8()? as usize;
        let mut states = Vec::with_capacity(etat_count);
        for _ in 0..etat_count {
            let sub_count = r.read_u8()? as usize;
            states.push(r.read_records(sub_count)?);
        }
        Ok(Self { states })
    }

    fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u8(count_as(self.states.len(), "etats")?)?;
        for subs in &self.states {
            w.write_u8(count_as(subs.len(), "sub-etats")?)?;
            w.write_records(subs)?;
        }
        Ok(())
    }
}

/// Read an ETA block: `u8` count followed by the tables.
pub fn read_eta_block(r: &mut Reader<'_>) -> Result<Vec<Eta>> {
    let count = r.read_u8()? as usize;
    tracing::trace!(count, pos = r.pos(), "reading ETA block");
    r.read_records(count)
}

/// Write an ETA block.
pub fn write_eta_block(w: &mut Writer, eta: &[Eta]) -> Result<()> {
    w.write_u8(count_as(eta.len(), "state tables")?)?;
    w.write_records(eta)
}
