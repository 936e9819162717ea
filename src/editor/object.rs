//! Placed objects and their resolved references.

use std::sync::Arc;

use super::animation::{AnimationSet, CommonAnimation};
use super::link::init_link_groups;
use super::sprites::{DesTables, LoadedDes};
use crate::format::{Eta, EtaState, ObjData};
use crate::util::{Error, IVec2, Result};

/// An object of the loaded level.
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Record written back on save
    pub data: ObjData,
    /// 0 = unlinked, otherwise the chain id
    pub link_group: u32,
    /// Sprites, `None` for DES index 0
    pub des: Option<Arc<LoadedDes>>,
    /// Animations, `None` for animation index 0
    pub animations: Option<Arc<AnimationSet>>,
    pub eta: Arc<Eta>,
}

impl GameObject {
    #[inline]
    pub fn position(&self) -> IVec2 {
        IVec2::new(self.data.x as i32, self.data.y as i32)
    }

    /// Move the object. Coordinates are stored as 16-bit values.
    pub fn set_position(&mut self, pos: IVec2) -> Result<()> {
        let x = i16::try_from(pos.x).map_err(|_| Error::InvalidFieldValue {
            field: "Position X",
            value: pos.x as i64,
        })?;
        let y = i16::try_from(pos.y).map_err(|_| Error::InvalidFieldValue {
            field: "Position Y",
            value: pos.y as i64,
        })?;
        self.data.x = x;
        self.data.y = y;
        Ok(())
    }

    /// Current state entry, if `(etat, sub_etat)` exists in the state table.
    pub fn state(&self) -> Option<&EtaState> {
        self.eta.state(self.data.etat, self.data.sub_etat)
    }

    /// Animation played in the current state.
    pub fn current_animation(&self) -> Option<&CommonAnimation> {
        let state = self.state()?;
        self.animations.as_ref()?.get(state.animation_index as usize)
    }
}

fn lookup<T: Clone>(table: &[T], index: u32, name: &'static str) -> Result<T> {
    table
        .get(index as usize)
        .cloned()
        .ok_or_else(|| Error::out_of_range(name, index as usize, table.len()))
}

/// Build objects in record order and assign link groups.
///
/// Every DES, animation and ETA index must resolve.
#[tracing::instrument(skip_all, fields(count = records.len()))]
pub fn load_objects(
    records: &[ObjData],
    link_table: &[u16],
    tables: &DesTables,
    eta: &[Arc<Eta>],
) -> Result<Vec<GameObject>> {
    let mut objects = records
        .iter()
        .enumerate()
        .map(|(i, data)| {
            let obj = GameObject {
                des: lookup(&tables.des, data.des_index, "DES")?,
                animations: lookup(&tables.animations, data.anim_index, "animation")?,
                eta: lookup(eta, data.eta_index, "ETA")?,
                data: data.clone(),
                link_group: 0,
            };
            tracing::trace!(
                index = i,
                obj_type = data.obj_type,
                x = data.x,
                y = data.y,
                "resolved object"
            );
            Ok(obj)
        })
        .collect::<Result<Vec<_>>>()
        .map_err(|e| {
            tracing::error!(error = %e, "failed to resolve object references");
            e
        })?;

    let groups = init_link_groups(link_table, objects.len())?;
    for (obj, group) in objects.iter_mut().zip(groups) {
        obj.link_group = group;
    }
    tracing::debug!(
        objects = objects.len(),
        linked = objects.iter().filter(|o| o.link_group != 0).count(),
        "assembled objects"
    );
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(count: usize) -> DesTables {
        DesTables {
            des: vec![None; count],
            animations: vec![None; count],
        }
    }

    #[test]
    fn test_resolve_and_link() {
        let eta = vec![Arc::new(Eta::default()), Arc::new(Eta::default())];
        let records = vec![
            ObjData { eta_index: 1, x: 4, y: -2, ..Default::default() },
            ObjData::default(),
        ];
        let objects = load_objects(&records, &[1, 0], &tables(1), &eta).unwrap();
        assert_eq!(objects.len(), 2);
        assert!(Arc::ptr_eq(&objects[0].eta, &eta[1]));
        assert_eq!(objects[0].position(), IVec2::new(4, -2));
        assert_eq!(objects[0].link_group, 1);
        assert_eq!(objects[1].link_group, 1);
        assert!(objects[0].des.is_none());
    }

    #[test]
    fn test_bad_index_is_fatal() {
        let eta = vec![Arc::new(Eta::default())];
        for data in [
            ObjData { des_index: 2, ..Default::default() },
            ObjData { anim_index: 2, ..Default::default() },
            ObjData { eta_index: 1, ..Default::default() },
        ] {
            let err = load_objects(&[data], &[0], &tables(2), &eta).unwrap_err();
            assert!(matches!(err, Error::IndexOutOfRange { .. }), "{}", err);
        }
    }

    #[test]
    fn test_set_position_range() {
        let eta = vec![Arc::new(Eta::default())];
        let mut obj = load_objects(&[ObjData::default()], &[0], &tables(1), &eta).unwrap().remove(0);
        obj.set_position(IVec2::new(-300, 700)).unwrap();
        assert_eq!((obj.data.x, obj.data.y), (-300, 700));
        assert!(obj.set_position(IVec2::new(40_000, 0)).is_err());
        assert_eq!(obj.position(), IVec2::new(-300, 700));
    }
}
