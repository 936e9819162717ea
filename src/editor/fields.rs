//! Declarative object field editors.
//!
//! Each [`FieldDescriptor`] pairs a getter and setter over [`GameObject`]
//! with a value domain, so any front end can present and edit objects
//! without knowing the record layout.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use super::object::GameObject;
use crate::format::Eta;
use crate::util::{Error, Result};

/// Allowed values of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer in `min..=max`
    Int { min: i64, max: i64 },
    /// One of the object's states, see [`StateItemCache`]
    State,
}

/// A named, editable property of an object.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub info: Option<&'static str>,
    pub kind: FieldKind,
    getter: fn(&GameObject) -> i64,
    setter: fn(&mut GameObject, i64) -> Result<()>,
}

impl FieldDescriptor {
    pub fn get(&self, obj: &GameObject) -> i64 {
        (self.getter)(obj)
    }

    /// Set the field, rejecting values outside its domain.
    pub fn set(&self, obj: &mut GameObject, value: i64) -> Result<()> {
        if let FieldKind::Int { min, max } = self.kind {
            if !(min..=max).contains(&value) {
                return Err(Error::InvalidFieldValue { field: self.name, value });
            }
        }
        (self.setter)(obj, value)
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

const STATE_INFO: &str = "The object state (ETA), grouped by the primary state (etat) and \
sub-state (sub-etat). The state primarily determines which animation to play, but also other \
factors such as how the object should behave (based on the type).";

const HIT_POINTS_INFO: &str = "This value usually determines how many hits it takes to defeat \
the enemy. For non-enemy objects this can have other usages, such as determining the color or \
changing other specific attributes.";

/// Encode a state as a field value.
#[inline]
pub fn state_value(etat: u8, sub_etat: u8) -> i64 {
    (etat as i64) << 8 | sub_etat as i64
}

fn u8_value(field: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::InvalidFieldValue { field, value })
}

/// Fields shown for every object: position first, then the game fields.
pub fn object_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor {
            name: "Position X",
            info: None,
            kind: FieldKind::Int { min: i16::MIN as i64, max: i16::MAX as i64 },
            getter: |o| o.data.x as i64,
            setter: |o, v| {
                o.data.x = v as i16;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "Position Y",
            info: None,
            kind: FieldKind::Int { min: i16::MIN as i64, max: i16::MAX as i64 },
            getter: |o| o.data.y as i64,
            setter: |o, v| {
                o.data.y = v as i16;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "Type",
            info: None,
            kind: FieldKind::Int { min: 0, max: u16::MAX as i64 },
            getter: |o| o.data.obj_type as i64,
            setter: |o, v| {
                o.data.obj_type = v as u16;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "State",
            info: Some(STATE_INFO),
            kind: FieldKind::State,
            getter: |o| state_value(o.data.etat, o.data.sub_etat),
            setter: |o, v| {
                let etat = u8_value("State", v >> 8)?;
                let sub_etat = u8_value("State", v & 0xFF)?;
                if o.eta.state(etat, sub_etat).is_none() {
                    return Err(Error::InvalidFieldValue { field: "State", value: v });
                }
                o.data.etat = etat;
                o.data.sub_etat = sub_etat;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "HitPoints",
            info: Some(HIT_POINTS_INFO),
            kind: FieldKind::Int { min: 0, max: 255 },
            getter: |o| o.data.hit_points as i64,
            setter: |o, v| {
                o.data.hit_points = u8_value("HitPoints", v)?;
                Ok(())
            },
        },
        FieldDescriptor {
            name: "HitSprite",
            info: None,
            kind: FieldKind::Int { min: 0, max: 255 },
            getter: |o| o.data.hit_sprite as i64,
            setter: |o, v| {
                o.data.hit_sprite = u8_value("HitSprite", v)?;
                Ok(())
            },
        },
    ]
}

// ============================================================================
// State items
// ============================================================================

/// One selectable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateItem {
    pub label: String,
    pub etat: u8,
    pub sub_etat: u8,
}

impl StateItem {
    #[inline]
    pub fn value(&self) -> i64 {
        state_value(self.etat, self.sub_etat)
    }
}

/// Every state of a table, grouped by etat.
pub fn state_items(eta: &Eta) -> Vec<StateItem> {
    eta.states
        .iter()
        .enumerate()
        .flat_map(|(etat, subs)| {
            subs.iter().enumerate().map(move |(sub, state)| StateItem {
                label: format!("State {}-{} (Animation {})", etat, sub, state.animation_index),
                etat: etat as u8,
                sub_etat: sub as u8,
            })
        })
        .collect()
}

/// State items built lazily per state table.
///
/// Tables are identified by `Arc` identity; an entry whose table was dropped
/// is rebuilt if the address is reused.
#[derive(Debug, Default)]
pub struct StateItemCache {
    entries: HashMap<usize, (Weak<Eta>, Arc<[StateItem]>)>,
}

impl StateItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&mut self, eta: &Arc<Eta>) -> Arc<[StateItem]> {
        let key = Arc::as_ptr(eta) as usize;
        if let Some((table, items)) = self.entries.get(&key) {
            if table.upgrade().is_some_and(|t| Arc::ptr_eq(&t, eta)) {
                return items.clone();
            }
        }
        let items: Arc<[StateItem]> = state_items(eta).into();
        self.entries.insert(key, (Arc::downgrade(eta), items.clone()));
        items
    }

    /// Index of the object's current state among its items.
    pub fn selected_index(&mut self, obj: &GameObject) -> Option<usize> {
        self.items(&obj.eta)
            .iter()
            .position(|i| i.etat == obj.data.etat && i.sub_etat == obj.data.sub_etat)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{EtaState, ObjData};

    fn object() -> GameObject {
        let eta = Eta {
            states: vec![
                vec![EtaState { animation_index: 2, ..Default::default() }],
                vec![EtaState::default(), EtaState { animation_index: 9, ..Default::default() }],
            ],
        };
        GameObject {
            data: ObjData::default(),
            link_group: 0,
            des: None,
            animations: None,
            eta: Arc::new(eta),
        }
    }

    fn field(name: &str) -> FieldDescriptor {
        object_fields().into_iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn test_int_fields() {
        let mut obj = object();
        let hp = field("HitPoints");
        hp.set(&mut obj, 200).unwrap();
        assert_eq!(obj.data.hit_points, 200);
        assert_eq!(hp.get(&obj), 200);
        assert!(matches!(
            hp.set(&mut obj, 256),
            Err(Error::InvalidFieldValue { field: "HitPoints", value: 256 })
        ));
        assert!(hp.set(&mut obj, -1).is_err());

        field("Position X").set(&mut obj, -12).unwrap();
        field("Type").set(&mut obj, 161).unwrap();
        assert_eq!(obj.data.x, -12);
        assert_eq!(obj.data.obj_type, 161);
        assert!(field("Position Y").set(&mut obj, 40_000).is_err());
    }

    #[test]
    fn test_state_field() {
        let mut obj = object();
        let state = field("State");
        state.set(&mut obj, state_value(1, 1)).unwrap();
        assert_eq!((obj.data.etat, obj.data.sub_etat), (1, 1));
        assert_eq!(state.get(&obj), 0x101);
        assert!(state.set(&mut obj, state_value(0, 1)).is_err());
        assert!(state.set(&mut obj, -1).is_err());
        assert_eq!((obj.data.etat, obj.data.sub_etat), (1, 1));
    }

    #[test]
    fn test_state_items_cached_per_table() {
        let obj = object();
        let mut cache = StateItemCache::new();
        let items = cache.items(&obj.eta);
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].label, "State 1-1 (Animation 9)");
        assert!(Arc::ptr_eq(&items, &cache.items(&obj.eta)));
        assert_eq!(cache.selected_index(&obj), Some(0));

        let other = object();
        let other_items = cache.items(&other.eta);
        assert!(!Arc::ptr_eq(&items, &other_items));
        assert_eq!(cache.len(), 2);
    }
}
