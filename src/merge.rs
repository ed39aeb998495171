//! Entity merging: one `Object` per scoped identifier.
//!
//! A scene record may mention the same object several times (the object list
//! itself, relationship endpoints, attribute targets). The registry keeps the
//! first mention and hands back that same instance for every later one.

use hashbrown::HashMap;

use crate::model::{Object, ObjectId, SenseRef};
use crate::raw::RawObject;

/// Result of [`ObjectRegistry::merge_or_create`].
#[derive(Debug)]
pub struct MergeOutcome<'a> {
    pub object: &'a Object,
    /// True when this call inserted the object.
    pub created: bool,
}

/// Scoped identifier → `Object`, built incrementally for one graph.
///
/// Objects are kept in insertion order so the registry can be turned
/// straight into a graph's object sequence.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<Object>,
    index: HashMap<ObjectId, usize>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the registered object for `raw`'s scoped id, creating it first
    /// if this is the id's first mention.
    pub fn merge_or_create(&mut self, raw: &RawObject) -> MergeOutcome<'_> {
        let id = ObjectId::scoped(raw.object_id, raw.guesswhat);
        let (slot, created) = match self.index.get(&id).copied() {
            Some(slot) => (slot, false),
            None => {
                let slot = self.objects.len();
                self.objects.push(object_from_raw(id, raw));
                self.index.insert(id, slot);
                (slot, true)
            }
        };
        MergeOutcome { object: &self.objects[slot], created }
    }

    /// Look up an id that a relationship or attribute refers to.
    pub fn lookup(&self, id: ObjectId) -> Option<&Object> {
        self.index.get(&id).map(|&slot| &self.objects[slot])
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in first-mention order.
    pub fn into_objects(self) -> Vec<Object> {
        self.objects
    }
}

/// Build a fresh `Object` from a raw mention without touching the record.
///
/// Absent attribute lists become empty.
pub fn object_from_raw(id: ObjectId, raw: &RawObject) -> Object {
    Object {
        id,
        bbox: raw.bbox(),
        names: raw.names.clone(),
        senses: raw.synsets.iter().cloned().map(SenseRef::Unresolved).collect(),
        attributes: raw.attributes.clone().unwrap_or_default(),
        situated_attributes: raw.situated_attributes.clone().unwrap_or_default(),
        abstract_attributes: raw.abstract_attributes.clone().unwrap_or_default(),
    }
}
