//! Graph: one image with its objects, relationships and attributes.

use serde::{Deserialize, Serialize};
use super::{Attribute, Image, Object, ObjectId, Relationship};

/// A per-image scene graph.
///
/// Invariant: every id referenced by a relationship endpoint or an
/// attribute target is present in `objects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub image: Image,
    /// Objects in insertion order.
    pub objects: Vec<Object>,
    pub relationships: Vec<Relationship>,
    pub attributes: Vec<Attribute>,
}

impl Graph {
    pub fn new(image: Image) -> Self {
        Self {
            image,
            objects: Vec::new(),
            relationships: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Relationships whose subject or object is `id`.
    pub fn relationships_of(&self, id: ObjectId) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter().filter(move |r| r.other_end(id).is_some())
    }

    pub fn attributes_of(&self, id: ObjectId) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(move |a| a.target == id)
    }

    /// Check that every relationship endpoint and attribute target exists.
    pub fn is_consistent(&self) -> bool {
        let known = |id: ObjectId| self.objects.iter().any(|o| o.id == id);
        self.relationships.iter().all(|r| known(r.subject) && known(r.object))
            && self.attributes.iter().all(|a| known(a.target))
    }
}
