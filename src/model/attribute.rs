//! Attribute record attached to an object.

use serde::{Deserialize, Serialize};
use super::{Object, ObjectId, SenseRef};

/// One attribute annotation.
///
/// `object` is the snapshot carried by the attribute record itself (geometry,
/// names, senses), independent of the graph's merged object. `target` is the
/// id of the merged object it annotates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: u64,
    pub target: ObjectId,
    pub object: Object,
    pub values: Vec<String>,
    pub senses: Vec<SenseRef>,
}

impl Attribute {
    pub fn new(id: u64, object: Object, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id,
            target: object.id,
            object,
            values: values.into_iter().map(Into::into).collect(),
            senses: Vec::new(),
        }
    }

    pub fn with_senses(mut self, senses: impl IntoIterator<Item = impl Into<SenseRef>>) -> Self {
        self.senses = senses.into_iter().map(Into::into).collect();
        self
    }
}
