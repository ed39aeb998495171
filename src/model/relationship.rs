//! Relationship (edge) in the scene graph.

use serde::{Deserialize, Serialize};
use super::{ObjectId, SenseRef};

/// A directed `subject -[predicate]-> object` edge.
///
/// Endpoints are scoped ids into the owning graph's object sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: u64,
    pub subject: ObjectId,
    pub predicate: String,
    pub object: ObjectId,
    pub senses: Vec<SenseRef>,
}

impl Relationship {
    pub fn new(id: u64, subject: ObjectId, predicate: impl Into<String>, object: ObjectId) -> Self {
        Self {
            id,
            subject,
            predicate: predicate.into(),
            object,
            senses: Vec::new(),
        }
    }

    pub fn with_senses(mut self, senses: impl IntoIterator<Item = impl Into<SenseRef>>) -> Self {
        self.senses = senses.into_iter().map(Into::into).collect();
        self
    }

    /// The "other" end of the relationship from the given object.
    pub fn other_end(&self, from: ObjectId) -> Option<ObjectId> {
        if from == self.subject { Some(self.object) }
        else if from == self.object { Some(self.subject) }
        else { None }
    }
}
