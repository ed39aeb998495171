//! Object (scene node) in the graph.

use serde::{Deserialize, Serialize};
use super::SenseRef;

/// Prefix used when an auxiliary-source identifier is rendered as a string.
pub const AUXILIARY_PREFIX: &str = "gw_";

/// Scoped object identifier.
///
/// Visual Genome and the auxiliary (GuessWhat?!) annotations share a raw
/// numeric id space, so the source is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectId {
    Primary(u64),
    Auxiliary(u64),
}

impl ObjectId {
    pub fn scoped(raw: u64, auxiliary: bool) -> Self {
        if auxiliary {
            ObjectId::Auxiliary(raw)
        } else {
            ObjectId::Primary(raw)
        }
    }

    pub fn raw(&self) -> u64 {
        match self {
            ObjectId::Primary(id) | ObjectId::Auxiliary(id) => *id,
        }
    }

    pub fn is_auxiliary(&self) -> bool {
        matches!(self, ObjectId::Auxiliary(_))
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectId::Primary(id) => write!(f, "{id}"),
            ObjectId::Auxiliary(id) => write!(f, "{AUXILIARY_PREFIX}{id}"),
        }
    }
}

/// Axis-aligned bounding box in pixel coordinates (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Corner form of a box: `(x1, y1)` top-left, `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn corners(&self) -> Corners {
        Corners {
            x1: self.x,
            y1: self.y,
            x2: self.x + self.width,
            y2: self.y + self.height,
        }
    }
}

impl From<[f64; 4]> for BBox {
    fn from(b: [f64; 4]) -> Self {
        BBox::new(b[0], b[1], b[2], b[3])
    }
}

/// An annotated object in a scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub bbox: BBox,
    pub names: Vec<String>,
    pub senses: Vec<SenseRef>,
    /// Final attribute list as stored in the per-image file.
    pub attributes: Vec<String>,
    /// Attributes derived from the object's placement in its image.
    pub situated_attributes: Vec<String>,
    /// Attributes derived from the object's category.
    pub abstract_attributes: Vec<String>,
}

impl Object {
    pub fn new(id: ObjectId, bbox: BBox) -> Self {
        Self {
            id,
            bbox,
            names: Vec::new(),
            senses: Vec::new(),
            attributes: Vec::new(),
            situated_attributes: Vec::new(),
            abstract_attributes: Vec::new(),
        }
    }

    pub fn with_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_senses(mut self, senses: impl IntoIterator<Item = impl Into<SenseRef>>) -> Self {
        self.senses = senses.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Name of the first sense, which drives category lookup.
    pub fn primary_sense(&self) -> Option<&str> {
        self.senses.first().map(SenseRef::name)
    }
}
