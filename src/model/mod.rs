//! # Scene Graph Model
//!
//! Clean DTOs that define a per-image scene graph.
//! These types cross every boundary: builder ↔ synthesizer ↔ export ↔ user.
//!
//! Design rule: NO file paths, NO ontology handles here.
//! This module is pure data: no I/O, no caches.

pub mod image;
pub mod object;
pub mod relationship;
pub mod attribute;
pub mod sense;
pub mod graph;
pub mod region;
pub mod qa;

pub use image::Image;
pub use object::{BBox, Corners, Object, ObjectId, AUXILIARY_PREFIX};
pub use relationship::Relationship;
pub use attribute::Attribute;
pub use sense::{Sense, SenseRef};
pub use graph::Graph;
pub use region::{ImageRegions, Region};
pub use qa::{ImageQuestions, QuestionAnswer};
