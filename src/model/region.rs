//! Region descriptions: free-text phrases grounded in image regions.

use serde::{Deserialize, Serialize};
use super::{BBox, Image};

/// One described region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: u64,
    pub image_id: u64,
    pub phrase: String,
    pub bbox: BBox,
}

impl Region {
    pub fn new(id: u64, image_id: u64, phrase: impl Into<String>, bbox: BBox) -> Self {
        Self { id, image_id, phrase: phrase.into(), bbox }
    }
}

/// All region descriptions of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRegions {
    pub image: Image,
    pub regions: Vec<Region>,
}
