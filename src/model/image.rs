//! Image metadata.

use serde::{Deserialize, Serialize};

/// One dataset image. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    /// Locator of the image file (URL for Visual Genome, file name for VRD).
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub coco_id: Option<u64>,
    pub flickr_id: Option<u64>,
}

impl Image {
    pub fn new(id: u64, url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            url: url.into(),
            width,
            height,
            coco_id: None,
            flickr_id: None,
        }
    }

    pub fn with_coco_id(mut self, coco_id: u64) -> Self {
        self.coco_id = Some(coco_id);
        self
    }
}
