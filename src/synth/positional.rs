//! Positional attributes from bounding-box geometry.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::{BBox, Image};

pub const RIGHT: &str = "right_image";
pub const LEFT: &str = "left_image";
pub const TOP: &str = "top_image";
pub const BOTTOM: &str = "bottom_image";
pub const CENTER: &str = "center";

/// At most one horizontal and one vertical tag, or `center` alone.
pub type PositionalTags = SmallVec<[&'static str; 2]>;

/// How the reference "center" box of an image is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenterRegion {
    /// Middle half of the image on each axis: `[W/4, 3W/4] × [H/4, 3H/4]`.
    ///
    /// Differs from the released per-image files on non-square images.
    #[default]
    Proportional,
    /// The box used by the released per-image files: origin `(H/4, H/4)`,
    /// side `W/4 + H/4`. Only square images get a centred box.
    Legacy,
}

impl CenterRegion {
    pub fn bbox(self, image: &Image) -> BBox {
        let quarter_w = f64::from(image.width) / 4.0;
        let quarter_h = f64::from(image.height) / 4.0;
        match self {
            CenterRegion::Proportional => BBox::new(quarter_w, quarter_h, 2.0 * quarter_w, 2.0 * quarter_h),
            CenterRegion::Legacy => {
                let side = quarter_w + quarter_h;
                BBox::new(quarter_h, quarter_h, side, side)
            }
        }
    }
}

/// Tag `bbox` by where it lies relative to the image's center region.
///
/// A box strictly beyond an edge of the region gets that side's tag
/// (horizontal first); a box overlapping the region on both axes gets
/// `center`.
pub fn positional_attributes(image: &Image, bbox: &BBox, region: CenterRegion) -> PositionalTags {
    let a = bbox.corners();
    let b = region.bbox(image).corners();
    let mut tags = PositionalTags::new();

    if a.x1 > b.x2 {
        tags.push(RIGHT);
    } else if b.x1 > a.x2 {
        tags.push(LEFT);
    }

    if a.y2 < b.y1 {
        tags.push(TOP);
    } else if a.y1 > b.y2 {
        tags.push(BOTTOM);
    }

    if tags.is_empty() {
        tags.push(CENTER);
    }
    tags
}
