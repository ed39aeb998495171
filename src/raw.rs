//! Raw record shapes as they appear in the dataset JSON files.
//!
//! These mirror the on-disk layout; unknown keys are carried through in
//! `extra` so a record read and written back loses nothing.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::model::{BBox, Image};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Pixel coordinates: whole numbers are written as integers, as in the
/// dataset files.
fn serialize_coord<S: Serializer>(v: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}

/// An object mention inside a scene graph record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObject {
    pub object_id: u64,
    /// Set on objects that come from the auxiliary (GuessWhat?!) annotations.
    #[serde(default, skip_serializing_if = "is_false")]
    pub guesswhat: bool,
    #[serde(serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y: f64,
    #[serde(rename = "w", alias = "width", serialize_with = "serialize_coord")]
    pub width: f64,
    #[serde(rename = "h", alias = "height", serialize_with = "serialize_coord")]
    pub height: f64,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub synsets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situated_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_attributes: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawObject {
    pub fn new(object_id: u64, bbox: BBox) -> Self {
        Self {
            object_id,
            guesswhat: false,
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            names: Vec::new(),
            synsets: Vec::new(),
            attributes: None,
            situated_attributes: None,
            abstract_attributes: None,
            extra: Map::new(),
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.width, self.height)
    }
}

/// A relationship record. Endpoints are primary-source object ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRelationship {
    pub relationship_id: u64,
    pub predicate: String,
    pub subject_id: u64,
    pub object_id: u64,
    #[serde(default)]
    pub synsets: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The object snapshot inside an attribute record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttributeEntry {
    pub object_id: u64,
    #[serde(serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y: f64,
    #[serde(rename = "w", alias = "width", serialize_with = "serialize_coord")]
    pub width: f64,
    #[serde(rename = "h", alias = "height", serialize_with = "serialize_coord")]
    pub height: f64,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub synsets: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawAttributeEntry {
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.width, self.height)
    }
}

/// One attribute annotation, as produced by attribute grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttributeRecord {
    pub attribute_id: u64,
    pub attribute: RawAttributeEntry,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-image scene graph record (`scene_graphs.json` element or `by-id/<id>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(alias = "id")]
    pub image_id: u64,
    #[serde(default)]
    pub objects: Vec<RawObject>,
    #[serde(default)]
    pub relationships: Vec<RawRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<RawAttributeRecord>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SceneRecord {
    pub fn new(image_id: u64) -> Self {
        Self {
            image_id,
            objects: Vec::new(),
            relationships: Vec::new(),
            attributes: None,
            extra: Map::new(),
        }
    }
}

/// Element of `attributes.json`: all attribute entries of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttributes {
    pub image_id: u64,
    #[serde(default)]
    pub attributes: Vec<RawAttributeEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Element of `image_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(alias = "image_id")]
    pub id: u64,
    #[serde(default)]
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub coco_id: Option<u64>,
    #[serde(default)]
    pub flickr_id: Option<u64>,
}

impl From<ImageRecord> for Image {
    fn from(r: ImageRecord) -> Self {
        Image {
            id: r.id,
            url: r.url,
            width: r.width,
            height: r.height,
            coco_id: r.coco_id,
            flickr_id: r.flickr_id,
        }
    }
}

/// An object from the auxiliary dataset, keyed by category code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryObject {
    pub id: u64,
    pub category: String,
    /// `[x, y, width, height]`
    pub bbox: [f64; 4],
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Auxiliary annotations for one image (`gw_vg_mapping.json` value, keyed by COCO id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryImage {
    #[serde(default)]
    pub gw_objects: Vec<AuxiliaryObject>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One region of `region_descriptions.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRegion {
    #[serde(alias = "id")]
    pub region_id: u64,
    #[serde(default)]
    pub image_id: Option<u64>,
    pub phrase: String,
    #[serde(serialize_with = "serialize_coord")]
    pub x: f64,
    #[serde(serialize_with = "serialize_coord")]
    pub y: f64,
    #[serde(alias = "w", serialize_with = "serialize_coord")]
    pub width: f64,
    #[serde(alias = "h", serialize_with = "serialize_coord")]
    pub height: f64,
}

impl RawRegion {
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Element of `region_descriptions.json`: all regions of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(alias = "image_id")]
    pub id: u64,
    #[serde(default)]
    pub regions: Vec<RawRegion>,
}

/// One question-answer pair of `question_answers.json`.
///
/// `q_objects` / `a_objects` are the objects grounded in the question and
/// in the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuestionAnswer {
    #[serde(alias = "id")]
    pub qa_id: u64,
    #[serde(default)]
    pub image_id: Option<u64>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub q_objects: Vec<RawObject>,
    #[serde(default)]
    pub a_objects: Vec<RawObject>,
}

/// Element of `question_answers.json`: all QAs of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswerRecord {
    #[serde(alias = "image_id")]
    pub id: u64,
    #[serde(default)]
    pub qas: Vec<RawQuestionAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_accepts_both_size_spellings() {
        let short: RawObject = serde_json::from_str(
            r#"{"object_id": 1, "x": 0, "y": 0, "w": 5, "h": 6, "names": ["cat"]}"#,
        ).unwrap();
        let long: RawObject = serde_json::from_str(
            r#"{"object_id": 1, "x": 0, "y": 0, "width": 5, "height": 6, "names": ["cat"]}"#,
        ).unwrap();
        assert_eq!(short, long);
        assert_eq!(short.bbox(), BBox::new(0.0, 0.0, 5.0, 6.0));
    }

    #[test]
    fn test_whole_coordinates_written_as_integers() {
        let o: RawObject = serde_json::from_str(
            r#"{"object_id": 1, "x": 1, "y": 2.5, "w": 5, "h": 6}"#,
        ).unwrap();
        let json = serde_json::to_string(&o).unwrap();
        assert!(json.contains(r#""x":1,"#), "{json}");
        assert!(json.contains(r#""y":2.5,"#), "{json}");
        assert!(json.contains(r#""w":5,"#), "{json}");
        assert!(json.contains(r#""h":6"#), "{json}");

        let back: RawObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bbox(), o.bbox());
    }

    #[test]
    fn test_object_missing_geometry_is_rejected() {
        let err = serde_json::from_str::<RawObject>(r#"{"object_id": 1, "x": 0, "y": 0}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = r#"{"image_id": 3, "objects": [], "relationships": [], "source": "vg"}"#;
        let record: SceneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.extra.get("source"), Some(&Value::from("vg")));
        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["source"], "vg");
        assert_eq!(back["image_id"], 3);
    }

    #[test]
    fn test_image_record_accepts_image_id() {
        let r: ImageRecord = serde_json::from_str(
            r#"{"image_id": 9, "url": "u", "width": 800, "height": 600, "coco_id": null}"#,
        ).unwrap();
        let image: Image = r.into();
        assert_eq!(image.id, 9);
        assert_eq!(image.coco_id, None);
    }
}
