//! Visual Relationship Detection (VRD) import.
//!
//! VRD files carry objects with inline attributes and relationships that
//! point at objects by their position in the image's object list.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::SkipCounts;
use crate::model::{Attribute, BBox, Graph, Image, Object, ObjectId, Relationship};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrdBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrdAttribute {
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrdObject {
    pub bbox: VrdBox,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<VrdAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrdRelationship {
    /// `[subject_index, object_index]`
    pub objects: Vec<usize>,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrdRecord {
    pub photo_id: u64,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub objects: Vec<VrdObject>,
    #[serde(default)]
    pub relationships: Vec<VrdRelationship>,
}

/// Build a graph from one VRD record.
///
/// Object ids are list positions; attribute ids restart at 0 for every
/// object. Relationships pointing past the object list are skipped.
pub fn parse_vrd_graph(record: &VrdRecord) -> Result<(Graph, SkipCounts)> {
    let image = Image::new(record.photo_id, record.filename.clone(), record.width, record.height);
    let mut graph = Graph::new(image);
    let mut skips = SkipCounts::default();

    for (i, o) in record.objects.iter().enumerate() {
        let b = &o.bbox;
        let object = Object::new(ObjectId::Primary(i as u64), BBox::new(b.x, b.y, b.w, b.h))
            .with_names(o.names.iter().cloned());
        for (j, a) in o.attributes.iter().enumerate() {
            graph.attributes.push(Attribute::new(j as u64, object.clone(), [a.attribute.clone()]));
        }
        graph.objects.push(object);
    }

    for (i, r) in record.relationships.iter().enumerate() {
        let [s, o] = r.objects.as_slice() else {
            return Err(Error::MissingField {
                record: format!("VRD photo {} relationship {i}", record.photo_id),
                field: "objects".into(),
            });
        };
        if *s >= graph.objects.len() || *o >= graph.objects.len() {
            skips.relationships += 1;
            continue;
        }
        graph.relationships.push(Relationship::new(
            i as u64,
            ObjectId::Primary(*s as u64),
            r.relationship.clone(),
            ObjectId::Primary(*o as u64),
        ));
    }

    Ok((graph, skips))
}

/// Load every record of a VRD JSON file as a graph.
pub fn load_vrd_graphs(path: impl AsRef<Path>) -> Result<Vec<Graph>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let records: Vec<VrdRecord> = serde_json::from_reader(reader)?;
    let mut skips = SkipCounts::default();
    let mut graphs = Vec::with_capacity(records.len());
    for record in &records {
        let (graph, s) = parse_vrd_graph(record)?;
        skips += s;
        graphs.push(graph);
    }
    tracing::info!(graphs = graphs.len(), %skips, "loaded VRD scene graphs");
    Ok(graphs)
}
