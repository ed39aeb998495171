//! # Dataset Access
//!
//! File-level plumbing around the pipeline: image metadata, the per-image
//! scene graph files, and the one-time passes that produce them.
//!
//! ```text
//! scene_graphs.json ──group_attributes()──▶ scene_graphs.json (+ attributes)
//!                   ──repartition()───────▶ by-id/<image_id>.json (enriched)
//! by-id/<id>.json   ──SceneGraphLoader────▶ Graph
//! region_descriptions.json / question_answers.json ──▶ ImageRegions / ImageQuestions
//! ```

pub mod regions;
pub mod vrd;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::builder::{build_graph, resolve_senses, SkipCounts};
use crate::config::PipelineConfig;
use crate::model::{Graph, Image};
use crate::raw::{AuxiliaryImage, ImageAttributes, ImageRecord, RawAttributeRecord, SceneRecord};
use crate::sense::{SenseRepository, SenseTable, SimilarityCache};
use crate::synth::{AttributeSynthesizer, CategoryTable, SynthesisStats};
use crate::{Error, Result};

pub use regions::{
    load_all_qas, load_all_region_descriptions, load_region_descriptions,
    parse_question_answers, parse_region_descriptions,
};
pub use vrd::{load_vrd_graphs, parse_vrd_graph, VrdRecord};

// ============================================================================
// JSON helpers
// ============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, value)?;
    Ok(())
}

// ============================================================================
// Image metadata
// ============================================================================

/// All images of `image_data.json`, in file order.
pub fn load_image_data(path: impl AsRef<Path>) -> Result<Vec<Image>> {
    let records: Vec<ImageRecord> = read_json(path.as_ref())?;
    Ok(records.into_iter().map(Image::from).collect())
}

/// `image_data.json` keyed by image id.
pub fn load_image_index(path: impl AsRef<Path>) -> Result<HashMap<u64, Image>> {
    let images = load_image_data(path)?;
    Ok(images.into_iter().map(|image| (image.id, image)).collect())
}

// ============================================================================
// Scene records
// ============================================================================

pub fn read_scene_record(path: impl AsRef<Path>) -> Result<SceneRecord> {
    read_json(path.as_ref())
}

/// Every record of the monolithic `scene_graphs.json`.
pub fn read_scene_records(path: impl AsRef<Path>) -> Result<Vec<SceneRecord>> {
    read_json(path.as_ref())
}

/// Write `record` to `<dir>/<image_id>.json`, returning the path.
pub fn write_scene_record(dir: impl AsRef<Path>, record: &SceneRecord) -> Result<PathBuf> {
    let path = dir.as_ref().join(format!("{}.json", record.image_id));
    write_json(&path, record)?;
    Ok(path)
}

// ============================================================================
// SceneGraphLoader
// ============================================================================

/// Loads per-image scene graph files and turns them into resolved `Graph`s.
pub struct SceneGraphLoader<'r, R: ?Sized> {
    images: HashMap<u64, Image>,
    senses: SenseTable,
    config: PipelineConfig,
    repo: &'r R,
}

impl<'r, R: SenseRepository + ?Sized> SceneGraphLoader<'r, R> {
    /// Read image metadata and the sense table named by `config`.
    pub fn open(config: &PipelineConfig, repo: &'r R) -> Result<Self> {
        config.validate()?;
        let images = load_image_index(config.image_data_path())?;
        let senses = SenseTable::from_path(config.synsets_path())?;
        Self::from_parts(images, senses, config.clone(), repo)
    }

    pub fn from_parts(
        images: HashMap<u64, Image>,
        senses: SenseTable,
        config: PipelineConfig,
        repo: &'r R,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { images, senses, config, repo })
    }

    /// Keep only graphs with `min..=max` relationships in `load_scene_graphs`.
    pub fn with_relationship_bounds(mut self, min: usize, max: usize) -> Self {
        self.config.min_relationships = min;
        self.config.max_relationships = max;
        self
    }

    pub fn image(&self, image_id: u64) -> Option<&Image> {
        self.images.get(&image_id)
    }

    /// One resolved graph, or `None` if the image has no per-image file.
    ///
    /// An id missing from the image metadata is an error.
    pub fn load_scene_graph(&self, image_id: u64) -> Result<Option<(Graph, SkipCounts)>> {
        let image = self
            .image(image_id)
            .ok_or_else(|| Error::NotFound(format!("Image {image_id}")))?;

        let path = self.config.scene_graph_path(image_id);
        let record = match File::open(&path) {
            Ok(file) => serde_json::from_reader::<_, SceneRecord>(BufReader::new(file))?,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (graph, skips) = build_graph(&record, image.clone());
        let graph = resolve_senses(graph, &self.senses, self.repo)?;
        Ok(Some((graph, skips)))
    }

    /// Resolved graphs for `image_ids` whose relationship count is within
    /// the configured bounds, plus the skip counts over every loaded file.
    pub fn load_scene_graphs(
        &self,
        image_ids: impl IntoIterator<Item = u64>,
    ) -> Result<(Vec<Graph>, SkipCounts)> {
        self.config.validate()?;
        let bounds = self.config.min_relationships..=self.config.max_relationships;

        let mut graphs = Vec::new();
        let mut skips = SkipCounts::default();
        for image_id in image_ids {
            let Some((graph, s)) = self.load_scene_graph(image_id)? else {
                continue;
            };
            skips += s;
            let n_rels = graph.relationships.len();
            if bounds.contains(&n_rels) {
                graphs.push(graph);
            }
        }
        tracing::info!(graphs = graphs.len(), %skips, "loaded scene graphs");
        Ok((graphs, skips))
    }
}

// ============================================================================
// Attribute grouping
// ============================================================================

/// Attach the entries of `attributes.json` to their scene records.
///
/// Each entry becomes its own attribute record with a globally increasing
/// `attribute_id`, carrying the image-level fields of its source record.
/// Returns the number of attribute records created.
pub fn group_attributes(records: &mut [SceneRecord], attributes: Vec<ImageAttributes>) -> Result<usize> {
    let slots: HashMap<u64, usize> = records
        .iter()
        .enumerate()
        .map(|(slot, r)| (r.image_id, slot))
        .collect();

    let mut next_id = 0u64;
    for image_attrs in attributes {
        let slot = *slots
            .get(&image_attrs.image_id)
            .ok_or_else(|| Error::NotFound(format!("Scene graph for image {}", image_attrs.image_id)))?;

        let mut shared = image_attrs.extra;
        shared.insert("image_id".into(), Value::from(image_attrs.image_id));

        let grouped = image_attrs
            .attributes
            .into_iter()
            .map(|entry| {
                let record = RawAttributeRecord {
                    attribute_id: next_id,
                    attribute: entry,
                    extra: shared.clone(),
                };
                next_id += 1;
                record
            })
            .collect();
        records[slot].attributes = Some(grouped);
    }
    Ok(next_id as usize)
}

/// Rewrite `scene_graphs.json` with the attributes of `attributes.json`.
pub fn add_attributes_to_scene_graphs(config: &PipelineConfig) -> Result<usize> {
    let mut records = read_scene_records(config.scene_graphs_path())?;
    let attributes: Vec<ImageAttributes> = read_json(&config.attributes_path())?;
    let created = group_attributes(&mut records, attributes)?;
    write_json(&config.scene_graphs_path(), &records)?;
    tracing::info!(attributes = created, records = records.len(), "grouped attributes into scene graphs");
    Ok(created)
}

// ============================================================================
// Repartitioning
// ============================================================================

/// Outcome of a [`repartition`] run.
#[derive(Debug, Clone)]
pub struct RepartitionStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub records_seen: usize,
    pub written: usize,
    /// Records whose image is missing from the image metadata.
    pub unknown_image: usize,
    /// Records whose image has no auxiliary annotations.
    pub without_auxiliary: usize,
    pub synthesis: SynthesisStats,
}

impl RepartitionStats {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            records_seen: 0,
            written: 0,
            unknown_image: 0,
            without_auxiliary: 0,
            synthesis: SynthesisStats::default(),
        }
    }
}

impl std::fmt::Display for RepartitionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RepartitionStats {{ seen: {}, written: {}, unknown_image: {}, without_auxiliary: {}, objects: {}, auxiliary_objects: {} }}",
            self.records_seen, self.written, self.unknown_image, self.without_auxiliary,
            self.synthesis.objects, self.synthesis.auxiliary_objects,
        )
    }
}

/// Split `scene_graphs.json` into enriched per-image files.
///
/// Only records whose image has a COCO id present in the auxiliary mapping
/// are written. The similarity cache is flushed once, after the last record.
pub fn repartition<R>(
    config: &PipelineConfig,
    repo: &R,
    cache: &mut SimilarityCache,
) -> Result<RepartitionStats>
where
    R: SenseRepository + ?Sized,
{
    config.validate()?;
    fs::create_dir_all(&config.by_id_dir)?;

    let table = CategoryTable::from_jsonl(config.category_table_path())?;
    let auxiliary: HashMap<String, AuxiliaryImage> = read_json(&config.auxiliary_mapping_path())?;
    let images = load_image_index(config.image_data_path())?;
    let records = read_scene_records(config.scene_graphs_path())?;

    let mut stats = RepartitionStats::start();
    let mut synth = AttributeSynthesizer::new(&table, repo, &mut *cache)
        .with_region(config.center_region)
        .with_threshold(config.similarity_threshold);

    for record in records {
        stats.records_seen += 1;
        let Some(image) = images.get(&record.image_id) else {
            stats.unknown_image += 1;
            continue;
        };
        let Some(aux) = image.coco_id.and_then(|coco| auxiliary.get(&coco.to_string())) else {
            stats.without_auxiliary += 1;
            continue;
        };
        let enriched = synth.enrich(record, image, Some(aux))?;
        write_scene_record(&config.by_id_dir, &enriched)?;
        stats.written += 1;
    }

    stats.synthesis = synth.stats();
    drop(synth);
    cache.flush()?;
    stats.finished_at = Some(Utc::now());
    tracing::info!(%stats, "repartition complete");
    Ok(stats)
}
