//! # Attribute Synthesis
//!
//! Offline enrichment of raw scene records before they are written per image.
//!
//! ```text
//! RawObject ──positional_attributes()──▶ situated  ("left_image", "center", ...)
//!           ──category_attributes()───▶ abstract  (category table row)
//!                       │ no exact row
//!                       ▼
//!           similarity cache ──miss──▶ scan every category sense
//! attributes = situated ++ abstract
//! ```
//!
//! Objects of the auxiliary dataset are matched by category code instead and
//! appended to the record as new objects.

pub mod category;
pub mod positional;

use crate::model::{BBox, Image, Sense};
use crate::raw::{AuxiliaryImage, RawObject, SceneRecord};
use crate::sense::{MatchCache, SenseRepository};
use crate::{Error, Result};

pub use category::{CategoryData, CategoryRow, CategoryTable};
pub use positional::{positional_attributes, CenterRegion, PositionalTags};

/// Minimum similarity for a category to count as a fallback match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;

/// How objects got their abstract attributes during one synthesizer's life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisStats {
    pub objects: usize,
    pub exact_matches: usize,
    pub fallback_matches: usize,
    pub unmatched: usize,
    pub auxiliary_objects: usize,
}

/// Positional and category attribute synthesis for scene records.
///
/// Generic over the cache so a single-owner `&mut SimilarityCache` and a
/// `SharedSimilarityCache` handle both work.
pub struct AttributeSynthesizer<'a, R: ?Sized, C> {
    table: &'a CategoryTable,
    repo: &'a R,
    cache: C,
    region: CenterRegion,
    threshold: f64,
    /// Category senses known to the ontology, in table order.
    candidates: Vec<Sense>,
    stats: SynthesisStats,
}

impl<'a, R, C> AttributeSynthesizer<'a, R, C>
where
    R: SenseRepository + ?Sized,
    C: MatchCache,
{
    pub fn new(table: &'a CategoryTable, repo: &'a R, cache: C) -> Self {
        let candidates = table
            .rows()
            .filter_map(|row| {
                let sense = repo.lookup(&row.wordnet_id);
                if sense.is_none() {
                    tracing::warn!(sense = %row.wordnet_id, "category sense unknown to ontology, excluded from similarity fallback");
                }
                sense
            })
            .collect();
        Self {
            table,
            repo,
            cache,
            region: CenterRegion::default(),
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            candidates,
            stats: SynthesisStats::default(),
        }
    }

    pub fn with_region(mut self, region: CenterRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn stats(&self) -> SynthesisStats {
        self.stats
    }

    /// Hand the cache back, e.g. to flush it.
    pub fn into_cache(self) -> C {
        self.cache
    }

    // ========================================================================
    // Category attributes
    // ========================================================================

    /// Abstract attributes for an object whose first sense is `sense_name`.
    ///
    /// Exact table match first; otherwise the best-scoring category at or
    /// above the threshold, remembered in the cache. Fails only when the
    /// ontology does not know `sense_name`.
    pub fn category_attributes(&mut self, sense_name: &str) -> Result<Vec<String>> {
        let table = self.table;
        if let Some(row) = table.by_sense(sense_name) {
            self.stats.exact_matches += 1;
            return Ok(row.abstract_attributes());
        }

        let sense = self
            .repo
            .lookup(sense_name)
            .ok_or_else(|| Error::NotFound(format!("Sense {sense_name}")))?;

        let Self { cache, repo, candidates, threshold, .. } = &mut *self;
        let scan = || best_match(*repo, candidates, &sense, *threshold);
        let mut best = cache.get_or_insert_with(&sense.name, scan);

        // A cached winner missing from the table is a miss: rescan, which
        // either replaces the entry or leaves it removed.
        if let Some(stale) = best.take_if(|name| table.by_sense(name).is_none()) {
            tracing::warn!(sense = sense_name, best_match = %stale, "cached match no longer in category table, rescanning");
            cache.remove(&sense.name);
            best = cache.get_or_insert_with(&sense.name, scan);
        }

        match best.as_deref().and_then(|name| table.by_sense(name)) {
            Some(row) => {
                self.stats.fallback_matches += 1;
                Ok(row.abstract_attributes())
            }
            None => {
                self.stats.unmatched += 1;
                Ok(Vec::new())
            }
        }
    }

    // ========================================================================
    // Objects and records
    // ========================================================================

    /// Enrich one object: situated = existing attributes ++ positional tags,
    /// abstract = category attributes of its first sense,
    /// attributes = situated ++ abstract.
    pub fn synthesize_object(&mut self, mut raw: RawObject, image: &Image) -> Result<RawObject> {
        let mut situated = raw.attributes.take().unwrap_or_default();
        situated.extend(
            positional_attributes(image, &raw.bbox(), self.region)
                .iter()
                .map(|tag| tag.to_string()),
        );

        let abstract_attributes = match raw.synsets.first() {
            Some(sense) => self.category_attributes(sense)?,
            None => Vec::new(),
        };

        raw.attributes = Some(situated.iter().chain(&abstract_attributes).cloned().collect());
        raw.situated_attributes = Some(situated);
        raw.abstract_attributes = Some(abstract_attributes);
        self.stats.objects += 1;
        Ok(raw)
    }

    /// Enrich every object of `scene`.
    pub fn synthesize_attributes(&mut self, mut scene: SceneRecord, image: &Image) -> Result<SceneRecord> {
        let objects = std::mem::take(&mut scene.objects);
        scene.objects = objects
            .into_iter()
            .map(|raw| self.synthesize_object(raw, image))
            .collect::<Result<_>>()?;
        Ok(scene)
    }

    /// New object records for the auxiliary objects whose category code is
    /// in the table. Their final attributes are the abstract ones only.
    pub fn synthesize_auxiliary_objects(&mut self, aux: &AuxiliaryImage, image: &Image) -> Vec<RawObject> {
        let mut objects = Vec::new();
        for obj in &aux.gw_objects {
            let Some(row) = self.table.by_concept(&obj.category) else {
                continue;
            };
            let bbox = BBox::from(obj.bbox);
            let abstract_attributes = row.abstract_attributes();

            let mut raw = RawObject::new(obj.id, bbox);
            raw.guesswhat = true;
            raw.names = vec![obj.category.clone()];
            raw.synsets = vec![row.wordnet_id.clone()];
            raw.situated_attributes = Some(
                positional_attributes(image, &bbox, self.region)
                    .iter()
                    .map(|tag| tag.to_string())
                    .collect(),
            );
            raw.attributes = Some(abstract_attributes.clone());
            raw.abstract_attributes = Some(abstract_attributes);
            objects.push(raw);
        }
        self.stats.auxiliary_objects += objects.len();
        objects
    }

    /// Full offline pass for one image: enrich the record's objects, then
    /// append the auxiliary objects.
    pub fn enrich(
        &mut self,
        scene: SceneRecord,
        image: &Image,
        aux: Option<&AuxiliaryImage>,
    ) -> Result<SceneRecord> {
        let mut scene = self.synthesize_attributes(scene, image)?;
        if let Some(aux) = aux {
            let extra = self.synthesize_auxiliary_objects(aux, image);
            scene.objects.extend(extra);
        }
        Ok(scene)
    }
}

/// Highest-scoring candidate with score ≥ `threshold`.
///
/// Uses a strict `>` against the running best, so on equal scores the
/// earliest candidate in table order wins.
fn best_match<R>(repo: &R, candidates: &[Sense], sense: &Sense, threshold: f64) -> Option<String>
where
    R: SenseRepository + ?Sized,
{
    let mut best: Option<&Sense> = None;
    let mut best_score = 0.0;
    for candidate in candidates {
        let Some(score) = repo.similarity(sense, candidate) else {
            continue;
        };
        if score >= threshold && score > best_score {
            best = Some(candidate);
            best_score = score;
        }
    }
    best.map(|s| s.name.clone())
}
