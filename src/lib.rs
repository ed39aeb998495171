//! # visual-genome-rs — Scene Graph Construction for Visual Genome
//!
//! Builds per-image scene graphs (objects, relationships, attributes) from the
//! nested JSON records of the Visual Genome dataset, and enriches objects with
//! derived attributes before the per-image files are written.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `SenseRepository` is the contract between the pipeline
//!    and the lexical ontology (WordNet or any stand-in)
//! 2. **Clean DTOs**: `Object`, `Relationship`, `Attribute`, `Sense` cross all boundaries
//! 3. **Builders own nothing**: raw record → `Graph` is a pure function
//! 4. **Explicit cache lifecycle**: the similarity cache is loaded, passed in,
//!    and flushed by the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use visual_genome::{MemoryOntology, PipelineConfig, SceneGraphLoader};
//!
//! # fn example() -> visual_genome::Result<()> {
//! let config = PipelineConfig::default();
//! let ontology = MemoryOntology::from_path("data/ontology.json")?;
//! let loader = SceneGraphLoader::open(&config, &ontology)?;
//!
//! if let Some((graph, skips)) = loader.load_scene_graph(1)? {
//!     println!("{} objects, {} relationships ({skips})",
//!         graph.objects.len(), graph.relationships.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Center Region
//!
//! Positional tags are computed against `CenterRegion::Proportional` by
//! default. The released per-image files were produced with a box built from
//! the image height alone (`CenterRegion::Legacy`), so on non-square images
//! the default output differs from the released data. Set
//! `center_region: "legacy"` in `PipelineConfig` to reproduce it.
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | Merge | `merge` | Deduplicate object mentions by scoped identifier |
//! | Build | `builder` | Assemble and sense-resolve one `Graph` per image |
//! | Enrich | `synth` | Positional + category attributes (offline pass) |
//! | Access | `dataset` | Image metadata, per-image files, repartitioning |
//! | Export | `export` | Cypher script for a built graph |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod raw;
pub mod merge;
pub mod builder;
pub mod sense;
pub mod synth;
pub mod dataset;
pub mod export;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Attribute, BBox, Corners, Graph, Image, ImageQuestions, ImageRegions, Object, ObjectId,
    QuestionAnswer, Region, Relationship, Sense, SenseRef,
};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use builder::{build_graph, resolve_senses, SkipCounts};
pub use config::PipelineConfig;
pub use dataset::{RepartitionStats, SceneGraphLoader};
pub use merge::{MergeOutcome, ObjectRegistry};
pub use sense::{
    MatchCache, MemoryOntology, SenseRepository, SenseTable, SharedSimilarityCache, SimilarityCache,
};
pub use synth::{AttributeSynthesizer, CategoryTable, CenterRegion};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing field `{field}` in {record}")]
    MissingField { record: String, field: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
