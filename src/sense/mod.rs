//! # Sense Repository
//!
//! The contract between the pipeline and the lexical ontology. The
//! pipeline only ever asks two things of it: "give me the sense with this
//! name" and "how similar are these two senses".
//!
//! ## Implementations
//!
//! | Repository | Module | Description |
//! |------------|--------|-------------|
//! | `MemoryOntology` | `memory` | In-memory hypernym graph with Wu–Palmer similarity |
//!
//! Alongside it live the name → `Sense` table shipped with the dataset
//! (`table`) and the persistent best-match cache used by the category
//! fallback (`cache`).

pub mod memory;
pub mod cache;
pub mod table;

use crate::model::Sense;

pub use memory::{MemoryOntology, OntologyRecord};
pub use cache::{MatchCache, SharedSimilarityCache, SimilarityCache};
pub use table::SenseTable;

// ============================================================================
// SenseRepository Trait
// ============================================================================

/// Lexical ontology lookup.
pub trait SenseRepository {
    /// Sense by dot-qualified name, `None` if the ontology has no such sense.
    fn lookup(&self, name: &str) -> Option<Sense>;

    /// Semantic similarity in `[0, 1]`, `None` when undefined for the pair
    /// (e.g. no common ancestor).
    fn similarity(&self, a: &Sense, b: &Sense) -> Option<f64>;
}

impl<R: SenseRepository + ?Sized> SenseRepository for &R {
    fn lookup(&self, name: &str) -> Option<Sense> {
        (**self).lookup(name)
    }

    fn similarity(&self, a: &Sense, b: &Sense) -> Option<f64> {
        (**self).similarity(a, b)
    }
}
