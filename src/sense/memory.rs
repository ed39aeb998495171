//! In-memory lexical ontology.
//!
//! Reference implementation of `SenseRepository`: senses with definitions
//! and hypernym links, scored with Wu–Palmer similarity.
//!
//! ## Limitations
//!
//! - **No lemma index**: lookups are by exact sense name only.
//! - **Shortest-path depth**: a sense's depth is one plus its shortest
//!   hypernym distance to a root, so multiply-inherited senses take the
//!   shallowest route.
//!
//! Use this repository for:
//! - Tests of the builder and synthesizer
//! - Small curated ontologies exported to JSON

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::Sense;
use crate::Result;
use super::SenseRepository;

/// One ontology entry as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyRecord {
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub hypernyms: Vec<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    sense: Sense,
    hypernyms: Vec<String>,
}

/// Hypernym graph keyed by sense name.
#[derive(Debug, Clone, Default)]
pub struct MemoryOntology {
    entries: HashMap<String, Entry>,
}

impl MemoryOntology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of [`OntologyRecord`]s.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let records: Vec<OntologyRecord> = serde_json::from_reader(reader)?;
        tracing::info!(senses = records.len(), path = %path.as_ref().display(), "loaded ontology");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: impl IntoIterator<Item = OntologyRecord>) -> Self {
        let mut ontology = Self::new();
        for record in records {
            ontology.insert(record);
        }
        ontology
    }

    pub fn with_sense(
        mut self,
        name: impl Into<String>,
        definition: impl Into<String>,
        hypernyms: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.insert(OntologyRecord {
            name: name.into(),
            definition: definition.into(),
            hypernyms: hypernyms.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn insert(&mut self, record: OntologyRecord) {
        let entry = Entry {
            sense: Sense::new(record.name.clone(), record.definition),
            hypernyms: record.hypernyms,
        };
        self.entries.insert(record.name, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn hypernyms_of(&self, name: &str) -> &[String] {
        self.entries.get(name).map(|e| e.hypernyms.as_slice()).unwrap_or(&[])
    }

    /// Shortest hypernym distance from `name` to each of its ancestors
    /// (including itself at distance 0).
    fn ancestor_distances(&self, name: &str) -> HashMap<String, usize> {
        let mut distances = HashMap::new();
        let mut queue = VecDeque::new();
        distances.insert(name.to_string(), 0);
        queue.push_back((name.to_string(), 0usize));

        while let Some((current, dist)) = queue.pop_front() {
            for parent in self.hypernyms_of(&current) {
                if !distances.contains_key(parent) {
                    distances.insert(parent.clone(), dist + 1);
                    queue.push_back((parent.clone(), dist + 1));
                }
            }
        }
        distances
    }

    /// Depth with roots at 1.
    fn depth(&self, name: &str) -> usize {
        self.ancestor_distances(name)
            .iter()
            .filter(|(ancestor, _)| self.hypernyms_of(ancestor).is_empty())
            .map(|(_, dist)| dist + 1)
            .min()
            .unwrap_or(1)
    }
}

impl SenseRepository for MemoryOntology {
    fn lookup(&self, name: &str) -> Option<Sense> {
        self.entries.get(name).map(|e| e.sense.clone())
    }

    /// Wu–Palmer: `2·depth(lcs) / (dist(a, lcs) + dist(b, lcs) + 2·depth(lcs))`,
    /// maximised over common ancestors.
    fn similarity(&self, a: &Sense, b: &Sense) -> Option<f64> {
        if a == b {
            return Some(1.0);
        }
        let from_a = self.ancestor_distances(&a.name);
        let from_b = self.ancestor_distances(&b.name);

        from_a
            .iter()
            .filter_map(|(ancestor, da)| {
                let db = from_b.get(ancestor)?;
                let depth = self.depth(ancestor) as f64;
                Some(2.0 * depth / (*da as f64 + *db as f64 + 2.0 * depth))
            })
            .fold(None, |best: Option<f64>, score| match best {
                Some(b) if b >= score => Some(b),
                _ => Some(score),
            })
    }
}
