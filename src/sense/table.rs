//! Name → `Sense` table shipped with the dataset (`synsets.json`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::model::Sense;
use crate::Result;

#[derive(Debug, Deserialize)]
struct SynsetRecord {
    synset_name: String,
    #[serde(default)]
    synset_definition: String,
}

/// Corpus-wide sense definitions keyed by sense name.
#[derive(Debug, Clone, Default)]
pub struct SenseTable {
    senses: HashMap<String, Sense>,
}

impl SenseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `synsets.json`: an array of `{synset_name, synset_definition}`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let records: Vec<SynsetRecord> = serde_json::from_reader(reader)?;
        let table: Self = records
            .into_iter()
            .map(|r| Sense::new(r.synset_name, r.synset_definition))
            .collect();
        tracing::info!(senses = table.len(), path = %path.as_ref().display(), "loaded sense table");
        Ok(table)
    }

    pub fn insert(&mut self, sense: Sense) {
        self.senses.insert(sense.name.clone(), sense);
    }

    pub fn get(&self, name: &str) -> Option<&Sense> {
        self.senses.get(name)
    }

    pub fn len(&self) -> usize {
        self.senses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }
}

impl FromIterator<Sense> for SenseTable {
    fn from_iter<I: IntoIterator<Item = Sense>>(iter: I) -> Self {
        let mut table = SenseTable::new();
        for sense in iter {
            table.insert(sense);
        }
        table
    }
}
