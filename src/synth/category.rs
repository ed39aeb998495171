//! Category table (`visa.jsonl`): per-sense attribute groups and type labels.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Marker some attribute names carry in front of the behaviour group.
pub const BEHAVIOUR_MARKER: &str = "beh_-_";

/// Attribute groups and type labels of one category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryData {
    /// Group name → attribute names. Groups are visited in key order.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One table row, keyed by sense name and by external category code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub wordnet_id: String,
    #[serde(default)]
    pub concept_id: Option<String>,
    pub data: CategoryData,
}

impl CategoryRow {
    pub fn new(wordnet_id: impl Into<String>, data: CategoryData) -> Self {
        Self { wordnet_id: wordnet_id.into(), concept_id: None, data }
    }

    pub fn with_concept_id(mut self, concept_id: impl Into<String>) -> Self {
        self.concept_id = Some(concept_id.into());
        self
    }

    /// Normalised attribute names of every group, then normalised types.
    pub fn abstract_attributes(&self) -> Vec<String> {
        let attributes = self.data.attributes.values().flatten().map(|a| normalize_attribute(a));
        let types = self.data.types.iter().map(|t| normalize_type(t));
        attributes.chain(types).collect()
    }
}

/// `beh_-_fast` → `fast`, `has_four_legs` → `has four legs`.
pub fn normalize_attribute(raw: &str) -> String {
    raw.replace(BEHAVIOUR_MARKER, "_").replace('_', " ").trim().to_string()
}

/// `animal kingdom` → `animal_kingdom`.
pub fn normalize_type(raw: &str) -> String {
    raw.replace(' ', "_")
}

/// Rows in file order with lookups by sense and by category code.
///
/// When a key appears on several rows the first row wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    rows: Vec<CategoryRow>,
    by_sense: HashMap<String, usize>,
    by_concept: HashMap<String, usize>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON-lines file, one [`CategoryRow`] per non-blank line.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut table = Self::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row: CategoryRow = serde_json::from_str(&line).map_err(|e| {
                Error::InvalidRecord(format!("{}:{}: {e}", path.display(), lineno + 1))
            })?;
            table.push(row);
        }
        tracing::info!(categories = table.len(), path = %path.display(), "loaded category table");
        Ok(table)
    }

    pub fn push(&mut self, row: CategoryRow) {
        let slot = self.rows.len();
        self.by_sense.entry(row.wordnet_id.clone()).or_insert(slot);
        if let Some(code) = &row.concept_id {
            self.by_concept.entry(code.clone()).or_insert(slot);
        }
        self.rows.push(row);
    }

    pub fn by_sense(&self, sense: &str) -> Option<&CategoryRow> {
        self.by_sense.get(sense).map(|&slot| &self.rows[slot])
    }

    pub fn by_concept(&self, code: &str) -> Option<&CategoryRow> {
        self.by_concept.get(code).map(|&slot| &self.rows[slot])
    }

    pub fn rows(&self) -> impl Iterator<Item = &CategoryRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<CategoryRow> for CategoryTable {
    fn from_iter<I: IntoIterator<Item = CategoryRow>>(iter: I) -> Self {
        let mut table = CategoryTable::new();
        for row in iter {
            table.push(row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(sense: &str, groups: &[(&str, &[&str])], types: &[&str]) -> CategoryRow {
        CategoryRow::new(sense, CategoryData {
            attributes: groups
                .iter()
                .map(|(g, attrs)| (g.to_string(), attrs.iter().map(|a| a.to_string()).collect()))
                .collect(),
            types: types.iter().map(|t| t.to_string()).collect(),
        })
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_attribute("beh_-_fast"), "fast");
        assert_eq!(normalize_attribute("has_four_legs"), "has four legs");
        assert_eq!(normalize_attribute("beh_-_eats_grass"), "eats grass");
        assert_eq!(normalize_type("animal kingdom"), "animal_kingdom");
    }

    #[test]
    fn test_expand_row() {
        let r = row("dog.n.01", &[("behaviour", &["beh_-_fast"])], &["animal kingdom"]);
        assert_eq!(r.abstract_attributes(), vec!["fast".to_string(), "animal_kingdom".to_string()]);
    }

    #[test]
    fn test_first_row_wins() {
        let table: CategoryTable = [
            row("dog.n.01", &[], &["first"]).with_concept_id("17"),
            row("dog.n.01", &[], &["second"]).with_concept_id("17"),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.by_sense("dog.n.01").unwrap().data.types, vec!["first".to_string()]);
        assert_eq!(table.by_concept("17").unwrap().data.types, vec!["first".to_string()]);
        assert!(table.by_concept("18").is_none());
    }

    #[test]
    fn test_parse_row_json() {
        let r: CategoryRow = serde_json::from_str(
            r#"{"wordnet_id": "cat.n.01", "concept_id": "cat",
                "data": {"attributes": {"structure": ["has_tail"]}, "types": ["pet"]}}"#,
        ).unwrap();
        assert_eq!(r.abstract_attributes(), vec!["has tail".to_string(), "pet".to_string()]);
    }
}
