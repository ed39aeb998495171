//! Lexical senses (WordNet synsets) and late-bound references to them.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A lexical concept, e.g. `dog.n.01`.
///
/// Two senses are equal iff their names are equal; the definition is payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sense {
    pub name: String,
    #[serde(default)]
    pub definition: String,
}

impl Sense {
    pub fn new(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self { name: name.into(), definition: definition.into() }
    }

    /// Lemma part of the dot-qualified name (`dog.n.01` → `dog`).
    pub fn lemma(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

impl PartialEq for Sense {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Sense {}

impl Hash for Sense {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Sense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A sense reference: the raw name until resolution, the `Sense` after.
///
/// Serializes as a bare string when unresolved and as `{name, definition}`
/// once resolved, matching the per-image file format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SenseRef {
    Unresolved(String),
    Resolved(Sense),
}

impl SenseRef {
    pub fn name(&self) -> &str {
        match self {
            SenseRef::Unresolved(name) => name,
            SenseRef::Resolved(sense) => &sense.name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SenseRef::Resolved(_))
    }

    pub fn as_sense(&self) -> Option<&Sense> {
        match self {
            SenseRef::Resolved(sense) => Some(sense),
            SenseRef::Unresolved(_) => None,
        }
    }
}

impl From<&str> for SenseRef {
    fn from(name: &str) -> Self { SenseRef::Unresolved(name.to_string()) }
}

impl From<String> for SenseRef {
    fn from(name: String) -> Self { SenseRef::Unresolved(name) }
}

impl From<Sense> for SenseRef {
    fn from(sense: Sense) -> Self { SenseRef::Resolved(sense) }
}
