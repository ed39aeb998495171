//! Graph construction from raw per-image records.
//!
//! ```text
//! SceneRecord ──build_graph()──▶ Graph (raw sense names)
//!             ──resolve_senses()──▶ Graph (Sense instances)
//! ```
//!
//! Cross-references that point at objects the record never introduced are
//! dropped and counted; they are a known property of the dataset, not an
//! error.

use crate::merge::ObjectRegistry;
use crate::model::{Attribute, Graph, Image, Object, ObjectId, Relationship, SenseRef};
use crate::raw::SceneRecord;
use crate::sense::{SenseRepository, SenseTable};
use crate::{Error, Result};

// ============================================================================
// Skip counts
// ============================================================================

/// Records dropped while building graphs because of dangling references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub relationships: usize,
    pub attributes: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.relationships + self.attributes
    }
}

impl std::ops::AddAssign for SkipCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.relationships += rhs.relationships;
        self.attributes += rhs.attributes;
    }
}

impl std::fmt::Display for SkipCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped {} rels, {} attrs", self.relationships, self.attributes)
    }
}

// ============================================================================
// Build
// ============================================================================

/// Assemble one scene graph.
///
/// Objects are merged by scoped id in input order. Relationship endpoints and
/// attribute targets are resolved against the merged objects; records with an
/// unknown id are skipped and counted. Each attribute keeps its own object
/// snapshot taken from the attribute record.
pub fn build_graph(scene: &SceneRecord, image: Image) -> (Graph, SkipCounts) {
    if scene.image_id != image.id {
        tracing::warn!(record = scene.image_id, image = image.id, "scene record and image ids differ");
    }

    let mut registry = ObjectRegistry::new();
    for raw in &scene.objects {
        registry.merge_or_create(raw);
    }

    let mut skips = SkipCounts::default();

    let mut relationships = Vec::with_capacity(scene.relationships.len());
    for rel in &scene.relationships {
        let subject = registry.lookup(ObjectId::Primary(rel.subject_id));
        let object = registry.lookup(ObjectId::Primary(rel.object_id));
        match (subject, object) {
            (Some(s), Some(o)) => relationships.push(
                Relationship::new(rel.relationship_id, s.id, rel.predicate.clone(), o.id)
                    .with_senses(rel.synsets.iter().cloned()),
            ),
            _ => skips.relationships += 1,
        }
    }

    let mut attributes = Vec::new();
    for record in scene.attributes.iter().flatten() {
        let entry = &record.attribute;
        let target = ObjectId::Primary(entry.object_id);
        if !registry.contains(target) {
            skips.attributes += 1;
            continue;
        }
        let snapshot = Object::new(target, entry.bbox())
            .with_names(entry.names.iter().cloned())
            .with_senses(entry.synsets.iter().cloned());
        attributes.push(
            Attribute::new(record.attribute_id, snapshot, entry.attributes.iter().cloned())
                .with_senses(entry.synsets.iter().cloned()),
        );
    }

    if skips.total() > 0 {
        tracing::debug!(image_id = image.id, relationships = skips.relationships, attributes = skips.attributes, "dropped dangling references");
    }

    let graph = Graph {
        image,
        objects: registry.into_objects(),
        relationships,
        attributes,
    };
    (graph, skips)
}

// ============================================================================
// Sense resolution
// ============================================================================

/// Replace every unresolved sense name in the graph with its `Sense`.
///
/// Names are looked up in `table` first and in the ontology second; a name
/// neither knows is a `NotFound` error. Already-resolved senses are left as
/// they are, so resolving twice is the same as resolving once.
pub fn resolve_senses<R>(mut graph: Graph, table: &SenseTable, repo: &R) -> Result<Graph>
where
    R: SenseRepository + ?Sized,
{
    for object in &mut graph.objects {
        resolve_list(&mut object.senses, table, repo)?;
    }
    for rel in &mut graph.relationships {
        resolve_list(&mut rel.senses, table, repo)?;
    }
    for attr in &mut graph.attributes {
        resolve_list(&mut attr.senses, table, repo)?;
        resolve_list(&mut attr.object.senses, table, repo)?;
    }
    Ok(graph)
}

fn resolve_list<R>(senses: &mut [SenseRef], table: &SenseTable, repo: &R) -> Result<()>
where
    R: SenseRepository + ?Sized,
{
    for sense_ref in senses.iter_mut() {
        if let SenseRef::Unresolved(name) = sense_ref {
            let sense = match table.get(name) {
                Some(sense) => sense.clone(),
                None => repo
                    .lookup(name)
                    .ok_or_else(|| Error::NotFound(format!("Sense {name}")))?,
            };
            *sense_ref = SenseRef::Resolved(sense);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Sense};
    use crate::raw::{RawAttributeEntry, RawAttributeRecord, RawObject, RawRelationship};
    use crate::sense::MemoryOntology;
    use pretty_assertions::assert_eq;
    use serde_json::Map;

    fn object(id: u64, synset: &str) -> RawObject {
        let mut o = RawObject::new(id, BBox::new(10.0, 10.0, 50.0, 50.0));
        o.names = vec![synset.split('.').next().unwrap_or(synset).to_string()];
        o.synsets = vec![synset.to_string()];
        o
    }

    fn rel(id: u64, subject: u64, object: u64) -> RawRelationship {
        RawRelationship {
            relationship_id: id,
            predicate: "next to".into(),
            subject_id: subject,
            object_id: object,
            synsets: vec!["next.r.01".into()],
            extra: Map::new(),
        }
    }

    fn attr(id: u64, object_id: u64) -> RawAttributeRecord {
        RawAttributeRecord {
            attribute_id: id,
            attribute: RawAttributeEntry {
                object_id,
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
                names: vec!["dog".into()],
                synsets: vec!["dog.n.01".into()],
                attributes: vec!["brown".into()],
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    fn scene() -> SceneRecord {
        let mut s = SceneRecord::new(1);
        s.objects = vec![object(1, "dog.n.01"), object(2, "cat.n.01"), object(1, "dog.n.01")];
        s.relationships = vec![rel(10, 1, 2), rel(11, 1, 99), rel(12, 98, 2)];
        s.attributes = Some(vec![attr(20, 1), attr(21, 77)]);
        s
    }

    fn ontology() -> MemoryOntology {
        let none: [&str; 0] = [];
        MemoryOntology::new()
            .with_sense("dog.n.01", "a domesticated canid", none)
            .with_sense("cat.n.01", "a small feline", none)
            .with_sense("next.r.01", "nearest in space", none)
    }

    #[test]
    fn test_duplicate_mentions_merge() {
        let (graph, _) = build_graph(&scene(), Image::new(1, "", 800, 600));
        assert_eq!(graph.objects.len(), 2);
        assert_eq!(graph.objects[0].id, ObjectId::Primary(1));
        assert_eq!(graph.objects[1].id, ObjectId::Primary(2));
    }

    #[test]
    fn test_dangling_references_are_counted() {
        let (graph, skips) = build_graph(&scene(), Image::new(1, "", 800, 600));
        assert_eq!(graph.relationships.len(), 1);
        assert_eq!(graph.relationships[0].id, 10);
        assert_eq!(graph.attributes.len(), 1);
        assert_eq!(skips, SkipCounts { relationships: 2, attributes: 1 });
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_attribute_keeps_own_snapshot() {
        let (graph, _) = build_graph(&scene(), Image::new(1, "", 800, 600));
        let a = &graph.attributes[0];
        assert_eq!(a.target, ObjectId::Primary(1));
        assert_eq!(a.object.bbox, BBox::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(a.values, vec!["brown".to_string()]);
        // The merged object keeps the geometry from the object list.
        assert_eq!(graph.object(a.target).unwrap().bbox, BBox::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_resolve_prefers_table_then_ontology() {
        let (graph, _) = build_graph(&scene(), Image::new(1, "", 800, 600));
        let table: SenseTable = [Sense::new("dog.n.01", "from the table")].into_iter().collect();
        let resolved = resolve_senses(graph, &table, &ontology()).unwrap();

        let dog = resolved.objects[0].senses[0].as_sense().unwrap();
        assert_eq!(dog.definition, "from the table");
        let cat = resolved.objects[1].senses[0].as_sense().unwrap();
        assert_eq!(cat.definition, "a small feline");
        assert!(resolved.relationships[0].senses.iter().all(SenseRef::is_resolved));
        assert!(resolved.attributes[0].senses.iter().all(SenseRef::is_resolved));
        assert!(resolved.attributes[0].object.senses.iter().all(SenseRef::is_resolved));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (graph, _) = build_graph(&scene(), Image::new(1, "", 800, 600));
        let table = SenseTable::new();
        let once = resolve_senses(graph, &table, &ontology()).unwrap();
        let twice = resolve_senses(once.clone(), &table, &ontology()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_sense_is_fatal() {
        let mut s = scene();
        s.objects[0].synsets = vec!["unicorn.n.01".into()];
        let (graph, _) = build_graph(&s, Image::new(1, "", 800, 600));
        let err = resolve_senses(graph, &SenseTable::new(), &ontology()).unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m.contains("unicorn.n.01")));
    }
}
