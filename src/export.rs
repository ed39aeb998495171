//! Cypher DUMP export — serialize a scene graph as Cypher statements.
//!
//! Produces a script that loads one image's graph into Neo4j or any
//! Cypher-compatible store.
//!
//! ```text
//! Graph → export_cypher_dump() → CREATE (:Object) / MATCH ... CREATE [:PREDICATE]
//!   → pipe into cypher-shell, or paste into Neo4j Browser
//! ```

use std::io::Write;

use serde_json::{json, Value};

use crate::model::{Graph, Object, SenseRef};
use crate::Result;

/// Export a graph as a Cypher DUMP script.
///
/// Objects become `:Object` nodes keyed by `_id` (the scoped object id, so
/// `gw_` objects stay distinct). Relationships become edges typed by their
/// predicate; attribute values hang off their object via `HAS_ATTRIBUTE`.
pub fn export_cypher_dump(graph: &Graph, writer: &mut dyn Write) -> Result<()> {
    // Header
    writeln!(writer, "// visual-genome-rs Cypher DUMP")?;
    writeln!(writer, "// Image: {}", graph.image.id)?;
    writeln!(writer, "// Objects: {}", graph.objects.len())?;
    writeln!(writer, "// Relationships: {}", graph.relationships.len())?;
    writeln!(writer, "// Attributes: {}", graph.attributes.len())?;
    writeln!(writer)?;

    writeln!(
        writer,
        "CREATE (:Image {{_id: {}, url: {}, width: {}, height: {}}});",
        graph.image.id,
        format_value(&Value::from(graph.image.url.as_str())),
        graph.image.width,
        graph.image.height,
    )?;

    for object in &graph.objects {
        writeln!(
            writer,
            "CREATE (:Object {{_id: '{}', image_id: {}, {}}});",
            object.id,
            graph.image.id,
            format_properties(&object_properties(object)),
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "// Relationships")?;

    for rel in &graph.relationships {
        writeln!(
            writer,
            "MATCH (a:Object {{_id: '{}', image_id: {img}}}), (b:Object {{_id: '{}', image_id: {img}}}) \
             CREATE (a)-[:{} {{_id: {}, predicate: {}, senses: {}}}]->(b);",
            rel.subject,
            rel.object,
            relationship_type(&rel.predicate),
            rel.id,
            format_value(&Value::from(rel.predicate.as_str())),
            format_value(&sense_names(&rel.senses)),
            img = graph.image.id,
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "// Attributes")?;

    for attr in &graph.attributes {
        for value in &attr.values {
            writeln!(
                writer,
                "MATCH (o:Object {{_id: '{}', image_id: {}}}) \
                 CREATE (o)-[:HAS_ATTRIBUTE {{_id: {}}}]->(:Attribute {{value: {}}});",
                attr.target,
                graph.image.id,
                attr.id,
                format_value(&Value::from(value.as_str())),
            )?;
        }
    }

    Ok(())
}

fn object_properties(object: &Object) -> Value {
    json!({
        "names": object.names,
        "x": object.bbox.x,
        "y": object.bbox.y,
        "w": object.bbox.width,
        "h": object.bbox.height,
        "attributes": object.attributes,
        "senses": sense_names(&object.senses),
    })
}

fn sense_names(senses: &[SenseRef]) -> Value {
    senses.iter().map(|s| Value::from(s.name())).collect()
}

/// `"sitting on"` → `SITTING_ON`. Empty predicates become `RELATED_TO`.
fn relationship_type(predicate: &str) -> String {
    let mut out = String::with_capacity(predicate.len());
    for c in predicate.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out = out.trim_matches('_');
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        format!("RELATED_TO{}", if out.is_empty() { String::new() } else { format!("_{out}") })
    } else {
        out.to_string()
    }
}

/// Format a JSON object as a Cypher property string (key: value, ...).
fn format_properties(props: &Value) -> String {
    let Value::Object(map) = props else {
        return String::new();
    };
    map.iter()
        .map(|(key, value)| format!("{}: {}", key, format_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a JSON value as a Cypher literal.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(m) => {
            let inner: Vec<String> = m.iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
