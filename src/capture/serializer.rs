use super::value::{CapturedValue, ValueKind};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashSet;

/// Sentinel substituted for a node already visited in the same traversal.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// Fixed fallback for a value that cannot be rendered at all.
pub const UNSERIALIZABLE: &str = "[unserializable value]";

enum Shape {
    Scalar(String),
    Composite,
}

/// Renders a captured value as a finite string.
///
/// Total function: never fails, never panics, and terminates on cyclic
/// graphs. Error values render as compact JSON, primitives as their
/// canonical display form, composites as pretty-printed JSON with revisited
/// nodes replaced by [`CIRCULAR_MARKER`].
pub fn serialize(value: &CapturedValue) -> String {
    let shape = value.with_kind(|kind| match kind {
        ValueKind::Null => Shape::Scalar("null".to_string()),
        ValueKind::Bool(b) => Shape::Scalar(b.to_string()),
        ValueKind::Int(i) => Shape::Scalar(i.to_string()),
        ValueKind::Float(f) => Shape::Scalar(f.to_string()),
        ValueKind::Text(s) => Shape::Scalar(s.clone()),
        ValueKind::Error(err) => Shape::Scalar(
            serde_json::to_string(err).unwrap_or_else(|_| UNSERIALIZABLE.to_string()),
        ),
        ValueKind::List(_) | ValueKind::Map(_) => Shape::Composite,
    });

    match shape {
        None => UNSERIALIZABLE.to_string(),
        Some(Shape::Scalar(rendered)) => rendered,
        Some(Shape::Composite) => {
            let mut visited = HashSet::new();
            let json = to_json(value, &mut visited);
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| UNSERIALIZABLE.to_string())
        }
    }
}

/// Converts a node graph to a JSON tree. The visited set covers the whole
/// traversal, so both cycles and shared nodes collapse to the marker and the
/// output stays bounded regardless of cycle length.
fn to_json(value: &CapturedValue, visited: &mut HashSet<usize>) -> JsonValue {
    if !visited.insert(value.node_id()) {
        return JsonValue::String(CIRCULAR_MARKER.to_string());
    }

    let json = value.with_kind(|kind| match kind {
        ValueKind::Null => JsonValue::Null,
        ValueKind::Bool(b) => JsonValue::Bool(*b),
        ValueKind::Int(i) => JsonValue::Number((*i).into()),
        // Non-finite floats have no JSON form and collapse to null.
        ValueKind::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueKind::Text(s) => JsonValue::String(s.clone()),
        ValueKind::Error(err) => serde_json::to_value(err)
            .unwrap_or_else(|_| JsonValue::String(UNSERIALIZABLE.to_string())),
        ValueKind::List(items) => {
            JsonValue::Array(items.iter().map(|item| to_json(item, visited)).collect())
        }
        ValueKind::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, entry) in entries {
                map.insert(key.clone(), to_json(entry, visited));
            }
            JsonValue::Object(map)
        }
    });

    json.unwrap_or_else(|| JsonValue::String(UNSERIALIZABLE.to_string()))
}
