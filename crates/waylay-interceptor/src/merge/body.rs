//! Type-dispatched body merging and on-the-wire serialization.

use serde_json::{Map, Value};

/// Classified shape of an upstream body.
///
/// Absent and scalar bodies classify as an empty `Object` so mock object
/// data can still be overlaid on them.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    /// Opaque non-JSON payload, e.g. HTML.
    Text(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl BodyShape {
    pub fn classify(body: Option<&Value>) -> Self {
        match body {
            Some(Value::String(text)) => BodyShape::Text(text.clone()),
            Some(Value::Array(items)) => BodyShape::Array(items.clone()),
            Some(Value::Object(fields)) => BodyShape::Object(fields.clone()),
            _ => BodyShape::Object(Map::new()),
        }
    }
}

/// Merge the upstream body with the mock body and produce wire text.
///
/// The upstream shape drives the dispatch: opaque text is returned
/// verbatim and the mock body is ignored; arrays merge element-wise;
/// objects merge as a shallow key-union. A mock body that does not match
/// the upstream shape is treated as absent.
pub(super) fn merge_body(upstream: Option<&Value>, mock: Option<&Value>) -> String {
    match BodyShape::classify(upstream) {
        BodyShape::Text(text) => text,
        BodyShape::Array(items) => {
            let mock_items = match mock {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            };
            let merged = merge_arrays(&items, mock_items);
            serde_json::to_string(&Value::Array(merged)).unwrap_or_default()
        }
        BodyShape::Object(fields) => {
            let merged = merge_objects(&fields, mock);
            serde_json::to_string(&Value::Object(merged)).unwrap_or_default()
        }
    }
}

/// Element-wise array merge; result length is the max of the two lengths.
fn merge_arrays(upstream: &[Value], mock: &[Value]) -> Vec<Value> {
    let len = upstream.len().max(mock.len());
    let mut merged = Vec::with_capacity(len);
    for i in 0..len {
        let element = match (upstream.get(i), mock.get(i)) {
            (Some(ours), Some(theirs)) => merge_elements(ours, theirs),
            (Some(ours), None) => ours.clone(),
            (None, Some(theirs)) => theirs.clone(),
            (None, None) => break,
        };
        merged.push(element);
    }
    merged
}

/// Key-union merge for two array elements sharing an index; the mock side
/// wins per key. Nested values are opaque. A non-object mock element
/// contributes nothing; a non-object upstream element is replaced only by
/// an object mock element.
fn merge_elements(upstream: &Value, mock: &Value) -> Value {
    match (upstream, mock) {
        (Value::Object(ours), _) => Value::Object(merge_objects(ours, Some(mock))),
        (_, Value::Object(_)) => mock.clone(),
        _ => upstream.clone(),
    }
}

/// Shallow key-union with the mock body; the mock wins on shared keys,
/// keys only the upstream defines are kept. A non-object mock value is
/// ignored.
pub(super) fn merge_objects(upstream: &Map<String, Value>, mock: Option<&Value>) -> Map<String, Value> {
    let mut merged = upstream.clone();
    if let Some(Value::Object(mock)) = mock {
        for (key, value) in mock {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Uniform on-the-wire serialization: strings pass through unchanged, any
/// other JSON value becomes its canonical JSON text.
pub(crate) fn serialize_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
