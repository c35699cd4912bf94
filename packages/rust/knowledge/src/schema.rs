//! Builders for the JSON schemas handed to the extraction collaborator.
//!
//! Schemas are sent in strict mode, which wants every property listed under
//! `required`. Fields the model may leave out are nullable instead.

use serde_json::{Map, Value, json};

pub(crate) fn string() -> Value {
    json!({ "type": "string" })
}

/// A string the model may answer with `null`.
pub(crate) fn nullable_string() -> Value {
    json!({ "type": ["string", "null"] })
}

/// One of `values`, or `null`.
pub(crate) fn nullable_enum(values: &[&str]) -> Value {
    let mut allowed: Vec<Value> = values.iter().map(|v| json!(v)).collect();
    allowed.push(Value::Null);
    json!({ "type": ["string", "null"], "enum": allowed })
}

pub(crate) fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

pub(crate) fn sources() -> Value {
    json!({ "type": "array", "items": { "type": "integer" } })
}

/// A closed object with every property required.
pub(crate) fn object(properties: &[(&str, Value)]) -> Value {
    let props: Map<String, Value> = properties
        .iter()
        .map(|(name, schema)| ((*name).to_string(), schema.clone()))
        .collect();
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false,
    })
}

pub(crate) fn list_of(item: Value) -> Value {
    json!({ "type": "array", "items": item })
}

/// `{date?, decision, sources[]}`, shared by operational and creative.
pub(crate) fn decision() -> Value {
    list_of(object(&[
        ("date", nullable_string()),
        ("decision", string()),
        ("sources", sources()),
    ]))
}

/// `{question, sources[]}`, shared by all variants.
pub(crate) fn open_question() -> Value {
    list_of(object(&[("question", string()), ("sources", sources())]))
}

/// Every object reachable from `schema` must list exactly its property keys
/// as `required`. Returns the JSON path of the first offender.
#[cfg(test)]
pub(crate) fn first_loose_object(schema: &Value, path: &str) -> Option<String> {
    if let Some(props) = schema.get("properties").and_then(Value::as_object) {
        let mut keys: Vec<&str> = props.keys().map(String::as_str).collect();
        let mut required: Vec<&str> = schema["required"]
            .as_array()
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        required.sort_unstable();
        if keys != required || schema["additionalProperties"] != json!(false) {
            return Some(path.to_string());
        }
        for (name, child) in props {
            if let Some(found) = first_loose_object(child, &format!("{path}.{name}")) {
                return Some(found);
            }
        }
    }
    schema
        .get("items")
        .and_then(|items| first_loose_object(items, &format!("{path}[]")))
}
