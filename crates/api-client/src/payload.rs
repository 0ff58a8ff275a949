//! Schema-agnostic access to JSON response bodies.
//!
//! APIs disagree on whether a single object comes back bare or wrapped in a
//! one-element array. [`decode_object`] accepts both shapes; everything else
//! in this module works on the object it yields.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A JSON object as returned by the API.
pub type JsonObject = Map<String, Value>;

#[derive(Deserialize)]
#[serde(untagged)]
enum Shape {
    Object(JsonObject),
    Array(Vec<Value>),
    Other(Value),
}

/// Decode a body holding an object or a non-empty array whose first element
/// is an object.
pub fn decode_object(body: &str) -> Result<JsonObject> {
    let shape: Shape = serde_json::from_str(body)?;
    match shape {
        Shape::Object(object) => Ok(object),
        Shape::Array(items) => match items.into_iter().next() {
            Some(Value::Object(object)) => Ok(object),
            Some(other) => Err(Error::decoding(format!(
                "first array element is {}, not an object",
                type_name(&other)
            ))),
            None => Err(Error::decoding("the JSON data is an empty array")),
        },
        Shape::Other(other) => Err(Error::decoding(format!(
            "the JSON data is {}, neither an object nor an array",
            type_name(&other)
        ))),
    }
}

/// Read `name` from the object in `body` as a string.
///
/// `name` may be a `/`-delimited path walked through nested objects.
pub fn get_field(body: &str, name: &str) -> Result<String> {
    let object = decode_object(body)?;
    lookup_string(&object, name)
}

/// Resolve a `/`-delimited path inside an object.
///
/// Every intermediate segment must name an object; arrays are not indexed.
pub fn lookup<'a>(object: &'a JsonObject, path: &str) -> Result<&'a Value> {
    let mut segments = path.split('/');
    let first = segments.next().unwrap_or_default();
    let mut current = object
        .get(first)
        .ok_or_else(|| Error::decoding(format!("{} not found", first)))?;

    for segment in segments {
        let Value::Object(inner) = current else {
            return Err(Error::decoding(format!(
                "cannot look up '{}' in {} while resolving '{}'",
                segment,
                type_name(current),
                path
            )));
        };
        current = inner
            .get(segment)
            .ok_or_else(|| Error::decoding(format!("{} not found in '{}'", segment, path)))?;
    }

    Ok(current)
}

/// Resolve a path whose value must be a JSON string.
pub fn lookup_string(object: &JsonObject, path: &str) -> Result<String> {
    match lookup(object, path)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::decoding(format!(
            "{} value is {} and can't be cast into a string",
            path,
            type_name(other)
        ))),
    }
}

/// Copy each of `keys` present in `known` into `body`, replacing what is there.
pub fn merge_copy_keys(body: &mut JsonObject, known: &JsonObject, keys: &[String]) {
    for key in keys {
        if let Some(value) = known.get(key) {
            body.insert(key.clone(), value.clone());
        }
    }
}

/// Apply [`merge_copy_keys`] to a raw update body.
///
/// Without copy keys the body is returned untouched; otherwise it must be a
/// JSON object.
pub fn apply_copy_keys(body: &str, known: &JsonObject, keys: &[String]) -> Result<String> {
    if keys.is_empty() {
        return Ok(body.to_string());
    }

    let mut outgoing = if body.trim().is_empty() {
        JsonObject::new()
    } else {
        match serde_json::from_str(body)? {
            Value::Object(object) => object,
            other => {
                return Err(Error::decoding(format!(
                    "update body is {}, copy keys need an object",
                    type_name(&other)
                )))
            }
        }
    };

    merge_copy_keys(&mut outgoing, known, keys);
    Ok(Value::Object(outgoing).to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
