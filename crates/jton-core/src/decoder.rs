//! JTON decoder — rebuilds the original JSON value from its encoded text.
//!
//! Decoding starts with the envelope test: a root object with exactly the
//! keys `d` and `m`, where `m` is an object whose values are all strings.
//! Anything else is external JSON and is returned verbatim — the decoder is
//! a no-op on documents the encoder emitted via the global fallback.
//!
//! Inside an envelope, descriptor shapes are dispatched by exact key set:
//!
//! - `{"S": s}` — escape-wrapped literal string
//! - `{"s","d","n"}` — arithmetic progression
//! - `{"c","n"}` — constant run
//! - `{"p","x"}` — prefix-factored string list
//! - `{"a","k","d"}` — columnar array, rebuilt row by row
//! - any other object — ordinary object, keys translated back through the
//!   inverted dictionary
//! - reserved-prefix string — packed sequence (see `packers`)
//!
//! Tokens never collide with the descriptor key spellings (assignment skips
//! them), so the dispatch is unambiguous. Violations of the grammar on a
//! document that did pass the envelope test surface as `MalformedInput`.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::{JtonError, Result};
use crate::packers::{has_packed_prefix, unpack};
use crate::value::check_depth;

/// Decode a JTON text back into the original JSON value.
///
/// Returns [`JtonError::InvalidJson`] when `text` is not JSON at all, and
/// [`JtonError::MalformedInput`] when it is an envelope that violates the
/// descriptor grammar. Plain JSON documents come back unchanged.
pub fn decompress_json(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text)?;
    let Some((tree, dict)) = envelope_parts(&value) else {
        return Ok(value);
    };
    let inverse = invert_dictionary(dict)?;
    decode_tree(tree, &inverse, 0)
}

/// Split a value into `(descriptor tree, key dictionary)` if its root has
/// the envelope shape.
pub(crate) fn envelope_parts(value: &Value) -> Option<(&Value, &Map<String, Value>)> {
    let map = value.as_object()?;
    if map.len() != 2 {
        return None;
    }
    let tree = map.get("d")?;
    let dict = map.get("m")?.as_object()?;
    if !dict.values().all(Value::is_string) {
        return None;
    }
    Some((tree, dict))
}

/// Invert `{ original_key: token }` into `token -> original_key`. The
/// dictionary must be one-to-one.
fn invert_dictionary(dict: &Map<String, Value>) -> Result<HashMap<&str, &str>> {
    let mut inverse = HashMap::with_capacity(dict.len());
    for (original, token) in dict {
        let Some(token) = token.as_str() else {
            // envelope_parts only admits all-string dictionaries.
            return Err(JtonError::malformed("dictionary value is not a string"));
        };
        if inverse.insert(token, original.as_str()).is_some() {
            return Err(JtonError::malformed(format!(
                "duplicate token {token:?} in dictionary"
            )));
        }
    }
    Ok(inverse)
}

/// Recursive inverse of the encoder's transform.
fn decode_tree(value: &Value, inverse: &HashMap<&str, &str>, depth: usize) -> Result<Value> {
    check_depth(depth)?;
    match value {
        Value::Object(map) => decode_object(map, inverse, depth),
        Value::Array(items) => items
            .iter()
            .map(|item| decode_tree(item, inverse, depth + 1))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::String(s) if has_packed_prefix(s) => Ok(Value::Array(unpack(s)?)),
        other => Ok(other.clone()),
    }
}

/// Dispatch an object by its exact key set.
fn decode_object(
    map: &Map<String, Value>,
    inverse: &HashMap<&str, &str>,
    depth: usize,
) -> Result<Value> {
    if map.len() == 1 {
        if let Some(inner) = map.get("S") {
            return match inner {
                Value::String(s) => Ok(Value::String(s.clone())),
                _ => Err(JtonError::malformed("escape wrapper must hold a string")),
            };
        }
    }
    if keys_are(map, &["s", "d", "n"]) {
        return decode_progression(map);
    }
    if keys_are(map, &["c", "n"]) {
        return decode_constant(map, inverse, depth);
    }
    if keys_are(map, &["p", "x"]) {
        return decode_prefixed(map);
    }
    if map.contains_key("a") {
        return decode_columnar(map, inverse, depth);
    }

    let mut out = Map::new();
    for (token, child) in map {
        let original = inverse.get(token.as_str()).ok_or_else(|| {
            JtonError::malformed(format!("object key token {token:?} not in dictionary"))
        })?;
        out.insert(
            (*original).to_string(),
            decode_tree(child, inverse, depth + 1)?,
        );
    }
    Ok(Value::Object(out))
}

/// Exact key-set test, order-insensitive.
fn keys_are(map: &Map<String, Value>, keys: &[&str]) -> bool {
    map.len() == keys.len() && keys.iter().all(|key| map.contains_key(*key))
}

/// Read and validate the `n` member shared by progression and constant
/// descriptors.
fn read_count(map: &Map<String, Value>) -> Result<usize> {
    let n = map
        .get("n")
        .and_then(Value::as_u64)
        .ok_or_else(|| JtonError::malformed("descriptor count n missing or not an integer"))?;
    if n < 2 {
        return Err(JtonError::malformed("descriptor count n must be at least 2"));
    }
    usize::try_from(n).map_err(|_| JtonError::malformed("descriptor count n is out of range"))
}

/// `{"s": start, "d": step, "n": count}` — replay `start + i * step`.
/// Integer progressions stay integers (checked arithmetic), float
/// progressions replay the exact f64 formula the encoder verified.
fn decode_progression(map: &Map<String, Value>) -> Result<Value> {
    let count = read_count(map)?;
    let (Some(start), Some(step)) = (
        map.get("s").and_then(Value::as_number),
        map.get("d").and_then(Value::as_number),
    ) else {
        return Err(JtonError::malformed(
            "progression start and step must be numbers",
        ));
    };

    if start.is_f64() || step.is_f64() {
        let (Some(s0), Some(d)) = (start.as_f64(), step.as_f64()) else {
            return Err(JtonError::malformed("progression bounds are not doubles"));
        };
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let f = s0 + (i as f64) * d;
            let number = Number::from_f64(f).ok_or_else(|| {
                JtonError::malformed("progression leaves the finite double range")
            })?;
            out.push(Value::Number(number));
        }
        Ok(Value::Array(out))
    } else {
        let (Some(s0), Some(d)) = (start.as_i64(), step.as_i64()) else {
            return Err(JtonError::malformed("progression bounds exceed i64"));
        };
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let v = i64::try_from(i)
                .ok()
                .and_then(|i| i.checked_mul(d))
                .and_then(|offset| s0.checked_add(offset))
                .ok_or_else(|| JtonError::malformed("integer progression overflows"))?;
            out.push(Value::Number(Number::from(v)));
        }
        Ok(Value::Array(out))
    }
}

/// `{"c": value, "n": count}` — the repeated value is itself a descriptor
/// (so escape-wrapped strings unwrap before cloning).
fn decode_constant(
    map: &Map<String, Value>,
    inverse: &HashMap<&str, &str>,
    depth: usize,
) -> Result<Value> {
    let count = read_count(map)?;
    let Some(template) = map.get("c") else {
        return Err(JtonError::malformed("constant run missing its value"));
    };
    let template = decode_tree(template, inverse, depth + 1)?;
    Ok(Value::Array(vec![template; count]))
}

/// `{"p": prefix, "x": [suffixes]}` — concatenate the shared prefix back
/// onto every suffix.
fn decode_prefixed(map: &Map<String, Value>) -> Result<Value> {
    let (Some(prefix), Some(suffixes)) = (
        map.get("p").and_then(Value::as_str),
        map.get("x").and_then(Value::as_array),
    ) else {
        return Err(JtonError::malformed(
            "prefix descriptor needs a string p and an array x",
        ));
    };
    let mut out = Vec::with_capacity(suffixes.len());
    for suffix in suffixes {
        let Some(suffix) = suffix.as_str() else {
            return Err(JtonError::malformed("prefix suffix list holds a non-string"));
        };
        out.push(Value::String(format!("{prefix}{suffix}")));
    }
    Ok(Value::Array(out))
}

/// `{"a": 1, "k": [tokens], "d": [columns]}` — expand every column, then
/// zip them back into row objects in column-key order.
fn decode_columnar(
    map: &Map<String, Value>,
    inverse: &HashMap<&str, &str>,
    depth: usize,
) -> Result<Value> {
    if !keys_are(map, &["a", "k", "d"]) {
        return Err(JtonError::malformed(
            "columnar descriptor must have exactly the keys a, k, d",
        ));
    }
    if map.get("a").and_then(Value::as_i64) != Some(1) {
        return Err(JtonError::malformed("unsupported columnar version"));
    }
    let (Some(tokens), Some(col_descriptors)) = (
        map.get("k").and_then(Value::as_array),
        map.get("d").and_then(Value::as_array),
    ) else {
        return Err(JtonError::malformed(
            "columnar descriptor needs arrays at k and d",
        ));
    };
    if tokens.len() != col_descriptors.len() {
        return Err(JtonError::malformed(format!(
            "columnar descriptor has {} keys but {} columns",
            tokens.len(),
            col_descriptors.len()
        )));
    }
    if tokens.is_empty() {
        return Err(JtonError::malformed("columnar descriptor with no columns"));
    }

    let mut keys = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some(token) = token.as_str() else {
            return Err(JtonError::malformed("column key token is not a string"));
        };
        let original = inverse.get(token).ok_or_else(|| {
            JtonError::malformed(format!("column key token {token:?} not in dictionary"))
        })?;
        keys.push(*original);
    }

    let mut cols = Vec::with_capacity(col_descriptors.len());
    for descriptor in col_descriptors {
        cols.push(decode_column(descriptor, inverse, depth + 1)?);
    }
    let rows = cols[0].len();
    if cols.iter().any(|col| col.len() != rows) {
        return Err(JtonError::malformed("columns decode to different lengths"));
    }

    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut object = Map::new();
        for (key, col) in keys.iter().zip(&cols) {
            object.insert((*key).to_string(), col[row].clone());
        }
        out.push(Value::Object(object));
    }
    Ok(Value::Array(out))
}

/// A column must expand to a sequence, whatever descriptor carried it.
fn decode_column(
    value: &Value,
    inverse: &HashMap<&str, &str>,
    depth: usize,
) -> Result<Vec<Value>> {
    match decode_tree(value, inverse, depth)? {
        Value::Array(items) => Ok(items),
        _ => Err(JtonError::malformed("column did not decode to a sequence")),
    }
}
