//! JTON encoder — rewrites a JSON value into its descriptor-packed form.
//!
//! The encoder is a single top-down transform. Leaves pass through as
//! literals (reserved-prefix strings escape-wrapped), objects are re-keyed
//! through the key dictionary, and arrays are where the work happens:
//!
//! 1. **Columnar**: a row-uniform array of objects becomes
//!    `{"a":1,"k":[tokens],"d":[columns]}`, each column re-entering the
//!    array encoder (so columns pack, and nested uniform rows nest).
//! 2. **Packed**: a same-typed leaf array collects the packer candidates
//!    and keeps whichever serializes shortest, the plain list included.
//! 3. **Plain**: anything else becomes an array of per-element descriptors.
//!
//! After the tree is built the envelope `{"d":tree,"m":dictionary}` is
//! measured against the canonical JSON of the input; whichever is shorter
//! is returned, so no input ever inflates. The one exception is an input
//! whose root already looks like an envelope — its canonical text would be
//! mis-read on decode, so such inputs always ship as a real envelope even
//! when that costs bytes.

use serde_json::{Map, Value};

use crate::analyzer::split_columns;
use crate::decoder::envelope_parts;
use crate::error::Result;
use crate::keys::KeyDict;
use crate::packers::{sequence_candidates, wrap_literal};
use crate::value::{check_depth, check_number};

/// Encoder configuration.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Emit the base64 binary packers (`T U B V H I L F G D`). Turning this
    /// off yields the human-readable variant: arithmetic, constant, prefix,
    /// and columnar encodings only. Escape wrapping of reserved-prefix
    /// literals stays on either way, because the decoder is shared.
    pub binary_packing: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            binary_packing: true,
        }
    }
}

/// Encode a JSON value into JTON text with the default options.
///
/// The output is always a complete JSON text: either an envelope
/// `{"d":…,"m":…}` or, when no encoding wins, the canonical minified JSON
/// of the input itself. Round-trip through [`crate::decompress_json`] is
/// exact in both cases.
///
/// ```
/// use serde_json::json;
///
/// let value = json!({"ids": [10, 20, 30, 40, 50, 60, 70, 80, 90, 100]});
/// let packed = jton_core::compress_json(&value).unwrap();
/// let back = jton_core::decompress_json(&packed).unwrap();
/// assert_eq!(back, value);
/// ```
pub fn compress_json(value: &Value) -> Result<String> {
    compress_json_with(value, &EncodeOptions::default())
}

/// Encode a JSON value into JTON text with explicit options.
pub fn compress_json_with(value: &Value, options: &EncodeOptions) -> Result<String> {
    let mut dict = KeyDict::new();
    let tree = encode_value(value, &mut dict, options, 0)?;

    let mut envelope = Map::new();
    envelope.insert("d".to_string(), tree);
    envelope.insert("m".to_string(), Value::Object(dict.into_map()));
    let envelope_text = serde_json::to_string(&Value::Object(envelope))?;

    let canonical = serde_json::to_string(value)?;
    if envelope_text.len() < canonical.len() || envelope_parts(value).is_some() {
        Ok(envelope_text)
    } else {
        Ok(canonical)
    }
}

/// Recursive transform of one value into its descriptor.
fn encode_value(
    value: &Value,
    dict: &mut KeyDict,
    options: &EncodeOptions,
    depth: usize,
) -> Result<Value> {
    check_depth(depth)?;
    match value {
        Value::Null | Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) => {
            check_number(n)?;
            Ok(value.clone())
        }
        Value::String(s) => Ok(wrap_literal(s)),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(dict.intern(key), encode_value(child, dict, options, depth + 1)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => encode_array(items, dict, options, depth),
    }
}

/// Encode an array (or a column, which is the same problem): columnar if
/// the rows are uniform, otherwise the shortest of the packer candidates
/// and the plain per-element list.
fn encode_array(
    items: &[Value],
    dict: &mut KeyDict,
    options: &EncodeOptions,
    depth: usize,
) -> Result<Value> {
    check_depth(depth)?;

    if let Some(columns) = split_columns(items) {
        let tokens = columns
            .keys
            .iter()
            .map(|key| Value::String(dict.intern(key)))
            .collect();
        let mut cols = Vec::with_capacity(columns.cols.len());
        for col in &columns.cols {
            cols.push(encode_array(col, dict, options, depth + 1)?);
        }
        let mut out = Map::new();
        out.insert("a".to_string(), Value::from(1));
        out.insert("k".to_string(), Value::Array(tokens));
        out.insert("d".to_string(), Value::Array(cols));
        return Ok(Value::Object(out));
    }

    let mut plain = Vec::with_capacity(items.len());
    for item in items {
        plain.push(encode_value(item, dict, options, depth + 1)?);
    }

    // Pick the shortest serialization. The packer candidates outrank the
    // plain list on ties, and earlier-declared packers outrank later ones,
    // so walk them in reverse and let `<=` replace.
    let mut best = Value::Array(plain);
    let mut best_len = serde_json::to_string(&best)?.len();
    for candidate in sequence_candidates(items, options.binary_packing)
        .into_iter()
        .rev()
    {
        let len = serde_json::to_string(&candidate)?.len();
        if len <= best_len {
            best = candidate;
            best_len = len;
        }
    }
    Ok(best)
}
