//! Column analyzer — decides whether an array can be stored columnwise.
//!
//! An array qualifies for columnar storage when it has at least two
//! elements, every element is an object, and every element carries exactly
//! the same keys in exactly the same insertion order as the first element.
//! Extra keys, missing keys, or a different ordering all disqualify the
//! array: the column-key list in the descriptor records one schema and the
//! decoder rebuilds every row from it.
//!
//! Arrays of empty objects are also rejected — with no columns there would
//! be nothing to carry the implicit row count.

use serde_json::Value;

/// A qualified array split into its columns.
pub(crate) struct Columns {
    /// Original key strings, in the shared insertion order of every row.
    pub keys: Vec<String>,
    /// `cols[i]` holds the value at `keys[i]` for each row, in row order.
    pub cols: Vec<Vec<Value>>,
}

/// Split `rows` into columns if the array is row-uniform, `None` otherwise.
pub(crate) fn split_columns(rows: &[Value]) -> Option<Columns> {
    if rows.len() < 2 {
        return None;
    }
    let first = rows[0].as_object()?;
    if first.is_empty() {
        return None;
    }
    let keys: Vec<&String> = first.keys().collect();

    for row in &rows[1..] {
        let obj = row.as_object()?;
        if obj.len() != keys.len() {
            return None;
        }
        // Same key multiset and same insertion order: pairwise comparison.
        if !obj.keys().zip(keys.iter()).all(|(k, expected)| k == *expected) {
            return None;
        }
    }

    let cols = keys
        .iter()
        .map(|key| {
            rows.iter()
                .map(|row| {
                    // Qualification above guarantees the key is present.
                    row.as_object()
                        .and_then(|obj| obj.get(*key))
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    Some(Columns {
        keys: keys.into_iter().cloned().collect(),
        cols,
    })
}
