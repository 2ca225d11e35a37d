//! Leaf-value classification over the `serde_json` value model.
//!
//! JTON operates directly on `serde_json::Value` (with `preserve_order`, so
//! object key insertion order survives). `serde_json::Number` already keeps
//! the integer/float distinction — `1` and `1.0` parse, compare, and
//! serialize differently — and cannot represent NaN or Infinity, which keeps
//! the whole `Value` tree inside the JSON domain. What this module adds is
//! the type-uniformity view the column analyzer and sequence packers need.

use serde_json::Value;

use crate::error::{JtonError, Result};

/// Maximum nesting depth accepted by the encoder and decoder. Matches
/// `serde_json`'s default parser recursion limit, so any value that came
/// from `serde_json::from_str` is always in range; deeper trees built
/// programmatically fail with `DepthExceeded` instead of blowing the stack.
pub(crate) const MAX_DEPTH: usize = 128;

/// The type of a leaf (non-container) JSON value. Integers and floats are
/// distinct kinds: a sequence mixing `1` and `1.5` is not packable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeafKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
}

/// Classify a value as a leaf kind, or `None` for arrays and objects.
pub(crate) fn leaf_kind(value: &Value) -> Option<LeafKind> {
    match value {
        Value::Null => Some(LeafKind::Null),
        Value::Bool(_) => Some(LeafKind::Bool),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(LeafKind::Int)
            } else {
                Some(LeafKind::Float)
            }
        }
        Value::String(_) => Some(LeafKind::Str),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// The shared leaf kind of a non-empty sequence, or `None` when the
/// sequence is empty, mixes kinds, or contains containers.
pub(crate) fn uniform_kind(values: &[Value]) -> Option<LeafKind> {
    let first = leaf_kind(values.first()?)?;
    for value in &values[1..] {
        if leaf_kind(value)? != first {
            return None;
        }
    }
    Some(first)
}

/// Extract an `i64` from a number value. Integers above `i64::MAX` exist in
/// the `serde_json` model (`u64` range); those stay literal and never pack.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    value.as_number().and_then(|n| n.as_i64())
}

/// Verify a number lies inside the JSON value domain (finite, integer or
/// double). Unreachable for values parsed from JSON text, but values built
/// programmatically against future `serde_json` feature sets go through the
/// same gate instead of being silently mangled.
pub(crate) fn check_number(n: &serde_json::Number) -> Result<()> {
    if n.is_i64() || n.is_u64() || n.as_f64().is_some_and(f64::is_finite) {
        Ok(())
    } else {
        Err(JtonError::UnsupportedValue(format!(
            "number outside the JSON domain: {n}"
        )))
    }
}

/// Guard a recursion step, failing cleanly past [`MAX_DEPTH`].
pub(crate) fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        Err(JtonError::DepthExceeded(MAX_DEPTH))
    } else {
        Ok(())
    }
}
