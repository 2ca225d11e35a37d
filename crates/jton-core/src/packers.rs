//! Sequence packers — candidate encodings for same-typed leaf sequences.
//!
//! Given a sequence of leaf values sharing one type (a column from the
//! analyzer, or a whole array of leaves), each packer either produces a
//! descriptor that losslessly replaces the sequence or declares itself not
//! applicable. The encoder measures every candidate's serialized length and
//! keeps the shortest; candidates here are returned in declaration order so
//! ties resolve to the earlier strategy:
//!
//! 1. Arithmetic progression: `{"s": start, "d": step, "n": count}`
//! 2. Constant run: `{"c": value, "n": count}`
//! 3. Prefix-factored strings: `{"p": prefix, "x": [suffixes]}`
//! 4. Bit-packed booleans: `"T<base64>~<count>"`, MSB-first, zero padding
//! 5. Width-packed integers: `"<U|B|V|H|I|L><base64>"`, little-endian
//! 6. Scaled floats: `"F<base64>"` (×100, i16) / `"G<base64>"` (×1000, i32)
//! 7. Raw doubles: `"D<base64>"`, IEEE-754 little-endian
//!
//! Every binary form is reversible by construction; the scaled-float packers
//! additionally verify that dividing the scaled integer back yields the
//! original double bit-for-bit before committing to the candidate.
//!
//! The symmetric `unpack` half lives here too, so the wire knowledge of
//! each prefix stays in one module.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Number, Value};

use crate::error::{JtonError, Result};
use crate::value::{as_i64, uniform_kind, LeafKind};

/// One-character prefixes that mark a string as a packed sequence.
pub(crate) const PACKED_PREFIXES: [char; 10] =
    ['T', 'U', 'B', 'V', 'H', 'I', 'L', 'F', 'G', 'D'];

/// Minimum sequence lengths per packer, fixed for this format revision.
/// Below these, the textual descriptors (constant, progression, plain list)
/// win on both byte count and typical LLM token count, so the binary forms
/// do not compete.
const BOOL_PACK_MIN: usize = 16;
const INT_PACK_MIN: usize = 8;
const FLOAT_PACK_MIN: usize = 8;

/// Scaled-float rounding tolerance. Candidates must also survive the exact
/// divide-back check, so this only pre-filters obvious non-decimals.
const SCALE_TOLERANCE: f64 = 1e-9;

/// Does this literal string collide with the packed-sequence namespace?
pub(crate) fn has_packed_prefix(s: &str) -> bool {
    s.chars().next().is_some_and(|c| PACKED_PREFIXES.contains(&c))
}

/// Escape a literal string for a descriptor position: strings opening with
/// a packed prefix are wrapped as `{"S": s}` so the decoder cannot mistake
/// them for a packed sequence.
pub(crate) fn wrap_literal(s: &str) -> Value {
    if has_packed_prefix(s) {
        json!({ "S": s })
    } else {
        Value::String(s.to_string())
    }
}

/// All applicable packed candidates for `values`, in tie-break order.
/// Empty when the sequence is shorter than 2, mixes types, or contains
/// containers. With `binary` off (the readable variant) only the textual
/// descriptors are produced.
pub(crate) fn sequence_candidates(values: &[Value], binary: bool) -> Vec<Value> {
    let mut out = Vec::new();
    if values.len() < 2 {
        return out;
    }
    let Some(kind) = uniform_kind(values) else {
        return out;
    };

    if let Some(c) = arithmetic(values, kind) {
        out.push(c);
    }
    if let Some(c) = constant(values) {
        out.push(c);
    }
    if kind == LeafKind::Str {
        if let Some(c) = prefix_factored(values) {
            out.push(c);
        }
    }
    if binary {
        match kind {
            LeafKind::Bool => out.extend(packed_bools(values)),
            LeafKind::Int => out.extend(packed_ints(values)),
            LeafKind::Float => {
                out.extend(packed_scaled(values, 100.0, i16::MIN as i64, i16::MAX as i64, 'F', 2));
                out.extend(packed_scaled(values, 1000.0, i32::MIN as i64, i32::MAX as i64, 'G', 4));
                out.extend(packed_doubles(values));
            }
            LeafKind::Null | LeafKind::Str => {}
        }
    }
    out
}

/// Arithmetic progression over all-integer or all-float sequences. Floats
/// must reproduce bit-for-bit under `start + i * step`, the exact formula
/// the decoder replays.
fn arithmetic(values: &[Value], kind: LeafKind) -> Option<Value> {
    match kind {
        LeafKind::Int => {
            let nums: Vec<i64> = values.iter().map(as_i64).collect::<Option<_>>()?;
            let step = nums[1].checked_sub(nums[0])?;
            for (i, &v) in nums.iter().enumerate() {
                let expected = (i as i64)
                    .checked_mul(step)
                    .and_then(|offset| nums[0].checked_add(offset))?;
                if v != expected {
                    return None;
                }
            }
            Some(json!({ "s": nums[0], "d": step, "n": nums.len() }))
        }
        LeafKind::Float => {
            let nums: Vec<f64> = values.iter().map(Value::as_f64).collect::<Option<_>>()?;
            let step = nums[1] - nums[0];
            if !step.is_finite() {
                return None;
            }
            for (i, &v) in nums.iter().enumerate() {
                let recomputed = nums[0] + (i as f64) * step;
                if recomputed.to_bits() != v.to_bits() {
                    return None;
                }
            }
            Some(json!({ "s": nums[0], "d": step, "n": nums.len() }))
        }
        _ => None,
    }
}

/// Constant run of any leaf value. Equality goes through `serde_json`'s
/// `Value` comparison, which keeps `1` and `1.0` distinct.
fn constant(values: &[Value]) -> Option<Value> {
    let first = &values[0];
    if !values[1..].iter().all(|v| v == first) {
        return None;
    }
    let repeated = match first {
        Value::String(s) => wrap_literal(s),
        other => other.clone(),
    };
    Some(json!({ "c": repeated, "n": values.len() }))
}

/// Factor the longest common prefix out of an all-string sequence. Needs a
/// shared prefix of at least 2 characters; whether it actually beats the
/// plain list is the cost comparison's call. Suffixes live in a
/// literal-only position and are never escape-wrapped.
fn prefix_factored(values: &[Value]) -> Option<Value> {
    let strings: Vec<&str> = values.iter().map(Value::as_str).collect::<Option<_>>()?;
    let prefix = longest_common_prefix(&strings);
    if prefix.chars().count() < 2 {
        return None;
    }
    let suffixes: Vec<Value> = strings
        .iter()
        .map(|s| Value::String(s[prefix.len()..].to_string()))
        .collect();
    Some(json!({ "p": prefix, "x": suffixes }))
}

/// Longest common prefix of a non-empty string slice, on char boundaries.
fn longest_common_prefix(strings: &[&str]) -> String {
    let mut prefix = strings[0];
    for s in &strings[1..] {
        let shared: usize = prefix
            .chars()
            .zip(s.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        prefix = &prefix[..shared];
        if prefix.is_empty() {
            break;
        }
    }
    prefix.to_string()
}

/// Pack booleans 8 per byte, most-significant-bit first, padding the final
/// byte with zero bits. The `~count` suffix lets the decoder discard the
/// padding exactly.
fn packed_bools(values: &[Value]) -> Option<Value> {
    if values.len() < BOOL_PACK_MIN {
        return None;
    }
    let bits: Vec<bool> = values.iter().map(Value::as_bool).collect::<Option<_>>()?;
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    Some(Value::String(format!(
        "T{}~{}",
        STANDARD.encode(&bytes),
        bits.len()
    )))
}

/// Pack integers at the narrowest width whose range covers every element,
/// little-endian. Sequence length is implicit: `bytes / width`.
fn packed_ints(values: &[Value]) -> Option<Value> {
    if values.len() < INT_PACK_MIN {
        return None;
    }
    let nums: Vec<i64> = values.iter().map(as_i64).collect::<Option<_>>()?;
    let min = *nums.iter().min()?;
    let max = *nums.iter().max()?;
    let (prefix, width) = int_width(min, max);
    let mut bytes = Vec::with_capacity(nums.len() * width);
    for &v in &nums {
        // Truncating the little-endian form keeps exactly the two's
        // complement narrow encoding once the range check has passed.
        bytes.extend_from_slice(&v.to_le_bytes()[..width]);
    }
    Some(Value::String(format!("{prefix}{}", STANDARD.encode(&bytes))))
}

/// Narrowest covering width, checked in declaration order.
fn int_width(min: i64, max: i64) -> (char, usize) {
    if min >= 0 && max <= u8::MAX as i64 {
        ('U', 1)
    } else if min >= i8::MIN as i64 && max <= i8::MAX as i64 {
        ('B', 1)
    } else if min >= 0 && max <= u16::MAX as i64 {
        ('V', 2)
    } else if min >= i16::MIN as i64 && max <= i16::MAX as i64 {
        ('H', 2)
    } else if min >= i32::MIN as i64 && max <= i32::MAX as i64 {
        ('I', 4)
    } else {
        ('L', 8)
    }
}

/// Fixed-point float pack: every element times `scale` must round to an
/// integer within tolerance, fit the target width, and divide back to the
/// original double bit-for-bit.
fn packed_scaled(
    values: &[Value],
    scale: f64,
    lo: i64,
    hi: i64,
    prefix: char,
    width: usize,
) -> Option<Value> {
    if values.len() < FLOAT_PACK_MIN {
        return None;
    }
    let mut bytes = Vec::with_capacity(values.len() * width);
    for value in values {
        let f = value.as_f64()?;
        let scaled = f * scale;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > SCALE_TOLERANCE {
            return None;
        }
        if rounded < lo as f64 || rounded > hi as f64 {
            return None;
        }
        let q = rounded as i64;
        if (q as f64 / scale).to_bits() != f.to_bits() {
            return None;
        }
        bytes.extend_from_slice(&q.to_le_bytes()[..width]);
    }
    Some(Value::String(format!("{prefix}{}", STANDARD.encode(&bytes))))
}

/// Raw IEEE-754 doubles, 8 bytes each, little-endian.
fn packed_doubles(values: &[Value]) -> Option<Value> {
    if values.len() < FLOAT_PACK_MIN {
        return None;
    }
    let mut bytes = Vec::with_capacity(values.len() * 8);
    for value in values {
        bytes.extend_from_slice(&value.as_f64()?.to_le_bytes());
    }
    Some(Value::String(format!("D{}", STANDARD.encode(&bytes))))
}

// ----------------------------------------------------------------------------
// Decoding
// ----------------------------------------------------------------------------

/// Decode a packed-sequence string back into its element values. The caller
/// has already established that the first character is a packed prefix; a
/// body that cannot be what its prefix claims is malformed, as is any body
/// implying fewer than 2 elements (the encoder never packs shorter runs).
pub(crate) fn unpack(s: &str) -> Result<Vec<Value>> {
    let Some(prefix) = s.chars().next() else {
        return Err(JtonError::malformed("empty packed sequence"));
    };
    let body = &s[prefix.len_utf8()..];
    let values = match prefix {
        'T' => unpack_bools(body)?,
        'U' => unpack_ints(body, 1, false)?,
        'B' => unpack_ints(body, 1, true)?,
        'V' => unpack_ints(body, 2, false)?,
        'H' => unpack_ints(body, 2, true)?,
        'I' => unpack_ints(body, 4, true)?,
        'L' => unpack_ints(body, 8, true)?,
        'F' => unpack_scaled(body, 2, 100.0)?,
        'G' => unpack_scaled(body, 4, 1000.0)?,
        'D' => unpack_doubles(body)?,
        other => {
            return Err(JtonError::malformed(format!(
                "unknown packed prefix {other:?}"
            )))
        }
    };
    if values.len() < 2 {
        return Err(JtonError::malformed(
            "packed sequence implies fewer than 2 elements",
        ));
    }
    Ok(values)
}

fn decode_base64(body: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(body)
        .map_err(|e| JtonError::malformed(format!("bad base64 in packed sequence: {e}")))
}

/// `T<base64>~<count>`: the count suffix says how many leading bits of the
/// byte stream are live; everything past it is padding.
fn unpack_bools(body: &str) -> Result<Vec<Value>> {
    let tilde = body
        .rfind('~')
        .ok_or_else(|| JtonError::malformed("boolean pack missing '~count' suffix"))?;
    let bytes = decode_base64(&body[..tilde])?;
    let count: usize = body[tilde + 1..]
        .parse()
        .map_err(|_| JtonError::malformed("boolean pack has a non-numeric count"))?;
    if bytes.len() != count.div_ceil(8) {
        return Err(JtonError::malformed(format!(
            "boolean pack length mismatch: {} bytes for {count} bits",
            bytes.len()
        )));
    }
    Ok((0..count)
        .map(|i| Value::Bool(bytes[i / 8] & (0x80 >> (i % 8)) != 0))
        .collect())
}

fn unpack_ints(body: &str, width: usize, signed: bool) -> Result<Vec<Value>> {
    let bytes = decode_base64(body)?;
    if bytes.len() % width != 0 {
        return Err(JtonError::malformed(format!(
            "integer pack of {} bytes is not a multiple of width {width}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(width)
        .map(|chunk| read_le_int(chunk, signed))
        .map(|v| Value::Number(Number::from(v)))
        .collect())
}

/// Reassemble one little-endian integer of 1, 2, 4, or 8 bytes.
fn read_le_int(chunk: &[u8], signed: bool) -> i64 {
    let mut buf = [0u8; 8];
    buf[..chunk.len()].copy_from_slice(chunk);
    let raw = u64::from_le_bytes(buf);
    if signed {
        // Sign-extend from the top bit of the narrow width.
        let shift = 64 - chunk.len() * 8;
        ((raw << shift) as i64) >> shift
    } else {
        raw as i64
    }
}

fn unpack_scaled(body: &str, width: usize, scale: f64) -> Result<Vec<Value>> {
    let bytes = decode_base64(body)?;
    if bytes.len() % width != 0 {
        return Err(JtonError::malformed(format!(
            "scaled-float pack of {} bytes is not a multiple of width {width}",
            bytes.len()
        )));
    }
    bytes
        .chunks_exact(width)
        .map(|chunk| {
            let q = read_le_int(chunk, true);
            Number::from_f64(q as f64 / scale)
                .map(Value::Number)
                .ok_or_else(|| JtonError::malformed("scaled float decodes outside the JSON domain"))
        })
        .collect()
}

fn unpack_doubles(body: &str) -> Result<Vec<Value>> {
    let bytes = decode_base64(body)?;
    if bytes.len() % 8 != 0 {
        return Err(JtonError::malformed(format!(
            "double pack of {} bytes is not a multiple of 8",
            bytes.len()
        )));
    }
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            Number::from_f64(f64::from_le_bytes(buf))
                .map(Value::Number)
                .ok_or_else(|| JtonError::malformed("double pack contains a non-finite value"))
        })
        .collect()
}
