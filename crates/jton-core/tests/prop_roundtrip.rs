/// Property-based roundtrip tests.
///
/// Uses the `proptest` crate to generate random JSON values and verify that
/// `decompress_json(compress_json(v)) == v` holds for all generated inputs,
/// alongside the no-inflation and decoder-identity properties. Strategies
/// lean on the hostile cases: keys that collide with descriptor spellings,
/// strings that look like packed sequences, integer extremes, and uniform
/// object arrays that trigger the columnar path.
///
/// `serde_json` floats round-trip their text form exactly (shortest-decimal
/// formatting), and every packed form is verified bit-exact before the
/// encoder commits to it, so value equality needs no normalization pass.
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use jton_core::{compress_json, compress_json_with, decompress_json, EncodeOptions};

// ============================================================================
// Strategies for generating JSON values
// ============================================================================

/// Object keys: ordinary identifiers plus the reserved descriptor
/// spellings and other single characters that stress the dictionary.
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,12}").unwrap(),
        1 => prop_oneof![
            Just("a".to_string()),
            Just("d".to_string()),
            Just("k".to_string()),
            Just("m".to_string()),
            Just("n".to_string()),
            Just("s".to_string()),
            Just("S".to_string()),
            Just("x".to_string()),
            Just("".to_string()),
        ],
    ]
}

/// String values, biased toward the cases that interact with descriptor
/// parsing: packed-sequence lookalikes, keywords, whitespace, unicode.
fn arb_json_string() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[a-zA-Z0-9 ,.:/_-]{0,24}").unwrap(),
        1 => prop_oneof![
            Just("".to_string()),
            Just("true".to_string()),
            Just("null".to_string()),
            Just("U12345".to_string()),
            Just("T/8A=~10".to_string()),
            Just("Dqqqq".to_string()),
            Just("F".to_string()),
            Just("G~1".to_string()),
            Just("Lorem ipsum".to_string()),
            Just("  padded  ".to_string()),
            Just("caf\u{00e9}".to_string()),
            Just("\u{4f60}\u{597d}".to_string()),
            Just("line1\nline2".to_string()),
            Just("quote\"inside".to_string()),
        ],
    ]
}

fn arb_json_integer() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (-1_000_000i64..1_000_000i64).prop_map(Value::from),
        1 => any::<i64>().prop_map(Value::from),
        1 => (u64::MAX - 1000..=u64::MAX).prop_map(Value::from),
    ]
}

/// Floats: simple decimals (the scaled-pack sweet spot) plus arbitrary
/// finite doubles.
fn arb_json_float() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => (-3_000_000i64..3_000_000i64, 1u32..5u32).prop_filter_map(
            "whole numbers are integers in this model",
            |(mantissa, decimals)| {
                let f = mantissa as f64 / 10f64.powi(decimals as i32);
                if f.fract() == 0.0 {
                    return None;
                }
                serde_json::Number::from_f64(f).map(Value::Number)
            },
        ),
        1 => any::<f64>().prop_filter_map("finite doubles only", |f| {
            serde_json::Number::from_f64(f).map(Value::Number)
        }),
    ]
}

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_json_string().prop_map(Value::String),
        arb_json_integer(),
        arb_json_float(),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

fn arb_flat_object() -> impl Strategy<Value = Value> {
    prop::collection::vec((arb_key(), arb_primitive()), 0..8).prop_map(|pairs| {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        Value::Object(map)
    })
}

fn arb_primitive_array() -> impl Strategy<Value = Value> {
    prop_oneof![
        // Mixed primitives
        prop::collection::vec(arb_primitive(), 0..12).prop_map(Value::Array),
        // Same-typed runs that exercise the packers
        prop::collection::vec(arb_json_integer(), 2..40).prop_map(Value::Array),
        prop::collection::vec(arb_json_float(), 2..40).prop_map(Value::Array),
        prop::collection::vec(any::<bool>().prop_map(Value::Bool), 2..40).prop_map(Value::Array),
        prop::collection::vec(arb_json_string().prop_map(Value::String), 2..16)
            .prop_map(Value::Array),
    ]
}

/// Uniform object arrays: every row shares the same keys in the same
/// order, which is exactly what the column analyzer fires on.
fn arb_tabular_array() -> impl Strategy<Value = Value> {
    (prop::collection::vec(arb_key(), 1..5), 2..8usize).prop_flat_map(|(fields, rows)| {
        let mut unique = Vec::new();
        for field in fields {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        let width = unique.len();
        prop::collection::vec(
            prop::collection::vec(arb_primitive(), width..=width),
            rows..=rows,
        )
        .prop_map(move |rows| {
            let arr: Vec<Value> = rows
                .into_iter()
                .map(|values| {
                    let mut map = Map::new();
                    for (k, v) in unique.iter().zip(values) {
                        map.insert(k.clone(), v);
                    }
                    Value::Object(map)
                })
                .collect();
            Value::Array(arr)
        })
    })
}

fn arb_json_value_inner(depth: u32) -> impl Strategy<Value = Value> {
    if depth == 0 {
        arb_primitive().boxed()
    } else {
        prop_oneof![
            4 => arb_primitive(),
            1 => arb_tabular_array(),
            2 => prop::collection::vec((arb_key(), arb_json_value_inner(depth - 1)), 0..5)
                .prop_map(|pairs| {
                    let mut map = Map::new();
                    for (k, v) in pairs {
                        map.insert(k, v);
                    }
                    Value::Object(map)
                }),
            2 => prop::collection::vec(arb_json_value_inner(depth - 1), 0..5)
                .prop_map(Value::Array),
        ]
        .boxed()
    }
}

fn arb_json_value() -> impl Strategy<Value = Value> {
    arb_json_value_inner(3)
}

/// Inputs whose root already looks like an envelope trade no-inflation for
/// roundtrip correctness; the size properties exclude them.
fn is_envelope_shaped(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        map.len() == 2
            && map.contains_key("d")
            && map
                .get("m")
                .and_then(Value::as_object)
                .is_some_and(|m| m.values().all(Value::is_string))
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Core roundtrip property: decompress(compress(v)) == v.
    #[test]
    fn roundtrip_preserves_json(value in arb_json_value()) {
        let packed = compress_json(&value).unwrap();
        let back = decompress_json(&packed).unwrap();
        prop_assert_eq!(
            &back, &value,
            "roundtrip failed!\n  input:  {}\n  packed: {}\n  output: {}",
            value, packed, back
        );
    }

    /// The readable variant (no binary packers) roundtrips too.
    #[test]
    fn readable_roundtrip_preserves_json(value in arb_json_value()) {
        let options = EncodeOptions { binary_packing: false };
        let packed = compress_json_with(&value, &options).unwrap();
        let back = decompress_json(&packed).unwrap();
        prop_assert_eq!(&back, &value);
    }

    /// Flat objects (the config-file shape).
    #[test]
    fn roundtrip_flat_object(value in arb_flat_object()) {
        let packed = compress_json(&value).unwrap();
        prop_assert_eq!(decompress_json(&packed).unwrap(), value);
    }

    /// Primitive arrays across every packer family.
    #[test]
    fn roundtrip_primitive_array(value in arb_primitive_array()) {
        let packed = compress_json(&value).unwrap();
        prop_assert_eq!(decompress_json(&packed).unwrap(), value);
    }

    /// Uniform object arrays (the columnar path).
    #[test]
    fn roundtrip_tabular_array(arr in arb_tabular_array()) {
        let value = json!({ "data": arr });
        let packed = compress_json(&value).unwrap();
        prop_assert_eq!(decompress_json(&packed).unwrap(), value);
    }

    /// Compressing never inflates (envelope-shaped roots excepted, which
    /// must pay for a real envelope to stay decodable).
    #[test]
    fn no_inflation(value in arb_json_value().prop_filter(
        "envelope-shaped inputs are exempt from no-inflation",
        |v| !is_envelope_shaped(v),
    )) {
        let packed = compress_json(&value).unwrap();
        let canonical = serde_json::to_string(&value).unwrap();
        prop_assert!(
            packed.len() <= canonical.len(),
            "inflated: {} -> {}",
            canonical, packed
        );
    }

    /// The decoder is the identity on canonical JSON that never went
    /// through the encoder.
    #[test]
    fn decoder_identity_on_canonical(value in arb_json_value().prop_filter(
        "envelope-shaped documents are decoded, not passed through",
        |v| !is_envelope_shaped(v),
    )) {
        let canonical = serde_json::to_string(&value).unwrap();
        prop_assert_eq!(decompress_json(&canonical).unwrap(), value);
    }

    /// Strings opening with a packed prefix survive exactly.
    #[test]
    fn reserved_prefix_strings_preserved(
        prefix in prop::sample::select(vec!["T", "U", "B", "V", "H", "I", "L", "F", "G", "D"]),
        tail in "[A-Za-z0-9+/=~]{0,12}",
        copies in 1usize..20,
    ) {
        let literal = format!("{prefix}{tail}");
        let strings: Vec<String> = vec![literal.clone(); copies];
        let value = json!({ "tags": strings, "one": literal });
        let packed = compress_json(&value).unwrap();
        prop_assert_eq!(decompress_json(&packed).unwrap(), value);
    }

    /// Encoding and decoding never panic on any generated value.
    #[test]
    fn encode_decode_never_panic(value in arb_json_value()) {
        let packed = compress_json(&value).unwrap();
        let _ = decompress_json(&packed).unwrap();
    }
}
