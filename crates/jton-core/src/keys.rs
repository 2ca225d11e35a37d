//! Key dictionary — maps original object keys to short base62 tokens.
//!
//! Every object key encountered during an encoding walk is interned exactly
//! once, in depth-first first-encounter order, and assigned the next token
//! in the base62 sequence `0, 1, ..., 9, A, ..., Z, a, ..., z, 10, 11, ...`
//! (most significant digit first). Token strings that collide with the
//! reserved descriptor keys (`s d n c p x a k` and the escape wrapper `S`)
//! are skipped during assignment, so an object inside the descriptor tree
//! whose keys are all tokens can never be mistaken for a descriptor shape.
//!
//! The dictionary is built during a single encode call, serialized into the
//! envelope's `"m"` member, and discarded.

use serde_json::{Map, Value};

const BASE62_ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Descriptor keys plus the literal-string escape wrapper key. Tokens never
/// take these spellings; the decoder relies on that to dispatch object
/// shapes without ambiguity.
pub(crate) const RESERVED_TOKENS: [&str; 9] = ["s", "d", "n", "c", "p", "x", "a", "k", "S"];

/// Append-only, insertion-ordered key interner.
///
/// Backed by a `serde_json::Map` (an `IndexMap` under `preserve_order`), so
/// the serialized `"m"` object lists keys in first-encounter order and
/// doubles as the hash index for `O(1)` repeat lookups.
pub(crate) struct KeyDict {
    /// original key -> token, in first-encounter order.
    tokens: Map<String, Value>,
    /// Next base62 counter value to try.
    next: u64,
}

impl KeyDict {
    pub(crate) fn new() -> Self {
        KeyDict {
            tokens: Map::new(),
            next: 0,
        }
    }

    /// Return the token for `key`, assigning the next free one on first use.
    pub(crate) fn intern(&mut self, key: &str) -> String {
        if let Some(Value::String(token)) = self.tokens.get(key) {
            return token.clone();
        }
        let token = loop {
            let candidate = base62(self.next);
            self.next += 1;
            if !RESERVED_TOKENS.contains(&candidate.as_str()) {
                break candidate;
            }
        };
        self.tokens
            .insert(key.to_string(), Value::String(token.clone()));
        token
    }

    /// The serialized form of the dictionary: `{ original_key: token }`.
    pub(crate) fn into_map(self) -> Map<String, Value> {
        self.tokens
    }
}

/// Encode a counter value in base62, most significant digit first.
/// `0 -> "0"`, `61 -> "z"`, `62 -> "10"`. Never empty, never padded.
pub(crate) fn base62(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(BASE62_ALPHABET[(n % 62) as usize] as char);
        n /= 62;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}
