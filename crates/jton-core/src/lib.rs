//! # jton-core
//!
//! Pure-Rust encoder and decoder for **JTON**, a lossless JSON re-encoding
//! that targets LLM token budgets. The encoder rewrites a JSON value into a
//! semantically equivalent JSON document that spends fewer tokens: object
//! keys shrink to base62 dictionary tokens, uniform object arrays turn
//! columnar, and same-typed sequences collapse into arithmetic-progression,
//! constant-run, prefix-factored, or base64-packed binary descriptors. The
//! decoder reverses every transform exactly, and any document that would
//! not shrink is passed through as plain minified JSON — so decoding also
//! accepts (and returns verbatim) ordinary JSON that never went through the
//! encoder.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use jton_core::{compress_json, decompress_json};
//!
//! let value = json!({
//!     "readings": [
//!         {"sensor": "s-01", "value": 10, "ok": true},
//!         {"sensor": "s-02", "value": 20, "ok": true},
//!         {"sensor": "s-03", "value": 30, "ok": true},
//!     ]
//! });
//!
//! let packed = compress_json(&value).unwrap();
//! assert!(packed.len() <= serde_json::to_string(&value).unwrap().len());
//!
//! let back = decompress_json(&packed).unwrap();
//! assert_eq!(back, value);
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] — `Value` → JTON text (envelope or canonical fallback)
//! - [`decoder`] — JTON text → `Value` (verbatim on non-envelopes)
//! - [`error`] — error taxonomy for both directions
//!
//! Both directions are pure, synchronous, and reentrant: no shared state,
//! no I/O, inputs are never mutated. Nesting beyond 128 levels fails
//! cleanly with [`JtonError::DepthExceeded`] instead of exhausting the
//! stack.

mod analyzer;
pub mod decoder;
pub mod encoder;
pub mod error;
mod keys;
mod packers;
mod value;

pub use decoder::decompress_json;
pub use encoder::{compress_json, compress_json_with, EncodeOptions};
pub use error::{JtonError, Result};
