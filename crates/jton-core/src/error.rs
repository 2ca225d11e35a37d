//! Error types for JTON encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur during JTON encoding or decoding.
#[derive(Error, Debug)]
pub enum JtonError {
    /// The input text was not valid JSON (decoding path).
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The input parsed as JSON and claims to be a JTON envelope, but
    /// violates the descriptor grammar (unknown packed prefix, bad base64,
    /// missing count, token not in the dictionary, ragged columns, ...).
    #[error("malformed JTON input: {0}")]
    MalformedInput(String),

    /// The input value lies outside the JSON value domain (encoding path).
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    /// Value nesting exceeds the supported recursion depth.
    #[error("nesting depth exceeds the supported maximum of {0}")]
    DepthExceeded(usize),
}

impl JtonError {
    /// Shorthand for a `MalformedInput` with a formatted message.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        JtonError::MalformedInput(message.into())
    }
}

/// Convenience alias used throughout jton-core.
pub type Result<T> = std::result::Result<T, JtonError>;
