use thiserror::Error;

/// Everything that can go wrong while extracting derived contexts.
///
/// Only `InvalidInput`, `Envelope` and `InvalidPath` are returned as hard
/// failures. The other kinds describe problems local to one fragment or one
/// navigation chain and are absorbed (see [`crate::group::Diagnostic`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("malformed schema `{schema}`: {reason}")]
    MalformedSchema { schema: String, reason: String },

    #[error("malformed fragment #{index}: {reason}")]
    MalformedFragment { index: usize, reason: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing field: {0}")]
    MissingField(String),

    // fatal for the whole call
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("envelope error: {0}")]
    Envelope(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
