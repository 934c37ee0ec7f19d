//! Error types for stepscope-layout.

use thiserror::Error;

/// Result type for layout and tree parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from tree parsing and layout.
#[derive(Debug, Error)]
pub enum Error {
    /// The tree is deeper than the layout engine accepts.
    #[error("tree depth {depth} exceeds the maximum of {max}")]
    TooDeep { depth: usize, max: usize },

    /// The input is not a level-order encoding.
    #[error("invalid tree encoding: {0}")]
    InvalidEncoding(String),

    /// An element of the level-order array is neither an integer nor null.
    #[error("element {index} is not an integer or null")]
    NonInteger { index: usize },

    /// A value has no parent to attach to.
    #[error("element {index} has no parent")]
    Orphan { index: usize },

    /// The input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
