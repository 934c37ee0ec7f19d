//! Error types for stepscope-trace.

use thiserror::Error;

use crate::step::StepKind;

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while recording or finalizing a trace.
#[derive(Debug, Error)]
pub enum Error {
    /// The instrumented algorithm returned an error; the partial trace was discarded.
    #[error("algorithm failed: {0}")]
    Algorithm(Box<dyn std::error::Error + Send + Sync>),

    /// The instrumented algorithm panicked; the partial trace was discarded.
    #[error("algorithm panicked: {0}")]
    Panicked(String),

    /// A start step was recorded somewhere other than the first position.
    #[error("start step recorded at index {index}; only the first step may be a start step")]
    MisplacedStart { index: usize },

    /// A step was recorded after the run had already reached a terminal step.
    #[error("{kind} step recorded at index {index} after the terminal step")]
    RecordAfterTerminal { index: usize, kind: StepKind },

    /// The run recorded more steps than the configured limit.
    #[error("trace exceeded the limit of {limit} steps")]
    TooManySteps { limit: usize },

    /// A step sequence does not have the shape of a finalized trace.
    #[error("invalid trace shape: {0}")]
    InvalidShape(String),

    /// Canonical encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
