//! Error types for stepscope-vis.

use thiserror::Error;

use crate::input::InputError;

/// Result type for the reference callers.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced while parsing, tracing, laying out or replaying a problem.
#[derive(Debug, Error)]
pub enum Error {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("trace error: {0}")]
    Trace(#[from] stepscope_trace::Error),

    #[error("layout error: {0}")]
    Layout(#[from] stepscope_layout::Error),

    #[error("replay error: {0}")]
    Replay(#[from] stepscope_replay::Error),
}
