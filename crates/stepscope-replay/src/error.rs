//! Error types for stepscope-replay.

use thiserror::Error;

/// Result type for replay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the replay controller and player.
///
/// Stepping or seeking past either end is not an error; positions clamp.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A playback operation was issued with no trace loaded.
    #[error("no trace loaded")]
    NoTrace,

    /// Speed multipliers must be finite and positive.
    #[error("invalid playback speed: {0}")]
    InvalidSpeed(f64),

    /// The player task has stopped.
    #[error("player has shut down")]
    PlayerClosed,
}
