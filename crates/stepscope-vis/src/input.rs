//! Parsing of problem inputs from their textual form.

use stepscope_replay::Speed;
use thiserror::Error;

/// Rejected problem input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array")]
    NotArray,

    #[error("element {index} is not an integer")]
    NotInteger { index: usize },

    #[error("array is not sorted at index {index}")]
    Unsorted { index: usize },

    #[error("invalid {name}: {value:?}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("unknown problem: {0}")]
    UnknownProblem(String),
}

/// Parse a JSON array of integers such as `[1, 3, 5]`.
pub fn parse_array(input: &str) -> Result<Vec<i64>, InputError> {
    let json: serde_json::Value = serde_json::from_str(input.trim())?;
    let serde_json::Value::Array(items) = json else {
        return Err(InputError::NotArray);
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| item.as_i64().ok_or(InputError::NotInteger { index }))
        .collect()
}

/// Parse a JSON integer array that must be in non-decreasing order.
pub fn parse_sorted_array(input: &str) -> Result<Vec<i64>, InputError> {
    let values = parse_array(input)?;
    if let Some(index) = values.windows(2).position(|w| w[0] > w[1]) {
        return Err(InputError::Unsorted { index: index + 1 });
    }
    Ok(values)
}

/// Parse a whole-number argument.
pub fn parse_integer(name: &'static str, input: &str) -> Result<i64, InputError> {
    input.trim().parse().map_err(|_| InputError::InvalidArgument {
        name,
        value: input.to_string(),
    })
}

/// Parse a playback speed multiplier such as `2` or `0.5`.
///
/// Text that is not a number is an [`InputError`]; a number outside the
/// accepted range is rejected by [`Speed::new`].
pub fn parse_speed(input: &str) -> crate::error::Result<Speed> {
    let multiplier: f64 = input.trim().parse().map_err(|_| InputError::InvalidArgument {
        name: "speed",
        value: input.to_string(),
    })?;
    Ok(Speed::new(multiplier)?)
}
