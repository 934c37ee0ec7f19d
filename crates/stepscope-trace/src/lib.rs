//! Stepscope Trace
//!
//! Captures an algorithm's execution as an ordered sequence of immutable
//! snapshots that can be replayed and scrubbed in any order.
//!
//! # Recording
//!
//! An instrumented algorithm receives a [`Recorder`] and calls
//! [`Recorder::record`] at each meaningful point. Payloads are owned
//! [`Value`]s: conversions from borrowed containers clone, so the live
//! algorithm state can be mutated freely after a step is taken.
//!
//! # Trace shape
//!
//! Every [`Trace`] has at least two steps, starts with [`StepKind::Start`] and
//! ends with a terminal kind (`found`, `not_found`, `finish`, `done`). The
//! builder supplies missing frame steps, so degenerate inputs still satisfy
//! the shape.
//!
//! # Usage
//!
//! ```
//! use stepscope_trace::{build_trace, Payload, StepKind};
//!
//! let trace = build_trace(&[3, 1, 2][..], |rec, xs: &[i64]| {
//!     rec.record(StepKind::Start, Payload::new().with("array", xs), "Begin");
//!     let max = xs.iter().copied().max();
//!     rec.record(StepKind::Finish, Payload::new().with("max", max), "Done");
//!     Ok::<_, std::convert::Infallible>(())
//! })
//! .unwrap();
//!
//! assert_eq!(trace.len(), 2);
//! ```

mod builder;
mod error;
mod step;
mod trace;
mod value;

pub use builder::{build_trace, build_trace_with, Recorder, TraceConfig, DEFAULT_MAX_STEPS};
pub use error::{Error, Result};
pub use step::{EntityId, Step, StepKind};
pub use trace::Trace;
pub use value::{Payload, Value};
