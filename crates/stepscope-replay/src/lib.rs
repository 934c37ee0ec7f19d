//! Stepscope Replay: Playback over Recorded Traces
//!
//! Replays a finalized [`Trace`](stepscope_trace::Trace) one step at a time.
//!
//! - [`ReplayController`]: synchronous state machine (idle, paused, playing)
//!   owning the replay position. Positions clamp to the trace bounds.
//! - [`Player`]: runs a controller on a tokio task and advances it on a
//!   timer scaled by the current [`Speed`].
//!
//! # Example
//!
//! ```
//! use stepscope_replay::{ReplayController, ReplayState};
//! use stepscope_trace::{build_trace, StepKind, Payload};
//!
//! let trace = build_trace(&3usize, |rec, n| {
//!     rec.record(StepKind::Start, Payload::new(), "begin");
//!     for i in 0..*n {
//!         rec.record(StepKind::Visit, Payload::new().with("i", i), format!("visit {}", i));
//!     }
//!     rec.record(StepKind::Done, Payload::new(), "done");
//!     Ok::<_, std::convert::Infallible>(())
//! })
//! .unwrap();
//!
//! let mut replay = ReplayController::with_trace(trace);
//! assert_eq!(replay.state(), ReplayState::Paused);
//! replay.seek(100).unwrap();
//! assert_eq!(replay.current_index(), 4);
//! ```

pub mod controller;
pub mod error;
pub mod player;

pub use controller::{ReplayController, ReplayState, ReplayStatus, Speed, Tick};
pub use error::{Error, Result};
pub use player::{Player, PlayerConfig};
