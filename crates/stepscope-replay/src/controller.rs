//! Playback state machine over a recorded trace.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepscope_trace::{Step, StepKind, Trace};
use tracing::debug;

use crate::error::{Error, Result};

/// Playback speed multiplier.
///
/// The advance interval is the base interval divided by the multiplier.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Speed(f64);

impl Speed {
    /// 0.25x speed
    pub const QUARTER: Speed = Speed(0.25);
    /// 0.5x speed
    pub const HALF: Speed = Speed(0.5);
    /// Normal speed (1x)
    pub const NORMAL: Speed = Speed(1.0);
    /// 2x speed
    pub const DOUBLE: Speed = Speed(2.0);
    /// 4x speed
    pub const QUADRUPLE: Speed = Speed(4.0);

    /// Slowest accepted multiplier.
    pub const MIN_MULTIPLIER: f64 = 0.01;
    /// Fastest accepted multiplier.
    pub const MAX_MULTIPLIER: f64 = 100.0;

    /// Create a speed; the multiplier must lie in
    /// `[MIN_MULTIPLIER, MAX_MULTIPLIER]`.
    pub fn new(multiplier: f64) -> Result<Self> {
        if (Self::MIN_MULTIPLIER..=Self::MAX_MULTIPLIER).contains(&multiplier) {
            Ok(Self(multiplier))
        } else {
            Err(Error::InvalidSpeed(multiplier))
        }
    }

    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        self.0
    }

    /// Time between autonomous advances at this speed. Saturates at
    /// `Duration::MAX` for base intervals too long to scale.
    pub fn interval(&self, base: Duration) -> Duration {
        Duration::try_from_secs_f64(base.as_secs_f64() / self.0).unwrap_or(Duration::MAX)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for Speed {
    type Error = Error;

    fn try_from(multiplier: f64) -> Result<Self> {
        Speed::new(multiplier)
    }
}

impl From<Speed> for f64 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayState {
    /// No trace loaded
    #[default]
    Idle,
    /// Trace loaded, position fixed
    Paused,
    /// Position advances on every tick
    Playing,
}

/// Outcome of an autonomous advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Moved to this index, still playing
    Advanced(usize),
    /// Reached the last index and paused
    Finished(usize),
    /// Not playing; nothing happened
    Idle,
}

/// Replay controller for a recorded trace.
///
/// Owns only the replay position and playback mode. The trace itself is
/// shared read-only. Positions are always within `[0, len - 1]`; stepping
/// or seeking past an end clamps instead of failing. Every playback
/// operation fails with [`Error::NoTrace`] until a trace is loaded.
#[derive(Debug, Default)]
pub struct ReplayController {
    trace: Option<Arc<Trace>>,
    position: usize,
    state: ReplayState,
    speed: Speed,
}

impl ReplayController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller with a trace already loaded.
    pub fn with_trace(trace: impl Into<Arc<Trace>>) -> Self {
        let mut controller = Self::new();
        controller.load_trace(trace);
        controller
    }

    /// Install a trace. Stops playback and rewinds to the first step.
    pub fn load_trace(&mut self, trace: impl Into<Arc<Trace>>) {
        let trace = trace.into();
        debug!(steps = trace.len(), "trace loaded");
        self.trace = Some(trace);
        self.position = 0;
        self.state = ReplayState::Paused;
    }

    /// Drop the trace and return to idle.
    pub fn clear(&mut self) {
        self.trace = None;
        self.position = 0;
        self.state = ReplayState::Idle;
    }

    fn last_index(&self) -> Result<usize> {
        self.trace
            .as_ref()
            .map(|t| t.last_index())
            .ok_or(Error::NoTrace)
    }

    /// Start autonomous playback.
    ///
    /// Returns `Ok(false)` without changing state when already on the last
    /// step; playback never wraps around.
    pub fn play(&mut self) -> Result<bool> {
        let last = self.last_index()?;
        if self.state == ReplayState::Playing {
            return Ok(true);
        }
        if self.position >= last {
            return Ok(false);
        }
        self.state = ReplayState::Playing;
        debug!(from = self.position, "playback started");
        Ok(true)
    }

    /// Pause playback. Idempotent.
    pub fn pause(&mut self) -> Result<()> {
        self.last_index()?;
        if self.state == ReplayState::Playing {
            debug!(at = self.position, "playback paused");
        }
        self.state = ReplayState::Paused;
        Ok(())
    }

    /// Pause if playing, otherwise play.
    pub fn toggle(&mut self) -> Result<bool> {
        if self.is_playing() {
            self.pause().map(|()| false)
        } else {
            self.play()
        }
    }

    /// Pause and move one step forward, stopping at the last step.
    pub fn step_forward(&mut self) -> Result<usize> {
        let last = self.last_index()?;
        self.state = ReplayState::Paused;
        self.position = (self.position + 1).min(last);
        Ok(self.position)
    }

    /// Pause and move one step back, stopping at the first step.
    pub fn step_backward(&mut self) -> Result<usize> {
        self.last_index()?;
        self.state = ReplayState::Paused;
        self.position = self.position.saturating_sub(1);
        Ok(self.position)
    }

    /// Jump to `index`, clamped into `[0, len - 1]`.
    ///
    /// Keeps the current mode, except that landing on the last step while
    /// playing pauses.
    pub fn seek(&mut self, index: i64) -> Result<usize> {
        let last = self.last_index()?;
        self.position = usize::try_from(index.max(0)).unwrap_or(usize::MAX).min(last);
        if self.state == ReplayState::Playing && self.position == last {
            self.state = ReplayState::Paused;
        }
        Ok(self.position)
    }

    /// Advance one step if playing. Reaching the last step pauses.
    pub fn tick(&mut self) -> Result<Tick> {
        let last = self.last_index()?;
        if self.state != ReplayState::Playing {
            return Ok(Tick::Idle);
        }

        self.position = (self.position + 1).min(last);
        if self.position == last {
            self.state = ReplayState::Paused;
            debug!(at = self.position, "playback finished");
            Ok(Tick::Finished(self.position))
        } else {
            Ok(Tick::Advanced(self.position))
        }
    }

    /// Set the speed multiplier. Allowed in any state; applies to the next tick.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<()> {
        self.speed = Speed::new(multiplier)?;
        Ok(())
    }

    /// Get the current replay position.
    pub fn current_index(&self) -> usize {
        self.position
    }

    /// Number of steps in the loaded trace, 0 when idle.
    pub fn total_steps(&self) -> usize {
        self.trace.as_ref().map_or(0, |t| t.len())
    }

    pub fn is_playing(&self) -> bool {
        self.state == ReplayState::Playing
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn trace(&self) -> Option<&Arc<Trace>> {
        self.trace.as_ref()
    }

    /// The step at the current position.
    pub fn current_step(&self) -> Option<&Step> {
        self.trace.as_ref().and_then(|t| t.get(self.position))
    }

    /// Calculate progress as a fraction (0.0 - 1.0) of the way to the last step.
    pub fn progress(&self) -> f64 {
        match &self.trace {
            Some(trace) => self.position as f64 / trace.last_index() as f64,
            None => 0.0,
        }
    }
}

/// Replay status for observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStatus {
    pub state: ReplayState,
    pub current_index: usize,
    pub total_steps: usize,
    pub speed: f64,
    pub progress: f64,
    pub kind: Option<StepKind>,
    pub description: Option<String>,
}

impl ReplayStatus {
    pub fn is_playing(&self) -> bool {
        self.state == ReplayState::Playing
    }
}

impl From<&ReplayController> for ReplayStatus {
    fn from(controller: &ReplayController) -> Self {
        let step = controller.current_step();
        Self {
            state: controller.state,
            current_index: controller.position,
            total_steps: controller.total_steps(),
            speed: controller.speed.multiplier(),
            progress: controller.progress(),
            kind: step.map(Step::kind),
            description: step.map(|s| s.description().to_owned()),
        }
    }
}
