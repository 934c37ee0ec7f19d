//! Recording an instrumented algorithm run into a [`Trace`].

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::step::{Step, StepKind};
use crate::trace::Trace;
use crate::value::Payload;

/// Default cap on recorded steps per run.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Configuration for trace recording.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Upper bound on the number of steps one run may record.
    /// Traces are held entirely in memory.
    pub max_steps: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl TraceConfig {
    /// Set the step limit.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Collects steps during one synchronous algorithm run.
///
/// `record` never fails at the call site. The first shape violation is
/// latched and every later call is ignored; [`Recorder::finalize`] reports it.
#[derive(Debug)]
pub struct Recorder {
    config: TraceConfig,
    steps: Vec<Step>,
    violation: Option<Error>,
}

impl Recorder {
    /// Create a recorder with the given configuration.
    pub fn new(config: TraceConfig) -> Self {
        Self {
            config,
            steps: Vec::new(),
            violation: None,
        }
    }

    /// Append a step.
    pub fn record(&mut self, kind: StepKind, payload: Payload, description: impl Into<String>) {
        if self.violation.is_some() {
            return;
        }

        let index = self.steps.len();
        if index >= self.config.max_steps {
            self.violation = Some(Error::TooManySteps {
                limit: self.config.max_steps,
            });
            return;
        }
        if kind.is_start() && index > 0 {
            self.violation = Some(Error::MisplacedStart { index });
            return;
        }
        if self.steps.last().is_some_and(|s| s.kind().is_terminal()) {
            self.violation = Some(Error::RecordAfterTerminal { index, kind });
            return;
        }

        let step = Step::new(kind, payload, description);
        trace!(index, kind = %kind, "{}", step.description());
        self.steps.push(step);
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Payload of the most recent step, if any.
    pub fn last_payload(&self) -> Option<&Payload> {
        self.steps.last().map(Step::payload)
    }

    /// Close the run and produce the trace.
    ///
    /// A missing start step is supplied at the front, and a missing terminal
    /// step is appended carrying the last recorded payload. A run that
    /// recorded nothing becomes `[start, finish]`.
    pub fn finalize(self) -> Result<Trace> {
        if let Some(violation) = self.violation {
            return Err(violation);
        }

        let mut steps = self.steps;
        if !steps.first().is_some_and(|s| s.kind().is_start()) {
            steps.insert(0, Step::new(StepKind::Start, Payload::new(), "Start"));
        }
        if !steps.last().is_some_and(|s| s.kind().is_terminal()) {
            let payload = steps.last().map(|s| s.payload().clone()).unwrap_or_default();
            steps.push(Step::new(StepKind::Finish, payload, "Finish"));
        }

        let trace = Trace::try_from(steps)?;
        debug!(steps = trace.len(), "trace finalized");
        Ok(trace)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(TraceConfig::default())
    }
}

/// Run `algorithm` on `input` with a fresh recorder and return the finalized trace.
///
/// If the algorithm returns an error or panics, everything it recorded is
/// discarded and the failure is returned instead.
pub fn build_trace<I, F, E>(input: &I, algorithm: F) -> Result<Trace>
where
    I: ?Sized,
    F: FnOnce(&mut Recorder, &I) -> std::result::Result<(), E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    build_trace_with(TraceConfig::default(), input, algorithm)
}

/// [`build_trace`] with an explicit configuration.
pub fn build_trace_with<I, F, E>(config: TraceConfig, input: &I, algorithm: F) -> Result<Trace>
where
    I: ?Sized,
    F: FnOnce(&mut Recorder, &I) -> std::result::Result<(), E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut recorder = Recorder::new(config);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| algorithm(&mut recorder, input)));
    match outcome {
        Ok(Ok(())) => recorder.finalize(),
        Ok(Err(e)) => {
            let e = e.into();
            warn!(recorded = recorder.len(), "algorithm failed, discarding partial trace: {}", e);
            Err(Error::Algorithm(e))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(recorded = recorder.len(), "algorithm panicked, discarding partial trace: {}", message);
            Err(Error::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
