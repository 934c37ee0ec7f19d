//! One recorded moment of an algorithm run.

use serde::{Deserialize, Serialize};

use crate::value::Payload;

/// Stable identifier of something a step can talk about.
///
/// Tree nodes use their level-order index, array cells their position and
/// map entries their key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityId {
    Node(usize),
    Index(usize),
    Key(String),
}

impl EntityId {
    /// Shorthand for a map-key entity.
    pub fn key(key: impl Into<String>) -> Self {
        EntityId::Key(key.into())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Node(id) => write!(f, "node:{}", id),
            EntityId::Index(i) => write!(f, "index:{}", i),
            EntityId::Key(k) => write!(f, "key:{}", k),
        }
    }
}

/// Tag describing what happened at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Initial state, before the algorithm does any work
    Start,
    /// An entity is being visited
    Visit,
    /// Two entities (or an entity and a target) are compared
    Compare,
    /// A value in some structure changed
    Update,
    /// Something was inserted into a structure
    Insert,
    /// Something was removed from a structure
    Remove,
    /// Push onto a stack or queue
    Push,
    /// Pop from a stack or queue
    Pop,
    /// Two positions exchanged values
    Swap,
    /// A comparison succeeded
    Match,
    /// A comparison failed
    Mismatch,
    /// The search retreated from a dead end
    Backtrack,
    /// Terminal: the target was found
    Found,
    /// Terminal: the search finished without a result
    NotFound,
    /// Terminal: the run finished
    Finish,
    /// Terminal: the run finished (structure-building algorithms)
    Done,
}

impl StepKind {
    /// Whether this kind may open a trace.
    pub fn is_start(&self) -> bool {
        matches!(self, StepKind::Start)
    }

    /// Whether this kind may close a trace.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepKind::Found | StepKind::NotFound | StepKind::Finish | StepKind::Done
        )
    }

    /// Lowercase name, as used in serialized traces.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Start => "start",
            StepKind::Visit => "visit",
            StepKind::Compare => "compare",
            StepKind::Update => "update",
            StepKind::Insert => "insert",
            StepKind::Remove => "remove",
            StepKind::Push => "push",
            StepKind::Pop => "pop",
            StepKind::Swap => "swap",
            StepKind::Match => "match",
            StepKind::Mismatch => "mismatch",
            StepKind::Backtrack => "backtrack",
            StepKind::Found => "found",
            StepKind::NotFound => "not_found",
            StepKind::Finish => "finish",
            StepKind::Done => "done",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable snapshot of algorithm state at one instant.
///
/// A step owns its payload outright. Nothing recorded into it can be reached
/// from the live algorithm state afterwards, so later mutation of that state
/// never shows up in an already-recorded step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    kind: StepKind,
    payload: Payload,
    description: String,
}

impl Step {
    /// Create a step.
    pub fn new(kind: StepKind, payload: Payload, description: impl Into<String>) -> Self {
        Self {
            kind,
            payload,
            description: description.into(),
        }
    }

    /// What happened at this step.
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// Snapshot of the algorithm state.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Narration for the live caption.
    pub fn description(&self) -> &str {
        &self.description
    }
}
