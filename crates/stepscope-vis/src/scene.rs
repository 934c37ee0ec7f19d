//! Render-ready view of a traced problem.

use std::collections::BTreeMap;
use std::sync::Arc;

use stepscope_layout::{layout_tree, TreeLayout};
use stepscope_trace::{EntityId, StepKind, Trace};
use tracing::debug;

use crate::algorithms::Problem;
use crate::error::Result;
use crate::visual::{resolve_all, Resolver, VisualState};

/// A traced problem: the trace, the entities to draw and, for trees, their
/// coordinates.
#[derive(Debug, Clone)]
pub struct Scene {
    trace: Arc<Trace>,
    entities: Vec<EntityId>,
    layout: Option<TreeLayout>,
}

/// Everything a renderer needs for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub total: usize,
    pub kind: StepKind,
    pub description: String,
    pub states: BTreeMap<EntityId, VisualState>,
}

impl Scene {
    /// Trace the problem and lay out its tree, if it has one.
    pub fn build(problem: &Problem) -> Result<Self> {
        let trace = problem.trace()?;
        let layout = problem
            .tree()
            .map(|tree| layout_tree(tree.root()))
            .transpose()?;

        debug!(
            problem = problem.name(),
            steps = trace.len(),
            laid_out = layout.as_ref().map_or(0, |l| l.nodes.len()),
            "scene built"
        );

        Ok(Self {
            trace: Arc::new(trace),
            entities: problem.entities(),
            layout,
        })
    }

    pub fn trace(&self) -> &Arc<Trace> {
        &self.trace
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn layout(&self) -> Option<&TreeLayout> {
        self.layout.as_ref()
    }

    /// Resolve every entity at step `index`. `None` past the end.
    pub fn frame<R: Resolver + ?Sized>(&self, resolver: &R, index: usize) -> Option<Frame> {
        let step = self.trace.get(index)?;
        Some(Frame {
            index,
            total: self.trace.len(),
            kind: step.kind(),
            description: step.description().to_string(),
            states: resolve_all(resolver, step, &self.entities),
        })
    }
}

impl Frame {
    /// One-line summary: position, kind, description and non-default states.
    pub fn caption(&self) -> String {
        let marked: Vec<String> = self
            .states
            .iter()
            .filter(|(_, state)| **state != VisualState::Default)
            .map(|(id, state)| format!("{}={}", id, state))
            .collect();

        let mut line = format!(
            "[{}/{}] {}: {}",
            self.index + 1,
            self.total,
            self.kind,
            self.description
        );
        if !marked.is_empty() {
            line.push_str(" (");
            line.push_str(&marked.join(", "));
            line.push(')');
        }
        line
    }
}
