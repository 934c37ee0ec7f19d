//! Visual state resolution.
//!
//! Maps `(step, entity)` to the state a renderer should draw the entity in.
//! Resolution is a pure function of the step payload: no history is kept and
//! every entity resolves to exactly one state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stepscope_trace::{EntityId, Step};

/// Rendering state of a single entity at a single step.
///
/// Variants are declared in ascending precedence, so `Ord` gives the
/// resolution order: terminal states (`Success`, `Error`) beat transient
/// ones (`Active`, `Comparing`, `Visiting`), which beat `Dimmed` and then
/// `Default`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    #[default]
    Default,
    Dimmed,
    Visiting,
    Comparing,
    Active,
    Error,
    Success,
}

impl VisualState {
    /// Every non-default state, highest precedence first.
    pub const BY_PRECEDENCE: [VisualState; 6] = [
        VisualState::Success,
        VisualState::Error,
        VisualState::Active,
        VisualState::Comparing,
        VisualState::Visiting,
        VisualState::Dimmed,
    ];

    /// Payload field that marks entities with this state.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            VisualState::Default => None,
            VisualState::Dimmed => Some("dimmed"),
            VisualState::Visiting => Some("visiting"),
            VisualState::Comparing => Some("comparing"),
            VisualState::Active => Some("active"),
            VisualState::Error => Some("error"),
            VisualState::Success => Some("success"),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VisualState::Success | VisualState::Error)
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            VisualState::Active | VisualState::Comparing | VisualState::Visiting
        )
    }

    /// Combine two candidate states, keeping the one with higher precedence.
    #[must_use]
    pub fn merge(self, other: VisualState) -> VisualState {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        self.field().unwrap_or("default")
    }
}

impl std::fmt::Display for VisualState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve an entity's state from the conventional payload fields.
///
/// An entity listed under several fields gets the highest-precedence state.
/// Entities the step does not mention, and steps without any of the fields,
/// resolve to [`VisualState::Default`].
pub fn resolve_visual_state(step: &Step, entity: &EntityId) -> VisualState {
    let payload = step.payload();
    VisualState::BY_PRECEDENCE
        .into_iter()
        .find(|state| {
            state
                .field()
                .is_some_and(|field| payload.contains_id(field, entity))
        })
        .unwrap_or_default()
}

/// Anything that can decide how an entity is drawn at a step.
pub trait Resolver {
    fn resolve(&self, step: &Step, entity: &EntityId) -> VisualState;
}

impl<F> Resolver for F
where
    F: Fn(&Step, &EntityId) -> VisualState,
{
    fn resolve(&self, step: &Step, entity: &EntityId) -> VisualState {
        self(step, entity)
    }
}

/// Field-based resolver with configurable field names.
///
/// [`FieldResolver::default`] uses the same fields as
/// [`resolve_visual_state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResolver {
    fields: Vec<(VisualState, String)>,
}

impl Default for FieldResolver {
    fn default() -> Self {
        let fields = VisualState::BY_PRECEDENCE
            .into_iter()
            .filter_map(|state| state.field().map(|f| (state, f.to_string())))
            .collect();
        Self { fields }
    }
}

impl FieldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `state` from `field` instead of its conventional name.
    /// Setting a field for `Default` has no effect.
    #[must_use]
    pub fn with_field(mut self, state: VisualState, field: impl Into<String>) -> Self {
        if let Some(entry) = self.fields.iter_mut().find(|(s, _)| *s == state) {
            entry.1 = field.into();
        }
        self
    }

    /// Field name currently mapped to `state`.
    pub fn field(&self, state: VisualState) -> Option<&str> {
        self.fields
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, f)| f.as_str())
    }
}

impl Resolver for FieldResolver {
    fn resolve(&self, step: &Step, entity: &EntityId) -> VisualState {
        let payload = step.payload();
        self.fields
            .iter()
            .find(|(_, field)| payload.contains_id(field, entity))
            .map(|(state, _)| *state)
            .unwrap_or_default()
    }
}

/// Resolve a set of entities at one step.
pub fn resolve_all<'a, R, I>(resolver: &R, step: &Step, entities: I) -> BTreeMap<EntityId, VisualState>
where
    R: Resolver + ?Sized,
    I: IntoIterator<Item = &'a EntityId>,
{
    entities
        .into_iter()
        .map(|entity| (entity.clone(), resolver.resolve(step, entity)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepscope_trace::{Payload, StepKind, Value};

    fn step(payload: Payload) -> Step {
        Step::new(StepKind::Visit, payload, "test")
    }

    fn node(i: usize) -> EntityId {
        EntityId::Node(i)
    }

    #[test]
    fn success_beats_visiting() {
        let s = step(
            Payload::new()
                .with("visiting", Value::ids([node(1)]))
                .with("success", Value::ids([node(1)])),
        );
        assert_eq!(resolve_visual_state(&s, &node(1)), VisualState::Success);
    }

    #[test]
    fn full_precedence_order() {
        let every = Value::ids([node(0)]);
        let mut payload = Payload::new();
        for state in VisualState::BY_PRECEDENCE.iter().rev() {
            payload.insert(state.field().unwrap(), every.clone());
            assert_eq!(resolve_visual_state(&step(payload.clone()), &node(0)), *state);
        }
    }

    #[test]
    fn unmentioned_entities_are_default() {
        let s = step(Payload::new().with("active", Value::ids([node(2)])));
        assert_eq!(resolve_visual_state(&s, &node(3)), VisualState::Default);
        assert_eq!(
            resolve_visual_state(&step(Payload::new()), &EntityId::key("x")),
            VisualState::Default
        );
    }

    #[test]
    fn wrongly_typed_fields_are_ignored() {
        let s = step(Payload::new().with("success", true).with("dimmed", Value::ids([node(0)])));
        assert_eq!(resolve_visual_state(&s, &node(0)), VisualState::Dimmed);
    }

    #[test]
    fn entity_kinds_are_distinct() {
        let s = step(Payload::new().with("active", Value::ids([EntityId::Index(1)])));
        assert_eq!(resolve_visual_state(&s, &EntityId::Index(1)), VisualState::Active);
        assert_eq!(resolve_visual_state(&s, &node(1)), VisualState::Default);
    }

    #[test]
    fn merge_keeps_higher_precedence() {
        assert_eq!(VisualState::Visiting.merge(VisualState::Error), VisualState::Error);
        assert_eq!(VisualState::Active.merge(VisualState::Dimmed), VisualState::Active);
        assert_eq!(VisualState::Default.merge(VisualState::Default), VisualState::Default);
        assert!(VisualState::Error.is_terminal());
        assert!(VisualState::Comparing.is_transient());
        assert!(!VisualState::Dimmed.is_transient());
    }

    #[test]
    fn field_resolver_custom_names() {
        let resolver = FieldResolver::new().with_field(VisualState::Success, "path");
        assert_eq!(resolver.field(VisualState::Success), Some("path"));

        let s = step(
            Payload::new()
                .with("path", Value::ids([node(0)]))
                .with("success", Value::ids([node(1)])),
        );
        assert_eq!(resolver.resolve(&s, &node(0)), VisualState::Success);
        assert_eq!(resolver.resolve(&s, &node(1)), VisualState::Default);
    }

    #[test]
    fn default_field_resolver_matches_free_function() {
        let s = step(
            Payload::new()
                .with("comparing", Value::ids([node(0), node(1)]))
                .with("error", Value::ids([node(1)])),
        );
        let resolver = FieldResolver::default();
        for id in [node(0), node(1), node(2)] {
            assert_eq!(resolver.resolve(&s, &id), resolve_visual_state(&s, &id));
        }
    }

    #[test]
    fn closures_and_functions_are_resolvers() {
        let always_dim = |_: &Step, _: &EntityId| VisualState::Dimmed;
        let s = step(Payload::new().with("active", Value::ids([node(0)])));
        let ids = [node(0), node(1)];

        let dimmed = resolve_all(&always_dim, &s, &ids);
        assert!(dimmed.values().all(|v| *v == VisualState::Dimmed));

        let resolved = resolve_all(&resolve_visual_state, &s, &ids);
        assert_eq!(resolved[&node(0)], VisualState::Active);
        assert_eq!(resolved[&node(1)], VisualState::Default);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&VisualState::Comparing).unwrap(), "\"comparing\"");
    }
}
