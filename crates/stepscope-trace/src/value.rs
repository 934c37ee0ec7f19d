//! Owned payload values.
//!
//! Every conversion into [`Value`] copies: borrowed slices, vectors, deques and
//! maps are cloned element by element. A recorded payload therefore never
//! aliases the container it was taken from.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::step::EntityId;

/// A single payload value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A list of entity references (highlight sets, paths, frontiers)
    Ids(Vec<EntityId>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Build an id list.
    pub fn ids<I: IntoIterator<Item = EntityId>>(ids: I) -> Self {
        Value::Ids(ids.into_iter().collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[EntityId]> {
        match self {
            Value::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::Ids(vec![id])
    }
}

impl From<&BTreeSet<EntityId>> for Value {
    fn from(ids: &BTreeSet<EntityId>) -> Self {
        Value::Ids(ids.iter().cloned().collect())
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        Value::Map(payload.0)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&Vec<T>> for Value {
    fn from(items: &Vec<T>) -> Self {
        Value::from(items.as_slice())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&VecDeque<T>> for Value {
    fn from(items: &VecDeque<T>) -> Self {
        Value::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<K: ToString, V: Clone + Into<Value>> From<&BTreeMap<K, V>> for Value {
    fn from(map: &BTreeMap<K, V>) -> Self {
        Value::Map(
            map.iter()
                .map(|(k, v)| (k.to_string(), v.clone().into()))
                .collect(),
        )
    }
}

impl<K: ToString, V: Clone + Into<Value>, S> From<&HashMap<K, V, S>> for Value {
    fn from(map: &HashMap<K, V, S>) -> Self {
        // Re-keyed into a BTreeMap so hash iteration order never leaks into a trace.
        Value::Map(
            map.iter()
                .map(|(k, v)| (k.to_string(), v.clone().into()))
                .collect(),
        )
    }
}

/// Field name to value mapping carried by a step.
///
/// Keys are kept sorted, which makes the serialized form of a trace
/// byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The id list stored under `key`, empty when the field is absent or not an id list.
    pub fn ids(&self, key: &str) -> &[EntityId] {
        self.get(key).and_then(Value::as_ids).unwrap_or(&[])
    }

    /// Whether the id list under `key` mentions `id`.
    pub fn contains_id(&self, key: &str, id: &EntityId) -> bool {
        self.ids(key).contains(id)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Payload(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_containers_are_copied() {
        let mut live = vec![3, 1, 2];
        let recorded = Value::from(&live);
        live[0] = 99;
        live.push(4);

        assert_eq!(
            recorded,
            Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn hash_maps_become_sorted_maps() {
        let mut counts = HashMap::new();
        counts.insert('z', 1);
        counts.insert('a', 2);
        counts.insert('m', 3);

        let value = Value::from(&counts);
        let keys: Vec<_> = value.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn payload_id_lookup() {
        let payload = Payload::new()
            .with("path", Value::ids([EntityId::Node(0), EntityId::Node(2)]))
            .with("sum", 4);

        assert!(payload.contains_id("path", &EntityId::Node(2)));
        assert!(!payload.contains_id("path", &EntityId::Node(1)));
        // Not an id list
        assert!(payload.ids("sum").is_empty());
        // Missing field
        assert!(payload.ids("frontier").is_empty());
        assert_eq!(payload.get("sum").and_then(Value::as_int), Some(4));
    }

    #[test]
    fn option_maps_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(5)), Value::Int(5));
    }

    #[test]
    fn payload_serializes_with_sorted_keys() {
        let payload = Payload::new().with("zeta", 1).with("alpha", true);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.find("alpha").unwrap() < json.find("zeta").unwrap());

        let parsed: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, payload);
    }
}
