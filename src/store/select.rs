//! Selection Module
//!
//! Derives flat views of a state tree from named path or function selectors.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::store::PropPath;

// == Selector ==
/// How a single output value is derived from the state.
pub enum Selector<S> {
    /// Path locator into the serialized state tree
    Path(PropPath),
    /// Pure function of the state
    Compute(Box<dyn Fn(&S) -> Value>),
}

impl<S> fmt::Debug for Selector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Selector::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

// == Selectors ==
/// Mapping of output keys to selectors.
///
/// ```ignore
/// let selectors = Selectors::new()
///     .path("c", "count")
///     .compute("double", |s: &Counter| json!(s.count * 2));
/// ```
#[derive(Debug)]
pub struct Selectors<S> {
    entries: Vec<(String, Selector<S>)>,
}

impl<S> Default for Selectors<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> Selectors<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the value at `path` under `key`.
    pub fn path(mut self, key: impl Into<String>, path: impl Into<PropPath>) -> Self {
        self.insert(key.into(), Selector::Path(path.into()));
        self
    }

    /// Selects the result of `compute` under `key`.
    pub fn compute<F>(mut self, key: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&S) -> Value + 'static,
    {
        self.insert(key.into(), Selector::Compute(Box::new(compute)));
        self
    }

    fn insert(&mut self, key: String, selector: Selector<S>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = selector,
            None => self.entries.push((key, selector)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Serialize> Selectors<S> {
    // == Select ==
    /// Resolves every selector against `state`.
    ///
    /// The state is serialized once, and only if a path selector needs it.
    /// Missing paths resolve to absent values; the only error is a state that
    /// cannot be serialized.
    pub fn select(&self, state: &S) -> Result<Selection> {
        let needs_tree = self
            .entries
            .iter()
            .any(|(_, selector)| matches!(selector, Selector::Path(_)));
        let tree = if needs_tree {
            serde_json::to_value(state)?
        } else {
            Value::Null
        };

        let values = self
            .entries
            .iter()
            .map(|(key, selector)| {
                let value = match selector {
                    Selector::Path(path) => path.resolve(&tree).cloned(),
                    Selector::Compute(compute) => Some(compute(state)),
                };
                (key.clone(), value)
            })
            .collect();

        Ok(Selection { values })
    }
}

// == Selection ==
/// Result of applying [`Selectors`]: same keys, resolved values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    values: BTreeMap<String, Option<Value>>,
}

impl Selection {
    /// Value under `key`; None if the key was not selected or resolved to absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// True if `key` was selected but its path did not resolve.
    pub fn is_absent(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(None))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Option<Value>> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Counter {
        count: u32,
        history: Vec<u32>,
    }

    fn counter() -> Counter {
        Counter {
            count: 2,
            history: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_select_paths() {
        let selection = Selectors::new()
            .path("c", "count")
            .path("last", "history[2]")
            .select(&counter())
            .unwrap();

        assert_eq!(selection.get("c"), Some(&json!(2)));
        assert_eq!(selection.get("last"), Some(&json!(2)));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_select_missing_path_is_absent() {
        let selection = Selectors::new()
            .path("x", "missing.path")
            .select(&counter())
            .unwrap();

        assert!(selection.contains_key("x"));
        assert!(selection.is_absent("x"));
        assert_eq!(selection.get("x"), None);
    }

    #[test]
    fn test_select_compute() {
        let selection = Selectors::new()
            .compute("double", |s: &Counter| json!(s.count * 2))
            .select(&counter())
            .unwrap();

        assert_eq!(selection.get("double"), Some(&json!(4)));
    }

    #[test]
    fn test_select_same_key_replaces_selector() {
        let selectors = Selectors::new()
            .path("v", "count")
            .compute("v", |_: &Counter| json!("computed"));

        assert_eq!(selectors.len(), 1);
        let selection = selectors.select(&counter()).unwrap();
        assert_eq!(selection.get("v"), Some(&json!("computed")));
    }

    #[test]
    fn test_select_empty() {
        let selection = Selectors::<Counter>::new().select(&counter()).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_unserializable_state_fails() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<Ser: serde::Serializer>(
                &self,
                _serializer: Ser,
            ) -> std::result::Result<Ser::Ok, Ser::Error> {
                Err(serde::ser::Error::custom("broken"))
            }
        }

        let result = Selectors::new().path("a", "a").select(&Broken);
        assert!(result.is_err());

        // Compute-only selections never serialize the state
        let selection = Selectors::new()
            .compute("ok", |_: &Broken| json!(true))
            .select(&Broken)
            .unwrap();
        assert_eq!(selection.get("ok"), Some(&json!(true)));
    }
}
