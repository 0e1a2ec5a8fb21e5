//! Accumulated key-value state threaded through a run.
//!
//! Each executor receives the context produced by all previously executed
//! nodes and returns the context to hand to the next one. Contexts are moved
//! by value between steps: no two nodes within a run ever hold the same
//! context concurrently, and executors never mutate their input in place.
//!
//! Merge semantics are shallow: when an executor's output reuses a top-level
//! key, the newer value wins wholesale. Nested values are not merged. This
//! mirrors the behavior observed in stored workflow runs rather than
//! attempting a deeper namespacing scheme.
//!
//! # Examples
//!
//! ```rust
//! use relayflow::context::ExecutionContext;
//! use serde_json::json;
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.insert("googleForm", json!({"formId": "f-1"}));
//!
//! let next = ctx.merged_with([("httpRequest".to_string(), json!({"status": 200}))]);
//! assert!(next.get("googleForm").is_some());
//! assert_eq!(next.get("httpRequest").unwrap()["status"], 200);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Accumulating key-value mapping threaded through a run.
///
/// Serializes as a flat JSON object so the durable journal can persist the
/// exact state a checkpoint produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    entries: FxHashMap<String, Value>,
}

impl ExecutionContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from an initial set of top-level entries.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Fetch a top-level value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or replace a top-level value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Return a new context with `updates` layered on top of this one.
    ///
    /// Top-level last-writer-wins: a key present in both keeps the value
    /// from `updates`.
    #[must_use]
    pub fn merged_with(&self, updates: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut entries = self.entries.clone();
        for (key, value) in updates {
            entries.insert(key, value);
        }
        Self { entries }
    }

    /// Consume this context and layer a single entry on top of it.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over top-level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Value)> for ExecutionContext {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}
