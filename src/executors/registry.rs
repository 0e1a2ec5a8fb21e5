use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{
    Executor, GoogleFormTriggerExecutor, HttpRequestExecutor, ManualTriggerExecutor,
    StripeTriggerExecutor,
};
use crate::types::NodeType;

/// A node references a type with no registered executor.
///
/// This is fatal and non-retriable: the run aborts at the offending node
/// rather than silently skipping it.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("no executor registered for node type '{kind}'")]
#[diagnostic(
    code(relayflow::registry::unknown_executor),
    help("Register an executor for this node type before constructing the runner.")
)]
pub struct UnknownExecutorError {
    pub kind: NodeType,
}

/// Closed mapping from node type to executor.
///
/// Built explicitly at process start and passed by reference into the
/// [`Runner`](crate::runner::Runner); the registry itself performs no
/// retries and has no default passthrough.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: FxHashMap<NodeType, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    /// Create an empty registry. Useful for tests injecting stub executors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry covering every [`NodeType`] with its built-in
    /// executor.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .register(NodeType::ManualTrigger, ManualTriggerExecutor)
            .register(NodeType::GoogleFormTrigger, GoogleFormTriggerExecutor)
            .register(NodeType::StripeTrigger, StripeTriggerExecutor)
            .register(NodeType::HttpRequest, HttpRequestExecutor::new())
    }

    /// Register (or replace) the executor for a node type.
    #[must_use]
    pub fn register(mut self, kind: NodeType, executor: impl Executor + 'static) -> Self {
        self.executors.insert(kind, Arc::new(executor));
        self
    }

    /// Look up the executor for a node type.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownExecutorError`] when no executor is registered for
    /// `kind`.
    pub fn get(&self, kind: NodeType) -> Result<Arc<dyn Executor>, UnknownExecutorError> {
        self.executors
            .get(&kind)
            .cloned()
            .ok_or(UnknownExecutorError { kind })
    }

    /// Number of registered executors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&NodeType> = self.executors.keys().collect();
        kinds.sort_by_key(|k| k.as_tag());
        f.debug_struct("ExecutorRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
