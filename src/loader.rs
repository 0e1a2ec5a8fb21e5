//! Graph loading seam.
//!
//! Workflow persistence belongs to a collaborator; the engine only needs one
//! operation: fetch the full graph snapshot for a workflow id. An absent
//! workflow is a normal outcome (`Ok(None)`), distinct from backend failures.

use async_trait::async_trait;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use std::sync::RwLock;
use thiserror::Error;

use crate::model::Workflow;

/// Loader backend failures (connectivity, decoding). Absence of a workflow
/// is not an error; it surfaces as `Ok(None)`.
#[derive(Debug, Error, Diagnostic)]
pub enum LoaderError {
    #[error("graph loader backend error: {message}")]
    #[diagnostic(
        code(relayflow::loader::backend),
        help("Check connectivity to the workflow store.")
    )]
    Backend { message: String },
}

/// Read-only access to stored workflow graphs.
#[async_trait]
pub trait GraphLoader: Send + Sync {
    /// Load a workflow with its full node and connection lists.
    ///
    /// The loader guarantees referential integrity: every connection
    /// endpoint names a node in the same workflow.
    async fn load_workflow_with_graph(
        &self,
        workflow_id: &str,
    ) -> Result<Option<Workflow>, LoaderError>;
}

/// Map-backed loader for tests and embedded setups.
#[derive(Debug, Default)]
pub struct InMemoryGraphLoader {
    workflows: RwLock<FxHashMap<String, Workflow>>,
}

impl InMemoryGraphLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a workflow snapshot.
    pub fn insert(&self, workflow: Workflow) {
        self.workflows
            .write()
            .expect("loader poisoned")
            .insert(workflow.id.clone(), workflow);
    }
}

#[async_trait]
impl GraphLoader for InMemoryGraphLoader {
    async fn load_workflow_with_graph(
        &self,
        workflow_id: &str,
    ) -> Result<Option<Workflow>, LoaderError> {
        Ok(self
            .workflows
            .read()
            .expect("loader poisoned")
            .get(workflow_id)
            .cloned())
    }
}
