//! Durable, sequential run execution.
//!
//! The runner drives one run through its state machine: `Preparing` (load
//! the graph, compute the topological order) then `Executing` each node in
//! order, each wrapped in a journal checkpoint, finishing in `Completed` or
//! aborting on the first failure. Nodes run strictly sequentially; each
//! handler is awaited to completion (including its event publishes) before
//! the next node starts, so within one run the observed event order matches
//! the execution order exactly.
//!
//! Failure policy is fail-fast: a handler error propagates unmodified,
//! remaining nodes do not run, and nothing already executed is compensated.
//! Whether a failed run is attempted again is the hosting retry envelope's
//! decision, guided by [`RunnerError::is_retriable`]; on replay, checkpoints
//! recorded by the previous attempt are reused instead of re-invoking their
//! handlers.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use relayflow::executors::ExecutorRegistry;
//! use relayflow::events::StdOutPublisher;
//! use relayflow::journal::InMemoryJournal;
//! use relayflow::loader::InMemoryGraphLoader;
//! use relayflow::runner::{RunRequest, Runner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = Runner::new(
//!     Arc::new(ExecutorRegistry::with_defaults()),
//!     Arc::new(InMemoryGraphLoader::new()),
//!     Arc::new(InMemoryJournal::new()),
//!     Arc::new(StdOutPublisher),
//! );
//!
//! let outcome = runner.run(RunRequest::new("wf-1")).await?;
//! println!("final context keys: {}", outcome.context.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::events::{NodeEmitter, Publisher};
use crate::executors::{ExecutorError, ExecutorInput, ExecutorRegistry, UnknownExecutorError};
use crate::journal::{Journal, JournalError};
use crate::loader::{GraphLoader, LoaderError};
use crate::model::Node;
use crate::sort::{CycleError, topological_sort};

/// Input for one run.
#[derive(Clone, Debug)]
pub struct RunRequest {
    /// The workflow to execute.
    pub workflow_id: String,
    /// Run instance identifier; generated when unset. Replays of the same
    /// run instance must reuse the same id so journal checkpoints match.
    pub job_id: Option<String>,
    /// Context seeded before the first node (trigger payloads etc.).
    pub initial_context: ExecutionContext,
}

impl RunRequest {
    #[must_use]
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            job_id: None,
            initial_context: ExecutionContext::new(),
        }
    }

    #[must_use]
    pub fn with_initial_context(mut self, context: ExecutionContext) -> Self {
        self.initial_context = context;
        self
    }

    #[must_use]
    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }
}

/// Terminal result of a successful run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub workflow_id: String,
    /// The fully accumulated context after the last node.
    pub context: ExecutionContext,
}

/// Run failures.
///
/// `Preparing`-phase failures (`WorkflowNotFound`, `Cycle`) and dispatch on
/// an unregistered type (`UnknownExecutor`) are non-retriable: replaying the
/// run cannot change the outcome. Everything else is left to the hosting
/// retry envelope.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    #[error("workflow doesn't exist: {workflow_id}")]
    #[diagnostic(
        code(relayflow::runner::workflow_not_found),
        help("The workflow id did not resolve to a stored graph.")
    )]
    WorkflowNotFound { workflow_id: String },

    #[error(transparent)]
    #[diagnostic(code(relayflow::runner::cycle))]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    #[diagnostic(code(relayflow::runner::unknown_executor))]
    UnknownExecutor(#[from] UnknownExecutorError),

    #[error("node '{node_id}' failed: {source}")]
    #[diagnostic(code(relayflow::runner::node))]
    Executor {
        node_id: String,
        #[source]
        source: ExecutorError,
    },

    #[error(transparent)]
    #[diagnostic(code(relayflow::runner::loader))]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    #[diagnostic(code(relayflow::runner::journal))]
    Journal(#[from] JournalError),
}

impl RunnerError {
    /// Whether the hosting retry envelope may re-attempt the run.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        !matches!(
            self,
            RunnerError::WorkflowNotFound { .. }
                | RunnerError::Cycle(_)
                | RunnerError::UnknownExecutor(_)
        )
    }
}

/// Executes runs: loads the graph, orders the nodes, and dispatches each one
/// through its registered executor inside a journal checkpoint.
///
/// A `Runner` is cheap to share (`Arc` all the way down) and holds no per-run
/// state; concurrent runs only share the journal backend.
pub struct Runner {
    registry: Arc<ExecutorRegistry>,
    loader: Arc<dyn GraphLoader>,
    journal: Arc<dyn Journal>,
    publisher: Arc<dyn Publisher>,
}

impl Runner {
    #[must_use]
    pub fn new(
        registry: Arc<ExecutorRegistry>,
        loader: Arc<dyn GraphLoader>,
        journal: Arc<dyn Journal>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            registry,
            loader,
            journal,
            publisher,
        }
    }

    /// Construct a runner with the journal backend described by `config`.
    pub async fn with_config(
        registry: Arc<ExecutorRegistry>,
        loader: Arc<dyn GraphLoader>,
        publisher: Arc<dyn Publisher>,
        config: &EngineConfig,
    ) -> Self {
        let journal = config.build_journal().await;
        Self::new(registry, loader, journal, publisher)
    }

    /// Execute one run to completion.
    ///
    /// # Errors
    ///
    /// See [`RunnerError`]; any failure aborts the run at the point it
    /// occurred, leaving earlier checkpoints journaled for replay.
    #[instrument(
        skip(self, request),
        fields(workflow_id = %request.workflow_id),
        err
    )]
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome, RunnerError> {
        let job_id = request
            .job_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::info!(job_id = %job_id, "workflow run started");

        // Preparing: load the graph snapshot and compute the execution order.
        // Failures here are non-retriable and no node runs.
        let workflow = self
            .loader
            .load_workflow_with_graph(&request.workflow_id)
            .await?
            .ok_or(RunnerError::WorkflowNotFound {
                workflow_id: request.workflow_id.clone(),
            })?;
        let order = topological_sort(&workflow.nodes, &workflow.connections)?;

        let nodes_by_id: FxHashMap<&str, &Node> = workflow
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n))
            .collect();

        // Executing: strictly sequential, one awaited checkpoint per node.
        let mut context = request.initial_context;
        for node_id in &order {
            let node = nodes_by_id[node_id.as_str()];
            let executor = self.registry.get(node.kind)?;
            let step_name = format!("execute-node-{}", node.id);

            if let Some(recorded) = self.journal.lookup(&job_id, &step_name).await? {
                tracing::debug!(
                    job_id = %job_id,
                    step = %step_name,
                    "checkpoint already recorded; reusing stored result"
                );
                context = serde_json::from_value(recorded).map_err(JournalError::from)?;
                continue;
            }

            let emitter = NodeEmitter::new(
                self.publisher.clone(),
                node.id.clone(),
                job_id.clone(),
                workflow.id.clone(),
                step_name.clone(),
            );
            let input = ExecutorInput {
                node_id: node.id.clone(),
                workflow_id: workflow.id.clone(),
                job_id: job_id.clone(),
                data: node.data.clone(),
                credential_ref: node.credential_ref.clone(),
            };

            context = executor
                .run(&input, context, &emitter)
                .await
                .map_err(|source| RunnerError::Executor {
                    node_id: node.id.clone(),
                    source,
                })?;

            let payload = serde_json::to_value(&context).map_err(JournalError::from)?;
            self.journal.record(&job_id, &step_name, payload).await?;
        }

        tracing::info!(
            job_id = %job_id,
            nodes = order.len(),
            "workflow run completed"
        );
        Ok(RunOutcome {
            workflow_id: workflow.id,
            context,
        })
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
