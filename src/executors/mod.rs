//! Node executors: the per-type handlers a run dispatches to.
//!
//! An [`Executor`] receives the node's opaque configuration, the context
//! accumulated by earlier nodes, and a [`NodeEmitter`] for status events. It
//! returns the new accumulated context; it never mutates the incoming one in
//! place. Executors are expected to be idempotent with respect to the
//! runner's replay contract: a journaled checkpoint is never re-executed, so
//! side effects happen at most once per run instance.
//!
//! Dispatch happens through an explicitly constructed [`ExecutorRegistry`],
//! built once at process start and injected into the
//! [`Runner`](crate::runner::Runner). There is no module-level executor map
//! and no implicit fallback for unknown node types.

mod http_request;
mod registry;
mod triggers;

pub use http_request::HttpRequestExecutor;
pub use registry::{ExecutorRegistry, UnknownExecutorError};
pub use triggers::{GoogleFormTriggerExecutor, ManualTriggerExecutor, StripeTriggerExecutor};

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::events::{NodeEmitter, PublishError};

/// Per-node inputs handed to an executor, fixed for the duration of one
/// node execution.
#[derive(Clone, Debug)]
pub struct ExecutorInput {
    /// Identifier of the node being executed.
    pub node_id: String,
    /// The workflow this run belongs to.
    pub workflow_id: String,
    /// The run (job) identifier.
    pub job_id: String,
    /// The node's opaque configuration payload.
    pub data: Value,
    /// Optional stored-credential reference (resolved elsewhere).
    pub credential_ref: Option<String>,
}

/// Fatal errors raised by executors.
///
/// Any error returned here aborts the run at the failing node: the runner
/// performs no catch-and-continue and no compensation of earlier nodes.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutorError {
    /// Expected data is missing from the accumulated context.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(relayflow::executor::missing_input),
        help("Check that an earlier node (or the trigger gateway) produced the required data.")
    )]
    MissingInput { what: &'static str },

    /// An external provider or service call failed.
    #[error("provider error ({provider}): {message}")]
    #[diagnostic(code(relayflow::executor::provider))]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// The node's configuration payload is invalid.
    #[error("invalid node configuration: {0}")]
    #[diagnostic(
        code(relayflow::executor::config),
        help("Check the node's data payload against the executor's expected fields.")
    )]
    InvalidConfig(String),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    #[diagnostic(code(relayflow::executor::serde_json))]
    Serde(#[from] serde_json::Error),

    /// A status event could not be published.
    #[error(transparent)]
    #[diagnostic(code(relayflow::executor::publish))]
    Publish(#[from] PublishError),
}

/// A type-specific node handler.
///
/// Implementations publish their own `loading` event before doing work and a
/// terminal `success`/`error` event afterwards, awaiting each publish so a
/// subscriber observes them in order.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn run(
        &self,
        input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError>;
}
