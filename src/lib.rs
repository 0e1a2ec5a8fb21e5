//! # Relayflow: Durable Webhook-Triggered Workflow Engine
//!
//! Relayflow executes stored workflow graphs: webhooks (or manual triggers)
//! start a run, nodes execute one at a time in dependency order, and each
//! node's result is journaled so a replayed run never repeats completed work.
//!
//! ## Core Concepts
//!
//! - **Workflow**: A directed acyclic graph of typed nodes and connections
//! - **Run**: One execution instance of a workflow, identified by a job id
//! - **Context**: Key-value state accumulated across nodes within a run
//! - **Journal**: Durable per-step checkpoints giving replay safety
//! - **Events**: Ordered per-node status stream (`loading` → `success`/`error`)
//! - **Gateway**: HTTP endpoints turning provider webhooks into runs
//!
//! ## Quick Start
//!
//! ### Executing a workflow
//!
//! ```
//! use std::sync::Arc;
//! use relayflow::context::ExecutionContext;
//! use relayflow::events::MemoryPublisher;
//! use relayflow::executors::ExecutorRegistry;
//! use relayflow::journal::InMemoryJournal;
//! use relayflow::loader::InMemoryGraphLoader;
//! use relayflow::model::{Connection, Node, Workflow};
//! use relayflow::runner::{RunRequest, Runner};
//! use relayflow::types::NodeType;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Arc::new(InMemoryGraphLoader::new());
//! loader.insert(Workflow {
//!     id: "wf-1".into(),
//!     nodes: vec![Node {
//!         id: "start".into(),
//!         kind: NodeType::ManualTrigger,
//!         data: json!({}),
//!         workflow_id: "wf-1".into(),
//!         credential_ref: None,
//!     }],
//!     connections: vec![],
//!     secret: "s3cret".into(),
//! });
//!
//! let publisher = MemoryPublisher::new();
//! let runner = Runner::new(
//!     Arc::new(ExecutorRegistry::with_defaults()),
//!     loader,
//!     Arc::new(InMemoryJournal::new()),
//!     Arc::new(publisher.clone()),
//! );
//!
//! let outcome = runner
//!     .run(RunRequest::new("wf-1").with_initial_context(ExecutionContext::new()))
//!     .await?;
//! assert!(outcome.context.get("manual").is_some());
//! assert_eq!(publisher.snapshot().len(), 2); // loading + success
//! # Ok(())
//! # }
//! ```
//!
//! ### Serving the webhook gateway
//!
//! See [`gateway`] for mounting the trigger endpoints on an axum server.
//!
//! ## Module Guide
//!
//! - [`types`] - The closed set of node types
//! - [`model`] - Workflow, node, and connection records
//! - [`context`] - Accumulated run state and merge semantics
//! - [`sort`] - Topological ordering with cycle detection
//! - [`executors`] - Per-type node handlers and the dispatch registry
//! - [`events`] - Status event types, publishers, and the node emitter
//! - [`journal`] - Replay-safe step checkpointing
//! - [`runner`] - The sequential run engine
//! - [`loader`] - Workflow graph loading seam
//! - [`gateway`] - Webhook trigger HTTP endpoints
//! - [`config`] - Journal backend selection and env resolution
//! - [`telemetry`] - Tracing subscriber setup for hosts

pub mod config;
pub mod context;
pub mod events;
pub mod executors;
pub mod gateway;
pub mod journal;
#[cfg(feature = "sqlite")]
pub mod journal_sqlite;
pub mod loader;
pub mod model;
pub mod runner;
pub mod sort;
pub mod telemetry;
pub mod types;
