//! Stub executors for exercising the runner without network calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use relayflow::context::ExecutionContext;
use relayflow::events::NodeEmitter;
use relayflow::executors::{Executor, ExecutorError, ExecutorInput};
use serde_json::{Value, json};

/// Writes a fixed key into the context and counts how many times it ran.
///
/// The invocation counter is what replay tests assert on: a journaled step
/// must not bump it a second time.
pub struct KeyExecutor {
    pub key: &'static str,
    pub value: Value,
    pub calls: Arc<AtomicUsize>,
}

impl KeyExecutor {
    pub fn new(key: &'static str, value: Value) -> Self {
        Self {
            key,
            value,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Clone sharing the same counter, for handing to the registry while the
    /// test keeps the original to assert on.
    pub fn handle(&self) -> Self {
        Self {
            key: self.key,
            value: self.value.clone(),
            calls: self.calls.clone(),
        }
    }
}

#[async_trait]
impl Executor for KeyExecutor {
    async fn run(
        &self,
        _input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        emitter.loading().await?;
        let next = context.with_entry(self.key, self.value.clone());
        emitter.success(Some(self.value.clone())).await?;
        Ok(next)
    }
}

/// Fails every invocation, after reporting loading and error events.
pub struct FailingExecutor;

#[async_trait]
impl Executor for FailingExecutor {
    async fn run(
        &self,
        _input: &ExecutorInput,
        _context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        emitter.loading().await?;
        let err = ExecutorError::Provider {
            provider: "stub",
            message: "forced failure".to_string(),
        };
        emitter.error(err.to_string()).await?;
        Err(err)
    }
}

/// Echoes the node id into the context under the node's own id, so ordering
/// tests can reconstruct execution order from event streams.
pub struct EchoExecutor;

#[async_trait]
impl Executor for EchoExecutor {
    async fn run(
        &self,
        input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        emitter.loading().await?;
        let next = context.with_entry(input.node_id.clone(), json!({"ran": true}));
        emitter.success(None).await?;
        Ok(next)
    }
}
