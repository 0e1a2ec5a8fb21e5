//! Trigger executors: the entry nodes of a workflow.
//!
//! Webhook-seeded triggers find their namespace already present in the
//! initial context (the gateway builds it before dispatching the run); their
//! job is to assert that invariant and report status. The manual trigger has
//! no external payload and records its own trigger metadata.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::{Executor, ExecutorError, ExecutorInput};
use crate::context::ExecutionContext;
use crate::events::NodeEmitter;

/// Starts a run triggered directly by a user or internal event.
#[derive(Debug, Default)]
pub struct ManualTriggerExecutor;

#[async_trait]
impl Executor for ManualTriggerExecutor {
    async fn run(
        &self,
        input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        emitter.loading().await?;
        let next = context.with_entry(
            "manual",
            json!({
                "nodeId": input.node_id,
                "triggeredAt": Utc::now().to_rfc3339(),
            }),
        );
        emitter.success(None).await?;
        Ok(next)
    }
}

/// Asserts the gateway-seeded `googleForm` namespace is present.
#[derive(Debug, Default)]
pub struct GoogleFormTriggerExecutor;

#[async_trait]
impl Executor for GoogleFormTriggerExecutor {
    async fn run(
        &self,
        _input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        emitter.loading().await?;
        if context.get("googleForm").is_none() {
            let err = ExecutorError::MissingInput { what: "googleForm" };
            emitter.error(err.to_string()).await?;
            return Err(err);
        }
        emitter.success(None).await?;
        Ok(context)
    }
}

/// Asserts the gateway-seeded `stripe` namespace is present.
#[derive(Debug, Default)]
pub struct StripeTriggerExecutor;

#[async_trait]
impl Executor for StripeTriggerExecutor {
    async fn run(
        &self,
        _input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        emitter.loading().await?;
        if context.get("stripe").is_none() {
            let err = ExecutorError::MissingInput { what: "stripe" };
            emitter.error(err.to_string()).await?;
            return Err(err);
        }
        emitter.success(None).await?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::{EventStatus, MemoryPublisher};
    use serde_json::json;

    fn input(node_id: &str) -> ExecutorInput {
        ExecutorInput {
            node_id: node_id.to_string(),
            workflow_id: "wf-1".to_string(),
            job_id: "job-1".to_string(),
            data: json!({}),
            credential_ref: None,
        }
    }

    fn emitter(publisher: &MemoryPublisher, node_id: &str) -> NodeEmitter {
        NodeEmitter::new(
            Arc::new(publisher.clone()),
            node_id,
            "job-1",
            "wf-1",
            format!("execute-node-{node_id}"),
        )
    }

    #[tokio::test]
    async fn manual_trigger_records_metadata_and_reports_success() {
        let publisher = MemoryPublisher::new();
        let executor = ManualTriggerExecutor;

        let out = executor
            .run(
                &input("trigger"),
                ExecutionContext::new(),
                &emitter(&publisher, "trigger"),
            )
            .await
            .unwrap();

        assert_eq!(out.get("manual").unwrap()["nodeId"], "trigger");
        let events = publisher.snapshot();
        assert_eq!(events[0].status, EventStatus::Loading);
        assert_eq!(events[1].status, EventStatus::Success);
    }

    #[tokio::test]
    async fn google_form_trigger_requires_its_namespace() {
        let publisher = MemoryPublisher::new();
        let executor = GoogleFormTriggerExecutor;

        let err = executor
            .run(
                &input("form"),
                ExecutionContext::new(),
                &emitter(&publisher, "form"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::MissingInput { what: "googleForm" }));

        // The failure is still reported on the channel, after loading.
        let events = publisher.snapshot();
        assert_eq!(events[0].status, EventStatus::Loading);
        assert_eq!(events[1].status, EventStatus::Error);
    }

    #[tokio::test]
    async fn stripe_trigger_passes_seeded_context_through() {
        let publisher = MemoryPublisher::new();
        let executor = StripeTriggerExecutor;
        let seeded =
            ExecutionContext::from_entries([("stripe".to_string(), json!({"eventId": "evt_1"}))]);

        let out = executor
            .run(&input("pay"), seeded.clone(), &emitter(&publisher, "pay"))
            .await
            .unwrap();
        assert_eq!(out, seeded);
    }
}
