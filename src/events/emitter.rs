use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::event::{EventStatus, ExecutionEvent};
use super::publisher::{PublishError, Publisher};

/// Node-scoped publishing handle passed to executors.
///
/// Every event carries the same node/job/channel/step metadata, so executors
/// only decide *what* happened. Each method awaits the underlying publish
/// before returning, which is what guarantees that a node's `loading` event
/// reaches the channel strictly before its terminal event.
#[derive(Clone)]
pub struct NodeEmitter {
    publisher: Arc<dyn Publisher>,
    node_id: String,
    job_id: String,
    channel: String,
    step: String,
}

impl NodeEmitter {
    #[must_use]
    pub fn new(
        publisher: Arc<dyn Publisher>,
        node_id: impl Into<String>,
        job_id: impl Into<String>,
        channel: impl Into<String>,
        step: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            node_id: node_id.into(),
            job_id: job_id.into(),
            channel: channel.into(),
            step: step.into(),
        }
    }

    /// The node this emitter reports for.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Report that the node has started executing.
    pub async fn loading(&self) -> Result<(), PublishError> {
        self.publish(EventStatus::Loading, None, None).await
    }

    /// Report successful completion, optionally attaching a result payload.
    pub async fn success(&self, data: Option<Value>) -> Result<(), PublishError> {
        self.publish(EventStatus::Success, data, None).await
    }

    /// Report failure with a human-readable message.
    pub async fn error(&self, message: impl Into<String>) -> Result<(), PublishError> {
        self.publish(EventStatus::Error, None, Some(message.into()))
            .await
    }

    async fn publish(
        &self,
        status: EventStatus,
        data: Option<Value>,
        error: Option<String>,
    ) -> Result<(), PublishError> {
        self.publisher
            .publish(ExecutionEvent {
                node_id: self.node_id.clone(),
                job_id: self.job_id.clone(),
                step: self.step.clone(),
                status,
                channel: self.channel.clone(),
                data,
                error,
                timestamp: Utc::now(),
            })
            .await
    }
}

impl std::fmt::Debug for NodeEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeEmitter")
            .field("node_id", &self.node_id)
            .field("job_id", &self.job_id)
            .field("channel", &self.channel)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::publisher::MemoryPublisher;
    use serde_json::json;

    #[tokio::test]
    async fn emitter_stamps_metadata_on_every_event() {
        let publisher = MemoryPublisher::new();
        let emitter = NodeEmitter::new(
            Arc::new(publisher.clone()),
            "fetch",
            "job-9",
            "wf-3",
            "execute-node-fetch",
        );

        emitter.loading().await.unwrap();
        emitter.success(Some(json!({"status": 200}))).await.unwrap();

        let events = publisher.snapshot();
        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.node_id, "fetch");
            assert_eq!(event.job_id, "job-9");
            assert_eq!(event.channel, "wf-3");
            assert_eq!(event.step, "execute-node-fetch");
        }
        assert_eq!(events[0].status, EventStatus::Loading);
        assert_eq!(events[1].status, EventStatus::Success);
        assert_eq!(events[1].data.as_ref().unwrap()["status"], 200);
    }

    #[tokio::test]
    async fn error_event_carries_the_message() {
        let publisher = MemoryPublisher::new();
        let emitter = NodeEmitter::new(
            Arc::new(publisher.clone()),
            "fetch",
            "job-9",
            "wf-3",
            "execute-node-fetch",
        );

        emitter.error("upstream returned 503").await.unwrap();
        let events = publisher.snapshot();
        assert_eq!(events[0].status, EventStatus::Error);
        assert_eq!(events[0].error.as_deref(), Some("upstream returned 503"));
    }
}
