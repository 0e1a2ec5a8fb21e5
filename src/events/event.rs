use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state reported for one node execution.
///
/// For every node a `Loading` event is published strictly before the
/// terminal `Success` or `Error` event; see [`NodeEmitter`](super::NodeEmitter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Loading,
    Success,
    Error,
}

impl EventStatus {
    /// Whether this status ends a node's lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Success | EventStatus::Error)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Loading => write!(f, "loading"),
            EventStatus::Success => write!(f, "success"),
            EventStatus::Error => write!(f, "error"),
        }
    }
}

/// One progress report for one node within one run.
///
/// Events are ephemeral: the engine publishes them to a workflow-scoped
/// channel and keeps no history. A relay outside this crate forwards them to
/// live subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
    /// The node this event describes.
    pub node_id: String,
    /// The run (job) the node executed under.
    pub job_id: String,
    /// Free-form step label, normally the checkpoint name.
    pub step: String,
    /// Lifecycle state.
    pub status: EventStatus,
    /// Pub/sub topic; the workflow id for this engine.
    pub channel: String,
    /// Optional payload attached to success events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable failure message attached to error events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}@{}] {} {}",
            self.node_id, self.job_id, self.step, self.status
        )
    }
}
