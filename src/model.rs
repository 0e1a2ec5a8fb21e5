//! Workflow graph data model.
//!
//! A [`Workflow`] is a read-only snapshot loaded once per run by a
//! [`GraphLoader`](crate::loader::GraphLoader): its nodes and connections are
//! never mutated while a run is in flight. The engine does not persist any of
//! these types; storage belongs to the loader's backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::NodeType;

/// One step of a workflow: a typed unit of work plus its configuration.
///
/// The `data` payload is opaque to the engine; each executor interprets the
/// fields it needs (for example the HTTP request executor reads `url` and
/// `method` out of it).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier of this node within its workflow.
    pub id: String,
    /// Which executor handles this node.
    #[serde(rename = "type")]
    pub kind: NodeType,
    /// Opaque configuration payload interpreted by the executor.
    #[serde(default)]
    pub data: Value,
    /// Identifier of the owning workflow.
    pub workflow_id: String,
    /// Optional reference to a stored credential (resolved by collaborators,
    /// never decrypted here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_ref: Option<String>,
}

/// A directed dependency between two nodes: `from_node_id` must execute
/// before `to_node_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from_node_id: String,
    pub to_node_id: String,
    /// Named output port on the source node, when the editor distinguishes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_output: Option<String>,
    /// Named input port on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_input: Option<String>,
}

impl Connection {
    /// Convenience constructor for the common unlabeled case.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_node_id: from.into(),
            to_node_id: to.into(),
            from_output: None,
            to_input: None,
        }
    }
}

/// A complete workflow graph snapshot.
///
/// The `secret` is a per-workflow shared value checked by the webhook
/// gateway before it accepts an externally triggered run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub secret: String,
}
