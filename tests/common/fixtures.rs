//! Workflow fixtures shared across integration tests.

use relayflow::model::{Connection, Node, Workflow};
use relayflow::types::NodeType;
use serde_json::{Value, json};

pub const TEST_SECRET: &str = "s3cret";

/// Build a node with an empty data payload.
pub fn node(id: &str, kind: NodeType, workflow_id: &str) -> Node {
    node_with_data(id, kind, workflow_id, json!({}))
}

pub fn node_with_data(id: &str, kind: NodeType, workflow_id: &str, data: Value) -> Node {
    Node {
        id: id.to_string(),
        kind,
        data,
        workflow_id: workflow_id.to_string(),
        credential_ref: None,
    }
}

/// A two-node workflow: manual trigger feeding an HTTP request node.
pub fn trigger_then_http(workflow_id: &str, url: &str) -> Workflow {
    Workflow {
        id: workflow_id.to_string(),
        nodes: vec![
            node("trigger", NodeType::ManualTrigger, workflow_id),
            node_with_data(
                "fetch",
                NodeType::HttpRequest,
                workflow_id,
                json!({"url": url}),
            ),
        ],
        connections: vec![Connection::new("trigger", "fetch")],
        secret: TEST_SECRET.to_string(),
    }
}

/// A workflow whose two nodes depend on each other.
pub fn cyclic_workflow(workflow_id: &str) -> Workflow {
    Workflow {
        id: workflow_id.to_string(),
        nodes: vec![
            node("x", NodeType::HttpRequest, workflow_id),
            node("y", NodeType::HttpRequest, workflow_id),
        ],
        connections: vec![Connection::new("x", "y"), Connection::new("y", "x")],
        secret: TEST_SECRET.to_string(),
    }
}

/// A single google-form trigger node, for gateway dispatch tests.
pub fn google_form_workflow(workflow_id: &str) -> Workflow {
    Workflow {
        id: workflow_id.to_string(),
        nodes: vec![node("form", NodeType::GoogleFormTrigger, workflow_id)],
        connections: vec![],
        secret: TEST_SECRET.to_string(),
    }
}

/// A single stripe trigger node.
pub fn stripe_workflow(workflow_id: &str) -> Workflow {
    Workflow {
        id: workflow_id.to_string(),
        nodes: vec![node("pay", NodeType::StripeTrigger, workflow_id)],
        connections: vec![],
        secret: TEST_SECRET.to_string(),
    }
}
