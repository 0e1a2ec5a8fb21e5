//! Core types for the relayflow workflow engine.
//!
//! This module defines the closed set of node kinds a workflow graph may
//! contain. Keeping the set closed means dispatch is exhaustive: an executor
//! either exists for a [`NodeType`] in the registry, or the lookup fails with
//! a typed error. There is no stringly-typed fallback path.
//!
//! # Examples
//!
//! ```rust
//! use relayflow::types::NodeType;
//!
//! let trigger = NodeType::ManualTrigger;
//! assert_eq!(trigger.as_tag(), "manual_trigger");
//! assert!(trigger.is_trigger());
//!
//! // Tags round-trip through serde for stored workflow definitions.
//! let parsed: NodeType = serde_json::from_str("\"http_request\"").unwrap();
//! assert_eq!(parsed, NodeType::HttpRequest);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a node within a workflow graph.
///
/// Each variant names a node behavior implemented by exactly one executor in
/// the [`ExecutorRegistry`](crate::executors::ExecutorRegistry). Stored
/// workflow definitions carry the snake_case tag form (`"manual_trigger"`,
/// `"http_request"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Workflow entry point triggered directly by a user or internal event.
    ManualTrigger,

    /// Entry point seeded by the Google Form webhook gateway.
    GoogleFormTrigger,

    /// Entry point seeded by the Stripe webhook gateway.
    StripeTrigger,

    /// Action node that issues an outbound HTTP call and records the response.
    HttpRequest,
}

impl NodeType {
    /// All known node kinds, in registry registration order.
    pub const ALL: [NodeType; 4] = [
        NodeType::ManualTrigger,
        NodeType::GoogleFormTrigger,
        NodeType::StripeTrigger,
        NodeType::HttpRequest,
    ];

    /// The snake_case tag used in stored workflow definitions.
    #[must_use]
    pub fn as_tag(&self) -> &'static str {
        match self {
            NodeType::ManualTrigger => "manual_trigger",
            NodeType::GoogleFormTrigger => "google_form_trigger",
            NodeType::StripeTrigger => "stripe_trigger",
            NodeType::HttpRequest => "http_request",
        }
    }

    /// Returns `true` for node kinds that start a workflow rather than act
    /// on accumulated context.
    #[must_use]
    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            NodeType::ManualTrigger | NodeType::GoogleFormTrigger | NodeType::StripeTrigger
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}
