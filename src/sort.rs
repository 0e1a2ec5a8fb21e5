//! Deterministic topological ordering of workflow nodes.
//!
//! The sorter is a pure function over one workflow's node and connection
//! lists. It performs a depth-first traversal with recursion-stack coloring:
//! reaching a node that is still on the active recursion stack proves a cycle,
//! and the whole sort fails with a typed [`CycleError`] rather than returning
//! a best-effort partial order.
//!
//! Determinism: for identical input ordering the output is identical. Roots
//! are visited so that a workflow with no connections sorts to exactly its
//! input node order, and isolated nodes (no incident connections) always
//! appear exactly once.
//!
//! # Examples
//!
//! ```rust
//! use relayflow::model::{Connection, Node};
//! use relayflow::sort::topological_sort;
//! use relayflow::types::NodeType;
//! use serde_json::json;
//!
//! let node = |id: &str, kind| Node {
//!     id: id.into(),
//!     kind,
//!     data: json!({}),
//!     workflow_id: "wf-1".into(),
//!     credential_ref: None,
//! };
//! let nodes = vec![
//!     node("trigger", NodeType::ManualTrigger),
//!     node("fetch", NodeType::HttpRequest),
//! ];
//! let connections = vec![Connection::new("trigger", "fetch")];
//!
//! let order = topological_sort(&nodes, &connections).unwrap();
//! assert_eq!(order, vec!["trigger".to_string(), "fetch".to_string()]);
//! ```

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::model::{Connection, Node};

/// The connection set induces a cycle; no ordering exists.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("workflow graph contains a cycle through node '{node_id}'")]
#[diagnostic(
    code(relayflow::sort::cycle),
    help("Remove the connection that routes execution back into an earlier node.")
)]
pub struct CycleError {
    /// A node on the detected cycle.
    pub node_id: String,
}

/// DFS visitation state. Gray marks a node on the active recursion stack;
/// an edge into a Gray node closes a cycle.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Compute a total execution order for `nodes` under `connections`.
///
/// For every connection `(a -> b)` the returned order places `a` before `b`.
/// Nodes without incident connections are retained. Connections that name a
/// node id absent from `nodes` are skipped with a warning; endpoint validity
/// is the graph loader's contract, not re-validated here.
///
/// # Errors
///
/// Returns [`CycleError`] when the connections induce a cycle. No partial
/// ordering is produced in that case.
pub fn topological_sort(
    nodes: &[Node],
    connections: &[Connection],
) -> Result<Vec<String>, CycleError> {
    let index_by_id: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for connection in connections {
        let (Some(&from), Some(&to)) = (
            index_by_id.get(connection.from_node_id.as_str()),
            index_by_id.get(connection.to_node_id.as_str()),
        ) else {
            tracing::warn!(
                from = %connection.from_node_id,
                to = %connection.to_node_id,
                "connection references unknown node; skipping"
            );
            continue;
        };
        successors[from].push(to);
    }

    let mut colors = vec![Color::White; nodes.len()];
    let mut postorder: Vec<usize> = Vec::with_capacity(nodes.len());

    // Seeding roots in reverse input order makes the reversed postorder come
    // out in input order whenever the edges leave ties unresolved.
    for root in (0..nodes.len()).rev() {
        if colors[root] == Color::White {
            visit(root, nodes, &successors, &mut colors, &mut postorder)?;
        }
    }

    postorder.reverse();
    Ok(postorder
        .into_iter()
        .map(|i| nodes[i].id.clone())
        .collect())
}

fn visit(
    node: usize,
    nodes: &[Node],
    successors: &[Vec<usize>],
    colors: &mut [Color],
    postorder: &mut Vec<usize>,
) -> Result<(), CycleError> {
    colors[node] = Color::Gray;
    for &next in &successors[node] {
        match colors[next] {
            Color::Gray => {
                return Err(CycleError {
                    node_id: nodes[next].id.clone(),
                });
            }
            Color::White => visit(next, nodes, successors, colors, postorder)?,
            Color::Black => {}
        }
    }
    colors[node] = Color::Black;
    postorder.push(node);
    Ok(())
}
