//! Graph vertex and edge records, in their export shape

use azgraph_core::NodeKind;
use serde::{Deserialize, Serialize};

/// Graph vertex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Resource ID, principal ID, or synthesized composite key
    pub id: String,

    /// Best-effort display name
    pub label: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub color: String,
}

/// Directed, labeled relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub color: String,
}

/// Point-in-time copy of the whole graph, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}
