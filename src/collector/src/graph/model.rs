//! Thread-safe graph store with merge-on-insert semantics

use super::types::{Edge, GraphSnapshot, Node};
use azgraph_core::types::DEFAULT_EDGE_COLOR;
use azgraph_core::NodeKind;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Outcome of [`ResourceGraph::add_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeInsert {
    /// The ID was new
    Inserted,
    /// The ID existed and a user-assigned identity insert overwrote it
    Overridden,
    /// The ID existed; the first write stands
    Ignored,
}

type EdgeKey = (String, String, String);

#[derive(Default)]
struct GraphInner {
    nodes: Vec<Node>,
    /// node ID -> position in `nodes`
    node_index: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_keys: HashSet<EdgeKey>,
}

/// Shared node/edge store
///
/// Every mutation takes one lock around its whole check-then-insert, so the
/// uniqueness invariants hold however many workers write concurrently.
#[derive(Default)]
pub struct ResourceGraph {
    inner: Mutex<GraphInner>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge a node
    ///
    /// An unseen `id` is inserted with `color`, or the kind's table color
    /// when `color` is `None`. A seen `id` keeps its first write, except
    /// that a `UserAssignedManagedIdentity` insert overwrites label, kind,
    /// and color: user-assigned identity data is authoritative over any
    /// placeholder recorded for the same ID.
    pub fn add_node(&self, id: &str, label: &str, kind: NodeKind, color: Option<&str>) -> NodeInsert {
        let color = color.unwrap_or_else(|| kind.default_color()).to_string();
        let mut inner = self.inner.lock();

        let existing = inner.node_index.get(id).copied();
        if let Some(position) = existing {
            if kind == NodeKind::UserAssignedManagedIdentity {
                let node = &mut inner.nodes[position];
                node.label = label.to_string();
                node.kind = kind;
                node.color = color;
                return NodeInsert::Overridden;
            }
            return NodeInsert::Ignored;
        }

        let position = inner.nodes.len();
        inner.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            color,
        });
        inner.node_index.insert(id.to_string(), position);
        NodeInsert::Inserted
    }

    /// Insert an edge unless `(source, target, label)` already exists
    ///
    /// Returns `true` when a new edge was added. Endpoints need not exist.
    pub fn add_edge(&self, source: &str, target: &str, label: &str, color: &str) -> bool {
        let key = (source.to_string(), target.to_string(), label.to_string());
        let mut inner = self.inner.lock();

        if inner.edge_keys.contains(&key) {
            return false;
        }

        inner.edges.push(Edge {
            source: key.0.clone(),
            target: key.1.clone(),
            label: key.2.clone(),
            color: color.to_string(),
        });
        inner.edge_keys.insert(key);
        true
    }

    /// [`add_edge`](Self::add_edge) with [`DEFAULT_EDGE_COLOR`]
    pub fn add_default_edge(&self, source: &str, target: &str, label: &str) -> bool {
        self.add_edge(source, target, label, DEFAULT_EDGE_COLOR)
    }

    /// Copy of a node by ID
    pub fn node(&self, id: &str) -> Option<Node> {
        let inner = self.inner.lock();
        inner.node_index.get(id).map(|&position| inner.nodes[position].clone())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.inner.lock().node_index.contains_key(id)
    }

    pub fn contains_edge(&self, source: &str, target: &str, label: &str) -> bool {
        let key = (source.to_string(), target.to_string(), label.to_string());
        self.inner.lock().edge_keys.contains(&key)
    }

    /// Nodes matching a predicate on their kind, in insertion order
    pub fn nodes_where<F>(&self, mut predicate: F) -> Vec<Node>
    where
        F: FnMut(&NodeKind) -> bool,
    {
        self.inner
            .lock()
            .nodes
            .iter()
            .filter(|node| predicate(&node.kind))
            .cloned()
            .collect()
    }

    /// Edges matching a predicate, in insertion order
    pub fn edges_where<F>(&self, mut predicate: F) -> Vec<Edge>
    where
        F: FnMut(&Edge) -> bool,
    {
        self.inner
            .lock()
            .edges
            .iter()
            .filter(|edge| predicate(edge))
            .cloned()
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.lock().edges.len()
    }

    /// Full node and edge lists in insertion order, ready for export
    pub fn snapshot(&self) -> GraphSnapshot {
        let inner = self.inner.lock();
        GraphSnapshot {
            nodes: inner.nodes.clone(),
            edges: inner.edges.clone(),
        }
    }
}
