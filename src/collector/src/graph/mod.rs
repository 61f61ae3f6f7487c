//! Resource-identity-access graph
//!
//! The graph is shared by every subscription worker. Nodes are keyed by ID
//! and merge on insert; edges are keyed by `(source, target, label)` and
//! duplicate inserts are silent no-ops.
//!
//! # Example
//!
//! ```
//! use azgraph_collector::graph::ResourceGraph;
//! use azgraph_core::NodeKind;
//!
//! let graph = ResourceGraph::new();
//! graph.add_node("p1", "alice", NodeKind::Principal, None);
//! graph.add_node("/subscriptions/s", "prod", NodeKind::Subscription, None);
//!
//! assert!(graph.add_edge("p1", "/subscriptions/s", "Owner", "#d62728"));
//! assert!(!graph.add_edge("p1", "/subscriptions/s", "Owner", "green"));
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod model;
mod types;


pub use model::{NodeInsert, ResourceGraph};
pub use types::{Edge, GraphSnapshot, Node};
