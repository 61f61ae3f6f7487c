//! Cross-reference linking post-pass
//!
//! Runs once, after every subscription pipeline has joined. Identities are
//! reached through several paths (role assignments name their principal,
//! identity blocks name the identity resource) and nothing during
//! aggregation ties the two together. Two passes do:
//!
//! - by label: a `Principal` and a `UserAssignedManagedIdentity` sharing a
//!   trimmed, case-folded label are linked. This is a heuristic and links
//!   every pair that shares a label, unrelated namesakes included.
//! - by ID: each user-assigned identity's backing principal is looked up and
//!   linked. Both passes draw `Linked` edges identity -> principal, so a
//!   by-ID link for a pair already linked by label is a no-op.

use crate::graph::ResourceGraph;
use crate::identity::IdentityExpander;
use azgraph_core::{NodeKind, Relationship};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Edges attempted by each linker pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSummary {
    /// Identity/principal pairs sharing a label
    pub by_label: usize,
    /// Identities whose backing principal was found
    pub by_id: usize,
    /// Identities whose backing principal lookup came back empty
    pub unresolved: usize,
}

/// Links identity nodes to the principals behind them
pub struct CrossReferenceLinker<'a> {
    graph: Arc<ResourceGraph>,
    expander: &'a IdentityExpander,
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

impl<'a> CrossReferenceLinker<'a> {
    pub fn new(graph: Arc<ResourceGraph>, expander: &'a IdentityExpander) -> Self {
        Self { graph, expander }
    }

    /// Run the by-label pass, then the by-ID pass
    pub fn run(&self) -> LinkSummary {
        let by_label = self.link_by_label();
        let (by_id, unresolved) = self.link_by_id();

        info!(by_label, by_id, unresolved, "Cross-reference linking complete");
        LinkSummary {
            by_label,
            by_id,
            unresolved,
        }
    }

    /// Link principals and user-assigned identities that share a label
    ///
    /// Returns the number of pairs linked (including pairs already linked).
    pub fn link_by_label(&self) -> usize {
        let mut principals: HashMap<String, Vec<String>> = HashMap::new();
        for node in self.graph.nodes_where(|kind| *kind == NodeKind::Principal) {
            principals.entry(normalize(&node.label)).or_default().push(node.id);
        }

        let identities = self
            .graph
            .nodes_where(|kind| *kind == NodeKind::UserAssignedManagedIdentity);

        let linked = Relationship::Linked;
        let mut attempted = 0;
        for identity in &identities {
            let Some(matches) = principals.get(&normalize(&identity.label)) else {
                continue;
            };
            for principal_id in matches {
                debug!("Linking {} to {} by label {:?}", identity.id, principal_id, identity.label);
                self.graph
                    .add_edge(&identity.id, principal_id, &linked.label(), linked.color());
                attempted += 1;
            }
        }

        attempted
    }

    /// Link every user-assigned identity to its backing principal
    ///
    /// Covers identity nodes recorded under either the identity kind or the
    /// identity resource type. Returns `(linked, unresolved)`.
    pub fn link_by_id(&self) -> (usize, usize) {
        let identities = self.graph.nodes_where(NodeKind::is_user_assigned_identity);

        let mut linked = 0;
        let mut unresolved = 0;
        for identity in &identities {
            match self.expander.link_backing_principal(&identity.id) {
                Some(_) => linked += 1,
                None => unresolved += 1,
            }
        }

        (linked, unresolved)
    }
}
