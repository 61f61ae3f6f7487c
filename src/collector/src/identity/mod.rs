//! Identity and access expansion
//!
//! Adds what role assignments alone do not show: Key Vault access policies,
//! system- and user-assigned managed identities with their backing
//! principals, and federated credentials of user-assigned identities.
//!
//! Every sub-fetch degrades the same way: a failed or empty query adds
//! nothing to the graph and expansion carries on.

mod federated;
mod key_vault;
mod managed;


use crate::graph::ResourceGraph;
use crate::principal::PrincipalNameResolver;
use azgraph_core::{CommandGateway, NodeKind, Relationship};
use std::sync::Arc;

/// Suffix of the synthesized system-assigned identity node ID
pub const SYSTEM_ASSIGNED_SUFFIX: &str = "/systemAssignedIdentity";

/// Node ID of a resource's system-assigned identity
pub fn system_assigned_identity_id(resource_id: &str) -> String {
    format!("{}{}", resource_id, SYSTEM_ASSIGNED_SUFFIX)
}

/// Node ID of a federated credential under a user-assigned identity
pub fn federated_credential_id(identity_id: &str, credential_name: &str) -> String {
    format!("{}/federatedCredentials/{}", identity_id, credential_name)
}

/// Expands resources into their identity and access-policy subgraphs
pub struct IdentityExpander {
    gateway: Arc<dyn CommandGateway>,
    graph: Arc<ResourceGraph>,
    resolver: Arc<PrincipalNameResolver>,
}

impl IdentityExpander {
    pub fn new(
        gateway: Arc<dyn CommandGateway>,
        graph: Arc<ResourceGraph>,
        resolver: Arc<PrincipalNameResolver>,
    ) -> Self {
        Self {
            gateway,
            graph,
            resolver,
        }
    }

    /// Ensure a `Principal` node exists, labeled through the resolver
    fn add_principal(&self, principal_id: &str) {
        let label = self.resolver.resolve_one(principal_id);
        self.graph.add_node(principal_id, &label, NodeKind::Principal, None);
    }

    /// Principal node plus a `Linked` edge from `identity_id`
    fn link_principal(&self, identity_id: &str, principal_id: &str) {
        self.add_principal(principal_id);
        let linked = Relationship::Linked;
        self.graph.add_edge(identity_id, principal_id, &linked.label(), linked.color());
    }
}
