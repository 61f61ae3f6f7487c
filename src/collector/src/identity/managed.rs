use super::{system_assigned_identity_id, IdentityExpander};
use crate::gateway::commands;
use crate::records::{principal_id_from_output, IdentityBlock};
use azgraph_core::{NodeKind, Relationship};
use tracing::debug;

/// Label of every system-assigned identity node
const SYSTEM_ASSIGNED_LABEL: &str = "SystemAssignedManagedIdentity";

impl IdentityExpander {
    /// Expand the `identity` block of a resource
    ///
    /// A system-assigned identity with a principal becomes a node under the
    /// resource, linked to its principal. Each user-assigned identity
    /// reference becomes (or overrides) the identity's node, linked to its
    /// principal when the block names one, and gets its federated
    /// credentials recorded.
    pub fn expand_identity_block(&self, resource_id: &str, identity: &IdentityBlock) {
        if identity.has_system_assigned() {
            match identity.principal_id.as_deref() {
                Some(principal_id) => self.expand_system_assigned(resource_id, principal_id),
                None => debug!("System-assigned identity on {} has no principal", resource_id),
            }
        }

        if identity.has_user_assigned() {
            let uses = Relationship::UsesUserAssignedIdentity;
            for reference in &identity.user_assigned {
                let identity_id = reference.identity_id.as_str();
                let label = identity_id.rsplit('/').find(|s| !s.is_empty()).unwrap_or(identity_id);

                self.graph
                    .add_node(identity_id, label, NodeKind::UserAssignedManagedIdentity, None);
                self.graph.add_edge(resource_id, identity_id, &uses.label(), uses.color());

                if let Some(principal_id) = reference.principal_id.as_deref() {
                    self.link_principal(identity_id, principal_id);
                }

                self.record_federated_credentials_for(identity_id);
            }
        }
    }

    fn expand_system_assigned(&self, resource_id: &str, principal_id: &str) {
        let identity_id = system_assigned_identity_id(resource_id);
        let relationship = Relationship::SystemAssignedIdentity;

        self.graph.add_node(
            &identity_id,
            SYSTEM_ASSIGNED_LABEL,
            NodeKind::SystemAssignedManagedIdentity,
            None,
        );
        self.graph
            .add_edge(resource_id, &identity_id, &relationship.label(), relationship.color());
        self.link_principal(&identity_id, principal_id);
    }

    /// Expand a user-assigned identity discovered as a resource itself
    ///
    /// The identity node is labeled with the resource name, its federated
    /// credentials are recorded, and its backing principal is looked up and
    /// linked. The principal node ID is the same one the reference path uses.
    pub fn expand_user_assigned_identity_resource(
        &self,
        identity_id: &str,
        identity_name: &str,
        resource_group: &str,
        subscription_id: &str,
    ) {
        self.graph.add_node(
            identity_id,
            identity_name,
            NodeKind::UserAssignedManagedIdentity,
            None,
        );
        self.record_federated_credentials(identity_id, identity_name, resource_group, subscription_id);
        self.link_backing_principal(identity_id);
    }

    /// Look up the backing principal of a user-assigned identity and link it
    ///
    /// Returns the principal ID, or `None` when the lookup yields nothing.
    pub fn link_backing_principal(&self, identity_id: &str) -> Option<String> {
        let output = self.gateway.execute(&commands::identity_principal_id(identity_id));
        let principal_id = match principal_id_from_output(&output) {
            Some(principal_id) => principal_id,
            None => {
                debug!("No backing principal found for {}", identity_id);
                return None;
            }
        };

        self.link_principal(identity_id, &principal_id);
        Some(principal_id)
    }
}
