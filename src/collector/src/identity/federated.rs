use super::{federated_credential_id, IdentityExpander};
use crate::gateway::commands;
use crate::records::FederatedCredentialRecord;
use azgraph_core::{NodeKind, Relationship, ResourceId};
use tracing::debug;

impl IdentityExpander {
    /// Record the federated credentials of a user-assigned identity
    ///
    /// Each credential becomes a `FederatedCredential` node under the
    /// identity with an identity -> credential edge. Returns the number of
    /// credentials seen.
    pub fn record_federated_credentials(
        &self,
        identity_id: &str,
        identity_name: &str,
        resource_group: &str,
        subscription_id: &str,
    ) -> usize {
        let credentials = self
            .gateway
            .execute(&commands::list_federated_credentials(subscription_id, resource_group, identity_name))
            .into_records();

        let relationship = Relationship::FederatedCredentials;
        let mut seen = 0;

        for credential in &credentials {
            let record = match FederatedCredentialRecord::try_from(credential) {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping federated credential of {}: {}", identity_name, e);
                    continue;
                }
            };

            let credential_id = federated_credential_id(identity_id, &record.name);
            self.graph
                .add_node(&credential_id, &record.name, NodeKind::FederatedCredential, None);
            self.graph
                .add_edge(identity_id, &credential_id, &relationship.label(), relationship.color());
            seen += 1;
        }

        seen
    }

    /// Federated credentials of an identity known only by its resource ID
    ///
    /// Subscription, resource group and name are taken from the ID. An ID
    /// that does not parse adds nothing.
    pub(crate) fn record_federated_credentials_for(&self, identity_id: &str) -> usize {
        let parsed = match ResourceId::parse(identity_id) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Not fetching federated credentials: {}", e);
                return 0;
            }
        };

        match parsed.resource_group() {
            Some(resource_group) => self.record_federated_credentials(
                identity_id,
                parsed.name(),
                resource_group,
                parsed.subscription_id(),
            ),
            None => 0,
        }
    }
}
