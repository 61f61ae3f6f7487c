use super::IdentityExpander;
use crate::gateway::commands;
use crate::records::AccessPolicyRecord;
use azgraph_core::types::AccessCategory;
use azgraph_core::{NodeKind, Relationship};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

impl IdentityExpander {
    /// Record a vault's access policies as principal -> vault edges
    ///
    /// One edge per principal and non-empty permission category, labeled
    /// `Keys`, `Secrets` or `Certificates`. Several policies for the same
    /// principal merge. Returns the number of edges added.
    pub fn expand_key_vault(
        &self,
        vault_id: &str,
        vault_name: &str,
        resource_group: &str,
        subscription_id: &str,
    ) -> usize {
        let policies = self
            .gateway
            .execute(&commands::key_vault_access_policies(subscription_id, resource_group, vault_name))
            .into_records();

        let mut granted: BTreeMap<String, BTreeSet<AccessCategory>> = BTreeMap::new();
        for policy in &policies {
            match AccessPolicyRecord::try_from(policy) {
                Ok(record) if !record.categories.is_empty() => {
                    granted.entry(record.object_id).or_default().extend(record.categories);
                }
                Ok(record) => debug!("Policy for {} on {} grants nothing", record.object_id, vault_name),
                Err(e) => debug!("Skipping access policy on {}: {}", vault_name, e),
            }
        }

        if granted.is_empty() {
            return 0;
        }

        let ids: Vec<String> = granted.keys().cloned().collect();
        let names = self.resolver.resolve(&ids);

        let mut added = 0;
        for (object_id, categories) in &granted {
            let label = names.get(object_id).map(String::as_str).unwrap_or(object_id.as_str());
            self.graph.add_node(object_id, label, NodeKind::Principal, None);

            for category in categories {
                let relationship = Relationship::AccessPolicy(*category);
                if self.graph.add_edge(object_id, vault_id, &relationship.label(), relationship.color()) {
                    added += 1;
                }
            }
        }

        debug!("{} access-policy edge(s) on {}", added, vault_name);
        added
    }
}
