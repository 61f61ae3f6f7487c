//! Role assignment fetching and graph recording

use crate::gateway::commands;
use crate::graph::ResourceGraph;
use crate::principal::PrincipalNameResolver;
use crate::records::RoleAssignmentRecord;
use azgraph_core::types::{resource_group_scope, subscription_scope};
use azgraph_core::{CommandGateway, NodeKind, Relationship};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// principal ID -> every `(scope, role name)` it holds
pub type PrincipalGrants = BTreeMap<String, BTreeSet<(String, String)>>;

/// Scopes one pipeline has already queried
///
/// Pipeline-local; scopes are subscription-qualified, so separate pipelines
/// never contend for the same entry.
#[derive(Debug, Default, Clone)]
pub struct ProcessedScopes {
    scopes: HashSet<String>,
}

impl ProcessedScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a scope as processed; `false` if it already was
    pub fn mark(&mut self, scope: &str) -> bool {
        self.scopes.insert(scope.to_string())
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Fetches role assignments and records them in the graph
///
/// Every `(principal, scope, role)` triple becomes a `Principal` node
/// (labeled through the resolver) and an edge principal -> scope labeled with
/// the role name.
pub struct RbacAggregator {
    gateway: Arc<dyn CommandGateway>,
    graph: Arc<ResourceGraph>,
    resolver: Arc<PrincipalNameResolver>,
}

impl RbacAggregator {
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

    /// Role assignments granted at `scope`, as `(principal ID, role name)`
    ///
    /// Records missing either field are skipped. A failed query yields an
    /// empty list.
    pub fn fetch_assignments(&self, scope: &str) -> Vec<(String, String)> {
        self.gateway
            .execute(&commands::list_role_assignments(scope))
            .into_records()
            .iter()
            .filter_map(|record| match RoleAssignmentRecord::try_from(record) {
                Ok(assignment) => Some((assignment.principal_id, assignment.role_name)),
                Err(e) => {
                    debug!("Skipping role assignment at {}: {}", scope, e);
                    None
                }
            })
            .collect()
    }

    /// Query one scope unless already processed, and record what it grants
    pub fn aggregate_scope(&self, scope: &str, processed: &mut ProcessedScopes) -> PrincipalGrants {
        let mut grants = PrincipalGrants::new();
        if processed.mark(scope) {
            self.collect_scope(scope, &mut grants);
        }
        self.record(&grants);
        grants
    }

    /// Walk the subscription -> resource group -> resource chain
    ///
    /// Scopes already in `processed` are skipped; every scope in the chain is
    /// processed afterwards. Returns, per principal, every
    /// `(scope, role)` pair found at the scopes queried by this call.
    pub fn aggregate_for_resource(
        &self,
        resource_id: &str,
        resource_group: &str,
        subscription_id: &str,
        processed: &mut ProcessedScopes,
    ) -> PrincipalGrants {
        let chain = [
            subscription_scope(subscription_id),
            resource_group_scope(subscription_id, resource_group),
            resource_id.to_string(),
        ];

        let mut grants = PrincipalGrants::new();
        for scope in &chain {
            if processed.mark(scope) {
                self.collect_scope(scope, &mut grants);
            }
        }
        self.record(&grants);
        grants
    }

    fn collect_scope(&self, scope: &str, grants: &mut PrincipalGrants) {
        let assignments = self.fetch_assignments(scope);
        debug!("{} role assignment(s) at {}", assignments.len(), scope);

        for (principal_id, role) in assignments {
            grants
                .entry(principal_id)
                .or_default()
                .insert((scope.to_string(), role));
        }
    }

    fn record(&self, grants: &PrincipalGrants) {
        if grants.is_empty() {
            return;
        }

        let ids: Vec<String> = grants.keys().cloned().collect();
        let names = self.resolver.resolve(&ids);

        for (principal_id, pairs) in grants {
            let label = names.get(principal_id).map(String::as_str).unwrap_or(principal_id.as_str());
            self.graph.add_node(principal_id, label, NodeKind::Principal, None);

            for (scope, role) in pairs {
                let relationship = Relationship::RoleAssignment(role.clone());
                self.graph.add_edge(principal_id, scope, &relationship.label(), relationship.color());
            }
        }
    }
}
