//! One subscription's expansion sequence

use crate::config::CollectorConfig;
use crate::gateway::commands;
use crate::graph::ResourceGraph;
use crate::identity::IdentityExpander;
use crate::records::{listing_rows, ResourceRecord, SubscriptionRecord};
use crate::scope::{ProcessedScopes, RbacAggregator};
use azgraph_core::types::{resource_group_scope, subscription_scope, KEY_VAULT_TYPE, USER_ASSIGNED_IDENTITY_TYPE};
use azgraph_core::{CommandGateway, NodeKind, Relationship};
use tracing::{debug, info};

/// What one pipeline did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSummary {
    pub subscription_id: String,
    /// Valid rows in the resource listing
    pub resources_seen: usize,
    /// Rows with a tracked type that got full expansion
    pub resources_expanded: usize,
    /// Rows rejected for missing fields or an unknown resource group
    pub resources_skipped: usize,
    /// Distinct scopes whose role assignments were queried
    pub scopes_queried: usize,
}

/// Sequential expansion of one subscription into the shared graph
///
/// Steps, in order:
/// 1. the `Subscription` node and its role assignments
/// 2. the resource listing
/// 3. per resource: its resource group (node, containment, role
///    assignments once per group); then, for tracked types only, the
///    resource node, its role assignment chain, its identities, and for
///    vaults the access policies
pub struct SubscriptionPipeline<'a> {
    config: &'a CollectorConfig,
    gateway: &'a dyn CommandGateway,
    graph: &'a ResourceGraph,
    rbac: &'a RbacAggregator,
    expander: &'a IdentityExpander,
    processed: ProcessedScopes,
}

impl<'a> SubscriptionPipeline<'a> {
    pub fn new(
        config: &'a CollectorConfig,
        gateway: &'a dyn CommandGateway,
        graph: &'a ResourceGraph,
        rbac: &'a RbacAggregator,
        expander: &'a IdentityExpander,
    ) -> Self {
        Self {
            config,
            gateway,
            graph,
            rbac,
            expander,
            processed: ProcessedScopes::new(),
        }
    }

    /// Expand `subscription` into the graph
    pub fn run(mut self, subscription: &SubscriptionRecord) -> SubscriptionSummary {
        let mut summary = SubscriptionSummary {
            subscription_id: subscription.id.clone(),
            ..Default::default()
        };

        info!(subscription = %subscription.name, id = %subscription.id, "Processing subscription");

        let subscription_node = subscription_scope(&subscription.id);
        self.graph
            .add_node(&subscription_node, &subscription.name, NodeKind::Subscription, None);
        self.rbac.aggregate_scope(&subscription_node, &mut self.processed);

        let rows = listing_rows(self.gateway.execute(&commands::list_resources(&subscription.id)));
        debug!("{} resource row(s) in {}", rows.len(), subscription.id);

        for row in &rows {
            let resource = match ResourceRecord::try_from(row) {
                Ok(resource) => resource,
                Err(e) => {
                    debug!("Skipping resource in {}: {}", subscription.id, e);
                    summary.resources_skipped += 1;
                    continue;
                }
            };
            let Some(resource_group) = resource.resource_group_name() else {
                debug!("No resource group for {}", resource.id);
                summary.resources_skipped += 1;
                continue;
            };
            summary.resources_seen += 1;

            self.record_resource_group(&subscription.id, &subscription_node, &resource_group);

            if !self.config.is_tracked(&resource.resource_type) {
                continue;
            }

            self.expand_resource(&subscription.id, &resource_group, &resource);
            summary.resources_expanded += 1;
        }

        summary.scopes_queried = self.processed.len();
        info!(
            subscription = %subscription.id,
            resources = summary.resources_seen,
            expanded = summary.resources_expanded,
            scopes = summary.scopes_queried,
            "Subscription complete"
        );
        summary
    }

    fn record_resource_group(&mut self, subscription_id: &str, subscription_node: &str, resource_group: &str) {
        let group_id = resource_group_scope(subscription_id, resource_group);
        let contains = Relationship::Contains;

        self.graph
            .add_node(&group_id, resource_group, NodeKind::ResourceGroup, None);
        self.graph
            .add_edge(subscription_node, &group_id, &contains.label(), contains.color());
        self.rbac.aggregate_scope(&group_id, &mut self.processed);
    }

    fn expand_resource(&mut self, subscription_id: &str, resource_group: &str, resource: &ResourceRecord) {
        let kind = NodeKind::resource(&resource.resource_type);
        let color = kind.default_color();
        let group_id = resource_group_scope(subscription_id, resource_group);

        self.graph.add_node(&resource.id, &resource.name, kind, None);
        self.graph
            .add_edge(&group_id, &resource.id, &Relationship::Contains.label(), color);

        self.rbac
            .aggregate_for_resource(&resource.id, resource_group, subscription_id, &mut self.processed);

        if resource.is_type(USER_ASSIGNED_IDENTITY_TYPE) {
            self.expander.expand_user_assigned_identity_resource(
                &resource.id,
                &resource.name,
                resource_group,
                subscription_id,
            );
        } else if let Some(identity) = &resource.identity {
            self.expander.expand_identity_block(&resource.id, identity);
        }

        if resource.is_type(KEY_VAULT_TYPE) {
            self.expander
                .expand_key_vault(&resource.id, &resource.name, resource_group, subscription_id);
        }
    }
}
