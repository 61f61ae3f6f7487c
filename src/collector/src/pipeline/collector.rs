//! Run orchestration: subscription fan-out, join, link

use super::subscription::{SubscriptionPipeline, SubscriptionSummary};
use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::export;
use crate::gateway::commands;
use crate::graph::ResourceGraph;
use crate::identity::IdentityExpander;
use crate::linker::{CrossReferenceLinker, LinkSummary};
use crate::principal::{PrincipalNameResolver, ResolverStats};
use crate::records::SubscriptionRecord;
use crate::scope::RbacAggregator;
use azgraph_core::CommandGateway;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a full collection run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One entry per subscription, in listing order
    pub subscriptions: Vec<SubscriptionSummary>,
    pub link: LinkSummary,
    pub nodes: usize,
    pub edges: usize,
    pub resolver: ResolverStats,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn resources_seen(&self) -> usize {
        self.subscriptions.iter().map(|s| s.resources_seen).sum()
    }

    pub fn scopes_queried(&self) -> usize {
        self.subscriptions.iter().map(|s| s.scopes_queried).sum()
    }
}

/// Builds the resource-identity-access graph for every visible subscription
///
/// The graph and the principal-name cache live as long as the collector and
/// are shared by every worker.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use azgraph_collector::{Collector, CollectorConfig, CollectorError};
/// use azgraph_core::testing::ScriptedGateway;
///
/// let collector = Collector::new(CollectorConfig::default(), Arc::new(ScriptedGateway::new()));
///
/// // No subscriptions visible
/// assert!(matches!(collector.collect(), Err(CollectorError::NoSubscriptions)));
/// ```
pub struct Collector {
    config: CollectorConfig,
    gateway: Arc<dyn CommandGateway>,
    graph: Arc<ResourceGraph>,
    resolver: Arc<PrincipalNameResolver>,
    rbac: RbacAggregator,
    expander: IdentityExpander,
}

impl Collector {
    pub fn new(config: CollectorConfig, gateway: Arc<dyn CommandGateway>) -> Self {
        let graph = Arc::new(ResourceGraph::new());
        let resolver = Arc::new(if config.principal_lookup.batch {
            PrincipalNameResolver::with_batching(gateway.clone(), config.principal_lookup.batch_size)
        } else {
            PrincipalNameResolver::new(gateway.clone())
        });

        let rbac = RbacAggregator::new(gateway.clone(), graph.clone(), resolver.clone());
        let expander = IdentityExpander::new(gateway.clone(), graph.clone(), resolver.clone());

        Self {
            config,
            gateway,
            graph,
            resolver,
            rbac,
            expander,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<ResourceGraph> {
        &self.graph
    }

    pub fn resolver(&self) -> &Arc<PrincipalNameResolver> {
        &self.resolver
    }

    /// Subscriptions visible to the current session
    ///
    /// Entries without `id` or `name` are skipped.
    pub fn list_subscriptions(&self) -> Vec<SubscriptionRecord> {
        self.gateway
            .execute(&commands::list_subscriptions())
            .into_records()
            .iter()
            .filter_map(|record| match SubscriptionRecord::try_from(record) {
                Ok(subscription) => Some(subscription),
                Err(e) => {
                    debug!("Skipping subscription: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Run every subscription pipeline, then the linker
    ///
    /// # Errors
    ///
    /// `NoSubscriptions` when nothing is visible, before any pipeline runs;
    /// `ThreadPool` when the worker pool cannot be built.
    pub fn collect(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let subscriptions = self.list_subscriptions();
        if subscriptions.is_empty() {
            return Err(CollectorError::NoSubscriptions);
        }

        let workers = self.config.max_workers.min(subscriptions.len()).max(1);
        info!(
            subscriptions = subscriptions.len(),
            workers,
            "Starting collection"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("azgraph-worker-{}", index))
            .build()
            .map_err(|e| CollectorError::ThreadPool(e.to_string()))?;

        let summaries: Vec<SubscriptionSummary> = pool.install(|| {
            subscriptions
                .par_iter()
                .map(|subscription| self.pipeline().run(subscription))
                .collect()
        });

        let link = CrossReferenceLinker::new(self.graph.clone(), &self.expander).run();

        let summary = RunSummary {
            subscriptions: summaries,
            link,
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            resolver: self.resolver.stats(),
            elapsed: start.elapsed(),
        };

        info!(
            nodes = summary.nodes,
            edges = summary.edges,
            resources = summary.resources_seen(),
            scopes = summary.scopes_queried(),
            principals = summary.resolver.entries,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Collection complete"
        );

        Ok(summary)
    }

    /// Write the graph as pretty-printed JSON
    pub fn export(&self, path: &Path) -> Result<()> {
        export::write_json(&self.graph.snapshot(), path)
    }

    fn pipeline(&self) -> SubscriptionPipeline<'_> {
        SubscriptionPipeline::new(
            &self.config,
            self.gateway.as_ref(),
            &self.graph,
            &self.rbac,
            &self.expander,
        )
    }
}
