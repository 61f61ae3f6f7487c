//! Scope-level RBAC aggregation
//!
//! Role assignments are queried per authorization scope: the subscription,
//! each resource group, and each tracked resource. A [`ProcessedScopes`] set
//! owned by one subscription pipeline guarantees every scope is queried at
//! most once per run of that pipeline.

mod aggregator;


pub use aggregator::{PrincipalGrants, ProcessedScopes, RbacAggregator};
