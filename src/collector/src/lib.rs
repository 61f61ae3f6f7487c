//! # azgraph Collector
//!
//! Builds a resource-identity-access graph of an Azure account for security
//! review: who holds which role where, which identities back which
//! resources, and which principals can read which vaults.
//!
//! ## Features
//!
//! - **Merge-on-insert graph** shared safely by concurrent workers
//! - **Scope-deduplicated RBAC**: each subscription, resource group and
//!   resource scope is queried at most once per subscription run
//! - **Principal name cache** with optional batched directory lookups
//! - **Identity expansion**: system/user-assigned managed identities,
//!   federated credentials, Key Vault access policies
//! - **Cross-reference linking** of identities to their backing principals
//! - **Pluggable command gateway**: the real `az` CLI, or a scripted one in tests
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use azgraph_collector::{Collector, CollectorConfig};
//! use azgraph_collector::gateway::commands;
//! use azgraph_core::testing::ScriptedGateway;
//! use serde_json::json;
//!
//! let gateway = Arc::new(ScriptedGateway::new());
//! gateway.on_json(
//!     &commands::list_subscriptions(),
//!     json!([{"id": "s1", "name": "prod"}]),
//! );
//!
//! let collector = Collector::new(CollectorConfig::default(), gateway);
//! let summary = collector.collect().unwrap();
//!
//! assert_eq!(summary.subscriptions.len(), 1);
//! assert!(collector.graph().contains_node("/subscriptions/s1"));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod graph;
pub mod identity;
pub mod linker;
pub mod pipeline;
pub mod principal;
pub mod records;
pub mod scope;

// Re-export commonly used types
pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use gateway::AzCliGateway;
pub use graph::{GraphSnapshot, ResourceGraph};
pub use linker::{CrossReferenceLinker, LinkSummary};
pub use pipeline::{Collector, RunSummary, SubscriptionPipeline, SubscriptionSummary};
pub use principal::PrincipalNameResolver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
