//! Shared types for azgraph

pub mod node;
pub mod relationship;
pub mod resource_id;

// Re-export commonly used types
pub use node::{NodeKind, DEFAULT_NODE_COLOR, KEY_VAULT_TYPE, TRACKED_RESOURCE_TYPES, USER_ASSIGNED_IDENTITY_TYPE};
pub use relationship::{AccessCategory, Relationship, DEFAULT_EDGE_COLOR};
pub use resource_id::{resource_group_scope, subscription_scope, ResourceId};
