//! # azgraph Core
//!
//! Shared types, traits, and error handling for the azgraph collector.
//! Holds the node-type vocabulary and its color table, the relationship kinds
//! used as edge labels, Azure resource-ID parsing, and the `CommandGateway`
//! boundary through which every cloud query flows.

pub mod types;
pub mod traits;
pub mod error;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::{AzCommand, CommandGateway, CommandOutput};
pub use types::{NodeKind, Relationship, ResourceId};
