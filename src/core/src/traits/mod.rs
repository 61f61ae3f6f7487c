//! Shared traits for azgraph

pub mod gateway;

// Re-export commonly used traits
pub use gateway::{AzCommand, CommandGateway, CommandOutput};
