//! Unified error types for azgraph
//!
//! Errors here are the ones that can actually stop something. Fetch failures
//! from the gateway never reach this type: they degrade to empty results.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type shared by the collector crates
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A resource ID did not have the expected segment layout
    #[error("Invalid resource ID: {0}")]
    InvalidResourceId(String),
}

impl CoreError {
    /// Create an invalid resource ID error
    pub fn invalid_resource_id<S: Into<String>>(id: S) -> Self {
        CoreError::InvalidResourceId(id.into())
    }
}
