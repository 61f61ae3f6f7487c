//! Error types for the collector
//!
//! Only failures that stop a run live here. A single failed cloud query is
//! not an error at this level: it is logged and treated as an empty result.

use thiserror::Error;

/// Collector errors
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The account exposes no subscriptions; nothing to collect
    #[error("No subscriptions found")]
    NoSubscriptions,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Export serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for collector operations
pub type Result<T> = std::result::Result<T, CollectorError>;
