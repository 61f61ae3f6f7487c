//! Collector configuration loading and validation

use crate::error::{CollectorError, Result};
use crate::principal::DEFAULT_BATCH_SIZE;
use azgraph_core::types::TRACKED_RESOURCE_TYPES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete collector configuration
///
/// Every field has a default, so an empty TOML file is a valid configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Resource types that receive full expansion (RBAC, identities, vault policies)
    pub resource_types: Vec<String>,

    /// Upper bound on concurrently processed subscriptions
    pub max_workers: usize,

    /// Path or name of the Azure CLI binary
    pub az_binary: String,

    /// Where the exported graph is written
    pub output: PathBuf,

    pub principal_lookup: PrincipalLookupSection,
}

/// How principal display names are looked up
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrincipalLookupSection {
    /// Resolve uncached IDs through filtered bulk queries before falling back
    /// to one-by-one lookups
    pub batch: bool,

    /// IDs per bulk query
    pub batch_size: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            resource_types: TRACKED_RESOURCE_TYPES.iter().map(|t| t.to_string()).collect(),
            max_workers: default_max_workers(),
            az_binary: "az".to_string(),
            output: PathBuf::from("output_azure_resource_data.json"),
            principal_lookup: PrincipalLookupSection::default(),
        }
    }
}

impl Default for PrincipalLookupSection {
    fn default() -> Self {
        Self {
            batch: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

fn default_max_workers() -> usize {
    num_cpus::get().max(1)
}

impl CollectorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CollectorConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(CollectorError::Config("max_workers must be at least 1".into()));
        }
        if self.principal_lookup.batch_size == 0 {
            return Err(CollectorError::Config(
                "principal_lookup.batch_size must be at least 1".into(),
            ));
        }
        if self.az_binary.trim().is_empty() {
            return Err(CollectorError::Config("az_binary must not be empty".into()));
        }
        if self.resource_types.is_empty() {
            return Err(CollectorError::Config("resource_types must not be empty".into()));
        }
        Ok(())
    }

    /// Whether a resource type is on the allow-list, ignoring case
    pub fn is_tracked(&self, resource_type: &str) -> bool {
        self.resource_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(resource_type))
    }
}
