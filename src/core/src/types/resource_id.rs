//! Azure resource-ID parsing
//!
//! Resource IDs look like
//! `/subscriptions/<sub>/resourceGroups/<rg>/providers/<ns>/<type>/<name>`.
//! Commands that take `--name`/`--resource-group` instead of `--ids` need the
//! pieces back out.

use crate::error::{CoreError, Result};
use std::fmt;

/// Scope ID of a subscription
pub fn subscription_scope(subscription_id: &str) -> String {
    format!("/subscriptions/{}", subscription_id)
}

/// Scope ID of a resource group
pub fn resource_group_scope(subscription_id: &str, resource_group: &str) -> String {
    format!("/subscriptions/{}/resourceGroups/{}", subscription_id, resource_group)
}

/// Parsed view over a resource ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    raw: String,
    subscription_id: String,
    resource_group: Option<String>,
    name: String,
}

impl ResourceId {
    /// Parse a resource ID
    ///
    /// # Errors
    ///
    /// Returns `InvalidResourceId` unless the ID starts with
    /// `/subscriptions/<id>`.
    pub fn parse(id: &str) -> Result<Self> {
        let segments: Vec<&str> = id.split('/').collect();

        if segments.len() < 3
            || !segments[0].is_empty()
            || !segments[1].eq_ignore_ascii_case("subscriptions")
            || segments[2].is_empty()
        {
            return Err(CoreError::invalid_resource_id(id));
        }

        let resource_group = match (segments.get(3), segments.get(4)) {
            (Some(marker), Some(rg)) if marker.eq_ignore_ascii_case("resourceGroups") && !rg.is_empty() => {
                Some((*rg).to_string())
            }
            _ => None,
        };

        let name = segments
            .iter()
            .rev()
            .find(|s| !s.is_empty())
            .map(|s| (*s).to_string())
            .unwrap_or_default();

        Ok(Self {
            raw: id.to_string(),
            subscription_id: segments[2].to_string(),
            resource_group,
            name,
        })
    }

    /// The full ID as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Resource group name, if the ID is scoped to one
    pub fn resource_group(&self) -> Option<&str> {
        self.resource_group.as_deref()
    }

    /// Last non-empty segment
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope ID of the enclosing resource group
    pub fn resource_group_scope(&self) -> Option<String> {
        self.resource_group
            .as_deref()
            .map(|rg| resource_group_scope(&self.subscription_id, rg))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
