//! Node type vocabulary and the color table derived from it

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Color used for any node type missing from the table
pub const DEFAULT_NODE_COLOR: &str = "#1f77b4";

/// Resource type of a Key Vault
pub const KEY_VAULT_TYPE: &str = "Microsoft.KeyVault/vaults";

/// Resource type of a user-assigned managed identity
pub const USER_ASSIGNED_IDENTITY_TYPE: &str = "Microsoft.ManagedIdentity/userAssignedIdentities";

/// Resource types expanded by default, with their node colors
const RESOURCE_COLORS: &[(&str, &str)] = &[
    ("Microsoft.Compute/virtualMachines", "#1f77b4"),
    ("Microsoft.Compute/virtualMachineScaleSets", "#aec7e8"),
    ("Microsoft.Storage/storageAccounts", "#2ca02c"),
    (KEY_VAULT_TYPE, "#9467bd"),
    ("Microsoft.Web/sites", "#e377c2"),
    (USER_ASSIGNED_IDENTITY_TYPE, "#ff7f0e"),
    ("Microsoft.ContainerService/managedClusters", "#17becf"),
    ("Microsoft.Automation/automationAccounts", "#8c564b"),
];

/// Default allow-list of resource types that get full expansion
pub const TRACKED_RESOURCE_TYPES: &[&str] = &[
    "Microsoft.Compute/virtualMachines",
    "Microsoft.Compute/virtualMachineScaleSets",
    "Microsoft.Storage/storageAccounts",
    KEY_VAULT_TYPE,
    "Microsoft.Web/sites",
    USER_ASSIGNED_IDENTITY_TYPE,
    "Microsoft.ContainerService/managedClusters",
    "Microsoft.Automation/automationAccounts",
];

/// Type of a graph vertex
///
/// Fixed kinds cover the synthesized vertices (scopes, identities, principals,
/// credentials). Every other vertex is a cloud resource and carries its
/// resource-type string, canonicalized against the color table when known.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Subscription,
    ResourceGroup,
    SystemAssignedManagedIdentity,
    UserAssignedManagedIdentity,
    Principal,
    FederatedCredential,
    /// Cloud resource, e.g. `Microsoft.Compute/virtualMachines`
    Resource(String),
}

impl NodeKind {
    /// Build a resource kind, adopting the table spelling when the type is
    /// known under a different casing
    pub fn resource(resource_type: &str) -> Self {
        let canonical = RESOURCE_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(resource_type))
            .map(|(known, _)| (*known).to_string())
            .unwrap_or_else(|| resource_type.to_string());
        NodeKind::Resource(canonical)
    }

    /// Parse the serialized form back into a kind
    pub fn parse(s: &str) -> Self {
        match s {
            "Subscription" => NodeKind::Subscription,
            "ResourceGroup" => NodeKind::ResourceGroup,
            "SystemAssignedManagedIdentity" => NodeKind::SystemAssignedManagedIdentity,
            "UserAssignedManagedIdentity" => NodeKind::UserAssignedManagedIdentity,
            "Principal" => NodeKind::Principal,
            "FederatedCredential" => NodeKind::FederatedCredential,
            other => NodeKind::resource(other),
        }
    }

    /// Serialized type string
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Subscription => "Subscription",
            NodeKind::ResourceGroup => "ResourceGroup",
            NodeKind::SystemAssignedManagedIdentity => "SystemAssignedManagedIdentity",
            NodeKind::UserAssignedManagedIdentity => "UserAssignedManagedIdentity",
            NodeKind::Principal => "Principal",
            NodeKind::FederatedCredential => "FederatedCredential",
            NodeKind::Resource(resource_type) => resource_type,
        }
    }

    /// Color from the fixed lookup table, or [`DEFAULT_NODE_COLOR`]
    pub fn default_color(&self) -> &'static str {
        match self {
            NodeKind::Subscription => "#bcbd22",
            NodeKind::ResourceGroup => "#7f7f7f",
            NodeKind::SystemAssignedManagedIdentity => "#98df8a",
            NodeKind::UserAssignedManagedIdentity => "#ff7f0e",
            NodeKind::Principal => "#d62728",
            NodeKind::FederatedCredential => "#9edae5",
            NodeKind::Resource(resource_type) => RESOURCE_COLORS
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(resource_type))
                .map(|(_, color)| *color)
                .unwrap_or(DEFAULT_NODE_COLOR),
        }
    }

    /// True for identity nodes and for user-assigned identity resources
    pub fn is_user_assigned_identity(&self) -> bool {
        match self {
            NodeKind::UserAssignedManagedIdentity => true,
            NodeKind::Resource(resource_type) => {
                resource_type.eq_ignore_ascii_case(USER_ASSIGNED_IDENTITY_TYPE)
            }
            _ => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeKind::parse(&s))
    }
}
