//! Relationship kinds used as edge labels, with their presentation colors

use std::borrow::Cow;

/// Edge color when the caller names none
pub const DEFAULT_EDGE_COLOR: &str = "black";

/// Key Vault access-policy permission category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessCategory {
    Keys,
    Secrets,
    Certificates,
}

impl AccessCategory {
    /// All categories, in the order edges are emitted
    pub const ALL: [AccessCategory; 3] = [
        AccessCategory::Keys,
        AccessCategory::Secrets,
        AccessCategory::Certificates,
    ];

    /// Key of the permission list inside a policy's `permissions` object
    pub fn permission_key(self) -> &'static str {
        match self {
            AccessCategory::Keys => "keys",
            AccessCategory::Secrets => "secrets",
            AccessCategory::Certificates => "certificates",
        }
    }

    /// Edge label for this category
    pub fn label(self) -> &'static str {
        match self {
            AccessCategory::Keys => "Keys",
            AccessCategory::Secrets => "Secrets",
            AccessCategory::Certificates => "Certificates",
        }
    }
}

/// Kind of directed relationship between two graph vertices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    /// Scope containment (subscription → resource group → resource)
    Contains,
    /// Role assignment from a principal to a scope, labeled with the role name
    RoleAssignment(String),
    /// Key Vault access policy from a principal to a vault
    AccessPolicy(AccessCategory),
    /// Resource → its system-assigned identity
    SystemAssignedIdentity,
    /// Resource → a user-assigned identity it uses
    UsesUserAssignedIdentity,
    /// Identity ↔ backing principal
    Linked,
    /// Identity → federated credential
    FederatedCredentials,
}

impl Relationship {
    /// Edge label; part of the edge identity
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            Relationship::Contains => Cow::Borrowed("Contains"),
            Relationship::RoleAssignment(role) => Cow::Borrowed(role.as_str()),
            Relationship::AccessPolicy(category) => Cow::Borrowed(category.label()),
            Relationship::SystemAssignedIdentity => Cow::Borrowed("SystemAssignedMI"),
            Relationship::UsesUserAssignedIdentity => Cow::Borrowed("Uses UAMI"),
            Relationship::Linked => Cow::Borrowed("Linked"),
            Relationship::FederatedCredentials => Cow::Borrowed("Federated Credentials"),
        }
    }

    /// Presentation color for this kind of edge
    ///
    /// Resource-group → resource containment is drawn in the resource's own
    /// color instead; callers pass that explicitly.
    pub fn color(&self) -> &'static str {
        match self {
            Relationship::Contains => "#7f7f7f",
            Relationship::RoleAssignment(_) => "#d62728",
            Relationship::AccessPolicy(_) => "#9edae5",
            Relationship::SystemAssignedIdentity => "#98df8a",
            Relationship::UsesUserAssignedIdentity => "#ff7f0e",
            Relationship::Linked => "blue",
            Relationship::FederatedCredentials => "#9edae5",
        }
    }
}
