//! Validated views over gateway records
//!
//! The CLI hands back loosely-typed JSON. Each consumer names the fields it
//! needs through one of these record types; a record without them is rejected
//! with [`RecordError::MissingField`] and skipped by the caller.

use azgraph_core::types::{AccessCategory, ResourceId};
use azgraph_core::CommandOutput;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a record could not be used
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),
}

fn object(value: &Value) -> Result<&serde_json::Map<String, Value>, RecordError> {
    value.as_object().ok_or(RecordError::NotAnObject)
}

fn required_str<'a>(value: &'a Value, key: &'static str) -> Result<&'a str, RecordError> {
    optional_str(value, key).ok_or(RecordError::MissingField(key))
}

fn optional_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Entry of `az account list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub id: String,
    pub name: String,
}

impl TryFrom<&Value> for SubscriptionRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        object(value)?;
        Ok(Self {
            id: required_str(value, "id")?.to_string(),
            name: required_str(value, "name")?.to_string(),
        })
    }
}

/// Entry of `az role assignment list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignmentRecord {
    pub principal_id: String,
    pub role_name: String,
}

impl TryFrom<&Value> for RoleAssignmentRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        object(value)?;
        Ok(Self {
            principal_id: required_str(value, "principalId")?.to_string(),
            role_name: required_str(value, "roleDefinitionName")?.to_string(),
        })
    }
}

/// Key Vault access policy, reduced to the categories it grants anything in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicyRecord {
    pub object_id: String,
    pub categories: BTreeSet<AccessCategory>,
}

impl TryFrom<&Value> for AccessPolicyRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        object(value)?;
        let object_id = required_str(value, "objectId")?.to_string();

        let permissions = value.get("permissions");
        let categories = AccessCategory::ALL
            .into_iter()
            .filter(|category| {
                permissions
                    .and_then(|p| p.get(category.permission_key()))
                    .and_then(Value::as_array)
                    .is_some_and(|verbs| !verbs.is_empty())
            })
            .collect();

        Ok(Self { object_id, categories })
    }
}

/// Name given to a federated credential that reports none
pub const UNNAMED_FEDERATED_CREDENTIAL: &str = "unknownFederatedCred";

/// Entry of `az identity federated-credential list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredentialRecord {
    pub name: String,
}

impl TryFrom<&Value> for FederatedCredentialRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        object(value)?;
        let name = optional_str(value, "name").unwrap_or(UNNAMED_FEDERATED_CREDENTIAL);
        Ok(Self { name: name.to_string() })
    }
}

/// Row of a bulk `az ad ... list --query "[].{id:id, name:displayName}"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalNameRecord {
    pub id: String,
    pub name: String,
}

impl TryFrom<&Value> for PrincipalNameRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        object(value)?;
        Ok(Self {
            id: required_str(value, "id")?.to_string(),
            name: required_str(value, "name")?.to_string(),
        })
    }
}

/// User-assigned identity referenced from another resource's identity block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAssignedReference {
    pub identity_id: String,
    pub principal_id: Option<String>,
}

/// The `identity` block of a resource
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityBlock {
    /// e.g. `SystemAssigned`, `UserAssigned`, `SystemAssigned, UserAssigned`
    pub identity_type: String,
    /// Backing principal of the system-assigned identity
    pub principal_id: Option<String>,
    pub user_assigned: Vec<UserAssignedReference>,
}

impl IdentityBlock {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object()?;

        let user_assigned = value
            .get("userAssignedIdentities")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter(|(id, _)| !id.is_empty())
                    .map(|(id, info)| UserAssignedReference {
                        identity_id: id.clone(),
                        principal_id: optional_str(info, "principalId").map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            identity_type: optional_str(value, "type").unwrap_or_default().to_string(),
            principal_id: optional_str(value, "principalId").map(str::to_string),
            user_assigned,
        })
    }

    pub fn has_system_assigned(&self) -> bool {
        self.identity_type.contains("SystemAssigned")
    }

    pub fn has_user_assigned(&self) -> bool {
        self.identity_type.contains("UserAssigned")
    }
}

/// Row of the resource listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub id: String,
    pub name: String,
    pub resource_type: String,
    /// `resourceGroup` column, when the listing projects it
    pub resource_group: Option<String>,
    pub identity: Option<IdentityBlock>,
}

impl ResourceRecord {
    /// Resource group name from the record, else from the ID itself
    pub fn resource_group_name(&self) -> Option<String> {
        self.resource_group.clone().or_else(|| {
            ResourceId::parse(&self.id)
                .ok()
                .and_then(|id| id.resource_group().map(str::to_string))
        })
    }

    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type.eq_ignore_ascii_case(resource_type)
    }
}

impl TryFrom<&Value> for ResourceRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        object(value)?;
        Ok(Self {
            id: required_str(value, "id")?.to_string(),
            name: required_str(value, "name")?.to_string(),
            resource_type: required_str(value, "type")?.to_string(),
            resource_group: optional_str(value, "resourceGroup").map(str::to_string),
            identity: value.get("identity").and_then(IdentityBlock::from_value),
        })
    }
}

/// Rows of a resource listing
///
/// Resource Graph wraps rows in `{"data": [...]}`; `az resource list` returns
/// a bare array. Both are accepted.
pub fn listing_rows(output: CommandOutput) -> Vec<Value> {
    match output {
        CommandOutput::Json(Value::Array(rows)) => rows,
        CommandOutput::Json(Value::Object(mut envelope)) => match envelope.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Principal ID from `az identity show --query principalId`
///
/// Accepts TSV text, a JSON list whose first element is a string, or an
/// object carrying `principalId`.
pub fn principal_id_from_output(output: &CommandOutput) -> Option<String> {
    if let Some(text) = output.scalar_text() {
        return Some(text);
    }
    match output.json()? {
        Value::Array(items) => items
            .first()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        other @ Value::Object(_) => optional_str(other, "principalId").map(str::to_string),
        _ => None,
    }
}
