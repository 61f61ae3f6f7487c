//! Catalog of Azure CLI queries issued by the collector

use azgraph_core::AzCommand;

/// Resource Graph projection used for the resource listing
pub const RESOURCE_PROJECTION: &str =
    "Resources | project id, name, type, resourceGroup, subscriptionId, identity";

/// `az account list`
pub fn list_subscriptions() -> AzCommand {
    AzCommand::new(["account", "list"]).flag("--output", "json")
}

/// Resource listing for one subscription through Resource Graph
pub fn list_resources(subscription_id: &str) -> AzCommand {
    AzCommand::new(["graph", "query"])
        .flag("-q", RESOURCE_PROJECTION)
        .flag("--subscriptions", subscription_id)
        .flag("--output", "json")
}

/// Role assignments granted at exactly `scope`
pub fn list_role_assignments(scope: &str) -> AzCommand {
    AzCommand::new(["role", "assignment", "list"])
        .flag("--scope", scope)
        .flag("--output", "json")
}

/// Access policies of a Key Vault
pub fn key_vault_access_policies(subscription_id: &str, resource_group: &str, vault_name: &str) -> AzCommand {
    AzCommand::new(["keyvault", "show"])
        .flag("--resource-group", resource_group)
        .flag("--name", vault_name)
        .flag("--subscription", subscription_id)
        .flag("--query", "properties.accessPolicies")
        .flag("--output", "json")
}

/// Federated credentials of a user-assigned identity
pub fn list_federated_credentials(subscription_id: &str, resource_group: &str, identity_name: &str) -> AzCommand {
    AzCommand::new(["identity", "federated-credential", "list"])
        .flag("--identity-name", identity_name)
        .flag("--resource-group", resource_group)
        .flag("--subscription", subscription_id)
        .flag("--output", "json")
}

/// Backing principal of a user-assigned identity
pub fn identity_principal_id(identity_id: &str) -> AzCommand {
    AzCommand::new(["identity", "show"])
        .flag("--ids", identity_id)
        .flag("--query", "principalId")
        .flag("--output", "tsv")
}

/// Display name of a user
pub fn user_display_name(principal_id: &str) -> AzCommand {
    AzCommand::new(["ad", "user", "show"])
        .flag("--id", principal_id)
        .flag("--query", "displayName")
        .flag("--output", "tsv")
}

/// Display name of a service principal
pub fn service_principal_display_name(principal_id: &str) -> AzCommand {
    AzCommand::new(["ad", "sp", "show"])
        .flag("--id", principal_id)
        .flag("--query", "displayName")
        .flag("--output", "tsv")
}

/// Display name of a group
pub fn group_display_name(principal_id: &str) -> AzCommand {
    AzCommand::new(["ad", "group", "show"])
        .flag("--group", principal_id)
        .flag("--query", "displayName")
        .flag("--output", "tsv")
}

fn id_filter(principal_ids: &[String]) -> String {
    let quoted: Vec<String> = principal_ids.iter().map(|id| format!("'{}'", id)).collect();
    format!("id in ({})", quoted.join(","))
}

/// Bulk display-name lookup of users
pub fn bulk_user_names(principal_ids: &[String]) -> AzCommand {
    AzCommand::new(["ad", "user", "list"])
        .flag("--filter", id_filter(principal_ids))
        .flag("--query", "[].{id:id, name:displayName}")
        .flag("--output", "json")
}

/// Bulk display-name lookup of service principals
pub fn bulk_service_principal_names(principal_ids: &[String]) -> AzCommand {
    AzCommand::new(["ad", "sp", "list"])
        .flag("--filter", id_filter(principal_ids))
        .flag("--query", "[].{id:id, name:displayName}")
        .flag("--output", "json")
}
