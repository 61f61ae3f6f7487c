//! Scripted Azure account fixtures for end-to-end runs

use azgraph_collector::gateway::commands;
use azgraph_core::testing::ScriptedGateway;
use azgraph_core::types::{resource_group_scope, subscription_scope};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Resource ID of `name` of `resource_type` in `sub`/`rg`
pub fn resource_id(sub: &str, rg: &str, resource_type: &str, name: &str) -> String {
    format!("{}/providers/{}/{}", resource_group_scope(sub, rg), resource_type, name)
}

/// Resource Graph row
pub fn resource_row(sub: &str, rg: &str, resource_type: &str, name: &str, identity: Value) -> Value {
    json!({
        "id": resource_id(sub, rg, resource_type, name),
        "name": name,
        "type": resource_type,
        "resourceGroup": rg,
        "subscriptionId": sub,
        "identity": identity,
    })
}

/// Builder over a [`ScriptedGateway`] that speaks in Azure terms
#[derive(Default)]
pub struct AccountFixture {
    gateway: Arc<ScriptedGateway>,
}

impl AccountFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriptions(&self, subscriptions: &[(&str, &str)]) -> &Self {
        let records: Vec<Value> = subscriptions
            .iter()
            .map(|(id, name)| json!({"id": id, "name": name, "state": "Enabled"}))
            .collect();
        self.gateway.on_json(&commands::list_subscriptions(), Value::Array(records));
        self
    }

    /// Resource Graph listing of one subscription, wrapped in a `data` envelope
    pub fn resources(&self, sub: &str, rows: Vec<Value>) -> &Self {
        let count = rows.len();
        self.gateway.on_json(
            &commands::list_resources(sub),
            json!({"count": count, "data": rows}),
        );
        self
    }

    pub fn role_assignments(&self, scope: &str, assignments: &[(&str, &str)]) -> &Self {
        let records: Vec<Value> = assignments
            .iter()
            .map(|(principal, role)| {
                json!({"principalId": principal, "roleDefinitionName": role, "scope": scope})
            })
            .collect();
        self.gateway
            .on_json(&commands::list_role_assignments(scope), Value::Array(records));
        self
    }

    pub fn subscription_roles(&self, sub: &str, assignments: &[(&str, &str)]) -> &Self {
        self.role_assignments(&subscription_scope(sub), assignments)
    }

    pub fn user(&self, id: &str, name: &str) -> &Self {
        self.gateway.on_text(&commands::user_display_name(id), name);
        self
    }

    pub fn service_principal(&self, id: &str, name: &str) -> &Self {
        self.gateway
            .on_text(&commands::service_principal_display_name(id), name);
        self
    }

    pub fn backing_principal(&self, identity_id: &str, principal_id: &str) -> &Self {
        self.gateway
            .on_text(&commands::identity_principal_id(identity_id), principal_id);
        self
    }

    pub fn federated_credentials(&self, sub: &str, rg: &str, identity_name: &str, names: &[&str]) -> &Self {
        let records: Vec<Value> = names
            .iter()
            .map(|name| json!({"name": name, "issuer": "https://token.actions.githubusercontent.com"}))
            .collect();
        self.gateway.on_json(
            &commands::list_federated_credentials(sub, rg, identity_name),
            Value::Array(records),
        );
        self
    }

    pub fn vault_policies(&self, sub: &str, rg: &str, vault: &str, policies: Value) -> &Self {
        self.gateway
            .on_json(&commands::key_vault_access_policies(sub, rg, vault), policies);
        self
    }

    pub fn gateway(&self) -> Arc<ScriptedGateway> {
        Arc::clone(&self.gateway)
    }
}

/// Node IDs and edge triples of an exported graph, order-insensitive
pub fn graph_shape(export: &Value) -> (BTreeSet<String>, BTreeSet<(String, String, String)>) {
    let text = |v: &Value, key: &str| v[key].as_str().unwrap_or_default().to_string();

    let nodes: BTreeSet<String> = export["nodes"]
        .as_array()
        .map(|nodes| nodes.iter().map(|n| text(n, "id")).collect())
        .unwrap_or_default();
    let edges: BTreeSet<(String, String, String)> = export["edges"]
        .as_array()
        .map(|edges| {
            edges
                .iter()
                .map(|e| (text(e, "source"), text(e, "target"), text(e, "label")))
                .collect()
        })
        .unwrap_or_default();

    (nodes, edges)
}
