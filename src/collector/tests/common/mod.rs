//! Shared fixtures for collector integration tests

#![allow(dead_code)]

use azgraph_collector::gateway::commands;
use azgraph_collector::{Collector, CollectorConfig};
use azgraph_core::testing::ScriptedGateway;
use serde_json::{json, Value};
use std::sync::Arc;

pub const SUB: &str = "s1";
pub const SUB_SCOPE: &str = "/subscriptions/s1";
pub const RG_SCOPE: &str = "/subscriptions/s1/resourceGroups/rg1";

pub fn resource_id(provider_type: &str, name: &str) -> String {
    format!("{}/providers/{}/{}", RG_SCOPE, provider_type, name)
}

/// Gateway with one subscription `s1` named `prod`
pub fn single_subscription() -> Arc<ScriptedGateway> {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.on_json(&commands::list_subscriptions(), json!([{"id": SUB, "name": "prod"}]));
    gateway
}

/// Resource Graph row in `rg1`
pub fn row(provider_type: &str, name: &str, identity: Value) -> Value {
    json!({
        "id": resource_id(provider_type, name),
        "name": name,
        "type": provider_type,
        "resourceGroup": "rg1",
        "subscriptionId": SUB,
        "identity": identity,
    })
}

pub fn role_assignment(principal_id: &str, role: &str) -> Value {
    json!({"principalId": principal_id, "roleDefinitionName": role})
}

/// Collector with default configuration over `gateway`
pub fn collector(gateway: Arc<ScriptedGateway>) -> Collector {
    let config = CollectorConfig {
        max_workers: 2,
        ..CollectorConfig::default()
    };
    Collector::new(config, gateway)
}

/// Edges as `(source, target, label)` triples
pub fn edge_triples(collector: &Collector) -> Vec<(String, String, String)> {
    collector
        .graph()
        .snapshot()
        .edges
        .into_iter()
        .map(|e| (e.source, e.target, e.label))
        .collect()
}

pub fn triple(source: &str, target: &str, label: &str) -> (String, String, String) {
    (source.to_string(), target.to_string(), label.to_string())
}
