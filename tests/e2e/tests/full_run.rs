//! End-to-end collection over a two-subscription account
//!
//! Runs the whole collector (listing, concurrent pipelines, linker, export)
//! against a scripted account and checks the exported graph.

use azgraph_collector::gateway::commands;
use azgraph_collector::{Collector, CollectorConfig, CollectorError};
use azgraph_e2e_tests::{graph_shape, resource_id, resource_row, AccountFixture};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;
use tracing_test::traced_test;

const PROD: &str = "s-prod";
const DEV: &str = "s-dev";

const WEB: &str = "Microsoft.Web/sites";
const VAULT: &str = "Microsoft.KeyVault/vaults";
const UAMI: &str = "Microsoft.ManagedIdentity/userAssignedIdentities";
const VM: &str = "Microsoft.Compute/virtualMachines";
const STORAGE: &str = "Microsoft.Storage/storageAccounts";
const SQL: &str = "Microsoft.Sql/servers";

fn account() -> AccountFixture {
    let fixture = AccountFixture::new();
    let deployer = resource_id(PROD, "identity", UAMI, "deployer");

    fixture
        .subscriptions(&[(PROD, "prod"), (DEV, "dev")])
        .resources(
            PROD,
            vec![
                resource_row(
                    PROD,
                    "apps",
                    WEB,
                    "portal",
                    json!({
                        "type": "SystemAssigned, UserAssigned",
                        "principalId": "portal-p",
                        "userAssignedIdentities": {deployer.clone(): {"principalId": "deployer-p"}}
                    }),
                ),
                resource_row(PROD, "identity", UAMI, "deployer", Value::Null),
                resource_row(PROD, "apps", VAULT, "kv-apps", Value::Null),
            ],
        )
        .resources(
            DEV,
            vec![
                resource_row(DEV, "dev", VM, "devbox", json!({"type": "SystemAssigned", "principalId": "devbox-p"})),
                resource_row(DEV, "dev", STORAGE, "devstore", Value::Null),
                resource_row(DEV, "dev", SQL, "devsql", Value::Null),
            ],
        )
        .subscription_roles(PROD, &[("alice-u", "Owner")])
        .subscription_roles(DEV, &[("alice-u", "Reader")])
        .role_assignments("/subscriptions/s-prod/resourceGroups/apps", &[("deployer-p", "Contributor")])
        .user("alice-u", "alice")
        .service_principal("deployer-p", "deployer")
        .backing_principal(&deployer, "deployer-p")
        .federated_credentials(PROD, "identity", "deployer", &["cred1", "cred2"])
        .vault_policies(
            PROD,
            "apps",
            "kv-apps",
            json!([
                {"objectId": "deployer-p", "permissions": {"secrets": ["get", "list"]}},
                {"objectId": "alice-u", "permissions": {"keys": ["get"], "certificates": ["get"]}}
            ]),
        );

    fixture
}

fn config(workers: usize) -> CollectorConfig {
    CollectorConfig {
        max_workers: workers,
        ..CollectorConfig::default()
    }
}

fn run_and_export(fixture: &AccountFixture, workers: usize) -> Value {
    let collector = Collector::new(config(workers), fixture.gateway());
    collector.collect().unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.json");
    collector.export(&path).unwrap();

    serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap()
}

#[test]
#[traced_test]
fn test_full_run_exports_expected_graph() {
    let fixture = account();
    let export = run_and_export(&fixture, 4);
    let (nodes, edges) = graph_shape(&export);

    let deployer = resource_id(PROD, "identity", UAMI, "deployer");
    let portal = resource_id(PROD, "apps", WEB, "portal");
    let vault = resource_id(PROD, "apps", VAULT, "kv-apps");
    let devbox = resource_id(DEV, "dev", VM, "devbox");

    for id in [
        "/subscriptions/s-prod",
        "/subscriptions/s-dev",
        "/subscriptions/s-prod/resourceGroups/apps",
        "/subscriptions/s-prod/resourceGroups/identity",
        "/subscriptions/s-dev/resourceGroups/dev",
        portal.as_str(),
        deployer.as_str(),
        vault.as_str(),
        devbox.as_str(),
        "alice-u",
        "deployer-p",
        "portal-p",
        "devbox-p",
    ] {
        assert!(nodes.contains(id), "missing node {}", id);
    }
    assert!(!nodes.contains(&resource_id(DEV, "dev", SQL, "devsql")));

    let has = |s: &str, t: &str, l: &str| edges.contains(&(s.to_string(), t.to_string(), l.to_string()));
    assert!(has("alice-u", "/subscriptions/s-prod", "Owner"));
    assert!(has("alice-u", "/subscriptions/s-dev", "Reader"));
    assert!(has("deployer-p", "/subscriptions/s-prod/resourceGroups/apps", "Contributor"));
    assert!(has(&portal, &deployer, "Uses UAMI"));
    assert!(has(&deployer, "deployer-p", "Linked"));
    assert!(has(&deployer, &format!("{}/federatedCredentials/cred1", deployer), "Federated Credentials"));
    assert!(has(&deployer, &format!("{}/federatedCredentials/cred2", deployer), "Federated Credentials"));
    assert!(has("deployer-p", &vault, "Secrets"));
    assert!(has("alice-u", &vault, "Keys"));
    assert!(has("alice-u", &vault, "Certificates"));
    assert!(!has("alice-u", &vault, "Secrets"));
    assert!(has(&devbox, &format!("{}/systemAssignedIdentity", devbox), "SystemAssignedMI"));

    // Export lists every node and edge once
    assert_eq!(export["nodes"].as_array().unwrap().len(), nodes.len());
    assert_eq!(export["edges"].as_array().unwrap().len(), edges.len());

    let deployer_node = export["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == deployer.as_str())
        .unwrap();
    assert_eq!(deployer_node["type"], "UserAssignedManagedIdentity");
    assert_eq!(deployer_node["label"], "deployer");

    assert!(logs_contain("Starting collection"));
    assert!(logs_contain("Collection complete"));
}

#[test]
fn test_every_scope_queried_at_most_once() {
    let fixture = account();
    run_and_export(&fixture, 2);

    let gateway = fixture.gateway();
    let calls = gateway.calls();
    let role_queries: Vec<&String> = calls
        .iter()
        .filter(|c| c.starts_with("az role assignment list"))
        .collect();
    let distinct: HashSet<&&String> = role_queries.iter().collect();
    assert_eq!(role_queries.len(), distinct.len());

    // 2 subscriptions + 3 resource groups + 5 tracked resources
    assert_eq!(role_queries.len(), 10);
}

#[test]
fn test_principal_names_are_looked_up_once() {
    let fixture = account();
    let collector = Collector::new(config(1), fixture.gateway());
    collector.collect().unwrap();

    let gateway = fixture.gateway();
    assert_eq!(gateway.call_count(&commands::user_display_name("alice-u")), 1);
    assert_eq!(collector.graph().node("alice-u").unwrap().label, "alice");
    assert_eq!(collector.graph().node("deployer-p").unwrap().label, "deployer");
}

#[test]
fn test_worker_count_does_not_change_the_graph() {
    let fixture_a = account();
    let fixture_b = account();

    let sequential = graph_shape(&run_and_export(&fixture_a, 1));
    let parallel = graph_shape(&run_and_export(&fixture_b, 4));
    assert_eq!(sequential, parallel);
}

#[test]
fn test_batched_and_single_lookups_build_the_same_graph() {
    let batched = {
        let fixture = account();
        let collector = Collector::new(config(2), fixture.gateway());
        collector.collect().unwrap();
        collector.graph().snapshot()
    };
    let single = {
        let fixture = account();
        let mut config = config(2);
        config.principal_lookup.batch = false;
        let collector = Collector::new(config, fixture.gateway());
        collector.collect().unwrap();
        collector.graph().snapshot()
    };

    let labels = |snapshot: &azgraph_collector::GraphSnapshot| {
        snapshot
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.label.clone()))
            .collect::<HashSet<_>>()
    };
    assert_eq!(labels(&batched), labels(&single));
}

#[test]
#[traced_test]
fn test_no_subscriptions_aborts_before_any_pipeline() {
    let fixture = AccountFixture::new();
    let gateway = fixture.gateway();
    let collector = Collector::new(config(2), gateway.clone());

    assert!(matches!(collector.collect(), Err(CollectorError::NoSubscriptions)));
    assert_eq!(gateway.total_calls(), 1);
    assert_eq!(collector.graph().node_count(), 0);
    assert!(!logs_contain("Collection complete"));
}

#[test]
fn test_config_file_drives_the_run() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("azgraph.toml");
    let output = dir.path().join("out.json");
    std::fs::write(
        &config_path,
        format!(
            "max_workers = 1\nresource_types = [\"Microsoft.Web/sites\"]\noutput = {:?}\n\n[principal_lookup]\nbatch = false\n",
            output.display().to_string()
        ),
    )
    .unwrap();

    let config = CollectorConfig::load(&config_path).unwrap();
    config.validate().unwrap();

    let fixture = account();
    let collector = Collector::new(config.clone(), fixture.gateway());
    collector.collect().unwrap();
    collector.export(&config.output).unwrap();

    let export: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let (nodes, _) = graph_shape(&export);

    // Only web sites are expanded
    assert!(nodes.contains(&resource_id(PROD, "apps", WEB, "portal")));
    assert!(!nodes.contains(&resource_id(PROD, "apps", VAULT, "kv-apps")));
    assert!(!nodes.contains(&resource_id(DEV, "dev", VM, "devbox")));
    assert_eq!(fixture.gateway().calls_containing("az ad user list"), 0);
}

#[test]
fn test_gateway_is_shareable_across_collectors() {
    let fixture = account();
    let gateway: Arc<dyn azgraph_core::CommandGateway> = fixture.gateway();
    let first = Collector::new(config(1), Arc::clone(&gateway));
    let second = Collector::new(config(1), gateway);

    first.collect().unwrap();
    second.collect().unwrap();

    let shape = |collector: &Collector| graph_shape(&serde_json::to_value(collector.graph().snapshot()).unwrap());
    assert_eq!(shape(&first), shape(&second));
}
