//! Property tests over randomly shaped accounts
//!
//! Whatever the account looks like, the exported graph keeps node IDs and
//! edge triples unique and never queries a scope twice.

use azgraph_collector::{Collector, CollectorConfig};
use azgraph_e2e_tests::{graph_shape, resource_row, AccountFixture};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

const TYPES: &[&str] = &[
    "Microsoft.Web/sites",
    "Microsoft.KeyVault/vaults",
    "Microsoft.Compute/virtualMachines",
    "Microsoft.ManagedIdentity/userAssignedIdentities",
    "Microsoft.Sql/servers",
];

const PRINCIPALS: &[&str] = &["alice", "bob", "ci", "ops"];

#[derive(Debug, Clone)]
struct ResourceShape {
    type_index: usize,
    group: usize,
    name: usize,
    system_identity: Option<usize>,
}

fn resource_shape() -> impl Strategy<Value = ResourceShape> {
    (0..TYPES.len(), 0usize..2, 0usize..3, prop::option::of(0..PRINCIPALS.len())).prop_map(
        |(type_index, group, name, system_identity)| ResourceShape {
            type_index,
            group,
            name,
            system_identity,
        },
    )
}

fn account_shape() -> impl Strategy<Value = Vec<(Vec<ResourceShape>, Vec<(usize, usize)>)>> {
    prop::collection::vec(
        (
            prop::collection::vec(resource_shape(), 0..6),
            prop::collection::vec((0..PRINCIPALS.len(), 0usize..3), 0..4),
        ),
        1..4,
    )
}

fn build(layout: &[(Vec<ResourceShape>, Vec<(usize, usize)>)]) -> AccountFixture {
    let fixture = AccountFixture::new();
    let subscriptions: Vec<(String, String)> = (0..layout.len())
        .map(|i| (format!("sub-{}", i), format!("Subscription {}", i)))
        .collect();
    let refs: Vec<(&str, &str)> = subscriptions
        .iter()
        .map(|(id, name)| (id.as_str(), name.as_str()))
        .collect();
    fixture.subscriptions(&refs);

    for (index, (resources, roles)) in layout.iter().enumerate() {
        let sub = format!("sub-{}", index);

        let rows: Vec<Value> = resources
            .iter()
            .map(|r| {
                let identity = match r.system_identity {
                    Some(p) => json!({"type": "SystemAssigned", "principalId": PRINCIPALS[p]}),
                    None => Value::Null,
                };
                resource_row(&sub, &format!("rg{}", r.group), TYPES[r.type_index], &format!("r{}", r.name), identity)
            })
            .collect();
        fixture.resources(&sub, rows);

        let assignments: Vec<(&str, &str)> = roles
            .iter()
            .map(|(p, role)| (PRINCIPALS[*p], ["Owner", "Reader", "Contributor"][*role]))
            .collect();
        fixture.subscription_roles(&sub, &assignments);
    }

    fixture
}

fn run(fixture: &AccountFixture, workers: usize) -> Value {
    let config = CollectorConfig {
        max_workers: workers,
        ..CollectorConfig::default()
    };
    let collector = Collector::new(config, fixture.gateway());
    collector.collect().unwrap();
    serde_json::to_value(collector.graph().snapshot()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_export_has_unique_nodes_and_edges(layout in account_shape()) {
        let fixture = build(&layout);
        let export = run(&fixture, 3);
        let (nodes, edges) = graph_shape(&export);

        prop_assert_eq!(export["nodes"].as_array().unwrap().len(), nodes.len());
        prop_assert_eq!(export["edges"].as_array().unwrap().len(), edges.len());

        // Every subscription shows up
        for index in 0..layout.len() {
            let subscription = format!("/subscriptions/sub-{}", index);
            prop_assert!(nodes.contains(&subscription));
        }
    }

    #[test]
    fn prop_scopes_are_never_queried_twice(layout in account_shape()) {
        let fixture = build(&layout);
        run(&fixture, 2);

        let calls = fixture.gateway().calls();
        let mut seen = HashSet::new();
        for call in calls.iter().filter(|c| c.starts_with("az role assignment list")) {
            prop_assert!(seen.insert(call.clone()), "scope queried twice: {}", call);
        }
    }

    #[test]
    fn prop_worker_count_is_invisible(layout in account_shape()) {
        let sequential = graph_shape(&run(&build(&layout), 1));
        let parallel = graph_shape(&run(&build(&layout), 4));
        prop_assert_eq!(sequential, parallel);
    }
}
