// tests/execute_api.rs

//! The high-level build-and-run entry point.

use std::sync::Arc;

use serde_json::json;

use flowdag::{execute, ComponentRegistry, RunOptions, RunStatus, VertexState};
use flowdag_test_utils::builders::{GraphSpecBuilder, VertexSpecBuilder};
use flowdag_test_utils::components::{RelayComponent, SourceComponent};
use flowdag_test_utils::with_timeout;

#[tokio::test]
async fn execute_builds_and_runs_once() {
    // This binary owns the global subscriber; other test binaries use the
    // test-utils tracing setup.
    flowdag::logging::init_logging().unwrap();

    let registry = ComponentRegistry::new()
        .with("source", Arc::new(SourceComponent::new(json!(42))))
        .with("relay", Arc::new(RelayComponent::new()));

    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_edge("A", "value", "B", "input")
        .build();

    let report = with_timeout(execute(&spec, &registry, RunOptions::default()))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.state_of("B"), Some(VertexState::Success));
    assert_eq!(
        report.vertex("B").unwrap().outputs.as_ref().unwrap().get("value"),
        Some(&json!(42))
    );
}

#[tokio::test]
async fn execute_surfaces_build_errors() {
    let registry = ComponentRegistry::new();

    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "ghost").build())
        .build();

    let err = with_timeout(execute(&spec, &registry, RunOptions::default()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown component type"));
}

#[tokio::test]
async fn graph_definitions_round_trip_through_json() {
    let registry = ComponentRegistry::new()
        .with("source", Arc::new(SourceComponent::new(json!("x"))))
        .with("relay", Arc::new(RelayComponent::new()));

    // A definition as a persistence layer would deliver it.
    let raw = json!({
        "vertices": [
            { "id": "A", "component_type": "source", "inputs": {} },
            { "id": "B", "component_type": "relay",
              "inputs": { "input": { "vertex": "A", "slot": "value" } } }
        ],
        "edges": []
    });

    let spec: flowdag::GraphSpec = serde_json::from_value(raw).unwrap();
    let report = with_timeout(execute(&spec, &registry, RunOptions::default()))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);

    // Reports serialize for the surrounding system's transport.
    let serialized = serde_json::to_value(&report).unwrap();
    assert_eq!(serialized["status"], json!("completed"));
    assert_eq!(serialized["vertices"]["B"]["state"], json!("success"));
}
