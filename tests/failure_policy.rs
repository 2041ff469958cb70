// tests/failure_policy.rs

//! Fail-fast vs best-effort: what keeps running after the first failure,
//! and how the final report accounts for every vertex.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use flowdag::types::FailurePolicy;
use flowdag::{ComponentRegistry, Graph, GraphSpec, RunOptions, RunStatus, Scheduler, VertexState};
use flowdag_test_utils::builders::{GraphSpecBuilder, VertexSpecBuilder};
use flowdag_test_utils::components::{FailingComponent, RelayComponent, SourceComponent};
use flowdag_test_utils::{init_tracing, with_timeout};

/// A -> B (fails instantly), A -> C (slow) -> E; B -> D.
///
/// With a concurrency limit of 2, B and C are both in flight when B
/// fails: D is skipped either way, while C/E distinguish the policies.
fn branching_spec() -> GraphSpec {
    GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "broken").build())
        .with_vertex(VertexSpecBuilder::new("C", "slow").build())
        .with_vertex(VertexSpecBuilder::new("D", "relay").build())
        .with_vertex(VertexSpecBuilder::new("E", "relay").build())
        .with_edge("A", "value", "B", "input")
        .with_edge("A", "value", "C", "input")
        .with_edge("B", "value", "D", "input")
        .with_edge("C", "value", "E", "input")
        .build()
}

fn registry() -> ComponentRegistry {
    ComponentRegistry::new()
        .with("source", Arc::new(SourceComponent::new(json!("seed"))))
        .with("broken", Arc::new(FailingComponent::new("boom")))
        .with(
            "slow",
            Arc::new(RelayComponent::new().with_delay(Duration::from_millis(50))),
        )
        .with("relay", Arc::new(RelayComponent::new()))
}

#[tokio::test]
async fn fail_fast_stops_dispatch_and_accounts_for_everything() {
    init_tracing();

    let graph = Arc::new(Graph::build(&branching_spec(), &registry()).unwrap());
    let report = with_timeout(
        Scheduler::new(graph).run(
            RunOptions::default()
                .with_concurrency(2)
                .with_failure_policy(FailurePolicy::FailFast),
        ),
    )
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.state_of("A"), Some(VertexState::Success));
    assert_eq!(report.state_of("B"), Some(VertexState::Failed));
    // C was already in flight; it drains to success.
    assert_eq!(report.state_of("C"), Some(VertexState::Success));
    // D depends on the failure, E was never dispatched: both skipped.
    assert_eq!(report.state_of("D"), Some(VertexState::Skipped));
    assert_eq!(report.state_of("E"), Some(VertexState::Skipped));

    assert_eq!(
        report.vertex("D").unwrap().skipped_due_to.as_deref(),
        Some("B")
    );
    assert_eq!(
        report.vertex("E").unwrap().skipped_due_to.as_deref(),
        Some("B")
    );

    // Every vertex is accounted for; nothing is left pending.
    assert!(report
        .vertices
        .values()
        .all(|v| v.state.is_terminal()));
}

#[tokio::test]
async fn best_effort_finishes_independent_branches() {
    init_tracing();

    let graph = Arc::new(Graph::build(&branching_spec(), &registry()).unwrap());
    let report = with_timeout(
        Scheduler::new(graph).run(
            RunOptions::default()
                .with_concurrency(2)
                .with_failure_policy(FailurePolicy::BestEffort),
        ),
    )
    .await
    .unwrap();

    // Still a failed run overall, but the independent branch ran fully.
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.state_of("B"), Some(VertexState::Failed));
    assert_eq!(report.state_of("C"), Some(VertexState::Success));
    assert_eq!(report.state_of("E"), Some(VertexState::Success));
    assert_eq!(report.state_of("D"), Some(VertexState::Skipped));
}

#[tokio::test]
async fn best_effort_with_no_failures_completes() {
    init_tracing();

    let registry = ComponentRegistry::new()
        .with("source", Arc::new(SourceComponent::new(json!(1))))
        .with("relay", Arc::new(RelayComponent::new()));

    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_edge("A", "value", "B", "input")
        .build();

    let graph = Arc::new(Graph::build(&spec, &registry).unwrap());
    let report = with_timeout(
        Scheduler::new(graph)
            .run(RunOptions::default().with_failure_policy(FailurePolicy::BestEffort)),
    )
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
}
