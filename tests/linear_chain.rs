// tests/linear_chain.rs

//! A -> B -> C with no failures: everything succeeds, values flow along
//! the chain, and the event stream arrives in the contractual order.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use flowdag::{
    ComponentRegistry, Graph, GraphSpec, RunEvent, RunOptions, RunStatus, Scheduler, VertexState,
};
use flowdag_test_utils::builders::{GraphSpecBuilder, VertexSpecBuilder};
use flowdag_test_utils::components::{RelayComponent, SourceComponent};
use flowdag_test_utils::{init_tracing, with_timeout};

fn chain_spec() -> GraphSpec {
    GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_vertex(VertexSpecBuilder::new("C", "relay").build())
        .with_edge("A", "value", "B", "input")
        .with_edge("B", "value", "C", "input")
        .build()
}

fn registry() -> ComponentRegistry {
    ComponentRegistry::new()
        .with("source", Arc::new(SourceComponent::new(json!("ping"))))
        .with("relay", Arc::new(RelayComponent::new()))
}

#[tokio::test]
async fn chain_runs_to_completion_in_order() {
    init_tracing();

    let graph = Arc::new(Graph::build(&chain_spec(), &registry()).unwrap());
    let scheduler = Scheduler::new(graph);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<RunEvent>();
    let report = with_timeout(scheduler.run_with(
        RunOptions::default(),
        Some(event_tx),
        CancellationToken::new(),
    ))
    .await
    .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    for id in ["A", "B", "C"] {
        assert_eq!(report.state_of(id), Some(VertexState::Success), "{id}");
    }

    // The source value travels the whole chain.
    let c_outputs = report.vertex("C").unwrap().outputs.as_ref().unwrap();
    assert_eq!(c_outputs.get("value"), Some(&json!("ping")));

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }

    let summary: Vec<String> = events
        .iter()
        .map(|e| match e {
            RunEvent::VertexStarted { id } => format!("started:{id}"),
            RunEvent::VertexSucceeded { id, .. } => format!("succeeded:{id}"),
            RunEvent::VertexFailed { id, .. } => format!("failed:{id}"),
            RunEvent::VertexSkipped { id, .. } => format!("skipped:{id}"),
            RunEvent::RunCompleted { status } => format!("completed:{status:?}"),
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            "started:A",
            "succeeded:A",
            "started:B",
            "succeeded:B",
            "started:C",
            "succeeded:C",
            "completed:Completed",
        ]
    );
}

#[tokio::test]
async fn literal_inputs_reach_the_component() {
    init_tracing();

    let spec = GraphSpecBuilder::new()
        .with_vertex(
            VertexSpecBuilder::new("only", "relay")
                .literal("input", json!({"k": 7}))
                .build(),
        )
        .build();

    let graph = Arc::new(Graph::build(&spec, &registry()).unwrap());
    let report = with_timeout(Scheduler::new(graph).run(RunOptions::default()))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    let outputs = report.vertex("only").unwrap().outputs.as_ref().unwrap();
    assert_eq!(outputs.get("value"), Some(&json!({"k": 7})));
}
