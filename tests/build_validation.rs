// tests/build_validation.rs

//! Build-time validation: every structural problem is fatal before any
//! execution starts, and a valid definition produces the expected
//! topology.

use std::sync::Arc;

use serde_json::json;

use flowdag::errors::BuildError;
use flowdag::types::{FanInPolicy, GraphConfig};
use flowdag::{ComponentRegistry, Graph};
use flowdag_test_utils::builders::{GraphSpecBuilder, VertexSpecBuilder};
use flowdag_test_utils::components::{
    ConcatComponent, JoinComponent, RelayComponent, SourceComponent,
};

fn registry() -> ComponentRegistry {
    ComponentRegistry::new()
        .with("source", Arc::new(SourceComponent::new(json!("ping"))))
        .with("relay", Arc::new(RelayComponent::new()))
        .with("join", Arc::new(JoinComponent))
        .with("concat", Arc::new(ConcatComponent))
}

#[test]
fn empty_definition_is_rejected() {
    let spec = GraphSpecBuilder::new().build();
    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(matches!(err, BuildError::EmptyGraph));
}

#[test]
fn duplicate_vertex_id_is_rejected() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateVertex { id } if id == "A"));
}

#[test]
fn unknown_component_type_is_rejected() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "warp-drive").build())
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(
        matches!(err, BuildError::UnknownComponent { vertex, component_type }
            if vertex == "A" && component_type == "warp-drive")
    );
}

#[test]
fn self_loop_is_a_cycle() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "relay").build())
        .with_edge("A", "value", "A", "input")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    match err {
        BuildError::CycleDetected { cycle } => {
            assert!(cycle.contains(&"A".to_string()));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn two_vertex_cycle_reports_the_sequence() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "relay").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_edge("A", "value", "B", "input")
        .with_edge("B", "value", "A", "input")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    match err {
        BuildError::CycleDetected { cycle } => {
            assert!(cycle.len() >= 3, "cycle sequence too short: {cycle:?}");
            assert_eq!(cycle.first(), cycle.last());
            assert!(cycle.contains(&"A".to_string()));
            assert!(cycle.contains(&"B".to_string()));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn edge_to_missing_vertex_is_dangling() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_edge("A", "value", "X", "input")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    match err {
        BuildError::DanglingEdge { target, what, .. } => {
            assert_eq!(target, "X");
            assert!(what.contains("X"), "what = {what}");
        }
        other => panic!("expected DanglingEdge, got {other:?}"),
    }
}

#[test]
fn edge_from_missing_output_slot_is_dangling() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_edge("A", "bogus", "B", "input")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    match err {
        BuildError::DanglingEdge { what, .. } => {
            assert!(what.contains("bogus"), "what = {what}");
        }
        other => panic!("expected DanglingEdge, got {other:?}"),
    }
}

#[test]
fn unbound_required_input_is_unresolved() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(
        matches!(err, BuildError::UnresolvedInput { vertex, slot }
            if vertex == "B" && slot == "input")
    );
}

#[test]
fn literal_on_unknown_slot_is_rejected() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(
            VertexSpecBuilder::new("A", "source")
                .literal("bogus", json!(1))
                .build(),
        )
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(
        matches!(err, BuildError::UnknownInputSlot { vertex, slot }
            if vertex == "A" && slot == "bogus")
    );
}

#[test]
fn literal_plus_edge_on_one_slot_conflicts() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(
            VertexSpecBuilder::new("B", "relay")
                .literal("input", json!("const"))
                .build(),
        )
        .with_edge("A", "value", "B", "input")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(
        matches!(err, BuildError::InputConflict { vertex, slot }
            if vertex == "B" && slot == "input")
    );
}

#[test]
fn second_edge_into_one_slot_is_rejected_by_default() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "source").build())
        .with_vertex(VertexSpecBuilder::new("C", "relay").build())
        .with_edge("A", "value", "C", "input")
        .with_edge("B", "value", "C", "input")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    assert!(
        matches!(err, BuildError::MultipleInputEdges { vertex, slot }
            if vertex == "C" && slot == "input")
    );
}

#[test]
fn collect_fan_in_permits_multiple_edges() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "source").build())
        .with_vertex(VertexSpecBuilder::new("C", "relay").build())
        .with_edge("A", "value", "C", "input")
        .with_edge("B", "value", "C", "input")
        .build();

    let config = GraphConfig {
        fan_in: FanInPolicy::Collect,
    };
    let graph = Graph::build_with_config(&spec, &registry(), config).unwrap();
    assert_eq!(graph.edges().len(), 2);
    assert_eq!(graph.predecessors_of("C"), vec!["A", "B"]);
}

#[test]
fn incompatible_slot_types_are_rejected() {
    // join emits a list; concat expects text on both inputs.
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "source").build())
        .with_vertex(VertexSpecBuilder::new("J", "join").build())
        .with_vertex(
            VertexSpecBuilder::new("T", "concat")
                .literal("b", json!("suffix"))
                .build(),
        )
        .with_edge("A", "value", "J", "left")
        .with_edge("B", "value", "J", "right")
        .with_edge("J", "value", "T", "a")
        .build();

    let err = Graph::build(&spec, &registry()).unwrap_err();
    match err {
        BuildError::SlotTypeMismatch {
            source,
            target,
            source_type,
            target_type,
            ..
        } => {
            assert_eq!(source, "J");
            assert_eq!(target, "T");
            assert_eq!(source_type, "list");
            assert_eq!(target_type, "text");
        }
        other => panic!("expected SlotTypeMismatch, got {other:?}"),
    }
}

#[test]
fn reference_bindings_are_equivalent_to_edges() {
    let via_edges = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_edge("A", "value", "B", "input")
        .build();

    let via_reference = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(
            VertexSpecBuilder::new("B", "relay")
                .reference("input", "A", "value")
                .build(),
        )
        .build();

    let g1 = Graph::build(&via_edges, &registry()).unwrap();
    let g2 = Graph::build(&via_reference, &registry()).unwrap();

    assert_eq!(g1.edges().len(), 1);
    assert_eq!(g2.edges().len(), 1);
    assert_eq!(g1.predecessors_of("B"), g2.predecessors_of("B"));
}

#[test]
fn duplicate_declarations_of_one_edge_collapse() {
    // The same wiring declared both as an edge and a reference binding.
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(
            VertexSpecBuilder::new("B", "relay")
                .reference("input", "A", "value")
                .build(),
        )
        .with_edge("A", "value", "B", "input")
        .build();

    let graph = Graph::build(&spec, &registry()).unwrap();
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn valid_graph_exposes_ordered_topology() {
    let spec = GraphSpecBuilder::new()
        .with_vertex(VertexSpecBuilder::new("A", "source").build())
        .with_vertex(VertexSpecBuilder::new("B", "relay").build())
        .with_vertex(VertexSpecBuilder::new("C", "relay").build())
        .with_vertex(VertexSpecBuilder::new("D", "join").build())
        .with_edge("A", "value", "B", "input")
        .with_edge("A", "value", "C", "input")
        .with_edge("B", "value", "D", "left")
        .with_edge("C", "value", "D", "right")
        .build();

    let graph = Graph::build(&spec, &registry()).unwrap();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.successors_of("A"), vec!["B", "C"]);
    assert_eq!(graph.predecessors_of("D"), vec!["B", "C"]);
    assert!(graph.predecessors_of("A").is_empty());

    let ready = graph.initial_ready_set();
    assert_eq!(ready.len(), 1);
    assert_eq!(graph.vertex_at(ready[0]).id, "A");
}
