// src/graph/validate.rs

//! Build-time validation pipeline.
//!
//! Turns a declarative [`GraphSpec`] into a runnable [`Graph`], failing
//! with the first structural problem found. Nothing here runs again after
//! a successful build; the scheduler trusts the invariants established
//! below.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::component::{ComponentRegistry, SlotSpec};
use crate::errors::BuildError;
use crate::types::{FanInPolicy, GraphConfig};

use super::edge::Edge;
use super::graph::Graph;
use super::spec::{GraphSpec, InputBinding};
use super::vertex::{Binding, Vertex};

pub(crate) fn build_graph(
    spec: &GraphSpec,
    registry: &ComponentRegistry,
    config: GraphConfig,
) -> Result<Graph, BuildError> {
    ensure_has_vertices(spec)?;

    let (mut vertices, index) = resolve_vertices(spec, registry)?;
    let edges = unify_edges(spec, &index, &vertices)?;
    validate_edge_slots(&vertices, &edges)?;
    assemble_bindings(spec, &mut vertices, &edges, config.fan_in)?;
    validate_acyclic(&vertices, &edges)?;

    let n = vertices.len();
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree: Vec<usize> = vec![0; n];

    for (eix, edge) in edges.iter().enumerate() {
        out_edges[edge.source].push(eix);
        in_degree[edge.target] += 1;
        if !succs[edge.source].contains(&edge.target) {
            succs[edge.source].push(edge.target);
        }
        if !preds[edge.target].contains(&edge.source) {
            preds[edge.target].push(edge.source);
        }
    }

    Ok(Graph {
        vertices,
        edges,
        index,
        preds,
        succs,
        out_edges,
        in_degree,
        fan_in: config.fan_in,
    })
}

fn ensure_has_vertices(spec: &GraphSpec) -> Result<(), BuildError> {
    if spec.vertices.is_empty() {
        return Err(BuildError::EmptyGraph);
    }
    Ok(())
}

/// Check vertex identity and resolve every component type through the
/// registry, caching its slot declarations on the vertex.
fn resolve_vertices(
    spec: &GraphSpec,
    registry: &ComponentRegistry,
) -> Result<(Vec<Vertex>, HashMap<String, usize>), BuildError> {
    let mut vertices = Vec::with_capacity(spec.vertices.len());
    let mut index = HashMap::with_capacity(spec.vertices.len());

    for (ix, vs) in spec.vertices.iter().enumerate() {
        if index.insert(vs.id.clone(), ix).is_some() {
            return Err(BuildError::DuplicateVertex { id: vs.id.clone() });
        }

        let component =
            registry
                .get(&vs.component_type)
                .ok_or_else(|| BuildError::UnknownComponent {
                    vertex: vs.id.clone(),
                    component_type: vs.component_type.clone(),
                })?;

        let input_slots = component.input_slots();
        let output_slots = component.output_slots();

        vertices.push(Vertex {
            ix,
            id: vs.id.clone(),
            component_type: vs.component_type.clone(),
            component,
            bindings: BTreeMap::new(),
            input_slots,
            output_slots,
        });
    }

    Ok((vertices, index))
}

/// Merge declared edge descriptors and reference bindings into one
/// canonical edge set, checking that every endpoint vertex exists.
///
/// Declared edges come first, then edges derived from reference bindings
/// (vertex declaration order, slot name order); exact duplicates collapse.
fn unify_edges(
    spec: &GraphSpec,
    index: &HashMap<String, usize>,
    vertices: &[Vertex],
) -> Result<Vec<Edge>, BuildError> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut seen: HashSet<(usize, String, usize, String)> = HashSet::new();

    let mut push_edge = |source_id: &str,
                         source_slot: &str,
                         target_id: &str,
                         target_slot: &str|
     -> Result<(), BuildError> {
        let dangling = |what: String| BuildError::DanglingEdge {
            source: source_id.to_string(),
            source_slot: source_slot.to_string(),
            target: target_id.to_string(),
            target_slot: target_slot.to_string(),
            what,
        };

        let source = *index
            .get(source_id)
            .ok_or_else(|| dangling(format!("vertex '{source_id}'")))?;
        let target = *index
            .get(target_id)
            .ok_or_else(|| dangling(format!("vertex '{target_id}'")))?;

        let key = (
            source,
            source_slot.to_string(),
            target,
            target_slot.to_string(),
        );
        if seen.insert(key) {
            edges.push(Edge {
                source,
                source_slot: source_slot.to_string(),
                target,
                target_slot: target_slot.to_string(),
                source_id: vertices[source].id.clone(),
                target_id: vertices[target].id.clone(),
            });
        }
        Ok(())
    };

    for es in &spec.edges {
        push_edge(&es.source, &es.source_slot, &es.target, &es.target_slot)?;
    }

    for vs in &spec.vertices {
        for (slot, binding) in &vs.inputs {
            if let InputBinding::Reference { vertex, slot: out } = binding {
                push_edge(vertex, out, &vs.id, slot)?;
            }
        }
    }

    Ok(edges)
}

fn find_slot<'a>(slots: &'a [SlotSpec], name: &str) -> Option<&'a SlotSpec> {
    slots.iter().find(|s| s.name == name)
}

/// Check that every edge references declared slots on both endpoints and
/// that the connected slot types are compatible.
fn validate_edge_slots(vertices: &[Vertex], edges: &[Edge]) -> Result<(), BuildError> {
    for edge in edges {
        let source = &vertices[edge.source];
        let target = &vertices[edge.target];

        let dangling = |what: String| BuildError::DanglingEdge {
            source: edge.source_id.clone(),
            source_slot: edge.source_slot.clone(),
            target: edge.target_id.clone(),
            target_slot: edge.target_slot.clone(),
            what,
        };

        let out_slot = find_slot(&source.output_slots, &edge.source_slot).ok_or_else(|| {
            dangling(format!(
                "output slot '{}' on vertex '{}'",
                edge.source_slot, edge.source_id
            ))
        })?;
        let in_slot = find_slot(&target.input_slots, &edge.target_slot).ok_or_else(|| {
            dangling(format!(
                "input slot '{}' on vertex '{}'",
                edge.target_slot, edge.target_id
            ))
        })?;

        if !out_slot.value_type.is_compatible_with(in_slot.value_type) {
            return Err(BuildError::SlotTypeMismatch {
                source: edge.source_id.clone(),
                source_slot: edge.source_slot.clone(),
                target: edge.target_id.clone(),
                target_slot: edge.target_slot.clone(),
                source_type: out_slot.value_type.to_string(),
                target_type: in_slot.value_type.to_string(),
            });
        }
    }

    Ok(())
}

/// Assemble the canonical per-slot bindings on each vertex and check
/// binding completeness: literal/edge conflicts, fan-in policy, and
/// required inputs left unbound.
fn assemble_bindings(
    spec: &GraphSpec,
    vertices: &mut [Vertex],
    edges: &[Edge],
    fan_in: FanInPolicy,
) -> Result<(), BuildError> {
    // Literal bindings from the vertex descriptors. `resolve_vertices`
    // built the arena in descriptor order, so indices line up.
    for (vix, vs) in spec.vertices.iter().enumerate() {
        for (slot, binding) in &vs.inputs {
            let InputBinding::Literal { literal } = binding else {
                // Reference bindings became edges in `unify_edges`.
                continue;
            };

            let vertex = &mut vertices[vix];

            if find_slot(&vertex.input_slots, slot).is_none() {
                return Err(BuildError::UnknownInputSlot {
                    vertex: vs.id.clone(),
                    slot: slot.clone(),
                });
            }

            vertex
                .bindings
                .insert(slot.clone(), Binding::Literal(literal.clone()));
        }
    }

    // Incoming edges, in declaration order.
    for (eix, edge) in edges.iter().enumerate() {
        let vertex = &mut vertices[edge.target];

        match vertex.bindings.get_mut(&edge.target_slot) {
            None => {
                vertex
                    .bindings
                    .insert(edge.target_slot.clone(), Binding::Edges(vec![eix]));
            }
            Some(Binding::Literal(_)) => {
                return Err(BuildError::InputConflict {
                    vertex: edge.target_id.clone(),
                    slot: edge.target_slot.clone(),
                });
            }
            Some(Binding::Edges(edge_ixs)) => match fan_in {
                FanInPolicy::Reject => {
                    return Err(BuildError::MultipleInputEdges {
                        vertex: edge.target_id.clone(),
                        slot: edge.target_slot.clone(),
                    });
                }
                FanInPolicy::Collect => edge_ixs.push(eix),
            },
        }
    }

    // Required inputs must be bound by now.
    for vertex in vertices.iter() {
        for slot in &vertex.input_slots {
            if slot.required && !vertex.bindings.contains_key(&slot.name) {
                return Err(BuildError::UnresolvedInput {
                    vertex: vertex.id.clone(),
                    slot: slot.name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Reject cyclic definitions, reporting the offending cycle's vertex
/// sequence.
fn validate_acyclic(vertices: &[Vertex], edges: &[Edge]) -> Result<(), BuildError> {
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

    for ix in 0..vertices.len() {
        graph.add_node(ix);
    }
    for edge in edges {
        // A self-loop is the smallest cycle; report it directly with the
        // vertex named twice.
        if edge.source == edge.target {
            let id = vertices[edge.source].id.clone();
            return Err(BuildError::CycleDetected {
                cycle: vec![id.clone(), id],
            });
        }
        graph.add_edge(edge.source, edge.target, ());
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let start = cycle.node_id();
            let mut succs: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
            for edge in edges {
                succs[edge.source].push(edge.target);
            }
            let path = cycle_through(start, &succs);
            Err(BuildError::CycleDetected {
                cycle: path
                    .into_iter()
                    .map(|ix| vertices[ix].id.clone())
                    .collect(),
            })
        }
    }
}

/// Recover a concrete cycle passing through `start` by depth-first
/// traversal with an explicit path stack. `start` is known to be on a
/// cycle, so the search always succeeds.
fn cycle_through(start: usize, succs: &[Vec<usize>]) -> Vec<usize> {
    let mut visited = vec![false; succs.len()];
    let mut path = vec![start];
    visited[start] = true;

    fn dfs(
        current: usize,
        start: usize,
        succs: &[Vec<usize>],
        visited: &mut [bool],
        path: &mut Vec<usize>,
    ) -> bool {
        for &next in &succs[current] {
            if next == start {
                return true;
            }
            if !visited[next] {
                visited[next] = true;
                path.push(next);
                if dfs(next, start, succs, visited, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    if dfs(start, start, succs, &mut visited, &mut path) {
        path.push(start);
    }
    path
}
