// src/graph/graph.rs

use std::collections::HashMap;

use crate::component::ComponentRegistry;
use crate::errors::BuildError;
use crate::types::{FanInPolicy, GraphConfig};

use super::edge::Edge;
use super::spec::GraphSpec;
use super::vertex::Vertex;

/// Immutable topology of a validated graph.
///
/// Vertices and edges live in flat arenas and refer to each other by
/// index, never by ownership pointer. Everything here is read-only after
/// [`build`](Graph::build), so a `Graph` can be shared (`Arc`) across
/// concurrent vertex executions and across concurrent runs; all per-run
/// mutable state lives in [`RunState`](crate::run::RunState).
#[derive(Debug)]
pub struct Graph {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) index: HashMap<String, usize>,
    /// Unique predecessor vertex indices per vertex, in first-edge order.
    pub(crate) preds: Vec<Vec<usize>>,
    /// Unique successor vertex indices per vertex, in first-edge order.
    pub(crate) succs: Vec<Vec<usize>>,
    /// Outgoing edge indices per vertex, in edge declaration order.
    pub(crate) out_edges: Vec<Vec<usize>>,
    /// Incoming edge count per vertex. This is the initial value of the
    /// per-run pending-dependency counter: one per edge, not one per
    /// predecessor.
    pub(crate) in_degree: Vec<usize>,
    pub(crate) fan_in: FanInPolicy,
}

impl Graph {
    /// Build and validate a graph with the default configuration.
    pub fn build(spec: &GraphSpec, registry: &ComponentRegistry) -> Result<Self, BuildError> {
        Self::build_with_config(spec, registry, GraphConfig::default())
    }

    /// Build and validate a graph.
    ///
    /// Fails with the first [`BuildError`] encountered; no partial graph
    /// is ever returned. Validation covers vertex identity, component
    /// resolution, edge endpoints and slot compatibility, input binding
    /// completeness, and acyclicity.
    pub fn build_with_config(
        spec: &GraphSpec,
        registry: &ComponentRegistry,
        config: GraphConfig,
    ) -> Result<Self, BuildError> {
        super::validate::build_graph(spec, registry, config)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn fan_in(&self) -> FanInPolicy {
        self.fan_in
    }

    /// All vertices, in declaration order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All canonical edges, in declaration order (declared edges first,
    /// then edges derived from reference bindings).
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Vertex ids in declaration order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|v| v.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.index_of(id).map(|ix| &self.vertices[ix])
    }

    pub fn vertex_at(&self, ix: usize) -> &Vertex {
        &self.vertices[ix]
    }

    /// Arena indices of vertices with zero unresolved predecessor
    /// dependencies, in declaration order. These are the vertices a fresh
    /// run dispatches first.
    pub fn initial_ready_set(&self) -> Vec<usize> {
        (0..self.vertices.len())
            .filter(|&ix| self.in_degree[ix] == 0)
            .collect()
    }

    /// Ids of the immediate predecessors of `id`, in first-edge order.
    pub fn predecessors_of(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|ix| {
                self.preds[ix]
                    .iter()
                    .map(|&p| self.vertices[p].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of the immediate successors of `id`, in first-edge order.
    pub fn successors_of(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|ix| {
                self.succs[ix]
                    .iter()
                    .map(|&s| self.vertices[s].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn succs_ix(&self, ix: usize) -> &[usize] {
        &self.succs[ix]
    }

    pub(crate) fn out_edges_ix(&self, ix: usize) -> &[usize] {
        &self.out_edges[ix]
    }

    pub(crate) fn in_degree_of(&self, ix: usize) -> usize {
        self.in_degree[ix]
    }
}
