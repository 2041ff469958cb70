#![allow(dead_code)]

use serde_json::Value;

use flowdag::graph::{EdgeSpec, GraphSpec, InputBinding, VertexSpec};

/// Builder for `GraphSpec` to simplify test setup.
pub struct GraphSpecBuilder {
    spec: GraphSpec,
}

impl GraphSpecBuilder {
    pub fn new() -> Self {
        Self {
            spec: GraphSpec::default(),
        }
    }

    pub fn with_vertex(mut self, vertex: VertexSpec) -> Self {
        self.spec.vertices.push(vertex);
        self
    }

    pub fn with_edge(
        mut self,
        source: &str,
        source_slot: &str,
        target: &str,
        target_slot: &str,
    ) -> Self {
        self.spec
            .edges
            .push(EdgeSpec::new(source, source_slot, target, target_slot));
        self
    }

    pub fn build(self) -> GraphSpec {
        self.spec
    }
}

impl Default for GraphSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `VertexSpec`.
pub struct VertexSpecBuilder {
    vertex: VertexSpec,
}

impl VertexSpecBuilder {
    pub fn new(id: &str, component_type: &str) -> Self {
        Self {
            vertex: VertexSpec {
                id: id.to_string(),
                component_type: component_type.to_string(),
                inputs: Default::default(),
            },
        }
    }

    /// Bind an input slot to a literal value.
    pub fn literal(mut self, slot: &str, value: Value) -> Self {
        self.vertex
            .inputs
            .insert(slot.to_string(), InputBinding::Literal { literal: value });
        self
    }

    /// Bind an input slot to an upstream vertex's output slot.
    pub fn reference(mut self, slot: &str, vertex: &str, output_slot: &str) -> Self {
        self.vertex.inputs.insert(
            slot.to_string(),
            InputBinding::Reference {
                vertex: vertex.to_string(),
                slot: output_slot.to_string(),
            },
        );
        self
    }

    pub fn build(self) -> VertexSpec {
        self.vertex
    }
}
