// src/graph/spec.rs

//! Declarative graph definition as supplied by the surrounding system
//! (editor, persistence layer — out of scope here).
//!
//! A definition is a list of vertex descriptors plus a list of edge
//! descriptors:
//!
//! ```json
//! {
//!   "vertices": [
//!     { "id": "prompt", "component_type": "template",
//!       "inputs": { "template": { "literal": "Hello {name}" } } },
//!     { "id": "llm", "component_type": "model-call",
//!       "inputs": { "prompt": { "vertex": "prompt", "slot": "text" } } }
//!   ],
//!   "edges": [
//!     { "source": "prompt", "source_slot": "text",
//!       "target": "llm", "target_slot": "prompt" }
//!   ]
//! }
//! ```
//!
//! Reference bindings and edge descriptors are two declaration styles for
//! the same wiring; [`Graph::build`](crate::graph::Graph::build) unifies
//! them into one canonical edge set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::VertexId;

/// Top-level declarative graph definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default)]
    pub vertices: Vec<VertexSpec>,

    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// One vertex descriptor: identity, component type, and input bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexSpec {
    pub id: VertexId,

    /// Identifier resolved through the [`ComponentRegistry`](crate::component::ComponentRegistry).
    pub component_type: String,

    /// Bindings keyed by input slot name. Slots missing from the map may
    /// still be bound by an edge descriptor; required slots bound by
    /// neither fail validation.
    #[serde(default)]
    pub inputs: BTreeMap<String, InputBinding>,
}

/// How one input slot gets its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputBinding {
    /// A constant value embedded in the definition.
    Literal { literal: Value },

    /// The named output slot of an upstream vertex. Equivalent to an edge
    /// descriptor with this vertex/slot as the target.
    Reference { vertex: VertexId, slot: String },
}

/// One edge descriptor: a directed connection from a source output slot
/// to a target input slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: VertexId,
    pub source_slot: String,
    pub target: VertexId,
    pub target_slot: String,
}

impl EdgeSpec {
    pub fn new(source: &str, source_slot: &str, target: &str, target_slot: &str) -> Self {
        Self {
            source: source.to_string(),
            source_slot: source_slot.to_string(),
            target: target.to_string(),
            target_slot: target_slot.to_string(),
        }
    }
}
