// src/graph/vertex.rs

//! Built vertices and input resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::component::{Component, Outputs, ResolvedInputs, SlotSpec};
use crate::errors::VertexError;
use crate::types::VertexId;

use super::Graph;

/// Canonical binding of one input slot, assembled at build time.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A constant from the definition.
    Literal(Value),
    /// Incoming edge indices, in edge declaration order. More than one
    /// entry only occurs under [`FanInPolicy::Collect`](crate::types::FanInPolicy::Collect).
    Edges(Vec<usize>),
}

/// One executable unit in the graph, wrapping a component instance.
///
/// All fields are immutable after build; per-run state (status, outputs)
/// lives in [`RunState`](crate::run::RunState), keyed by `ix`.
pub struct Vertex {
    /// Arena index of this vertex inside the owning graph.
    pub ix: usize,
    pub id: VertexId,
    pub component_type: String,
    pub(crate) component: Arc<dyn Component>,
    /// Canonical input bindings keyed by slot name. Optional slots bound
    /// by neither a literal nor an edge are absent.
    pub bindings: BTreeMap<String, Binding>,
    /// Slot declarations cached from the component at build time.
    pub input_slots: Vec<SlotSpec>,
    pub output_slots: Vec<SlotSpec>,
}

impl std::fmt::Debug for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vertex")
            .field("ix", &self.ix)
            .field("id", &self.id)
            .field("component_type", &self.component_type)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl Vertex {
    /// Component implementation backing this vertex.
    pub fn component(&self) -> Arc<dyn Component> {
        Arc::clone(&self.component)
    }

    /// Resolve every bound input to a concrete value.
    ///
    /// `outputs` is the per-run output store, indexed by arena index and
    /// populated only for vertices that reached `Success`. The scheduler
    /// only calls this for vertices whose every predecessor succeeded, so
    /// a missing upstream value is an invariant violation
    /// ([`VertexError::MissingInput`]), not a user-facing error.
    pub fn resolve_inputs(
        &self,
        graph: &Graph,
        outputs: &[Option<Outputs>],
    ) -> Result<ResolvedInputs, VertexError> {
        let mut resolved = ResolvedInputs::new();

        for (slot, binding) in &self.bindings {
            match binding {
                Binding::Literal(value) => {
                    resolved.insert(slot.clone(), value.clone());
                }
                Binding::Edges(edge_ixs) => {
                    let mut values = Vec::with_capacity(edge_ixs.len());
                    for &eix in edge_ixs {
                        let edge = &graph.edges()[eix];
                        let value = outputs[edge.source]
                            .as_ref()
                            .and_then(|out| out.get(&edge.source_slot))
                            .ok_or_else(|| VertexError::MissingInput {
                                vertex: self.id.clone(),
                                slot: slot.clone(),
                            })?;
                        values.push(value.clone());
                    }

                    // A single edge delivers the bare value; multiple edges
                    // (fan-in collect) deliver an ordered array.
                    let value = if values.len() == 1 {
                        values.remove(0)
                    } else {
                        Value::Array(values)
                    };
                    resolved.insert(slot.clone(), value);
                }
            }
        }

        Ok(resolved)
    }
}
