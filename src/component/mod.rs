// src/component/mod.rs

//! The component contract.
//!
//! The engine treats a component as an opaque unit of work: a set of
//! declared input/output slots plus an async `execute`. What the component
//! actually does (a model call, a vector search, a transform) is invisible
//! here; implementations live in the surrounding system's catalog and are
//! handed to the engine through a [`ComponentRegistry`].

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::types::VertexId;

pub mod registry;

pub use registry::ComponentRegistry;

/// Named values produced by a component, keyed by output slot name.
pub type Outputs = BTreeMap<String, Value>;

/// Named values handed to a component, keyed by input slot name.
pub type ResolvedInputs = BTreeMap<String, Value>;

/// Coarse value classification used as edge compatibility metadata.
///
/// `Any` is compatible with every type; otherwise types must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Any,
    Text,
    Number,
    Bool,
    Object,
    List,
}

impl ValueType {
    /// Whether a value of type `self` may flow into a slot of type `other`.
    pub fn is_compatible_with(self, other: ValueType) -> bool {
        self == ValueType::Any || other == ValueType::Any || self == other
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Any => "any",
            ValueType::Text => "text",
            ValueType::Number => "number",
            ValueType::Bool => "bool",
            ValueType::Object => "object",
            ValueType::List => "list",
        };
        f.write_str(s)
    }
}

/// Declaration of one input or output slot of a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSpec {
    pub name: String,
    pub value_type: ValueType,
    /// Only meaningful for input slots: a required slot must be bound by a
    /// literal or an incoming edge before the graph is runnable.
    pub required: bool,
}

impl SlotSpec {
    pub fn required(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            required: true,
        }
    }

    pub fn optional(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            required: false,
        }
    }
}

/// Everything a component receives for one execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Id of the vertex being executed, for diagnostics.
    pub vertex: VertexId,
    /// Resolved input values, keyed by input slot name. Optional slots
    /// with no binding are absent from the map.
    pub inputs: ResolvedInputs,
    /// Cooperative cancellation signal. The engine never interrupts a
    /// running execution; a component that wants to abort early should
    /// select on this token.
    pub cancel: CancellationToken,
}

/// The polymorphic capability every component type implements.
///
/// `execute` is invoked exactly once per vertex per run, only after every
/// input reference resolved from a successful upstream. Errors must be
/// returned, never swallowed; the engine wraps them with vertex context.
pub trait Component: Send + Sync {
    /// Declared input slots, used at build time to validate bindings and
    /// edge compatibility.
    fn input_slots(&self) -> Vec<SlotSpec>;

    /// Declared output slots.
    fn output_slots(&self) -> Vec<SlotSpec>;

    /// Perform the unit of work. May suspend on arbitrary external I/O.
    fn execute(
        &self,
        ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>>;
}
