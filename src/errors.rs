// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Three layers, matching where an error can arise:
//! - [`BuildError`]: the graph definition is not runnable. Fatal at
//!   construction time; nothing executes.
//! - [`VertexError`]: one vertex execution went wrong at run time. The
//!   scheduler decides the run-level consequences.
//! - [`EngineError`]: the umbrella type returned by engine entry points.

use std::time::Duration;

use thiserror::Error;

/// Validation failures detected while building a [`Graph`](crate::graph::Graph).
///
/// All of these are fatal: no partial graph is ever returned.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("graph definition contains no vertices")]
    EmptyGraph,

    #[error("duplicate vertex id '{id}'")]
    DuplicateVertex { id: String },

    #[error("vertex '{vertex}' references unknown component type '{component_type}'")]
    UnknownComponent {
        vertex: String,
        component_type: String,
    },

    #[error("cycle detected in graph: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error(
        "edge {source}[{source_slot}] -> {target}[{target_slot}] references a missing {what}"
    )]
    DanglingEdge {
        r#source: String,
        source_slot: String,
        target: String,
        target_slot: String,
        /// What exactly is missing: a vertex id or a slot name.
        what: String,
    },

    #[error(
        "edge {source}[{source_slot}] -> {target}[{target_slot}] connects incompatible slot types ({source_type} -> {target_type})"
    )]
    SlotTypeMismatch {
        r#source: String,
        source_slot: String,
        target: String,
        target_slot: String,
        source_type: String,
        target_type: String,
    },

    #[error("vertex '{vertex}' binds unknown input slot '{slot}'")]
    UnknownInputSlot { vertex: String, slot: String },

    #[error("required input '{slot}' of vertex '{vertex}' has no literal value and no incoming edge")]
    UnresolvedInput { vertex: String, slot: String },

    #[error("input '{slot}' of vertex '{vertex}' has both a literal value and an incoming edge")]
    InputConflict { vertex: String, slot: String },

    #[error(
        "input '{slot}' of vertex '{vertex}' has more than one incoming edge (fan-in policy is 'reject')"
    )]
    MultipleInputEdges { vertex: String, slot: String },
}

/// Runtime failure of a single vertex execution.
#[derive(Error, Debug)]
pub enum VertexError {
    /// The wrapped component raised or returned an error.
    #[error("vertex '{vertex}' failed: {source}")]
    Execution {
        vertex: String,
        #[source]
        source: anyhow::Error,
    },

    /// The vertex execution exceeded its configured deadline.
    #[error("vertex '{vertex}' timed out after {timeout:?}")]
    Timeout { vertex: String, timeout: Duration },

    /// Input resolution was attempted before every predecessor reached
    /// `Success`. The scheduler only dispatches ready vertices, so seeing
    /// this means a programming defect, not a user-facing condition.
    #[error("invariant violation: input '{slot}' of vertex '{vertex}' has no resolved upstream value")]
    MissingInput { vertex: String, slot: String },
}

/// Umbrella error for engine entry points.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("internal engine error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
