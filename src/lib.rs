// src/lib.rs

//! flowdag — concurrent DAG execution engine for component pipelines.
//!
//! A surrounding system (a visual pipeline editor, a server, a test)
//! supplies a declarative [`GraphSpec`] and a [`ComponentRegistry`];
//! flowdag validates the topology, then runs it with maximal safe
//! parallelism, partial-failure isolation, and a streamed progress event
//! sequence.
//!
//! ```no_run
//! use std::sync::Arc;
//! use flowdag::{ComponentRegistry, Graph, GraphSpec, RunOptions, Scheduler};
//!
//! # async fn example(spec: GraphSpec, registry: ComponentRegistry) -> flowdag::errors::Result<()> {
//! let graph = Arc::new(Graph::build(&spec, &registry)?);
//! let report = Scheduler::new(graph).run(RunOptions::default()).await?;
//! println!("run {} finished: {:?}", report.run_id, report.status);
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod run;
pub mod types;

use std::sync::Arc;

pub use component::{
    Component, ComponentRegistry, ExecutionContext, Outputs, ResolvedInputs, SlotSpec, ValueType,
};
pub use engine::{RunEvent, RunOptions, Scheduler, DEFAULT_CONCURRENCY};
pub use errors::{BuildError, EngineError, VertexError};
pub use graph::{EdgeSpec, Graph, GraphSpec, InputBinding, VertexSpec};
pub use run::{RunReport, RunStatus, VertexReport, VertexState};
pub use types::{FailurePolicy, FanInPolicy, GraphConfig, VertexId};

/// High-level entry point: build the graph and run it once with default
/// configuration.
pub async fn execute(
    spec: &GraphSpec,
    registry: &ComponentRegistry,
    options: RunOptions,
) -> errors::Result<RunReport> {
    let graph = Arc::new(Graph::build(spec, registry)?);
    Scheduler::new(graph).run(options).await
}
