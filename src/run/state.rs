// src/run/state.rs

//! Per-run mutable vertex state.
//!
//! A fresh [`RunState`] is created inside every `Scheduler::run`, so
//! concurrent runs against the same immutable [`Graph`](crate::graph::Graph)
//! never share mutable state. All mutation happens from the scheduler's
//! single completion-handling section.

use std::time::Duration;

use serde::Serialize;

use crate::component::Outputs;
use crate::errors::VertexError;
use crate::graph::Graph;

/// Lifecycle state of one vertex within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexState {
    /// Waiting on unresolved predecessor dependencies.
    Pending,
    /// Every input is resolvable; queued for dispatch.
    Ready,
    /// Dispatched; the component is executing.
    Running,
    /// Executed and produced outputs.
    Success,
    /// Execution raised an error or exceeded its deadline.
    Failed,
    /// Can never succeed because a transitive predecessor failed.
    Skipped,
}

impl VertexState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            VertexState::Success | VertexState::Failed | VertexState::Skipped
        )
    }
}

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Mutable per-run state, indexed by vertex arena index.
#[derive(Debug)]
pub struct RunState {
    states: Vec<VertexState>,
    /// Write-once output store; populated only on success.
    outputs: Vec<Option<Outputs>>,
    errors: Vec<Option<VertexError>>,
    /// For skipped vertices: arena index of the upstream failure that
    /// caused the skip.
    skip_cause: Vec<Option<usize>>,
    durations: Vec<Option<Duration>>,
}

impl RunState {
    pub fn new(graph: &Graph) -> Self {
        let n = graph.len();
        Self {
            states: vec![VertexState::Pending; n],
            outputs: vec![None; n],
            errors: (0..n).map(|_| None).collect(),
            skip_cause: vec![None; n],
            durations: vec![None; n],
        }
    }

    pub fn state_of(&self, ix: usize) -> VertexState {
        self.states[ix]
    }

    /// Output store slice for input resolution.
    pub fn outputs_slice(&self) -> &[Option<Outputs>] {
        &self.outputs
    }

    pub fn outputs_of(&self, ix: usize) -> Option<&Outputs> {
        self.outputs[ix].as_ref()
    }

    pub fn error_of(&self, ix: usize) -> Option<&VertexError> {
        self.errors[ix].as_ref()
    }

    pub fn skip_cause_of(&self, ix: usize) -> Option<usize> {
        self.skip_cause[ix]
    }

    pub fn duration_of(&self, ix: usize) -> Option<Duration> {
        self.durations[ix]
    }

    pub fn mark_ready(&mut self, ix: usize) {
        self.states[ix] = VertexState::Ready;
    }

    pub fn mark_running(&mut self, ix: usize) {
        self.states[ix] = VertexState::Running;
    }

    pub fn mark_success(&mut self, ix: usize, outputs: Outputs, duration: Duration) {
        self.states[ix] = VertexState::Success;
        self.outputs[ix] = Some(outputs);
        self.durations[ix] = Some(duration);
    }

    pub fn mark_failed(&mut self, ix: usize, error: VertexError, duration: Option<Duration>) {
        self.states[ix] = VertexState::Failed;
        self.errors[ix] = Some(error);
        self.durations[ix] = duration;
    }

    pub fn mark_skipped(&mut self, ix: usize, caused_by: usize) {
        self.states[ix] = VertexState::Skipped;
        self.skip_cause[ix] = Some(caused_by);
    }

    pub fn any_failed(&self) -> bool {
        self.states.iter().any(|s| *s == VertexState::Failed)
    }

    /// Arena index of the first vertex (in declaration order) that failed.
    pub fn first_failed(&self) -> Option<usize> {
        self.states.iter().position(|s| *s == VertexState::Failed)
    }

    pub fn all_terminal(&self) -> bool {
        self.states.iter().all(|s| s.is_terminal())
    }

    /// Indices of vertices not yet in a terminal state, in declaration
    /// order.
    pub fn non_terminal(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_terminal())
            .map(|(ix, _)| ix)
            .collect()
    }
}
