// src/run/report.rs

//! Final, user-visible accounting of a run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::component::Outputs;
use crate::graph::Graph;
use crate::types::VertexId;

use super::state::{RunState, RunStatus, VertexState};

/// Per-vertex outcome in the final report.
///
/// A finished (`Completed`/`Failed`) run reports every vertex as exactly
/// one of `Success` (with outputs), `Failed` (with error detail), or
/// `Skipped` (with the upstream failure that caused it). A `Cancelled`
/// run may additionally report not-started vertices as `Pending`/`Ready`.
#[derive(Debug, Clone, Serialize)]
pub struct VertexReport {
    pub state: VertexState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Outputs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_due_to: Option<VertexId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Result of one execution attempt of a graph.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outcome per vertex id; covers the full vertex set of the graph.
    pub vertices: BTreeMap<VertexId, VertexReport>,
}

impl RunReport {
    pub(crate) fn from_state(
        graph: &Graph,
        state: &RunState,
        run_id: Uuid,
        status: RunStatus,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut vertices = BTreeMap::new();

        for vertex in graph.vertices() {
            let ix = vertex.ix;
            let report = VertexReport {
                state: state.state_of(ix),
                outputs: state.outputs_of(ix).cloned(),
                error: state.error_of(ix).map(|e| e.to_string()),
                skipped_due_to: state
                    .skip_cause_of(ix)
                    .map(|cause| graph.vertex_at(cause).id.clone()),
                duration_ms: state.duration_of(ix).map(|d| d.as_millis() as u64),
            };
            vertices.insert(vertex.id.clone(), report);
        }

        Self {
            run_id,
            status,
            started_at,
            finished_at,
            vertices,
        }
    }

    pub fn vertex(&self, id: &str) -> Option<&VertexReport> {
        self.vertices.get(id)
    }

    pub fn state_of(&self, id: &str) -> Option<VertexState> {
        self.vertices.get(id).map(|v| v.state)
    }

    /// Ids of vertices that finished in the given state, in id order.
    pub fn vertices_in_state(&self, state: VertexState) -> Vec<&str> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.state == state)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
