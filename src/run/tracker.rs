// src/run/tracker.rs

//! Pending-dependency counters and readiness propagation.

use std::collections::VecDeque;

use tracing::debug;

use crate::graph::Graph;

/// Tracks, per vertex, how many incoming edges are not yet satisfied for
/// one run, and computes the readiness / skip deltas when a vertex
/// finishes.
///
/// Purely synchronous and deterministic; the scheduler calls into it only
/// from its serialized completion-handling section.
#[derive(Debug)]
pub struct DependencyTracker {
    /// Remaining unsatisfied incoming edges per vertex. A vertex whose
    /// counter reaches zero (and which is not vetoed) becomes ready.
    pending: Vec<usize>,
    /// Veto marker: a vertex with a failed transitive predecessor can
    /// never become ready, regardless of its remaining counter.
    skipped: Vec<bool>,
}

impl DependencyTracker {
    pub fn new(graph: &Graph) -> Self {
        let n = graph.len();
        Self {
            pending: (0..n).map(|ix| graph.in_degree_of(ix)).collect(),
            skipped: vec![false; n],
        }
    }

    pub fn pending_of(&self, ix: usize) -> usize {
        self.pending[ix]
    }

    pub fn is_vetoed(&self, ix: usize) -> bool {
        self.skipped[ix]
    }

    /// Record that `ix` succeeded and return the vertices that became
    /// ready as a result, in edge declaration order.
    ///
    /// Each outgoing edge decrements its target's counter once, so a
    /// successor wired to this vertex through several edges is
    /// decremented once per satisfied edge, not once per predecessor.
    pub fn on_vertex_succeeded(&mut self, graph: &Graph, ix: usize) -> Vec<usize> {
        let mut newly_ready = Vec::new();

        for &eix in graph.out_edges_ix(ix) {
            let target = graph.edges()[eix].target;
            // Counters start at the exact incoming-edge count and each
            // edge is satisfied at most once per run, so this cannot
            // underflow.
            self.pending[target] -= 1;

            if self.pending[target] == 0 && !self.skipped[target] {
                debug!(
                    vertex = %graph.vertex_at(target).id,
                    "all dependencies satisfied; vertex is ready"
                );
                newly_ready.push(target);
            }
        }

        newly_ready
    }

    /// Record that `ix` failed and return every transitive successor that
    /// must be skipped, in breadth-first order.
    ///
    /// Vertices already vetoed by an earlier failure are not returned
    /// again; each vertex is visited by skip propagation at most once per
    /// run.
    pub fn on_vertex_failed(&mut self, graph: &Graph, ix: usize) -> Vec<usize> {
        let mut queue: VecDeque<usize> = graph.succs_ix(ix).iter().copied().collect();
        let mut to_skip = Vec::new();

        while let Some(v) = queue.pop_front() {
            if self.skipped[v] {
                continue;
            }
            self.skipped[v] = true;
            to_skip.push(v);
            queue.extend(graph.succs_ix(v).iter().copied());
        }

        to_skip
    }
}
