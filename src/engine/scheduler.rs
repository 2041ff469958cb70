// src/engine/scheduler.rs

//! The runnable-vertices manager.
//!
//! One async loop per run: dispatch ready vertices up to the concurrency
//! limit, block on the completion channel, fold each completion into the
//! dependency tracker, dispatch whatever became ready, repeat until the
//! ready queue and the in-flight set are both empty.
//!
//! All mutation of run state (vertex states, outputs, counters, the ready
//! queue) happens inside this loop, so vertex *execution* is parallel
//! while scheduling state needs no locks.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::exec::{run_vertex, VertexCompletion};
use crate::graph::Graph;
use crate::run::{DependencyTracker, RunReport, RunState, RunStatus};
use crate::types::FailurePolicy;

use super::events::{EventSink, RunEvent};
use super::RunOptions;

/// Drives runs of one immutable [`Graph`].
///
/// The scheduler itself is stateless between runs; every `run` call
/// creates fresh per-run state, so one scheduler may serve concurrent
/// runs of the same graph.
#[derive(Debug, Clone)]
pub struct Scheduler {
    graph: Arc<Graph>,
}

impl Scheduler {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Run the graph to completion with no observer and no external
    /// cancellation.
    pub async fn run(&self, options: RunOptions) -> Result<RunReport> {
        self.run_with(options, None, CancellationToken::new()).await
    }

    /// Run the graph to completion.
    ///
    /// `events` receives the ordered progress stream (see
    /// [`RunEvent`]); `cancel` is the run-level cancellation signal,
    /// checked before every dispatch.
    pub async fn run_with(
        &self,
        options: RunOptions,
        events: Option<mpsc::UnboundedSender<RunEvent>>,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        let graph = &self.graph;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let limit = options.concurrency_limit.max(1);

        info!(
            run_id = %run_id,
            vertices = graph.len(),
            concurrency_limit = limit,
            policy = ?options.failure_policy,
            "starting graph run"
        );

        let mut state = RunState::new(graph);
        let mut tracker = DependencyTracker::new(graph);
        let mut events = EventSink::new(events);

        let mut ready: VecDeque<usize> = graph.initial_ready_set().into();
        for &ix in &ready {
            state.mark_ready(ix);
        }

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<VertexCompletion>();
        let mut in_flight: usize = 0;
        let mut cancelled = false;
        // First failure under fail-fast (or an invariant violation):
        // while set, nothing new is dispatched and in-flight work drains.
        let mut abort: Option<usize> = None;

        loop {
            if !cancelled && cancel.is_cancelled() {
                cancelled = true;
                info!(
                    run_id = %run_id,
                    "cancellation observed; no further vertices will be dispatched"
                );
            }

            if !cancelled && abort.is_none() {
                while in_flight < limit {
                    let Some(ix) = ready.pop_front() else {
                        break;
                    };

                    let vertex = graph.vertex_at(ix);
                    match vertex.resolve_inputs(graph, state.outputs_slice()) {
                        Ok(inputs) => {
                            debug!(
                                run_id = %run_id,
                                vertex = %vertex.id,
                                component = %vertex.component_type,
                                "dispatching vertex"
                            );
                            state.mark_running(ix);
                            events.emit(RunEvent::VertexStarted {
                                id: vertex.id.clone(),
                            });
                            in_flight += 1;
                            tokio::spawn(run_vertex(
                                vertex.id.clone(),
                                ix,
                                vertex.component(),
                                inputs,
                                options.vertex_timeout,
                                cancel.child_token(),
                                done_tx.clone(),
                            ));
                        }
                        Err(err) => {
                            // Only dispatched after every predecessor
                            // succeeded, so this is a programming defect,
                            // not a component failure.
                            error!(
                                run_id = %run_id,
                                vertex = %vertex.id,
                                error = %err,
                                "internal invariant violation during input resolution; aborting run"
                            );
                            events.emit(RunEvent::VertexFailed {
                                id: vertex.id.clone(),
                                error: err.to_string(),
                            });
                            state.mark_failed(ix, err, None);
                            abort = Some(ix);
                            break;
                        }
                    }
                }
            }

            if in_flight == 0 {
                break;
            }

            let Some(completion) = done_rx.recv().await else {
                return Err(EngineError::Internal(
                    "completion channel closed with vertex executions in flight".to_string(),
                ));
            };
            in_flight -= 1;

            self.on_completion(
                completion,
                &mut state,
                &mut tracker,
                &mut ready,
                &mut events,
                &mut abort,
                cancelled,
                options.failure_policy,
                run_id,
            );
        }

        let status = self.finalize(&mut state, &mut events, cancelled, abort, run_id);

        events.emit(RunEvent::RunCompleted { status });
        let finished_at = Utc::now();

        info!(
            run_id = %run_id,
            status = ?status,
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "graph run finished"
        );

        Ok(RunReport::from_state(
            graph,
            &state,
            run_id,
            status,
            started_at,
            finished_at,
        ))
    }

    /// Fold one completion into the run state. This is the single point
    /// serializing all writes to shared scheduling state.
    #[allow(clippy::too_many_arguments)]
    fn on_completion(
        &self,
        completion: VertexCompletion,
        state: &mut RunState,
        tracker: &mut DependencyTracker,
        ready: &mut VecDeque<usize>,
        events: &mut EventSink,
        abort: &mut Option<usize>,
        cancelled: bool,
        policy: FailurePolicy,
        run_id: Uuid,
    ) {
        let graph = &self.graph;
        let ix = completion.ix;
        let vertex_id = graph.vertex_at(ix).id.clone();

        match completion.outcome {
            Ok(outputs) => {
                info!(
                    run_id = %run_id,
                    vertex = %vertex_id,
                    "vertex succeeded"
                );
                events.emit(RunEvent::VertexSucceeded {
                    id: vertex_id.clone(),
                    outputs: outputs.clone(),
                });
                state.mark_success(ix, outputs, completion.elapsed);

                // After cancellation or abort the result is recorded but
                // not propagated: no further dependents are dispatched.
                if !cancelled && abort.is_none() {
                    for newly_ready in tracker.on_vertex_succeeded(graph, ix) {
                        state.mark_ready(newly_ready);
                        ready.push_back(newly_ready);
                    }
                }
            }
            Err(err) => {
                warn!(
                    run_id = %run_id,
                    vertex = %vertex_id,
                    error = %err,
                    "vertex failed"
                );
                events.emit(RunEvent::VertexFailed {
                    id: vertex_id.clone(),
                    error: err.to_string(),
                });
                state.mark_failed(ix, err, Some(completion.elapsed));

                if !cancelled {
                    for skipped in tracker.on_vertex_failed(graph, ix) {
                        state.mark_skipped(skipped, ix);
                        events.emit(RunEvent::VertexSkipped {
                            id: graph.vertex_at(skipped).id.clone(),
                            caused_by: vertex_id.clone(),
                        });
                    }

                    if policy == FailurePolicy::FailFast && abort.is_none() {
                        info!(
                            run_id = %run_id,
                            vertex = %vertex_id,
                            "fail-fast policy: draining in-flight work, no new dispatch"
                        );
                        *abort = Some(ix);
                    }
                }
            }
        }
    }

    /// Decide the terminal run status and account for vertices that never
    /// started.
    fn finalize(
        &self,
        state: &mut RunState,
        events: &mut EventSink,
        cancelled: bool,
        abort: Option<usize>,
        run_id: Uuid,
    ) -> RunStatus {
        let graph = &self.graph;

        if cancelled {
            // Not-started vertices keep their Pending/Ready marker.
            return RunStatus::Cancelled;
        }

        if state.any_failed() {
            // Under fail-fast (or an invariant abort), vertices that
            // never started are accounted as skipped, caused by the
            // failure that stopped dispatch. Under best-effort the skip
            // propagation already covered everything.
            if let Some(cause) = abort.or_else(|| state.first_failed()) {
                let caused_by = graph.vertex_at(cause).id.clone();
                for ix in state.non_terminal() {
                    state.mark_skipped(ix, cause);
                    events.emit(RunEvent::VertexSkipped {
                        id: graph.vertex_at(ix).id.clone(),
                        caused_by: caused_by.clone(),
                    });
                }
            }
            return RunStatus::Failed;
        }

        if !state.all_terminal() {
            // Cannot happen on a validated DAG: every vertex either runs
            // or is skipped once its dependencies resolve.
            warn!(
                run_id = %run_id,
                "run drained with non-terminal vertices and no failure"
            );
        }

        RunStatus::Completed
    }
}
