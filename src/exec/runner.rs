// src/exec/runner.rs

//! Individual vertex execution task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::component::{Component, ExecutionContext, ResolvedInputs};
use crate::errors::VertexError;
use crate::types::VertexId;

use super::VertexCompletion;

/// Run a single vertex execution and report the outcome to the scheduler.
///
/// - The component is invoked exactly once; its error (if any) is wrapped
///   with vertex context, never swallowed.
/// - If `timeout` elapses first, the execution counts as failed and the
///   vertex's own cancellation token fires so any in-flight component
///   work can abort cooperatively.
/// - The engine never interrupts a running component on run-level
///   cancellation; the token passed in the context is the component's
///   chance to stop early on its own terms.
pub async fn run_vertex(
    vertex: VertexId,
    ix: usize,
    component: Arc<dyn Component>,
    inputs: ResolvedInputs,
    timeout: Option<Duration>,
    cancel: CancellationToken,
    done_tx: mpsc::UnboundedSender<VertexCompletion>,
) {
    let started = Instant::now();

    let ctx = ExecutionContext {
        vertex: vertex.clone(),
        inputs,
        cancel: cancel.clone(),
    };

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, component.execute(ctx)).await {
            Ok(Ok(outputs)) => Ok(outputs),
            Ok(Err(source)) => Err(VertexError::Execution {
                vertex: vertex.clone(),
                source,
            }),
            Err(_elapsed) => {
                cancel.cancel();
                Err(VertexError::Timeout {
                    vertex: vertex.clone(),
                    timeout: limit,
                })
            }
        },
        None => match component.execute(ctx).await {
            Ok(outputs) => Ok(outputs),
            Err(source) => Err(VertexError::Execution {
                vertex: vertex.clone(),
                source,
            }),
        },
    };

    let elapsed = started.elapsed();

    match &outcome {
        Ok(_) => info!(
            vertex = %vertex,
            elapsed_ms = elapsed.as_millis() as u64,
            "vertex execution finished"
        ),
        Err(err) => warn!(
            vertex = %vertex,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %err,
            "vertex execution failed"
        ),
    }

    if done_tx
        .send(VertexCompletion {
            ix,
            outcome,
            elapsed,
        })
        .is_err()
    {
        debug!(vertex = %vertex, "scheduler hung up; dropping completion");
    }
}
