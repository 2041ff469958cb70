// src/engine/events.rs

//! Progress event stream.
//!
//! The scheduler emits an ordered sequence of events to an optional
//! observer channel. The only contract is ordering: events for a given
//! vertex arrive as Started → (Succeeded | Failed), a skipped vertex gets
//! a single Skipped event, and `RunCompleted` is always last. Transport
//! (SSE, polling, logging) is the observer's concern.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::component::Outputs;
use crate::run::RunStatus;
use crate::types::VertexId;

/// One progress event of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    VertexStarted {
        id: VertexId,
    },
    VertexSucceeded {
        id: VertexId,
        outputs: Outputs,
    },
    VertexFailed {
        id: VertexId,
        error: String,
    },
    VertexSkipped {
        id: VertexId,
        /// The upstream failure that made this vertex unrunnable.
        caused_by: VertexId,
    },
    /// Always the last event of a run.
    RunCompleted {
        status: RunStatus,
    },
}

/// Fire-and-forget wrapper around the observer channel.
///
/// Sends never block the run; a hung-up observer is logged once at debug
/// level and otherwise ignored.
#[derive(Debug)]
pub(crate) struct EventSink {
    tx: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: Option<mpsc::UnboundedSender<RunEvent>>) -> Self {
        Self { tx }
    }

    pub fn emit(&mut self, event: RunEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(event).is_err() {
            debug!("event observer hung up; dropping further run events");
            self.tx = None;
        }
    }
}
