//! Fake components for engine tests.
//!
//! These stand in for real model calls, retrievers, and transforms: they
//! record what ran, emit predictable values, sleep, fail, or cancel the
//! run, so tests can exercise every scheduler path without real work.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use flowdag::component::{Component, ExecutionContext, Outputs, SlotSpec, ValueType};

/// Records which vertices ran, in what order, and how many ran at once.
#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<RecorderInner>,
}

#[derive(Default)]
struct RecorderInner {
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&self, vertex: &str) {
        self.inner
            .started
            .lock()
            .unwrap()
            .push(vertex.to_string());
        let running = self.inner.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_running.fetch_max(running, Ordering::SeqCst);
    }

    fn exit(&self, vertex: &str) {
        self.inner.running.fetch_sub(1, Ordering::SeqCst);
        self.inner
            .finished
            .lock()
            .unwrap()
            .push(vertex.to_string());
    }

    /// Vertex ids in execution start order.
    pub fn started(&self) -> Vec<String> {
        self.inner.started.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.inner.finished.lock().unwrap().clone()
    }

    /// Highest number of simultaneously executing vertices observed.
    pub fn max_concurrent(&self) -> usize {
        self.inner.max_running.load(Ordering::SeqCst)
    }
}

fn value_outputs(value: Value) -> Outputs {
    let mut outputs = BTreeMap::new();
    outputs.insert("value".to_string(), value);
    outputs
}

/// Sleep for `delay` (if any), bailing out early if the vertex's
/// cancellation token fires.
async fn delay_or_cancel(
    delay: Option<Duration>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    if let Some(d) = delay {
        tokio::select! {
            _ = tokio::time::sleep(d) => {}
            _ = cancel.cancelled() => anyhow::bail!("execution cancelled"),
        }
    }
    Ok(())
}

/// Emits a constant on its `value` output. Accepts (and ignores) anything
/// wired to its optional `input` slot, so it can stand in for an
/// arbitrary pipeline node.
pub struct SourceComponent {
    value: Value,
    delay: Option<Duration>,
    recorder: Option<Recorder>,
}

impl SourceComponent {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            delay: None,
            recorder: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }
}

impl Component for SourceComponent {
    fn input_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("input", ValueType::Any)]
    }

    fn output_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("value", ValueType::Any)]
    }

    fn execute(
        &self,
        ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>> {
        let value = self.value.clone();
        let delay = self.delay;
        let recorder = self.recorder.clone();

        Box::pin(async move {
            if let Some(rec) = &recorder {
                rec.enter(&ctx.vertex);
            }
            let result = delay_or_cancel(delay, &ctx.cancel).await;
            if let Some(rec) = &recorder {
                rec.exit(&ctx.vertex);
            }
            result?;
            Ok(value_outputs(value))
        })
    }
}

/// Echoes its required `input` to its `value` output.
pub struct RelayComponent {
    delay: Option<Duration>,
    recorder: Option<Recorder>,
}

impl RelayComponent {
    pub fn new() -> Self {
        Self {
            delay: None,
            recorder: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }
}

impl Default for RelayComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RelayComponent {
    fn input_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::required("input", ValueType::Any)]
    }

    fn output_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("value", ValueType::Any)]
    }

    fn execute(
        &self,
        mut ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>> {
        let delay = self.delay;
        let recorder = self.recorder.clone();

        Box::pin(async move {
            if let Some(rec) = &recorder {
                rec.enter(&ctx.vertex);
            }
            let result = delay_or_cancel(delay, &ctx.cancel).await;
            if let Some(rec) = &recorder {
                rec.exit(&ctx.vertex);
            }
            result?;
            let input = ctx
                .inputs
                .remove("input")
                .ok_or_else(|| anyhow::anyhow!("missing 'input'"))?;
            Ok(value_outputs(input))
        })
    }
}

/// Joins its required `left` and `right` inputs into a two-element array.
pub struct JoinComponent;

impl Component for JoinComponent {
    fn input_slots(&self) -> Vec<SlotSpec> {
        vec![
            SlotSpec::required("left", ValueType::Any),
            SlotSpec::required("right", ValueType::Any),
        ]
    }

    fn output_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("value", ValueType::List)]
    }

    fn execute(
        &self,
        mut ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>> {
        Box::pin(async move {
            let left = ctx
                .inputs
                .remove("left")
                .ok_or_else(|| anyhow::anyhow!("missing 'left'"))?;
            let right = ctx
                .inputs
                .remove("right")
                .ok_or_else(|| anyhow::anyhow!("missing 'right'"))?;
            Ok(value_outputs(Value::Array(vec![left, right])))
        })
    }
}

/// Concatenates its two required text inputs. The only fake with strictly
/// typed slots, for edge compatibility tests.
pub struct ConcatComponent;

impl Component for ConcatComponent {
    fn input_slots(&self) -> Vec<SlotSpec> {
        vec![
            SlotSpec::required("a", ValueType::Text),
            SlotSpec::required("b", ValueType::Text),
        ]
    }

    fn output_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("text", ValueType::Text)]
    }

    fn execute(
        &self,
        ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>> {
        Box::pin(async move {
            let a = ctx
                .inputs
                .get("a")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("missing text input 'a'"))?;
            let b = ctx
                .inputs
                .get("b")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("missing text input 'b'"))?;

            let mut outputs = BTreeMap::new();
            outputs.insert("text".to_string(), Value::String(format!("{a}{b}")));
            Ok(outputs)
        })
    }
}

/// Always fails with a configurable message.
pub struct FailingComponent {
    message: String,
    delay: Option<Duration>,
}

impl FailingComponent {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Component for FailingComponent {
    fn input_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("input", ValueType::Any)]
    }

    fn output_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("value", ValueType::Any)]
    }

    fn execute(
        &self,
        ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>> {
        let message = self.message.clone();
        let delay = self.delay;

        Box::pin(async move {
            delay_or_cancel(delay, &ctx.cancel).await?;
            Err(anyhow::anyhow!("{message}"))
        })
    }
}

/// Emits a constant, then cancels the run-level token it was constructed
/// with. Lets tests trigger cancellation at a deterministic point.
pub struct CancellingComponent {
    value: Value,
    token: CancellationToken,
}

impl CancellingComponent {
    pub fn new(value: Value, token: CancellationToken) -> Self {
        Self { value, token }
    }
}

impl Component for CancellingComponent {
    fn input_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("input", ValueType::Any)]
    }

    fn output_slots(&self) -> Vec<SlotSpec> {
        vec![SlotSpec::optional("value", ValueType::Any)]
    }

    fn execute(
        &self,
        _ctx: ExecutionContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Outputs>> + Send + '_>> {
        let value = self.value.clone();
        let token = self.token.clone();

        Box::pin(async move {
            token.cancel();
            Ok(value_outputs(value))
        })
    }
}
