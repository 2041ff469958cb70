// src/types.rs

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical vertex id type used throughout the engine.
pub type VertexId = String;

/// Run-level policy deciding what happens after the first vertex failure.
///
/// - `FailFast`: stop dispatching new work once a failure is observed;
///   in-flight vertices drain, everything not yet started is skipped, and
///   the run finalises as `Failed` (default behaviour).
/// - `BestEffort`: keep executing every vertex whose dependencies remain
///   satisfiable; the run finalises as `Failed` only after all
///   still-runnable work has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    FailFast,
    BestEffort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::FailFast
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" => Ok(FailurePolicy::FailFast),
            "best-effort" | "besteffort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!(
                "invalid failure policy: {other} (expected \"fail-fast\" or \"best-effort\")"
            )),
        }
    }
}

/// Policy for multiple edges targeting the same input slot.
///
/// - `Reject`: at most one incoming edge per input slot; a second edge is
///   a build-time error (default behaviour).
/// - `Collect`: all incoming values are delivered as a JSON array, in
///   edge declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanInPolicy {
    Reject,
    Collect,
}

impl Default for FanInPolicy {
    fn default() -> Self {
        FanInPolicy::Reject
    }
}

impl FromStr for FanInPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(FanInPolicy::Reject),
            "collect" => Ok(FanInPolicy::Collect),
            other => Err(format!(
                "invalid fan-in policy: {other} (expected \"reject\" or \"collect\")"
            )),
        }
    }
}

/// Build-time configuration for [`Graph::build_with_config`](crate::graph::Graph::build_with_config).
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphConfig {
    pub fan_in: FanInPolicy,
}
