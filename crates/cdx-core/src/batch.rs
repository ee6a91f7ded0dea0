//! Batch evaluation of bridging scenarios.
//!
//! A batch file is a JSON array of bridging inputs, each optionally tagged
//! with an `id`. Scenarios are evaluated independently: one malformed or
//! out-of-domain scenario is reported in `failed` without stopping the rest.

use cdx_common::{BatchResult, Error, Result};
use serde::{Deserialize, Serialize};

use crate::estimate::{estimate_bridging, BridgingEstimate, BridgingInput};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};

/// One scenario of a batch file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub input: BridgingInput,
}

/// A successfully estimated scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEstimate {
    pub id: String,

    #[serde(flatten)]
    pub estimate: BridgingEstimate,
}

impl std::fmt::Display for ScenarioEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let e = &self.estimate;
        write!(
            f,
            "{}: {:.4} [{:.4}, {:.4}] at {}%",
            self.id,
            e.efficacy_estimate,
            e.ci_lower,
            e.ci_upper,
            (e.conf_level * 1e4).round() / 1e2
        )
    }
}

fn scenario_id(explicit: Option<&str>, index: usize) -> String {
    explicit
        .map(str::to_string)
        .unwrap_or_else(|| format!("scenario-{}", index + 1))
}

/// Split a batch document into per-scenario JSON values.
///
/// Only the outer shape is checked here; each element is decoded on its own
/// so a bad element does not hide the good ones.
pub fn parse_batch(json: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    match value {
        serde_json::Value::Array(items) => Ok(items),
        other => Err(Error::Json(serde::de::Error::custom(format!(
            "batch input must be a JSON array of scenarios, got {}",
            json_kind(&other)
        )))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Estimate every scenario, filling missing confidence levels from `default_conf_level`.
pub fn run_batch(
    items: &[serde_json::Value],
    default_conf_level: f64,
    ctx: &LogContext,
) -> BatchResult<ScenarioEstimate> {
    let mut result = BatchResult::default();

    for (index, item) in items.iter().enumerate() {
        let explicit_id = item.get("id").and_then(|v| v.as_str());
        let id = scenario_id(explicit_id, index);

        let outcome = BatchScenario::deserialize(item)
            .map_err(Error::from)
            .and_then(|scenario| {
                estimate_bridging(&scenario.input.with_default_conf_level(default_conf_level))
            });

        match outcome {
            Ok(estimate) => {
                log_event!(ctx, DEBUG, event_names::BATCH_ITEM, Stage::Batch, "scenario estimated",
                    index = index);
                result.add_success(ScenarioEstimate { id, estimate });
            }
            Err(err) => {
                log_event!(ctx, WARN, event_names::BATCH_ITEM, Stage::Batch, "scenario failed",
                    index = index, code = err.code());
                result.add_failure(id, &err);
            }
        }
    }

    log_event!(ctx, INFO, event_names::BATCH_FINISHED, Stage::Batch, "batch finished",
        total = result.summary.total, failed = result.summary.failed);

    result
}
