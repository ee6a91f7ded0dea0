//! Function-tool bindings for the estimators.
//!
//! An agent front-end lists the tools with [`tool_definitions`], picks one
//! for a natural-language question, and invokes it through [`call_tool`]
//! with JSON arguments. Each call returns the estimator's result mapping as a
//! single JSON text block.

pub mod protocol;

pub use protocol::{ToolContent, ToolDefinition};

use cdx_common::{Error, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::estimate::{estimate_bridging, estimate_ppv, BridgingInput, DiagnosticAccuracy};
use crate::logging::event_names;
use crate::normalize::normalize_percentages;

pub const TOOL_PPV: &str = "cdx_ppv";
pub const TOOL_BRIDGING: &str = "cdx_bridging";
pub const TOOL_NORMALIZE: &str = "cdx_normalize_query";

/// Canonical names of every dispatchable tool.
pub const TOOL_NAMES: [&str; 3] = [TOOL_PPV, TOOL_BRIDGING, TOOL_NORMALIZE];

/// Older tool names, still accepted on dispatch.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("get_ppv_stats", TOOL_PPV),
    ("get_bridging", TOOL_BRIDGING),
];

/// Arguments of the query-normalization tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NormalizeQueryArgs {
    /// Free-text question possibly quoting percentages such as "90%".
    pub query: String,
}

/// Result of the query-normalization tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedQuery {
    pub query: String,
}

fn input_schema<T: JsonSchema>() -> serde_json::Value {
    schemars::schema_for!(T).to_value()
}

/// Build the list of available tool definitions.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: TOOL_PPV.to_string(),
            description: "Positive predictive value of a local diagnostic against the \
                          clinical-trial reference assay, with its delta-method variance. \
                          Returns {ppv_estimate, ppv_variance}."
                .to_string(),
            input_schema: input_schema::<DiagnosticAccuracy>(),
        },
        ToolDefinition {
            name: TOOL_BRIDGING.to_string(),
            description: "Clinical efficacy in the diagnostic-positive population with a \
                          confidence interval, propagating PPV uncertainty. Returns \
                          {efficacy_estimate, ci_lower, ci_upper, efficacy_variance, conf_level, z, ppv}."
                .to_string(),
            input_schema: input_schema::<BridgingInput>(),
        },
        ToolDefinition {
            name: TOOL_NORMALIZE.to_string(),
            description: "Rewrite percentages in a question as decimal fractions \
                          (\"90%\" becomes 0.9) before extracting tool arguments."
                .to_string(),
            input_schema: input_schema::<NormalizeQueryArgs>(),
        },
    ]
}

/// Map a legacy alias to its canonical tool name.
pub fn canonical_tool_name(name: &str) -> &str {
    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

fn parse_args<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T> {
    T::deserialize(params).map_err(|e| Error::InvalidToolArguments(e.to_string()))
}

/// Dispatch a tool call by name and return content blocks.
///
/// Estimator errors are passed through unchanged so callers can tell an
/// out-of-domain argument from a malformed call.
pub fn call_tool(name: &str, params: &serde_json::Value) -> Result<Vec<ToolContent>> {
    let canonical = canonical_tool_name(name);
    tracing::debug!(
        target: event_names::TOOL_CALL,
        tool = canonical,
        requested = name,
        message = "tool call"
    );

    let content = match canonical {
        TOOL_PPV => {
            let args: DiagnosticAccuracy = parse_args(params)?;
            ToolContent::json(&estimate_ppv(&args)?)?
        }
        TOOL_BRIDGING => {
            let args: BridgingInput = parse_args(params)?;
            ToolContent::json(&estimate_bridging(&args)?)?
        }
        TOOL_NORMALIZE => {
            let args: NormalizeQueryArgs = parse_args(params)?;
            ToolContent::json(&NormalizedQuery {
                query: normalize_percentages(&args.query),
            })?
        }
        _ => {
            return Err(Error::UnknownTool {
                name: name.to_string(),
            })
        }
    };

    Ok(vec![content])
}
