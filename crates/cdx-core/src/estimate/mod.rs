//! Closed-form estimators for companion-diagnostic bridging.
//!
//! Two estimators live here:
//!
//! - [`estimate_ppv`]: positive predictive value of a local diagnostic with
//!   respect to the clinical-trial reference assay, with a delta-method
//!   variance.
//! - [`estimate_bridging`]: clinical efficacy in the diagnostic-positive
//!   population, propagating the PPV uncertainty into a Wald interval.
//!
//! Both are pure functions of their inputs. Out-of-domain inputs are
//! rejected with [`Error::InvalidParameter`](cdx_common::Error) before any
//! arithmetic runs; a valid input combination that still yields a negative
//! or non-finite variance is reported as
//! [`Error::Computation`](cdx_common::Error).

mod bridging;
mod ppv;

pub use bridging::estimate_bridging;
pub use ppv::{estimate_ppv, validate_accuracy};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::normalize::probability;

/// Confidence level applied when a request does not carry one.
pub const DEFAULT_CONF_LEVEL: f64 = 0.95;

/// Agreement of a local diagnostic with the reference assay, plus the
/// reference cohort sizes those agreements were measured on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnosticAccuracy {
    /// Positive percent agreement, P(diagnostic+ | condition+). Domain (0, 1].
    #[serde(deserialize_with = "probability::deserialize")]
    #[schemars(schema_with = "probability::schema")]
    pub ppa: f64,

    /// Negative percent agreement, P(diagnostic- | condition-). Domain [0, 1].
    #[serde(deserialize_with = "probability::deserialize")]
    #[schemars(schema_with = "probability::schema")]
    pub npa: f64,

    /// Prior probability of the condition. Domain (0, 1].
    #[serde(alias = "prev", deserialize_with = "probability::deserialize")]
    #[schemars(schema_with = "probability::schema")]
    pub prevalence: f64,

    /// Condition-positive reference sample size.
    pub n1: u64,

    /// Condition-negative reference sample size.
    pub n0: u64,
}

/// Inputs to the bridging estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BridgingInput {
    #[serde(flatten)]
    pub accuracy: DiagnosticAccuracy,

    /// Efficacy in discordant (diagnostic+, condition-) subjects relative to
    /// concordant ones. Domain [0, 1].
    pub c: f64,

    /// Observed clinical effect in the trial population (e.g. a log hazard ratio).
    pub delta1: f64,

    /// Variance of `delta1`. Must be non-negative.
    pub var_delta1: f64,

    /// Two-sided confidence level in (0, 1). Defaults to 0.95.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_level: Option<f64>,
}

impl BridgingInput {
    /// The confidence level that will be used for the interval.
    pub fn effective_conf_level(&self) -> f64 {
        self.conf_level.unwrap_or(DEFAULT_CONF_LEVEL)
    }

    /// Fill a missing confidence level from an outer default.
    pub fn with_default_conf_level(mut self, conf_level: f64) -> Self {
        self.conf_level.get_or_insert(conf_level);
        self
    }
}

/// Positive predictive value and its delta-method variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PpvEstimate {
    /// In [0, 1].
    pub ppv_estimate: f64,
    /// Non-negative.
    pub ppv_variance: f64,
}

/// Efficacy in the diagnostic-positive population with its Wald interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BridgingEstimate {
    pub efficacy_estimate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub efficacy_variance: f64,
    pub conf_level: f64,
    /// Two-sided critical value used for the interval.
    pub z: f64,
    /// Present only when the diagnostic is imperfect (`npa < 1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppv: Option<PpvEstimate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_accepts_prev_alias_and_percentages() {
        let json = r#"{"ppa": "95%", "npa": 0.9, "prev": "30%", "n1": 100, "n0": 100}"#;
        let acc: DiagnosticAccuracy = serde_json::from_str(json).unwrap();
        assert_eq!(acc.ppa, 0.95);
        assert_eq!(acc.prevalence, 0.3);
        assert_eq!(acc.n1, 100);
    }

    #[test]
    fn bridging_input_flattens_accuracy() {
        let json = r#"{
            "ppa": 0.95, "npa": 0.9, "prevalence": 0.3, "n1": 100, "n0": 100,
            "c": 0.5, "delta1": 0.5, "var_delta1": 0.01
        }"#;
        let input: BridgingInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.accuracy.npa, 0.9);
        assert_eq!(input.conf_level, None);
        assert_eq!(input.effective_conf_level(), DEFAULT_CONF_LEVEL);
        assert_eq!(input.with_default_conf_level(0.9).effective_conf_level(), 0.9);
    }

    #[test]
    fn explicit_conf_level_beats_outer_default() {
        let json = r#"{
            "ppa": 1, "npa": 1, "prevalence": 0.5, "n1": 10, "n0": 10,
            "c": 0, "delta1": 0, "var_delta1": 0, "conf_level": 0.99
        }"#;
        let input: BridgingInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.with_default_conf_level(0.9).effective_conf_level(), 0.99);
    }

    #[test]
    fn sample_sizes_must_be_non_negative_integers() {
        let json = r#"{"ppa": 0.9, "npa": 0.9, "prevalence": 0.3, "n1": -1, "n0": 100}"#;
        assert!(serde_json::from_str::<DiagnosticAccuracy>(json).is_err());
    }

    #[test]
    fn ppv_is_omitted_when_absent() {
        let estimate = BridgingEstimate {
            efficacy_estimate: 0.5,
            ci_lower: 0.3,
            ci_upper: 0.7,
            efficacy_variance: 0.01,
            conf_level: 0.95,
            z: 1.96,
            ppv: None,
        };
        let json = serde_json::to_value(estimate).unwrap();
        assert!(json.get("ppv").is_none());
    }
}
