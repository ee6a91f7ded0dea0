//! Bridging estimator: efficacy in the diagnostic-positive population.

use cdx_common::{Error, Result};
use cdx_math::{in_unit_closed, two_sided_critical_value, IntervalError, WaldInterval};

use super::ppv::{estimate_ppv, validate_accuracy};
use super::{BridgingEstimate, BridgingInput};
use crate::logging::event_names;

fn validate_bridging(input: &BridgingInput, conf_level: f64) -> Result<f64> {
    let z = two_sided_critical_value(conf_level).ok_or_else(|| {
        Error::invalid_parameter("conf_level", conf_level, "must lie in (0, 1)")
    })?;
    if !(input.var_delta1 >= 0.0 && input.var_delta1.is_finite()) {
        return Err(Error::invalid_parameter(
            "var_delta1",
            input.var_delta1,
            "must be finite and non-negative",
        ));
    }
    if !in_unit_closed(input.c) {
        return Err(Error::invalid_parameter("c", input.c, "must lie in [0, 1]"));
    }
    if !input.delta1.is_finite() {
        return Err(Error::invalid_parameter("delta1", input.delta1, "must be finite"));
    }
    validate_accuracy(&input.accuracy)?;
    Ok(z)
}

/// Estimate efficacy in the diagnostic-positive group with a Wald interval.
///
/// With a perfectly specific diagnostic (`npa == 1`) every diagnostic-positive
/// subject is condition-positive and the trial effect carries over unchanged.
/// Otherwise
///
/// ```text
/// efficacy = ((1-c)·ppv + c)·delta1
/// variance = (2ppv² - 2ppv + 1)·var_delta1 + ((1-c)²·delta1² + 2·var_delta1)·var_ppv
/// ```
///
/// and the interval is `efficacy ± z·sqrt(variance)`.
pub fn estimate_bridging(input: &BridgingInput) -> Result<BridgingEstimate> {
    let conf_level = input.effective_conf_level();
    let z = validate_bridging(input, conf_level)?;

    let BridgingInput {
        c,
        delta1,
        var_delta1,
        ..
    } = *input;

    let (efficacy, variance, ppv) = if input.accuracy.npa == 1.0 {
        (delta1, var_delta1, None)
    } else {
        let ppv_est = estimate_ppv(&input.accuracy)?;
        let ppv = ppv_est.ppv_estimate;
        let var_ppv = ppv_est.ppv_variance;

        let efficacy = ((1.0 - c) * ppv + c) * delta1;
        let v1 = (2.0 * ppv * ppv - 2.0 * ppv + 1.0) * var_delta1;
        let v2 = (1.0 - c).powi(2) * delta1 * delta1 + 2.0 * var_delta1;
        (efficacy, v1 + v2 * var_ppv, Some(ppv_est))
    };

    let interval = WaldInterval::with_critical_value(efficacy, variance, conf_level, z)
        .map_err(|e| {
            let detail = match e {
                IntervalError::InvalidVariance => format!("efficacy variance {variance}"),
                _ => format!("efficacy estimate {efficacy}"),
            };
            Error::Computation(format!("{e}: {detail}"))
        })?;

    tracing::debug!(
        target: event_names::ESTIMATE_BRIDGING,
        efficacy,
        variance,
        ci_lower = interval.lower,
        ci_upper = interval.upper,
        perfect_npa = ppv.is_none(),
        message = "bridging estimated"
    );

    Ok(BridgingEstimate {
        efficacy_estimate: interval.estimate,
        ci_lower: interval.lower,
        ci_upper: interval.upper,
        efficacy_variance: interval.variance,
        conf_level,
        z,
        ppv,
    })
}
