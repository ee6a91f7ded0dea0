//! Positive predictive value with a delta-method variance.

use cdx_common::{Error, Result};
use cdx_math::{binomial_variance, in_unit_closed, in_unit_left_open, relative_variance_term};

use super::{DiagnosticAccuracy, PpvEstimate};
use crate::logging::event_names;

/// Check every accuracy parameter against its domain, first failure wins.
///
/// NaN is outside every domain.
pub fn validate_accuracy(acc: &DiagnosticAccuracy) -> Result<()> {
    if !in_unit_left_open(acc.ppa) {
        return Err(Error::invalid_parameter("ppa", acc.ppa, "must lie in (0, 1]"));
    }
    if !in_unit_closed(acc.npa) {
        return Err(Error::invalid_parameter("npa", acc.npa, "must lie in [0, 1]"));
    }
    if !in_unit_left_open(acc.prevalence) {
        return Err(Error::invalid_parameter(
            "prevalence",
            acc.prevalence,
            "must lie in (0, 1]",
        ));
    }
    if acc.n1 == 0 {
        return Err(Error::invalid_parameter("n1", 0.0, "must be a positive integer"));
    }
    if acc.n0 == 0 {
        return Err(Error::invalid_parameter("n0", 0.0, "must be a positive integer"));
    }
    Ok(())
}

/// Estimate PPV and its variance.
///
/// ```text
/// ppv     = prev·ppa / (prev·ppa + (1-prev)(1-npa))
/// var_ppv = (ppv(1-ppv))² · [ var_prev/(prev(1-prev))² + var_ppa/ppa² + var_phi10/phi10² ]
/// ```
///
/// with `m = n1/prev`, `var_prev = prev(1-prev)/m`, `var_ppa = ppa(1-ppa)/n1`,
/// `phi10 = 1-npa` and `var_phi10 = phi10(1-phi10)/n0`.
///
/// Inputs inside the domain can still underflow: with `ppa` and `prevalence`
/// near 1e-200 the products `prev·ppa` and `ppa²` flush to zero and the
/// variance becomes NaN. Such inputs yield [`Error::Computation`], not an
/// estimate.
pub fn estimate_ppv(acc: &DiagnosticAccuracy) -> Result<PpvEstimate> {
    validate_accuracy(acc)?;

    let DiagnosticAccuracy {
        ppa,
        npa,
        prevalence: prev,
        n1,
        n0,
    } = *acc;
    let n1 = n1 as f64;
    let n0 = n0 as f64;

    let true_pos = prev * ppa;
    let false_pos = (1.0 - prev) * (1.0 - npa);
    let ppv = true_pos / (true_pos + false_pos);

    // Effective total sample implied by n1 condition-positive subjects.
    let m = n1 / prev;
    let var_prev = binomial_variance(prev, m);
    let var_ppa = binomial_variance(ppa, n1);
    let phi10 = 1.0 - npa;
    let var_phi10 = binomial_variance(phi10, n0);

    let relative = relative_variance_term(var_prev, prev * (1.0 - prev))
        + relative_variance_term(var_ppa, ppa)
        + relative_variance_term(var_phi10, phi10);
    let spread = ppv * (1.0 - ppv);
    let var_ppv = spread * spread * relative;

    if !ppv.is_finite() || !var_ppv.is_finite() {
        tracing::debug!(
            target: event_names::ESTIMATE_REJECTED,
            ppv,
            var_ppv,
            message = "non-finite PPV intermediate"
        );
        return Err(Error::Computation(format!(
            "PPV variance is not finite (ppv={ppv}, var_ppv={var_ppv})"
        )));
    }

    tracing::trace!(
        target: event_names::ESTIMATE_PPV,
        ppa,
        npa,
        prevalence = prev,
        ppv,
        var_ppv,
        message = "ppv estimated"
    );

    Ok(PpvEstimate {
        ppv_estimate: ppv,
        ppv_variance: var_ppv,
    })
}
