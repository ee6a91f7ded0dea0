//! Symmetric normal-approximation (Wald) confidence intervals.

use serde::{Deserialize, Serialize};

use super::normal::two_sided_critical_value;

/// Why a Wald interval could not be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    /// Confidence level outside (0, 1).
    InvalidLevel,
    /// Variance negative, NaN or infinite.
    InvalidVariance,
    /// Point estimate NaN or infinite.
    InvalidEstimate,
}

impl std::fmt::Display for IntervalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntervalError::InvalidLevel => write!(f, "confidence level must lie in (0, 1)"),
            IntervalError::InvalidVariance => {
                write!(f, "variance must be finite and non-negative")
            }
            IntervalError::InvalidEstimate => write!(f, "point estimate must be finite"),
        }
    }
}

/// `estimate ± z·sqrt(variance)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaldInterval {
    pub estimate: f64,
    pub variance: f64,
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
    pub z: f64,
}

impl WaldInterval {
    /// Build the interval at confidence `level`.
    ///
    /// The square root is only taken once the variance is known to be finite
    /// and non-negative, so the bounds are never NaN.
    pub fn from_variance(estimate: f64, variance: f64, level: f64) -> Result<Self, IntervalError> {
        let z = two_sided_critical_value(level).ok_or(IntervalError::InvalidLevel)?;
        Self::with_critical_value(estimate, variance, level, z)
    }

    /// Build the interval from a precomputed critical value.
    pub fn with_critical_value(
        estimate: f64,
        variance: f64,
        level: f64,
        z: f64,
    ) -> Result<Self, IntervalError> {
        if !estimate.is_finite() {
            return Err(IntervalError::InvalidEstimate);
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(IntervalError::InvalidVariance);
        }
        let half_width = z * variance.sqrt();
        Ok(WaldInterval {
            estimate,
            variance,
            lower: estimate - half_width,
            upper: estimate + half_width,
            level,
            z,
        })
    }

    /// Distance from the estimate to either bound.
    pub fn half_width(&self) -> f64 {
        self.upper - self.estimate
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_symmetric_around_estimate() {
        let ci = WaldInterval::from_variance(0.5, 0.04, 0.95).unwrap();
        let half = 1.959_963_984_540_054 * 0.2;
        assert!((ci.lower - (0.5 - half)).abs() < 1e-12);
        assert!((ci.upper - (0.5 + half)).abs() < 1e-12);
        assert!(ci.contains(0.5));
        assert!((ci.width() - 2.0 * half).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_collapses_to_point() {
        let ci = WaldInterval::from_variance(-1.25, 0.0, 0.9).unwrap();
        assert_eq!(ci.lower, -1.25);
        assert_eq!(ci.upper, -1.25);
        assert_eq!(ci.half_width(), 0.0);
    }

    #[test]
    fn negative_variance_is_rejected() {
        let err = WaldInterval::from_variance(0.0, -1e-9, 0.95).unwrap_err();
        assert_eq!(err, IntervalError::InvalidVariance);
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert_eq!(
            WaldInterval::from_variance(0.0, f64::NAN, 0.95).unwrap_err(),
            IntervalError::InvalidVariance
        );
        assert_eq!(
            WaldInterval::from_variance(0.0, f64::INFINITY, 0.95).unwrap_err(),
            IntervalError::InvalidVariance
        );
        assert_eq!(
            WaldInterval::from_variance(f64::NAN, 1.0, 0.95).unwrap_err(),
            IntervalError::InvalidEstimate
        );
    }

    #[test]
    fn bad_level_is_rejected() {
        assert_eq!(
            WaldInterval::from_variance(0.0, 1.0, 1.0).unwrap_err(),
            IntervalError::InvalidLevel
        );
    }

    #[test]
    fn serializes_all_fields() {
        let ci = WaldInterval::from_variance(1.0, 1.0, 0.95).unwrap();
        let json = serde_json::to_value(ci).unwrap();
        for key in ["estimate", "variance", "lower", "upper", "level", "z"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
