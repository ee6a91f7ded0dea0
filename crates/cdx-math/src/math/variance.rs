//! Sampling-variance helpers used by delta-method propagation.

/// Binomial variance of a proportion estimated from `n` trials: p(1-p)/n.
///
/// Returns NaN for `n == 0`.
pub fn binomial_variance(p: f64, n: f64) -> f64 {
    if n <= 0.0 || n.is_nan() {
        return f64::NAN;
    }
    p * (1.0 - p) / n
}

/// One squared-relative-error term of a first-order (delta-method) expansion:
/// `variance / scale²`.
///
/// A zero variance contributes nothing even when `scale` is also zero: a
/// parameter held at a boundary value is a point mass, and the `0/0` form
/// is the limit of a vanishing contribution.
pub fn relative_variance_term(variance: f64, scale: f64) -> f64 {
    if variance == 0.0 {
        return 0.0;
    }
    variance / (scale * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_variance_matches_formula() {
        assert!((binomial_variance(0.95, 100.0) - 0.000475).abs() < 1e-15);
        assert_eq!(binomial_variance(1.0, 10.0), 0.0);
        assert_eq!(binomial_variance(0.0, 10.0), 0.0);
    }

    #[test]
    fn binomial_variance_rejects_empty_sample() {
        assert!(binomial_variance(0.5, 0.0).is_nan());
        assert!(binomial_variance(0.5, f64::NAN).is_nan());
    }

    #[test]
    fn relative_term_divides_by_squared_scale() {
        assert!((relative_variance_term(0.01, 0.5) - 0.04).abs() < 1e-15);
    }

    #[test]
    fn relative_term_zero_variance_is_zero() {
        assert_eq!(relative_variance_term(0.0, 0.0), 0.0);
        assert_eq!(relative_variance_term(0.0, 0.3), 0.0);
    }
}
