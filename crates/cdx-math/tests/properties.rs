//! Property-based tests for cdx-math numerical functions.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use proptest::prelude::*;
use cdx_math::{
    gamma_p, gamma_q, normal_cdf, normal_quantile, normal_sf, two_sided_critical_value,
    WaldInterval,
};

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// Incomplete gamma
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// P and Q are complementary.
    #[test]
    fn gamma_p_q_sum_to_one(a in 0.1..20.0f64, x in 0.0..40.0f64) {
        let p = gamma_p(a, x);
        let q = gamma_q(a, x);
        prop_assert!(approx_eq(p + q, 1.0, 1e-12), "P({},{})={} Q={}", a, x, p, q);
    }

    /// P(a, x) is a CDF in x: bounded and non-decreasing.
    #[test]
    fn gamma_p_monotone_in_x(a in 0.1..20.0f64, x in 0.0..40.0f64, dx in 0.0..5.0f64) {
        let lo = gamma_p(a, x);
        let hi = gamma_p(a, x + dx);
        prop_assert!((0.0..=1.0).contains(&lo));
        prop_assert!((0.0..=1.0).contains(&hi));
        prop_assert!(hi >= lo - 1e-14, "P({},{})={} > P({},{})={}", a, x, lo, a, x + dx, hi);
    }
}

// ============================================================================
// Normal distribution
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Φ is symmetric: Φ(-x) = 1 - Φ(x).
    #[test]
    fn normal_cdf_symmetry(x in -8.0..8.0f64) {
        prop_assert!(approx_eq(normal_cdf(-x), 1.0 - normal_cdf(x), 1e-14));
        prop_assert!(approx_eq(normal_sf(x), normal_cdf(-x), 1e-15));
    }

    /// Φ(Φ⁻¹(p)) = p.
    #[test]
    fn quantile_inverts_cdf(p in 1e-8..(1.0 - 1e-8)) {
        let x = normal_quantile(p);
        prop_assert!(x.is_finite());
        let back = normal_cdf(x);
        prop_assert!(approx_eq(back, p, TOL), "Φ(Φ⁻¹({})) = {}", p, back);
    }

    /// Φ⁻¹ is strictly increasing.
    #[test]
    fn quantile_strictly_increasing(p in 0.001..0.998f64, dp in 1e-6..0.001f64) {
        prop_assert!(normal_quantile(p + dp) > normal_quantile(p));
    }

    /// Φ⁻¹(1 - p) = -Φ⁻¹(p).
    #[test]
    fn quantile_antisymmetry(p in 1e-6..0.5f64) {
        let lo = normal_quantile(p);
        let hi = normal_quantile(1.0 - p);
        prop_assert!(approx_eq(lo, -hi, 1e-8), "q({})={} q(1-{})={}", p, lo, p, hi);
    }
}

// ============================================================================
// Critical values and intervals
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Larger confidence level, strictly larger critical value.
    #[test]
    fn critical_value_increases_with_level(level in 0.01..0.98f64, step in 1e-4..0.01f64) {
        let z_lo = two_sided_critical_value(level).unwrap();
        let z_hi = two_sided_critical_value(level + step).unwrap();
        prop_assert!(z_lo > 0.0);
        prop_assert!(z_hi > z_lo);
    }

    /// Wald bounds are ordered and symmetric about the estimate.
    #[test]
    fn wald_interval_ordered_and_symmetric(
        estimate in -10.0..10.0f64,
        variance in 0.0..5.0f64,
        level in 0.5..0.999f64,
    ) {
        let ci = WaldInterval::from_variance(estimate, variance, level).unwrap();
        prop_assert!(ci.lower <= ci.estimate && ci.estimate <= ci.upper);
        let up = ci.upper - ci.estimate;
        let down = ci.estimate - ci.lower;
        prop_assert!(approx_eq(up, down, 1e-12), "up={} down={}", up, down);
    }
}
