//! Standard normal distribution: density, CDF, survival and quantile.
//!
//! The CDF goes through the regularized incomplete gamma function
//! (`erfc(x) = Q(1/2, x²)`), so both tails keep relative precision.
//! The quantile starts from Acklam's rational approximation and takes one
//! Halley step against that CDF, which brings it to near machine precision.

use super::gamma::gamma_q;
use super::stable::{in_unit_open, LOG_SQRT_2PI};

const ACKLAM_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const ACKLAM_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const ACKLAM_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const ACKLAM_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const ACKLAM_P_LOW: f64 = 0.024_25;

/// Log density of N(0, 1) at x.
pub fn normal_log_pdf(x: f64) -> f64 {
    -LOG_SQRT_2PI - 0.5 * x * x
}

/// Density of N(0, 1) at x.
pub fn normal_pdf(x: f64) -> f64 {
    normal_log_pdf(x).exp()
}

/// CDF of N(0, 1): Φ(x).
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 1.0;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    let tail = 0.5 * gamma_q(0.5, 0.5 * x * x);
    if x < 0.0 {
        tail
    } else {
        1.0 - tail
    }
}

/// Survival function of N(0, 1): 1 - Φ(x).
pub fn normal_sf(x: f64) -> f64 {
    normal_cdf(-x)
}

/// Quantile (inverse CDF) of N(0, 1): Φ⁻¹(p).
///
/// Returns -inf at p = 0, +inf at p = 1 and NaN outside [0, 1].
pub fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }

    let x = acklam_quantile(p);

    // Halley refinement: e = Φ(x) - p, u = e / φ(x).
    let e = normal_cdf(x) - p;
    let u = e * (-normal_log_pdf(x)).exp();
    x - u / (1.0 + 0.5 * x * u)
}

/// Two-sided critical value `z` for a symmetric normal interval.
///
/// `z = -Φ⁻¹((1 - level)/2)`, so 0.95 gives ≈ 1.959964. Evaluated in the
/// lower tail so levels near 1 keep their precision. Returns `None` when `level` is outside (0, 1) or the quantile is not finite.
pub fn two_sided_critical_value(level: f64) -> Option<f64> {
    if !in_unit_open(level) {
        return None;
    }
    let z = -normal_quantile((1.0 - level) / 2.0);
    if z.is_finite() {
        Some(z)
    } else {
        None
    }
}

fn acklam_quantile(p: f64) -> f64 {
    let (a, b, c, d) = (ACKLAM_A, ACKLAM_B, ACKLAM_C, ACKLAM_D);
    if p < ACKLAM_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= 1.0 - ACKLAM_P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn cdf_known_values() {
        assert!(approx_eq(normal_cdf(0.0), 0.5, 1e-15));
        assert!(approx_eq(normal_cdf(1.0), 0.841_344_746_068_542_9, 1e-13));
        assert!(approx_eq(normal_cdf(-1.959_963_984_540_054), 0.025, 1e-13));
        assert!(approx_eq(normal_cdf(3.0), 0.998_650_101_968_369_9, 1e-13));
    }

    #[test]
    fn cdf_lower_tail_keeps_relative_precision() {
        // Φ(-10) ≈ 7.619853024160527e-24
        let tail = normal_cdf(-10.0);
        let rel = (tail - 7.619_853_024_160_527e-24).abs() / 7.619_853_024_160_527e-24;
        assert!(rel < 1e-10, "Φ(-10) = {}", tail);
    }

    #[test]
    fn cdf_infinities_and_nan() {
        assert_eq!(normal_cdf(f64::INFINITY), 1.0);
        assert_eq!(normal_cdf(f64::NEG_INFINITY), 0.0);
        assert!(normal_cdf(f64::NAN).is_nan());
    }

    #[test]
    fn survival_mirrors_cdf() {
        for &x in &[-2.5, -0.3, 0.0, 0.7, 1.8] {
            assert!(approx_eq(normal_sf(x), normal_cdf(-x), 1e-15));
            assert!(approx_eq(normal_sf(x) + normal_cdf(x), 1.0, 1e-14));
        }
    }

    #[test]
    fn pdf_peak() {
        let peak = normal_pdf(0.0);
        assert!(approx_eq(peak, 0.398_942_280_401_432_7, 1e-15));
    }

    #[test]
    fn quantile_known_values() {
        assert!(approx_eq(normal_quantile(0.975), 1.959_963_984_540_054, 1e-12));
        assert!(approx_eq(normal_quantile(0.95), 1.644_853_626_951_472_2, 1e-12));
        assert!(approx_eq(normal_quantile(0.995), 2.575_829_303_548_900_4, 1e-12));
        assert!(approx_eq(normal_quantile(0.025), -1.959_963_984_540_054, 1e-12));
        assert_eq!(normal_quantile(0.5), 0.0);
    }

    #[test]
    fn quantile_tail_region() {
        // Acklam lower-tail branch
        assert!(approx_eq(normal_quantile(1e-5), -4.264_890_793_922_825, 1e-10));
        assert!(approx_eq(normal_quantile(1.0 - 1e-5), 4.264_890_793_922_825, 1e-8));
    }

    #[test]
    fn quantile_boundaries() {
        assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(normal_quantile(1.0), f64::INFINITY);
        assert!(normal_quantile(-0.1).is_nan());
        assert!(normal_quantile(1.1).is_nan());
        assert!(normal_quantile(f64::NAN).is_nan());
    }

    #[test]
    fn critical_values_match_convention() {
        let z95 = two_sided_critical_value(0.95).unwrap();
        assert!(approx_eq(z95, 1.959_963_984_540_054, 1e-12));

        let z90 = two_sided_critical_value(0.90).unwrap();
        assert!(approx_eq(z90, 1.644_853_626_951_472_2, 1e-12));

        let z99 = two_sided_critical_value(0.99).unwrap();
        assert!(approx_eq(z99, 2.575_829_303_548_900_4, 1e-12));
    }

    #[test]
    fn critical_value_near_one_stays_finite() {
        let z = two_sided_critical_value(1.0 - f64::EPSILON / 2.0).unwrap();
        assert!(z.is_finite() && z > 8.0, "z={z}");

        // Lower-tail evaluation: no cancellation in 1 - (1 - level)/2.
        let level = 1.0 - 1e-15;
        let z = two_sided_critical_value(level).unwrap();
        assert!(approx_eq(z, -normal_quantile((1.0 - level) / 2.0), 1e-12));
        assert!((z - 8.027).abs() < 1e-2, "z={z}");
    }

    #[test]
    fn critical_value_rejects_out_of_range_levels() {
        assert!(two_sided_critical_value(0.0).is_none());
        assert!(two_sided_critical_value(1.0).is_none());
        assert!(two_sided_critical_value(-0.5).is_none());
        assert!(two_sided_critical_value(1.5).is_none());
        assert!(two_sided_critical_value(f64::NAN).is_none());
    }
}
