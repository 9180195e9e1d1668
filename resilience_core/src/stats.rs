//! # Probability Helpers
//!
//! Closed-form distribution functions used by the fragility catalog and the
//! consequence model. Everything here is deterministic; random draws live in
//! [`crate::loss::sampling`].

use std::f64::consts::PI;

/// Standard normal cumulative distribution function.
///
/// Hastings approximation (A&S 26.2.17), absolute error below 7.5e-8.
/// Damage-state masses are rounded to whole percent, so a mass within that
/// bound of a half-percent tie (x.5 % +/- 7.5e-6 %) may round to the other
/// neighbour than an exact CDF would give.
pub fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return 0.5;
    }
    if z >= 8.0 {
        return 1.0;
    }
    if z <= -8.0 {
        return 0.0;
    }

    let (z_abs, negate) = if z < 0.0 { (-z, true) } else { (z, false) };

    const P: f64 = 0.2316419;
    const B1: f64 = 0.319381530;
    const B2: f64 = -0.356563782;
    const B3: f64 = 1.781477937;
    const B4: f64 = -1.821255978;
    const B5: f64 = 1.330274429;

    let t = 1.0 / (1.0 + P * z_abs);
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let pdf = (-0.5 * z_abs * z_abs).exp() / (2.0 * PI).sqrt();
    let upper = 1.0 - pdf * poly;

    if negate {
        1.0 - upper
    } else {
        upper
    }
}

/// CDF of a normal distribution with the given mean and standard deviation.
///
/// A zero standard deviation degenerates to a step at the mean.
pub fn normal_cdf_with(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return if x >= mean { 1.0 } else { 0.0 };
    }
    normal_cdf((x - mean) / std_dev)
}

/// CDF of a lognormal distribution parameterized by its median and
/// logarithmic standard deviation.
///
/// Demands at or below zero have zero probability of exceedance, and a zero
/// dispersion degenerates to a step at the median.
pub fn lognormal_cdf(x: f64, median: f64, beta: f64) -> f64 {
    if x <= 0.0 || median <= 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return 1.0;
    }
    if beta <= 0.0 {
        return if x >= median { 1.0 } else { 0.0 };
    }
    normal_cdf((x / median).ln() / beta)
}

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.15e-9).
///
/// Returns `-inf` / `+inf` at the closed ends of the unit interval and NaN
/// outside it.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Round a probability to an integer percentage, ties to even.
pub fn to_percent(probability: f64) -> i64 {
    (probability * 100.0).round_ties_even() as i64
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the two central values for even lengths); `None`
/// for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
