//! # Intensity Measures
//!
//! Arias intensity, significant duration and elastic single-degree-of-freedom
//! response of an acceleration record. Accelerations are in m/s^2 unless a
//! function says otherwise.

use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};
use crate::units::GRAVITY_M_S2;

/// Cumulative Arias intensity history, `pi / (2g) * cumsum(a^2 dt)` (m/s).
pub fn arias_intensity(acc: &[f64], dt: f64) -> Vec<f64> {
    let scale = std::f64::consts::PI / (2.0 * GRAVITY_M_S2) * dt;
    let mut total = 0.0;
    acc.iter()
        .map(|a| {
            total += scale * a * a;
            total
        })
        .collect()
}

/// Arias intensity and the build-up times derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AriasSummary {
    /// Total Arias intensity (m/s)
    pub intensity: f64,
    /// Time between 5% and 95% of the total (s)
    pub significant_duration: f64,
    /// Time at which 45% of the total has built up (s)
    pub mid_time: f64,
}

/// Index of the history sample closest to `target`.
fn nearest_index(history: &[f64], target: f64) -> usize {
    history
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_err), (i, v)| {
            let err = (v - target).abs();
            if err < best_err {
                (i, err)
            } else {
                (best, best_err)
            }
        })
        .0
}

/// Total Arias intensity, significant duration D5-95 and 45% build-up time.
pub fn significant_duration(acc: &[f64], dt: f64) -> AriasSummary {
    let history = arias_intensity(acc, dt);
    let intensity = history.iter().copied().fold(0.0, f64::max);

    let t5 = nearest_index(&history, 0.05 * intensity);
    let t95 = nearest_index(&history, 0.95 * intensity);
    let t45 = nearest_index(&history, 0.45 * intensity);

    AriasSummary {
        intensity,
        significant_duration: (t95 as f64 - t5 as f64) * dt,
        mid_time: t45 as f64 * dt,
    }
}

/// Velocity and displacement histories by trapezoidal integration from rest.
pub fn integrate_acceleration(acc: &[f64], dt: f64) -> (Vec<f64>, Vec<f64>) {
    fn cumulative_trapezoid(values: &[f64], dt: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(values.len());
        let mut total = 0.0;
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                total += 0.5 * (values[i - 1] + v) * dt;
            }
            out.push(total);
        }
        out
    }

    let velocity = cumulative_trapezoid(acc, dt);
    let displacement = cumulative_trapezoid(&velocity, dt);
    (velocity, displacement)
}

/// Time-stepping scheme for the SDOF oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SdofMethod {
    /// Newmark linear-acceleration method (gamma = 1/2, beta = 1/6)
    #[default]
    NewmarkLinear,
    /// Exact piecewise-linear excitation (Nigam-Jennings)
    NigamJennings,
}

/// Peak response of an elastic oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SdofResponse {
    /// Peak relative displacement
    pub displacement: f64,
    /// Peak relative velocity
    pub velocity: f64,
    /// Pseudo-acceleration omega^2 * umax
    pub pseudo_acceleration: f64,
}

/// Peak response of a unit-mass elastic oscillator to ground acceleration `ag`.
pub fn sdof_response(
    omega: f64,
    damping: f64,
    ag: &[f64],
    dt: f64,
    method: SdofMethod,
) -> ResilienceResult<SdofResponse> {
    if !omega.is_finite() || omega <= 0.0 {
        return Err(ResilienceError::invalid_input("omega", omega.to_string(), "Frequency must be positive"));
    }
    if !(0.0..1.0).contains(&damping) {
        return Err(ResilienceError::invalid_input(
            "damping",
            damping.to_string(),
            "Damping ratio must be within [0, 1)",
        ));
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(ResilienceError::invalid_input("dt", dt.to_string(), "Time step must be positive"));
    }
    if ag.is_empty() {
        return Ok(SdofResponse { displacement: 0.0, velocity: 0.0, pseudo_acceleration: 0.0 });
    }

    let (umax, vmax) = match method {
        SdofMethod::NewmarkLinear => newmark(omega, damping, ag, dt),
        SdofMethod::NigamJennings => nigam_jennings(omega, damping, ag, dt),
    };
    Ok(SdofResponse {
        displacement: umax,
        velocity: vmax,
        pseudo_acceleration: omega * omega * umax,
    })
}

fn newmark(omega: f64, zeta: f64, ag: &[f64], dt: f64) -> (f64, f64) {
    const GAMMA: f64 = 0.5;
    const BETA: f64 = 1.0 / 6.0;

    let w2 = omega * omega;
    let c = 2.0 * zeta * omega;
    let k_eq = w2 + GAMMA / (BETA * dt) * c + 1.0 / (BETA * dt * dt);

    let (mut u, mut v) = (0.0, 0.0);
    let mut a = -ag[0];
    let (mut umax, mut vmax) = (0.0f64, 0.0f64);

    for &ag_next in &ag[1..] {
        let p_eq = -ag_next
            + (1.0 / (BETA * dt * dt) + GAMMA / (BETA * dt) * c) * u
            + (1.0 / (BETA * dt) + (GAMMA / BETA - 1.0) * c) * v
            + ((0.5 / BETA - 1.0) + dt * (GAMMA / (2.0 * BETA) - 1.0) * c) * a;
        let u_next = p_eq / k_eq;
        let v_next = GAMMA / (BETA * dt) * (u_next - u)
            + (1.0 - GAMMA / BETA) * v
            + dt * (1.0 - GAMMA / (2.0 * BETA)) * a;
        a = -ag_next - c * v_next - w2 * u_next;
        u = u_next;
        v = v_next;
        umax = umax.max(u.abs());
        vmax = vmax.max(v.abs());
    }
    (umax, vmax)
}

fn nigam_jennings(w: f64, h: f64, ag: &[f64], dt: f64) -> (f64, f64) {
    let root = (1.0 - h * h).sqrt();
    let wd = root * w;
    let (s, c) = (wd * dt).sin_cos();
    let e = (-h * w * dt).exp();
    let hc = h / root;
    let w2 = w * w;

    let a11 = e * (hc * s + c);
    let a12 = e / wd * s;
    let a21 = -w / root * e * s;
    let a22 = e * (c - hc * s);

    let hc2 = (2.0 * h * h - 1.0) / (w2 * dt);
    let hw3 = 2.0 * h / (w2 * w * dt);
    let b11 = e * ((hc2 + h / w) * s / wd + (hw3 + 1.0 / w2) * c) - hw3;
    let b12 = -e * (hc2 * s / wd + hw3 * c) - 1.0 / w2 + hw3;
    let b21 = e * ((hc2 + h / w) * (c - hc * s) - (hw3 + 1.0 / w2) * (wd * s + h * w * c)) + 1.0 / (w2 * dt);
    let b22 = -e * (hc2 * (c - hc * s) - hw3 * (wd * s + h * w * c)) - 1.0 / (w2 * dt);

    let (mut u, mut v) = (0.0, 0.0);
    let (mut umax, mut vmax) = (0.0f64, 0.0f64);
    for pair in ag.windows(2) {
        let u_next = a11 * u + a12 * v + b11 * pair[0] + b12 * pair[1];
        let v_next = a21 * u + a22 * v + b21 * pair[0] + b22 * pair[1];
        u = u_next;
        v = v_next;
        umax = umax.max(u.abs());
        vmax = vmax.max(v.abs());
    }
    (umax, vmax)
}

/// One ordinate of a response spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralOrdinate {
    /// Period (s)
    pub period: f64,
    /// Spectral displacement
    pub sd: f64,
    /// Spectral velocity
    pub sv: f64,
    /// Pseudo-spectral acceleration
    pub sa: f64,
}

/// Elastic response spectrum over a list of periods.
pub fn response_spectrum(
    ag: &[f64],
    dt: f64,
    periods: &[f64],
    damping: f64,
    method: SdofMethod,
) -> ResilienceResult<Vec<SpectralOrdinate>> {
    periods
        .iter()
        .map(|&period| {
            if !period.is_finite() || period <= 0.0 {
                return Err(ResilienceError::invalid_input(
                    "period",
                    period.to_string(),
                    "Period must be positive",
                ));
            }
            let omega = 2.0 * std::f64::consts::PI / period;
            let r = sdof_response(omega, damping, ag, dt, method)?;
            Ok(SpectralOrdinate {
                period,
                sd: r.displacement,
                sv: r.velocity,
                sa: r.pseudo_acceleration,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f64, period: f64, dt: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * i as f64 * dt / period).sin())
            .collect()
    }

    #[test]
    fn test_arias_constant_record() {
        let acc = vec![2.0; 100];
        let history = arias_intensity(&acc, 0.01);
        let expected = std::f64::consts::PI / (2.0 * 9.8) * 4.0 * 0.01 * 100.0;
        assert!((history[99] - expected).abs() < 1e-12);
        assert!(history.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_significant_duration_uniform_energy() {
        // Uniform energy over 10 s builds up linearly
        let acc = vec![1.0; 1000];
        let summary = significant_duration(&acc, 0.01);
        assert!((summary.significant_duration - 9.0).abs() < 0.02);
        assert!((summary.mid_time - 4.5).abs() < 0.02);
    }

    #[test]
    fn test_integration_of_constant() {
        let (v, d) = integrate_acceleration(&[1.0; 101], 0.01);
        assert!((v[100] - 1.0).abs() < 1e-12);
        assert!((d[100] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_static_limit() {
        // A slowly applied constant load gives u = ag / omega^2 for a stiff oscillator
        let omega = 20.0;
        let ag: Vec<f64> = (0..4000).map(|i| -((i as f64) / 2000.0).min(1.0)).collect();
        for method in [SdofMethod::NewmarkLinear, SdofMethod::NigamJennings] {
            let r = sdof_response(omega, 0.05, &ag, 0.005, method).unwrap();
            assert!((r.displacement - 1.0 / (omega * omega)).abs() < 2e-4, "{:?}", method);
        }
    }

    #[test]
    fn test_methods_agree() {
        let ag = sine(3.0, 0.7, 0.005, 3000);
        let omega = 2.0 * std::f64::consts::PI / 0.5;
        let a = sdof_response(omega, 0.05, &ag, 0.005, SdofMethod::NewmarkLinear).unwrap();
        let b = sdof_response(omega, 0.05, &ag, 0.005, SdofMethod::NigamJennings).unwrap();
        assert!((a.displacement / b.displacement - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_spectrum_shape() {
        let ag = sine(2.0, 0.5, 0.01, 2000);
        let spectrum = response_spectrum(&ag, 0.01, &[0.1, 0.5, 2.0], 0.05, SdofMethod::default()).unwrap();
        assert_eq!(spectrum.len(), 3);
        // Resonance at the forcing period dominates
        assert!(spectrum[1].sa > spectrum[0].sa);
        assert!(spectrum[1].sa > spectrum[2].sa);
        assert!(response_spectrum(&ag, 0.01, &[0.0], 0.05, SdofMethod::default()).is_err());
    }
}
