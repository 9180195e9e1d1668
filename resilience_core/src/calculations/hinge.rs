//! # Plastic Hinge Parameters
//!
//! Backbone parameters of the modified Ibarra-Medina-Krawinkler
//! deterioration model, shared by the beam and column calculators.
//!
//! The empirical regressions produce *total* pre- and post-capping plastic
//! rotations measured from a bilinear fit that includes the elastic part of
//! the hardening branch. The hinge spring expects purely plastic values, so
//! `(Mc/My - 1) My / K0` is moved from the pre-capping rotation to the
//! post-capping rotation (which also gains the yield rotation).

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};

/// Raw regression output for one member end, before the elastic correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HingeRegression {
    /// Elastic rotational stiffness K0 = 6EI/L (kip-in/rad)
    pub elastic_stiffness_kip_in: f64,
    /// Plastic moment Zx Fy (kip-in)
    pub plastic_moment_kip_in: f64,
    /// Effective yield moment My (kip-in)
    pub effective_yield_moment_kip_in: f64,
    /// Capping-to-yield moment ratio Mc/My
    pub capping_ratio: f64,
    /// Reference cumulative rotation capacity Lambda
    pub reference_cumulative_rotation: f64,
    /// Pre-capping plastic rotation as fitted (rad)
    pub pre_capping_rotation_raw: f64,
    /// Post-capping rotation as fitted (rad)
    pub post_capping_rotation_raw: f64,
    /// Residual strength ratio
    pub residual_strength_ratio: f64,
    /// Ultimate rotation capacity (rad)
    pub ultimate_rotation: f64,
}

impl HingeRegression {
    /// Yield rotation My / K0 (rad)
    pub fn yield_rotation(&self) -> f64 {
        self.effective_yield_moment_kip_in / self.elastic_stiffness_kip_in
    }

    /// Elastic rotation between yield and capping, (Mc/My - 1) My / K0 (rad)
    pub fn elastic_capping_rotation(&self) -> f64 {
        (self.capping_ratio - 1.0) * self.yield_rotation()
    }
}

/// The nine scalars handed to the nonlinear rotational spring of one member.
///
/// ## JSON Example
///
/// ```json
/// {
///   "elastic_stiffness_kip_in": 1305000.0,
///   "plastic_moment_kip_in": 12700.0,
///   "effective_yield_moment_kip_in": 12700.0,
///   "strain_hardening_ratio": 0.0341,
///   "reference_cumulative_rotation": 1.287,
///   "pre_capping_rotation": 0.0285,
///   "post_capping_rotation": 0.2323,
///   "residual_strength_ratio": 0.4,
///   "ultimate_rotation": 0.2
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlasticHingeParameters {
    /// Initial stiffness K0 (kip-in/rad)
    pub elastic_stiffness_kip_in: f64,
    /// Plastic moment Myp (kip-in)
    pub plastic_moment_kip_in: f64,
    /// Effective yield moment My (kip-in)
    pub effective_yield_moment_kip_in: f64,
    /// Strain-hardening ratio as
    pub strain_hardening_ratio: f64,
    /// Reference cumulative rotation capacity Lambda
    pub reference_cumulative_rotation: f64,
    /// Pre-capping plastic rotation theta_p (rad)
    pub pre_capping_rotation: f64,
    /// Post-capping rotation theta_pc (rad)
    pub post_capping_rotation: f64,
    /// Residual strength ratio
    pub residual_strength_ratio: f64,
    /// Ultimate rotation theta_u (rad)
    pub ultimate_rotation: f64,
}

impl PlasticHingeParameters {
    /// Apply the elastic correction to a regression result.
    ///
    /// A correction larger than the fitted rotation leaves a non-positive
    /// theta_p, which is passed through unchanged.
    pub fn from_regression(raw: &HingeRegression) -> ResilienceResult<Self> {
        let k0 = raw.elastic_stiffness_kip_in;
        if !k0.is_finite() || k0 <= 0.0 {
            return Err(ResilienceError::numeric_domain(
                "elastic_stiffness_kip_in",
                k0,
                "Stiffness must be positive",
            ));
        }

        let correction = raw.elastic_capping_rotation();
        let pre_capping = raw.pre_capping_rotation_raw - correction;
        if pre_capping <= 0.0 {
            warn!(
                "Elastic correction {:.5} exceeds fitted theta_p {:.5}",
                correction, raw.pre_capping_rotation_raw
            );
        }
        let post_capping = raw.post_capping_rotation_raw + raw.yield_rotation() + correction;
        let hardening_moment = (raw.capping_ratio - 1.0) * raw.effective_yield_moment_kip_in;

        Ok(PlasticHingeParameters {
            elastic_stiffness_kip_in: k0,
            plastic_moment_kip_in: raw.plastic_moment_kip_in,
            effective_yield_moment_kip_in: raw.effective_yield_moment_kip_in,
            strain_hardening_ratio: hardening_moment / (pre_capping * k0),
            reference_cumulative_rotation: raw.reference_cumulative_rotation,
            pre_capping_rotation: pre_capping,
            post_capping_rotation: post_capping,
            residual_strength_ratio: raw.residual_strength_ratio,
            ultimate_rotation: raw.ultimate_rotation,
        })
    }

    /// Yield rotation My / K0 (rad)
    pub fn yield_rotation(&self) -> f64 {
        self.effective_yield_moment_kip_in / self.elastic_stiffness_kip_in
    }

    /// Capping moment My (1 + as K0 theta_p / My) (kip-in)
    pub fn capping_moment_kip_in(&self) -> f64 {
        self.effective_yield_moment_kip_in
            + self.strain_hardening_ratio * self.elastic_stiffness_kip_in * self.pre_capping_rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_regression() -> HingeRegression {
        HingeRegression {
            elastic_stiffness_kip_in: 1.0e6,
            plastic_moment_kip_in: 10000.0,
            effective_yield_moment_kip_in: 10000.0,
            capping_ratio: 1.1,
            reference_cumulative_rotation: 1.2,
            pre_capping_rotation_raw: 0.03,
            post_capping_rotation_raw: 0.2,
            residual_strength_ratio: 0.4,
            ultimate_rotation: 0.2,
        }
    }

    #[test]
    fn test_elastic_correction() {
        let raw = sample_regression();
        let hinge = PlasticHingeParameters::from_regression(&raw).unwrap();

        assert!((raw.yield_rotation() - 0.01).abs() < 1e-15);
        assert!((hinge.pre_capping_rotation - 0.029).abs() < 1e-12);
        assert!((hinge.post_capping_rotation - 0.211).abs() < 1e-12);
        assert!((hinge.pre_capping_rotation + raw.elastic_capping_rotation() - raw.pre_capping_rotation_raw).abs() < 1e-14);
    }

    #[test]
    fn test_capping_moment_recovers_ratio() {
        let raw = sample_regression();
        let hinge = PlasticHingeParameters::from_regression(&raw).unwrap();
        let mc = hinge.capping_moment_kip_in();
        assert!((mc / hinge.effective_yield_moment_kip_in - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_correction_larger_than_rotation_passes_through() {
        let mut raw = sample_regression();
        raw.pre_capping_rotation_raw = 0.0005;
        let hinge = PlasticHingeParameters::from_regression(&raw).unwrap();
        assert!((hinge.pre_capping_rotation + 0.0005).abs() < 1e-12);
        assert!((hinge.post_capping_rotation - 0.211).abs() < 1e-12);
        assert!(hinge.strain_hardening_ratio < 0.0);
    }

    #[test]
    fn test_zero_stiffness_rejected() {
        let mut raw = sample_regression();
        raw.elastic_stiffness_kip_in = 0.0;
        assert!(PlasticHingeParameters::from_regression(&raw).is_err());
    }
}
