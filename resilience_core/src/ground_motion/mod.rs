//! # Ground Motions
//!
//! Acceleration records and the earthquake scenarios they are generated
//! from. Stochastic generation itself is an external collaborator (see
//! [`crate::assessment::GroundMotionGenerator`]); this module holds the
//! data types and the intensity measures computed from a record.

pub mod intensity;

use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};
use crate::units::GRAVITY_M_S2;

pub use intensity::{
    arias_intensity, integrate_acceleration, response_spectrum, sdof_response, significant_duration,
    AriasSummary, SdofMethod, SdofResponse, SpectralOrdinate,
};

/// Earthquake scenario driving the stochastic generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundMotionScenario {
    /// Moment magnitude
    pub magnitude: f64,
    /// Rupture distance (km)
    pub distance_km: f64,
    /// Time-averaged shear-wave velocity of the top 30 m (m/s)
    pub vs30: f64,
    /// Fault mechanism indicator in [0, 1]
    pub fault_type: f64,
}

impl GroundMotionScenario {
    pub fn validate(&self) -> ResilienceResult<()> {
        let checks = [
            ("magnitude", self.magnitude, self.magnitude > 0.0),
            ("distance_km", self.distance_km, self.distance_km > 0.0),
            ("vs30", self.vs30, self.vs30 > 0.0),
            ("fault_type", self.fault_type, (0.0..=1.0).contains(&self.fault_type)),
        ];
        for (field, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(ResilienceError::invalid_input(field, value.to_string(), "Out of range"));
            }
        }
        Ok(())
    }
}

/// Uniformly sampled ground acceleration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundMotion {
    /// Acceleration history (g)
    pub acceleration_g: Vec<f64>,
    /// Time step (s)
    pub dt: f64,
}

impl GroundMotion {
    pub fn new(acceleration_g: Vec<f64>, dt: f64) -> ResilienceResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ResilienceError::invalid_input("dt", dt.to_string(), "Time step must be positive"));
        }
        if acceleration_g.is_empty() {
            return Err(ResilienceError::invalid_input("acceleration_g", "[]", "Record is empty"));
        }
        if acceleration_g.iter().any(|a| !a.is_finite()) {
            return Err(ResilienceError::invalid_input(
                "acceleration_g",
                "non-finite",
                "Record contains NaN or infinite values",
            ));
        }
        Ok(GroundMotion { acceleration_g, dt })
    }

    /// Record length (s)
    pub fn duration(&self) -> f64 {
        self.acceleration_g.len() as f64 * self.dt
    }

    /// Peak ground acceleration (g)
    pub fn pga(&self) -> f64 {
        self.acceleration_g.iter().fold(0.0, |m, a| m.max(a.abs()))
    }

    /// Acceleration history in m/s^2
    pub fn acceleration_m_s2(&self) -> Vec<f64> {
        self.acceleration_g.iter().map(|a| a * GRAVITY_M_S2).collect()
    }

    /// Arias intensity summary of this record.
    pub fn arias(&self) -> AriasSummary {
        significant_duration(&self.acceleration_m_s2(), self.dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_validation() {
        assert!(GroundMotion::new(vec![0.1, -0.2], 0.01).is_ok());
        assert!(GroundMotion::new(vec![], 0.01).is_err());
        assert!(GroundMotion::new(vec![0.1], 0.0).is_err());
        assert!(GroundMotion::new(vec![f64::NAN], 0.01).is_err());
    }

    #[test]
    fn test_pga_and_duration() {
        let gm = GroundMotion::new(vec![0.1, -0.35, 0.2, 0.0], 0.01).unwrap();
        assert_eq!(gm.pga(), 0.35);
        assert!((gm.duration() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_scenario_validation() {
        let ok = GroundMotionScenario { magnitude: 7.0, distance_km: 30.0, vs30: 760.0, fault_type: 0.5 };
        assert!(ok.validate().is_ok());
        let bad = GroundMotionScenario { fault_type: 1.5, ..ok };
        assert!(bad.validate().is_err());
    }
}
