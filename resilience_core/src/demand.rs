//! Engineering demand parameters of one structural analysis.
//!
//! The solver reports a flat vector `[IDR_1 .. IDR_s, PFA_0 .. PFA_s, RIDR]`:
//! one drift ratio per story, one peak acceleration per floor level
//! including the ground, and the residual drift. A vector containing NaN is
//! the sentinel for a failed analysis.

use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};

/// Drift, acceleration and residual-drift demands of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandVector {
    /// Peak inter-story drift ratio per story
    pub idr: Vec<f64>,
    /// Peak floor acceleration per level, ground first (g)
    pub pfa: Vec<f64>,
    /// Maximum residual inter-story drift ratio
    pub residual_drift: f64,
}

impl DemandVector {
    /// Build from separate parts, checking that there is one more floor
    /// level than stories.
    pub fn new(idr: Vec<f64>, pfa: Vec<f64>, residual_drift: f64) -> ResilienceResult<Self> {
        if idr.is_empty() {
            return Err(ResilienceError::invalid_input("idr", "[]", "At least one story is required"));
        }
        if pfa.len() != idr.len() + 1 {
            return Err(ResilienceError::invalid_input(
                "pfa",
                format!("{} values", pfa.len()),
                format!("Expected {} floor accelerations for {} stories", idr.len() + 1, idr.len()),
            ));
        }
        Ok(DemandVector { idr, pfa, residual_drift })
    }

    /// Split a solver EDP vector for a building with `stories` stories.
    pub fn from_edp_slice(edp: &[f64], stories: usize) -> ResilienceResult<Self> {
        let expected = 2 * stories + 2;
        if stories == 0 || edp.len() != expected {
            return Err(ResilienceError::invalid_input(
                "edp",
                format!("{} values", edp.len()),
                format!("Expected {} values for {} stories", expected, stories),
            ));
        }
        let idr = edp[..stories].to_vec();
        let pfa = edp[stories..2 * stories + 1].to_vec();
        Ok(DemandVector { idr, pfa, residual_drift: edp[expected - 1] })
    }

    /// Failed-analysis sentinel: every demand is NaN.
    pub fn nan_sentinel(stories: usize) -> Self {
        DemandVector {
            idr: vec![f64::NAN; stories],
            pfa: vec![f64::NAN; stories + 1],
            residual_drift: f64::NAN,
        }
    }

    /// Flatten back into the solver's EDP layout.
    pub fn to_edp_vec(&self) -> Vec<f64> {
        let mut edp = Vec::with_capacity(self.idr.len() + self.pfa.len() + 1);
        edp.extend_from_slice(&self.idr);
        edp.extend_from_slice(&self.pfa);
        edp.push(self.residual_drift);
        edp
    }

    pub fn stories(&self) -> usize {
        self.idr.len()
    }

    /// Largest story drift
    pub fn max_drift(&self) -> f64 {
        self.idr.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// False when any demand is NaN.
    pub fn is_complete(&self) -> bool {
        self.idr.iter().chain(self.pfa.iter()).all(|v| !v.is_nan()) && !self.residual_drift.is_nan()
    }

    /// Demand vector with every value zero
    pub fn zero(stories: usize) -> Self {
        DemandVector {
            idr: vec![0.0; stories],
            pfa: vec![0.0; stories + 1],
            residual_drift: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edp_slice_layout() {
        let edp = [0.01, 0.02, 0.015, 0.3, 0.5, 0.6, 0.8, 0.002];
        let d = DemandVector::from_edp_slice(&edp, 3).unwrap();
        assert_eq!(d.idr, vec![0.01, 0.02, 0.015]);
        assert_eq!(d.pfa, vec![0.3, 0.5, 0.6, 0.8]);
        assert_eq!(d.residual_drift, 0.002);
        assert_eq!(d.max_drift(), 0.02);
        assert_eq!(d.to_edp_vec(), edp.to_vec());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(DemandVector::from_edp_slice(&[0.0; 7], 3).is_err());
        assert!(DemandVector::new(vec![0.0; 3], vec![0.0; 3], 0.0).is_err());
    }

    #[test]
    fn test_sentinel_is_incomplete() {
        assert!(!DemandVector::nan_sentinel(3).is_complete());
        assert!(DemandVector::zero(3).is_complete());

        let mut partial = DemandVector::zero(3);
        partial.pfa[2] = f64::NAN;
        assert!(!partial.is_complete());
    }
}
