//! # Uncertain Input Parameters
//!
//! The sixteen parameters varied by the sensitivity study, in sample-row
//! order:
//!
//! | # | name | meaning | distribution |
//! |---|------|---------|--------------|
//! | 0 | `M` | moment magnitude | U(6, 8) |
//! | 1 | `R` | rupture distance (km) | U(10, 100) |
//! | 2 | `V_s30` | site shear-wave velocity (m/s) | U(600, 1500) |
//! | 3 | `F` | fault mechanism | U(0, 1) |
//! | 4 | `m_b` | mass multiplier | TN(1, 0.1) on [0.872, 1.128] |
//! | 5 | `kesi` | damping ratio | U(0.02, 0.05) |
//! | 6 | `P_nsq` | quantity percentile | U(0, 1) |
//! | 7-12 | `M_bcj` .. `M_hvac` | fragility median multipliers | TN(1, 0.3) on [0.616, 1.384] |
//! | 13 | `M_rf` | residual-drift fragility median | U(0.005, 0.015) |
//! | 14 | `S_rf` | residual-drift fragility dispersion | U(0.1, 0.8) |
//! | 15 | `C_rep` | replacement cost multiplier | U(1, 1/0.3) |

use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::assessment::AnalysisSettings;
use crate::errors::{ResilienceError, ResilienceResult};
use crate::fragility::CatalogMultipliers;
use crate::ground_motion::GroundMotionScenario;
use crate::loss::outcome::ConsequenceParameters;
use crate::loss::sampling::LossRng;

/// Number of uncertain parameters in a sample row.
pub const PARAMETER_COUNT: usize = 16;

/// Draw limit for rejection sampling of truncated normals.
const MAX_REJECTIONS: usize = 10_000;

/// Marginal distribution of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParameterDistribution {
    Uniform { low: f64, high: f64 },
    TruncatedNormal { low: f64, high: f64, mean: f64, std_dev: f64 },
}

impl ParameterDistribution {
    /// Support bounds `(low, high)`
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            ParameterDistribution::Uniform { low, high } => (low, high),
            ParameterDistribution::TruncatedNormal { low, high, .. } => (low, high),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let (low, high) = self.bounds();
        value.is_finite() && value >= low && value <= high
    }

    /// Midpoint for uniform, mean for truncated normal.
    pub fn nominal(&self) -> f64 {
        match *self {
            ParameterDistribution::Uniform { low, high } => 0.5 * (low + high),
            ParameterDistribution::TruncatedNormal { mean, .. } => mean,
        }
    }

    /// One random draw.
    pub fn sample(&self, rng: &mut LossRng) -> f64 {
        match *self {
            ParameterDistribution::Uniform { low, high } => rng.uniform_between(low, high),
            ParameterDistribution::TruncatedNormal { low, high, mean, std_dev } => {
                let Ok(normal) = Normal::new(mean, std_dev) else {
                    return mean.clamp(low, high);
                };
                normal
                    .sample_iter(&mut rng.0)
                    .take(MAX_REJECTIONS)
                    .find(|x| *x >= low && *x <= high)
                    .unwrap_or_else(|| mean.clamp(low, high))
            }
        }
    }
}

/// Name, meaning and distribution of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub distribution: ParameterDistribution,
}

const fn uniform(name: &'static str, description: &'static str, low: f64, high: f64) -> ParameterSpec {
    ParameterSpec {
        name,
        description,
        distribution: ParameterDistribution::Uniform { low, high },
    }
}

const fn multiplier(name: &'static str, description: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        description,
        distribution: ParameterDistribution::TruncatedNormal {
            low: 0.616,
            high: 1.384,
            mean: 1.0,
            std_dev: 0.3,
        },
    }
}

/// The parameter space in sample-row order.
pub static PARAMETER_SPACE: [ParameterSpec; PARAMETER_COUNT] = [
    uniform("M", "Moment magnitude", 6.0, 8.0),
    uniform("R", "Rupture distance (km)", 10.0, 100.0),
    uniform("V_s30", "Site shear-wave velocity (m/s)", 600.0, 1500.0),
    uniform("F", "Fault mechanism", 0.0, 1.0),
    ParameterSpec {
        name: "m_b",
        description: "Seismic mass multiplier",
        distribution: ParameterDistribution::TruncatedNormal {
            low: 0.872,
            high: 1.128,
            mean: 1.0,
            std_dev: 0.1,
        },
    },
    uniform("kesi", "Damping ratio", 0.02, 0.05),
    uniform("P_nsq", "Component quantity percentile", 0.0, 1.0),
    multiplier("M_bcj", "Beam-column joint fragility multiplier"),
    multiplier("M_gcw", "Curtain wall fragility multiplier"),
    multiplier("M_wp", "Wall partition fragility multiplier"),
    multiplier("M_sc", "Suspended ceiling fragility multiplier"),
    multiplier("M_ele", "Elevator fragility multiplier"),
    multiplier("M_hvac", "HVAC fragility multiplier"),
    uniform("M_rf", "Residual drift fragility median", 0.005, 0.015),
    uniform("S_rf", "Residual drift fragility dispersion", 0.1, 0.8),
    uniform("C_rep", "Replacement cost multiplier", 1.0, 1.0 / 0.3),
];

/// One sample of the uncertain parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertainParameters {
    pub magnitude: f64,
    pub distance_km: f64,
    pub vs30: f64,
    pub fault_type: f64,
    pub mass_multiplier: f64,
    pub damping_ratio: f64,
    pub quantity_percentile: f64,
    pub beam_column_joint: f64,
    pub curtain_wall: f64,
    pub wall_partition: f64,
    pub suspended_ceiling: f64,
    pub elevator: f64,
    pub hvac: f64,
    pub median_residual_drift: f64,
    pub residual_dispersion: f64,
    pub replacement_multiplier: f64,
}

impl Default for UncertainParameters {
    fn default() -> Self {
        let row = PARAMETER_SPACE.map(|spec| spec.distribution.nominal());
        Self::from_array(row)
    }
}

impl UncertainParameters {
    fn from_array(r: [f64; PARAMETER_COUNT]) -> Self {
        UncertainParameters {
            magnitude: r[0],
            distance_km: r[1],
            vs30: r[2],
            fault_type: r[3],
            mass_multiplier: r[4],
            damping_ratio: r[5],
            quantity_percentile: r[6],
            beam_column_joint: r[7],
            curtain_wall: r[8],
            wall_partition: r[9],
            suspended_ceiling: r[10],
            elevator: r[11],
            hvac: r[12],
            median_residual_drift: r[13],
            residual_dispersion: r[14],
            replacement_multiplier: r[15],
        }
    }

    /// Parse and validate one sample row.
    pub fn from_row(row: &[f64]) -> ResilienceResult<Self> {
        let values: [f64; PARAMETER_COUNT] = row.try_into().map_err(|_| {
            ResilienceError::invalid_input(
                "row",
                format!("{} values", row.len()),
                format!("Expected {} parameters", PARAMETER_COUNT),
            )
        })?;
        for (spec, &value) in PARAMETER_SPACE.iter().zip(values.iter()) {
            if !spec.distribution.contains(value) {
                let (low, high) = spec.distribution.bounds();
                return Err(ResilienceError::invalid_input(
                    spec.name,
                    value.to_string(),
                    format!("Must be within [{}, {}]", low, high),
                ));
            }
        }
        Ok(Self::from_array(values))
    }

    /// Values in sample-row order
    pub fn to_row(&self) -> [f64; PARAMETER_COUNT] {
        [
            self.magnitude,
            self.distance_km,
            self.vs30,
            self.fault_type,
            self.mass_multiplier,
            self.damping_ratio,
            self.quantity_percentile,
            self.beam_column_joint,
            self.curtain_wall,
            self.wall_partition,
            self.suspended_ceiling,
            self.elevator,
            self.hvac,
            self.median_residual_drift,
            self.residual_dispersion,
            self.replacement_multiplier,
        ]
    }

    /// Independent draw of every parameter from its marginal.
    pub fn sample(rng: &mut LossRng) -> Self {
        let mut row = [0.0; PARAMETER_COUNT];
        for (value, spec) in row.iter_mut().zip(PARAMETER_SPACE.iter()) {
            *value = spec.distribution.sample(rng);
        }
        Self::from_array(row)
    }

    pub fn ground_motion_scenario(&self) -> GroundMotionScenario {
        GroundMotionScenario {
            magnitude: self.magnitude,
            distance_km: self.distance_km,
            vs30: self.vs30,
            fault_type: self.fault_type,
        }
    }

    pub fn analysis_settings(&self, time_step: f64) -> AnalysisSettings {
        AnalysisSettings {
            time_step,
            mass_multiplier: self.mass_multiplier,
            damping_ratio: self.damping_ratio,
        }
    }

    pub fn catalog_multipliers(&self) -> CatalogMultipliers {
        CatalogMultipliers {
            quantity_percentile: self.quantity_percentile,
            beam_column_joint: self.beam_column_joint,
            curtain_wall: self.curtain_wall,
            wall_partition: self.wall_partition,
            suspended_ceiling: self.suspended_ceiling,
            elevator: self.elevator,
            hvac: self.hvac,
        }
    }

    pub fn consequence_parameters(&self) -> ConsequenceParameters {
        ConsequenceParameters {
            median_residual_drift: self.median_residual_drift,
            residual_dispersion: self.residual_dispersion,
            replacement_multiplier: self.replacement_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_order() {
        let names: Vec<&str> = PARAMETER_SPACE.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "M", "R", "V_s30", "F", "m_b", "kesi", "P_nsq", "M_bcj", "M_gcw", "M_wp", "M_sc", "M_ele",
                "M_hvac", "M_rf", "S_rf", "C_rep"
            ]
        );
    }

    #[test]
    fn test_row_roundtrip_and_split() {
        let row = [
            7.0, 40.0, 760.0, 1.0, 1.05, 0.03, 0.5, 1.1, 0.9, 1.0, 1.2, 0.8, 1.3, 0.01, 0.3, 1.5,
        ];
        let p = UncertainParameters::from_row(&row).unwrap();
        assert_eq!(p.to_row(), row);
        assert_eq!(p.catalog_multipliers().hvac, 1.3);
        assert_eq!(p.consequence_parameters().replacement_multiplier, 1.5);
        assert_eq!(p.ground_motion_scenario().vs30, 760.0);
        let a = p.analysis_settings(0.01);
        assert_eq!(a.mass_multiplier, 1.05);
        assert_eq!(a.damping_ratio, 0.03);
    }

    #[test]
    fn test_row_validation() {
        assert!(UncertainParameters::from_row(&[1.0; 15]).is_err());
        let mut row = UncertainParameters::default().to_row();
        row[0] = 9.0;
        let err = UncertainParameters::from_row(&row).unwrap_err();
        assert_eq!(
            err,
            ResilienceError::invalid_input("M", "9", "Must be within [6, 8]")
        );
        row[0] = f64::NAN;
        assert!(UncertainParameters::from_row(&row).is_err());
    }

    #[test]
    fn test_nominal_defaults() {
        let p = UncertainParameters::default();
        assert_eq!(p.magnitude, 7.0);
        assert_eq!(p.hvac, 1.0);
        assert_eq!(p.quantity_percentile, 0.5);
        assert!(p.catalog_multipliers().validate().is_ok());
        assert!(p.consequence_parameters().validate().is_ok());
    }

    #[test]
    fn test_samples_within_bounds() {
        let mut rng = LossRng::from_seed_u64(17);
        for _ in 0..500 {
            let p = UncertainParameters::sample(&mut rng);
            assert!(UncertainParameters::from_row(&p.to_row()).is_ok());
        }
    }

    #[test]
    fn test_truncated_normal_rejection() {
        let mut rng = LossRng::from_seed_u64(23);
        let dist = ParameterDistribution::TruncatedNormal { low: 0.8, high: 1.2, mean: 1.0, std_dev: 0.1 };
        let draws: Vec<f64> = (0..5000).map(|_| dist.sample(&mut rng)).collect();
        assert!(draws.iter().all(|x| dist.contains(*x)));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 1.0).abs() < 0.01);

        // Support far out in the tail: every draw is rejected
        let unreachable = ParameterDistribution::TruncatedNormal { low: 10.0, high: 11.0, mean: 0.0, std_dev: 0.1 };
        assert_eq!(unreachable.sample(&mut rng), 10.0);

        let degenerate = ParameterDistribution::TruncatedNormal { low: 0.0, high: 1.0, mean: 2.0, std_dev: -1.0 };
        assert_eq!(degenerate.sample(&mut rng), 1.0);
    }
}
