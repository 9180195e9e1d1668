//! # Column Hinge Calculation
//!
//! Plastic-hinge parameters for a moment-frame column under a gravity axial
//! demand. Every regression depends on the axial demand/capacity ratio,
//! which is formed from the AISC flexural-buckling strength (K = 1). The
//! capacity is only used to form that ratio; no design check is made here.
//!
//! The slenderness and the Lambda, theta_p and theta_pc fits take the
//! unbraced length in feet over ry in inches, the form the fits were
//! calibrated with. Mc/My and K0 use the length in inches.
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::calculations::column::{calculate, ColumnHingeInput};
//! use resilience_core::materials::{builtin_shapes, SteelMaterial};
//!
//! let input = ColumnHingeInput {
//!     label: "C-1".to_string(),
//!     section: "W14X132".to_string(),
//!     axial_demand_kips: 300.0,
//!     unbraced_length_x_ft: 13.0,
//!     unbraced_length_y_ft: 13.0,
//!     material: SteelMaterial::a992(),
//! };
//! let result = calculate(&input, builtin_shapes()).unwrap();
//! assert!((result.axial.demand_capacity_ratio - 0.172).abs() < 1e-3);
//! assert_eq!(result.regression.capping_ratio, 1.3);
//! assert_eq!(result.regression.pre_capping_rotation_raw, 0.20);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::calculations::hinge::{HingeRegression, PlasticHingeParameters};
use crate::errors::{ResilienceError, ResilienceResult};
use crate::materials::{SteelMaterial, SteelShape, SteelShapeDb};
use crate::units::{Feet, Inches, Kips};

/// Resistance factor for compression
pub const PHI_COMPRESSION: f64 = 0.90;

/// Ultimate rotation for columns (rad)
pub const COLUMN_ULTIMATE_ROTATION: f64 = 0.15;

/// Upper bound on the fitted pre-capping rotation (rad)
pub const COLUMN_MAX_PRE_CAPPING: f64 = 0.20;

/// Input parameters for a frame column.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "C-S1-P0",
///   "section": "W14X132",
///   "axial_demand_kips": 300.0,
///   "unbraced_length_x_ft": 13.0,
///   "unbraced_length_y_ft": 13.0,
///   "material": { "grade": "A992", "fy_ksi": 50.0, "fu_ksi": 65.0, "e_ksi": 29000.0, "ry": 1.1 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHingeInput {
    /// User label for this column
    pub label: String,

    /// W-shape label (e.g., "W14X132")
    pub section: String,

    /// Gravity axial compression demand (kips, magnitude)
    pub axial_demand_kips: f64,

    /// Strong-axis unbraced length (ft)
    pub unbraced_length_x_ft: f64,

    /// Weak-axis unbraced length (ft)
    pub unbraced_length_y_ft: f64,

    /// Steel material
    pub material: SteelMaterial,
}

impl ColumnHingeInput {
    /// Validate input parameters.
    pub fn validate(&self) -> ResilienceResult<()> {
        if !self.axial_demand_kips.is_finite() || self.axial_demand_kips < 0.0 {
            return Err(ResilienceError::invalid_input(
                "axial_demand_kips",
                self.axial_demand_kips.to_string(),
                "Axial demand must be a non-negative magnitude",
            ));
        }
        for (field, value) in [
            ("unbraced_length_x_ft", self.unbraced_length_x_ft),
            ("unbraced_length_y_ft", self.unbraced_length_y_ft),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResilienceError::invalid_input(field, value.to_string(), "Length must be positive"));
            }
        }
        self.material.validate()
    }
}

/// Flexural-buckling strength of the column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxialCapacity {
    /// Governing slenderness KL/r (L in ft, r in inches)
    pub slenderness: f64,
    /// Elastic buckling stress Fe (ksi)
    pub elastic_buckling_ksi: f64,
    /// Critical stress Fcr (ksi)
    pub critical_stress_ksi: f64,
    /// Design strength phi Pn (kips)
    pub design_strength_kips: f64,
    /// Axial demand / design strength
    pub demand_capacity_ratio: f64,
    /// True when KL/r <= 4.71 sqrt(E/Fy)
    pub inelastic_buckling: bool,
}

/// Compute the flexural-buckling strength and the axial ratio.
pub fn axial_capacity(
    shape: &SteelShape,
    material: &SteelMaterial,
    demand: Kips,
    length_x: Feet,
    length_y: Feet,
) -> AxialCapacity {
    let slenderness = (length_x.0 / shape.rx_in).max(length_y.0 / shape.ry_in);

    let fe = PI * PI * material.e_ksi / (slenderness * slenderness);
    let inelastic = slenderness <= 4.71 * material.e_over_fy_sqrt();
    let fcr = if inelastic {
        0.658_f64.powf(material.fy_ksi / fe) * material.fy_ksi
    } else {
        0.877 * fe
    };
    let design_strength = PHI_COMPRESSION * fcr * shape.area_in2;

    AxialCapacity {
        slenderness,
        elastic_buckling_ksi: fe,
        critical_stress_ksi: fcr,
        design_strength_kips: design_strength,
        demand_capacity_ratio: demand.0 / design_strength,
        inelastic_buckling: inelastic,
    }
}

/// Results from a column hinge calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHingeResult {
    /// Label copied from the input
    pub label: String,

    /// Section used
    pub section: String,

    /// Axial strength and demand ratio
    pub axial: AxialCapacity,

    /// Regression output before the elastic correction
    pub regression: HingeRegression,

    /// Corrected hinge parameters
    pub hinge: PlasticHingeParameters,
}

/// Evaluate the column deterioration regressions for a resolved shape.
///
/// Fails with `NumericDomain` when the axial ratio reaches 1.0, where the
/// `(1 - P/Pc)` terms of the regressions are no longer defined.
pub fn regression(
    shape: &SteelShape,
    material: &SteelMaterial,
    length_x: Feet,
    axial: &AxialCapacity,
) -> ResilienceResult<HingeRegression> {
    let ratio = axial.demand_capacity_ratio;
    if !ratio.is_finite() || ratio >= 1.0 {
        return Err(ResilienceError::numeric_domain(
            "demand_capacity_ratio",
            ratio,
            "Axial demand reaches the buckling strength",
        ));
    }

    let length: Inches = length_x.into();
    let h_tw = shape.web_slenderness();
    let l_ry = length_x.0 / shape.ry_in;
    let reserve = 1.0 - ratio;

    let k0 = 6.0 * material.e_ksi * shape.ix_in4 / length.0;
    let myp = shape.zx_in3 * material.fy_ksi;

    let capping_ratio =
        (12.5 * h_tw.powf(-0.2) * (length.0 / shape.ry_in).powf(-0.4) * reserve.powf(0.4)).clamp(1.0, 1.3);

    let expected_myp = 1.15 * material.ry * myp;
    let my = if ratio <= 0.2 {
        expected_myp * (1.0 - 0.5 * ratio)
    } else {
        expected_myp * 9.0 / 8.0 * reserve
    };

    let lambda = if ratio <= 0.35 {
        25000.0 * h_tw.powf(-2.14) * l_ry.powf(-0.53) * reserve.powf(4.92)
    } else {
        268000.0 * h_tw.powf(-2.30) * l_ry.powf(-1.30) * reserve.powf(1.19)
    };

    let theta_p = (294.0 * h_tw.powf(-1.7) * l_ry.powf(-0.7) * reserve.powf(1.6)).min(COLUMN_MAX_PRE_CAPPING);
    let theta_pc = 90.0 * h_tw.powf(-0.8) * l_ry.powf(-0.8) * reserve.powf(2.5);

    Ok(HingeRegression {
        elastic_stiffness_kip_in: k0,
        plastic_moment_kip_in: myp,
        effective_yield_moment_kip_in: my,
        capping_ratio,
        reference_cumulative_rotation: lambda,
        pre_capping_rotation_raw: theta_p,
        post_capping_rotation_raw: theta_pc,
        residual_strength_ratio: 0.5 - 0.4 * ratio,
        ultimate_rotation: COLUMN_ULTIMATE_ROTATION,
    })
}

/// Calculate hinge parameters for a column whose shape is already resolved.
pub fn calculate_for_shape(input: &ColumnHingeInput, shape: &SteelShape) -> ResilienceResult<ColumnHingeResult> {
    input.validate()?;
    shape.validate()?;

    let length_x = Feet(input.unbraced_length_x_ft);
    let axial = axial_capacity(
        shape,
        &input.material,
        Kips(input.axial_demand_kips),
        length_x,
        Feet(input.unbraced_length_y_ft),
    );
    let regression = regression(shape, &input.material, length_x, &axial)?;
    let hinge = PlasticHingeParameters::from_regression(&regression)?;

    Ok(ColumnHingeResult {
        label: input.label.clone(),
        section: shape.label.clone(),
        axial,
        regression,
        hinge,
    })
}

/// Calculate hinge parameters for a column, looking its section up by label.
pub fn calculate(input: &ColumnHingeInput, shapes: &SteelShapeDb) -> ResilienceResult<ColumnHingeResult> {
    let shape = shapes.lookup(&input.section)?;
    calculate_for_shape(input, shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::builtin_shapes;

    fn w14_column(axial_demand_kips: f64) -> ColumnHingeInput {
        ColumnHingeInput {
            label: "C-1".to_string(),
            section: "W14X132".to_string(),
            axial_demand_kips,
            unbraced_length_x_ft: 13.0,
            unbraced_length_y_ft: 13.0,
            material: SteelMaterial::a992(),
        }
    }

    #[test]
    fn test_axial_capacity_inelastic() {
        let shape = builtin_shapes().lookup("W14X132").unwrap();
        let cap = axial_capacity(shape, &SteelMaterial::a992(), Kips(300.0), Feet(13.0), Feet(13.0));
        assert!((cap.slenderness - 13.0 / 3.76).abs() < 1e-12);
        assert!(cap.inelastic_buckling);
        assert!((cap.critical_stress_ksi - 49.956).abs() < 1e-3);
        assert!((cap.design_strength_kips - 1744.47).abs() < 0.01);
        assert!((cap.demand_capacity_ratio - 0.1720).abs() < 1e-3);
    }

    #[test]
    fn test_axial_capacity_elastic() {
        let shape = builtin_shapes().lookup("W14X48").unwrap();
        // 250 ft / 1.91 in -> KL/r = 131 > 113
        let cap = axial_capacity(shape, &SteelMaterial::a992(), Kips(10.0), Feet(250.0), Feet(250.0));
        assert!(!cap.inelastic_buckling);
        assert!((cap.critical_stress_ksi - 0.877 * cap.elastic_buckling_ksi).abs() < 1e-12);
    }

    #[test]
    fn test_low_axial_column() {
        let result = calculate(&w14_column(300.0), builtin_shapes()).unwrap();
        let ratio = result.axial.demand_capacity_ratio;
        let raw = result.regression;

        assert_eq!(raw.capping_ratio, 1.3);
        let expected_my = 1.15 * 1.1 * 234.0 * 50.0 * (1.0 - 0.5 * ratio);
        assert!((raw.effective_yield_moment_kip_in - expected_my).abs() < 1e-6);
        assert!((result.hinge.residual_strength_ratio - (0.5 - 0.4 * ratio)).abs() < 1e-15);
        assert_eq!(result.hinge.ultimate_rotation, 0.15);
        assert!((raw.reference_cumulative_rotation - 8.788).abs() < 0.01);
        assert_eq!(raw.pre_capping_rotation_raw, COLUMN_MAX_PRE_CAPPING);
        assert!((raw.post_capping_rotation_raw - 1.9258).abs() < 1e-3);
        assert!((raw.elastic_stiffness_kip_in - 6.0 * 29000.0 * 1530.0 / 156.0).abs() < 1e-6);
    }

    #[test]
    fn test_fits_take_length_in_feet_over_ry() {
        let shape = builtin_shapes().lookup("W14X132").unwrap();
        let material = SteelMaterial::a992();
        let axial = axial_capacity(shape, &material, Kips(300.0), Feet(13.0), Feet(13.0));
        let raw = regression(shape, &material, Feet(13.0), &axial).unwrap();

        let ratio = axial.demand_capacity_ratio;
        let h_tw = shape.web_slenderness();
        let l_ry_ft: f64 = 13.0 / 3.76;
        let l_ry_in: f64 = 156.0 / 3.76;
        let lambda = 25000.0 * h_tw.powf(-2.14) * l_ry_ft.powf(-0.53) * (1.0 - ratio).powf(4.92);
        let theta_pc = 90.0 * h_tw.powf(-0.8) * l_ry_ft.powf(-0.8) * (1.0 - ratio).powf(2.5);
        let mc_my = 12.5 * h_tw.powf(-0.2) * l_ry_in.powf(-0.4) * (1.0 - ratio).powf(0.4);
        assert!((raw.reference_cumulative_rotation - lambda).abs() < 1e-9);
        assert!((raw.post_capping_rotation_raw - theta_pc).abs() < 1e-12);
        assert_eq!(raw.capping_ratio, mc_my.clamp(1.0, 1.3));
    }

    #[test]
    fn test_high_axial_column_branches() {
        let result = calculate(&w14_column(900.0), builtin_shapes()).unwrap();
        let ratio = result.axial.demand_capacity_ratio;
        assert!(ratio > 0.35);

        let raw = result.regression;
        let expected_my = 1.15 * 1.1 * 234.0 * 50.0 * 9.0 / 8.0 * (1.0 - ratio);
        assert!((raw.effective_yield_moment_kip_in - expected_my).abs() < 1e-6);

        let h_tw: f64 = (14.7 - 2.0 * 1.03) / 0.645;
        let l_ry: f64 = 13.0 / 3.76;
        let expected_lambda = 268000.0 * h_tw.powf(-2.30) * l_ry.powf(-1.30) * (1.0 - ratio).powf(1.19);
        assert!((raw.reference_cumulative_rotation - expected_lambda).abs() < 1e-9);
    }

    #[test]
    fn test_capping_ratio_bounds() {
        for demand in [0.0, 300.0, 700.0, 1200.0] {
            let result = calculate(&w14_column(demand), builtin_shapes()).unwrap();
            let mc_my = result.regression.capping_ratio;
            assert!((1.0..=1.3).contains(&mc_my), "Mc/My = {}", mc_my);
        }
    }

    #[test]
    fn test_pre_capping_cap() {
        // Zero axial load on a stocky section drives the fit above 0.20
        let mut input = w14_column(0.0);
        input.section = "W14X257".to_string();
        let result = calculate(&input, builtin_shapes()).unwrap();
        assert_eq!(result.regression.pre_capping_rotation_raw, COLUMN_MAX_PRE_CAPPING);
        assert!(result.hinge.pre_capping_rotation < COLUMN_MAX_PRE_CAPPING);
    }

    #[test]
    fn test_pre_capping_correction_identity() {
        let result = calculate(&w14_column(300.0), builtin_shapes()).unwrap();
        let raw = result.regression;
        let recovered = result.hinge.pre_capping_rotation + raw.elastic_capping_rotation();
        assert!((recovered - raw.pre_capping_rotation_raw).abs() < 1e-14);
    }

    #[test]
    fn test_overloaded_column_is_domain_error() {
        let err = calculate(&w14_column(2000.0), builtin_shapes()).unwrap_err();
        assert_eq!(err.error_code(), "NUMERIC_DOMAIN");
    }

    #[test]
    fn test_negative_demand_rejected() {
        let err = calculate(&w14_column(-5.0), builtin_shapes()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
