//! # Beam Hinge Calculation
//!
//! Plastic-hinge parameters for a moment-frame beam with reduced beam
//! section connections, with no axial load.
//!
//! ## Procedure
//!
//! 1. Lateral bracing: add braces (starting from one) until the spacing
//!    `L/(n+1)` satisfies both the highly-ductile member limit
//!    `0.086 ry E/Fy` (converted to ft) and the plastic-moment limit
//!    `Lp = 1.76 ry sqrt(E/Fy)`. `Lp` is compared as its inch value
//!    against the spacing in feet, so it only binds on very long spans.
//! 2. Stiffness and strength: `K0 = 6EIx/L`, `Myp = Zx Fy`, `My = Myp`.
//! 3. Deterioration regressions for Lambda, theta_p and theta_pc as functions
//!    of h/tw, bf/2tf, Lb/ry, L/d, depth and Fy, with `Mc/My = 1.10`.
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::calculations::beam::{calculate, BeamHingeInput};
//! use resilience_core::materials::{builtin_shapes, SteelMaterial};
//!
//! let input = BeamHingeInput {
//!     label: "B-1".to_string(),
//!     section: "W24X94".to_string(),
//!     span_ft: 30.0,
//!     material: SteelMaterial::a992(),
//! };
//! let result = calculate(&input, builtin_shapes()).unwrap();
//! assert_eq!(result.lateral_supports, 3);
//! assert!(result.hinge.pre_capping_rotation > 0.0);
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calculations::hinge::{HingeRegression, PlasticHingeParameters};
use crate::errors::{ResilienceError, ResilienceResult};
use crate::materials::{SteelMaterial, SteelShape, SteelShapeDb};
use crate::units::{Feet, Inches, Megapascals, Millimeters};

/// Capping-to-yield moment ratio for RBS beams
pub const BEAM_CAPPING_RATIO: f64 = 1.10;

/// Residual strength ratio for beams
pub const BEAM_RESIDUAL_STRENGTH: f64 = 0.40;

/// Ultimate rotation for beams (rad)
pub const BEAM_ULTIMATE_ROTATION: f64 = 0.20;

/// Input parameters for a frame beam.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "B-L2-1",
///   "section": "W24X94",
///   "span_ft": 30.0,
///   "material": { "grade": "A992", "fy_ksi": 50.0, "fu_ksi": 65.0, "e_ksi": 29000.0, "ry": 1.1 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamHingeInput {
    /// User label for this beam
    pub label: String,

    /// W-shape label (e.g., "W24X94")
    pub section: String,

    /// Beam span in feet (bay width)
    pub span_ft: f64,

    /// Steel material
    pub material: SteelMaterial,
}

impl BeamHingeInput {
    /// Validate input parameters.
    pub fn validate(&self) -> ResilienceResult<()> {
        if !self.span_ft.is_finite() || self.span_ft <= 0.0 {
            return Err(ResilienceError::invalid_input(
                "span_ft",
                self.span_ft.to_string(),
                "Span must be positive",
            ));
        }
        self.material.validate()
    }
}

/// Results from a beam hinge calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamHingeResult {
    /// Label copied from the input
    pub label: String,

    /// Section used
    pub section: String,

    /// Number of lateral braces along the span
    pub lateral_supports: u32,

    /// Unbraced length between braces Lb (ft)
    pub bracing_spacing_ft: f64,

    /// Regression output before the elastic correction
    pub regression: HingeRegression,

    /// Corrected hinge parameters
    pub hinge: PlasticHingeParameters,
}

/// Outcome of the lateral bracing search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralBracing {
    /// Number of braces
    pub supports: u32,
    /// Spacing L/(n+1)
    pub spacing: Feet,
}

/// Find the smallest number of lateral braces satisfying both spacing limits.
pub fn lateral_bracing(span: Feet, shape: &SteelShape, material: &SteelMaterial) -> LateralBracing {
    let ry = Inches(shape.ry_in);
    let ductile_limit: Feet = (ry * (0.086 * material.e_ksi / material.fy_ksi)).into();
    // Lp keeps its inch value
    let plastic_limit = Feet((ry * (1.76 * material.e_over_fy_sqrt())).0);

    let mut supports: u32 = 1;
    for limit in [ductile_limit, plastic_limit] {
        while span / f64::from(supports + 1) > limit {
            supports += 1;
        }
    }

    let bracing = LateralBracing {
        supports,
        spacing: span / f64::from(supports + 1),
    };
    debug!(
        "{}: {} lateral supports at {:.2} ft (ductile limit {:.2} ft, Lp {:.2})",
        shape.label, bracing.supports, bracing.spacing.0, ductile_limit.0, plastic_limit.0
    );
    bracing
}

/// Evaluate the beam deterioration regressions for a resolved shape.
pub fn regression(span: Feet, shape: &SteelShape, material: &SteelMaterial, bracing: &LateralBracing) -> HingeRegression {
    let length: Inches = span.into();
    let lb: Inches = bracing.spacing.into();
    let depth_mm: Millimeters = Inches(shape.depth_in).into();
    let fy_mpa: Megapascals = material.fy_mpa();

    let h_tw = shape.web_slenderness();
    let bf_2tf = shape.flange_slenderness();
    let lb_ry = lb.0 / shape.ry_in;
    let l_d = length.0 / shape.depth_in;
    let depth_ratio = depth_mm.0 / 533.0;
    let fy_ratio = fy_mpa.0 / 355.0;

    let k0 = 6.0 * material.e_ksi * shape.ix_in4 / length.0;
    let myp = shape.zx_in3 * material.fy_ksi;

    let lambda = 585.0
        * h_tw.powf(-1.14)
        * bf_2tf.powf(-0.632)
        * lb_ry.powf(-0.205)
        * fy_ratio.powf(-0.391);

    let theta_p = 0.19
        * h_tw.powf(-0.314)
        * bf_2tf.powf(-0.100)
        * lb_ry.powf(-0.185)
        * l_d.powf(0.113)
        * depth_ratio.powf(-0.760)
        * fy_ratio.powf(-0.070);

    let theta_pc = 9.52
        * h_tw.powf(-0.513)
        * bf_2tf.powf(-0.863)
        * lb_ry.powf(-0.108)
        * fy_ratio.powf(-0.360);

    HingeRegression {
        elastic_stiffness_kip_in: k0,
        plastic_moment_kip_in: myp,
        effective_yield_moment_kip_in: myp,
        capping_ratio: BEAM_CAPPING_RATIO,
        reference_cumulative_rotation: lambda,
        pre_capping_rotation_raw: theta_p,
        post_capping_rotation_raw: theta_pc,
        residual_strength_ratio: BEAM_RESIDUAL_STRENGTH,
        ultimate_rotation: BEAM_ULTIMATE_ROTATION,
    }
}

/// Calculate hinge parameters for a beam whose shape is already resolved.
pub fn calculate_for_shape(input: &BeamHingeInput, shape: &SteelShape) -> ResilienceResult<BeamHingeResult> {
    input.validate()?;
    shape.validate()?;

    let span = Feet(input.span_ft);
    let bracing = lateral_bracing(span, shape, &input.material);
    let regression = regression(span, shape, &input.material, &bracing);
    let hinge = PlasticHingeParameters::from_regression(&regression)?;

    Ok(BeamHingeResult {
        label: input.label.clone(),
        section: shape.label.clone(),
        lateral_supports: bracing.supports,
        bracing_spacing_ft: bracing.spacing.0,
        regression,
        hinge,
    })
}

/// Calculate hinge parameters for a beam, looking its section up by label.
///
/// # Returns
///
/// * `Ok(BeamHingeResult)` - Bracing layout and hinge parameters
/// * `Err(ResilienceError::DataLookup)` - Section label not in the database
/// * `Err(ResilienceError::InvalidInput)` - Non-positive span or material property
pub fn calculate(input: &BeamHingeInput, shapes: &SteelShapeDb) -> ResilienceResult<BeamHingeResult> {
    let shape = shapes.lookup(&input.section)?;
    calculate_for_shape(input, shape)
}
