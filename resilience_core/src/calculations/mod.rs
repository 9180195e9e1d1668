//! # Member Calculations
//!
//! Plastic-hinge derivations for moment-frame members. Each calculation
//! follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input, shapes) -> ResilienceResult<*Result>` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`beam`] - RBS beam hinge with lateral bracing search
//! - [`column`] - Column hinge driven by the axial demand/capacity ratio
//! - [`frame`] - Every member of a planar frame at once

pub mod beam;
pub mod column;
pub mod frame;
pub mod hinge;

use serde::{Deserialize, Serialize};

use crate::errors::ResilienceResult;
use crate::materials::SteelShapeDb;

pub use beam::{BeamHingeInput, BeamHingeResult};
pub use column::{AxialCapacity, ColumnHingeInput, ColumnHingeResult};
pub use frame::{FrameHinges, FrameLayout};
pub use hinge::{HingeRegression, PlasticHingeParameters};

/// Enum wrapper for a single member calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MemberItem {
    /// Frame beam
    Beam(BeamHingeInput),
    /// Frame column
    Column(ColumnHingeInput),
}

impl MemberItem {
    /// Get the user-provided label for this member
    pub fn label(&self) -> &str {
        match self {
            MemberItem::Beam(b) => &b.label,
            MemberItem::Column(c) => &c.label,
        }
    }

    /// Get the member type as a string
    pub fn member_type(&self) -> &'static str {
        match self {
            MemberItem::Beam(_) => "Beam",
            MemberItem::Column(_) => "Column",
        }
    }

    /// Derive the hinge parameters of this member.
    pub fn hinge(&self, shapes: &SteelShapeDb) -> ResilienceResult<PlasticHingeParameters> {
        match self {
            MemberItem::Beam(b) => beam::calculate(b, shapes).map(|r| r.hinge),
            MemberItem::Column(c) => column::calculate(c, shapes).map(|r| r.hinge),
        }
    }
}
