//! # Materials
//!
//! Structural steel grade properties and the W-shape section database used
//! by the plastic-hinge calculators.
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::materials::SteelMaterial;
//!
//! let a992 = SteelMaterial::a992();
//! assert_eq!(a992.fy_ksi, 50.0);
//! assert!((a992.expected_yield_ksi() - 55.0).abs() < 1e-9);
//! ```

pub mod steel;

pub use steel::{builtin_shapes, SteelShape, SteelShapeDb};

use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};
use crate::units::{Ksi, Megapascals};

/// Structural steel grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteelMaterial {
    /// Grade designation (e.g., "A992")
    pub grade: SteelGrade,
    /// Specified minimum yield stress Fy (ksi)
    pub fy_ksi: f64,
    /// Specified minimum tensile strength Fu (ksi)
    pub fu_ksi: f64,
    /// Modulus of elasticity E (ksi)
    pub e_ksi: f64,
    /// Ratio of expected to specified yield stress
    pub ry: f64,
}

/// Steel grades with built-in properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteelGrade {
    A992,
    A572Gr50,
    A36,
}

impl SteelMaterial {
    /// ASTM A992 wide-flange steel (Fy = 50 ksi, Fu = 65 ksi, Ry = 1.1)
    pub fn a992() -> Self {
        Self::from_grade(SteelGrade::A992)
    }

    /// Material with the tabulated properties of a grade
    pub fn from_grade(grade: SteelGrade) -> Self {
        let (fy_ksi, fu_ksi, ry) = match grade {
            SteelGrade::A992 => (50.0, 65.0, 1.1),
            SteelGrade::A572Gr50 => (50.0, 65.0, 1.1),
            SteelGrade::A36 => (36.0, 58.0, 1.5),
        };
        SteelMaterial {
            grade,
            fy_ksi,
            fu_ksi,
            e_ksi: 29000.0,
            ry,
        }
    }

    /// Expected yield stress Ry * Fy (ksi)
    pub fn expected_yield_ksi(&self) -> f64 {
        self.ry * self.fy_ksi
    }

    /// Yield stress in MPa, the unit the deterioration regressions use
    pub fn fy_mpa(&self) -> Megapascals {
        Ksi(self.fy_ksi).into()
    }

    /// sqrt(E / Fy), the recurring slenderness scale
    pub fn e_over_fy_sqrt(&self) -> f64 {
        (self.e_ksi / self.fy_ksi).sqrt()
    }

    /// Validate that all properties are physically meaningful
    pub fn validate(&self) -> ResilienceResult<()> {
        for (field, value) in [
            ("fy_ksi", self.fy_ksi),
            ("fu_ksi", self.fu_ksi),
            ("e_ksi", self.e_ksi),
            ("ry", self.ry),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResilienceError::invalid_input(
                    field,
                    value.to_string(),
                    "Material property must be positive",
                ));
            }
        }
        if self.fu_ksi < self.fy_ksi {
            return Err(ResilienceError::invalid_input(
                "fu_ksi",
                self.fu_ksi.to_string(),
                "Tensile strength cannot be below yield stress",
            ));
        }
        Ok(())
    }
}

impl Default for SteelMaterial {
    fn default() -> Self {
        Self::a992()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a992_properties() {
        let m = SteelMaterial::a992();
        assert_eq!(m.fy_ksi, 50.0);
        assert_eq!(m.fu_ksi, 65.0);
        assert_eq!(m.e_ksi, 29000.0);
        assert_eq!(m.ry, 1.1);
        assert!(m.validate().is_ok());
        assert!((m.fy_mpa().0 - 344.75).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_material() {
        let mut m = SteelMaterial::a992();
        m.fy_ksi = 0.0;
        assert!(m.validate().is_err());

        let mut m = SteelMaterial::a992();
        m.fu_ksi = 40.0;
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_material_serialization() {
        let m = SteelMaterial::from_grade(SteelGrade::A36);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"A36\""));
        let roundtrip: SteelMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(m, roundtrip);
    }
}
