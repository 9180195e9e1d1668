//! # Unit Types
//!
//! Newtype wrappers for the handful of units the hinge regressions and the
//! loss engine pass around. They serialize as bare numbers.
//!
//! The deterioration-model regressions were calibrated in SI (mm, MPa) while
//! section tables are in US customary units, so the SI conversions live here
//! rather than as loose constants inside the formulas.
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::units::{Feet, Inches, Ksi, Megapascals, Millimeters};
//!
//! let span = Feet(30.0);
//! let span_in: Inches = span.into();
//! assert_eq!(span_in.0, 360.0);
//!
//! let depth: Millimeters = Inches(10.0).into();
//! assert!((depth.0 - 254.0).abs() < 1e-9);
//!
//! let fy: Megapascals = Ksi(50.0).into();
//! assert!((fy.0 - 344.75).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Millimeters per inch
pub const MM_PER_IN: f64 = 25.4;

/// Megapascals per ksi (rounded the way the regressions were fitted)
pub const MPA_PER_KSI: f64 = 6.895;

// ============================================================================
// Length Units
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Feet> for Inches {
    fn from(ft: Feet) -> Self {
        Inches(ft.0 * 12.0)
    }
}

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / 12.0)
    }
}

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MM_PER_IN)
    }
}

// ============================================================================
// Force / Stress Units
// ============================================================================

/// Force in kips
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kips(pub f64);

/// Stress in kips per square inch (ksi)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ksi(pub f64);

/// Stress in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

impl From<Ksi> for Megapascals {
    fn from(ksi: Ksi) -> Self {
        Megapascals(ksi.0 * MPA_PER_KSI)
    }
}

// ============================================================================
// Moment / Rotation Units
// ============================================================================

/// Moment in kip-inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KipIn(pub f64);

/// Plastic rotation in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

// ============================================================================
// Demand Units
// ============================================================================

/// Acceleration as a fraction of gravity
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gravities(pub f64);

/// Standard gravity used for acceleration records (m/s^2)
pub const GRAVITY_M_S2: f64 = 9.8;

impl Gravities {
    /// Acceleration in m/s^2
    pub fn to_m_s2(self) -> f64 {
        self.0 * GRAVITY_M_S2
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Feet);
impl_arithmetic!(Inches);
impl_arithmetic!(Millimeters);
impl_arithmetic!(Kips);
impl_arithmetic!(Ksi);
impl_arithmetic!(Megapascals);
impl_arithmetic!(KipIn);
impl_arithmetic!(Radians);
impl_arithmetic!(Gravities);
