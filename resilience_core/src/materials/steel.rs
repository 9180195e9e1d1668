//! W-Shape Section Database
//!
//! Wide-flange section properties needed by the plastic-hinge regressions,
//! keyed by AISC manual label. A built-in table covers the moment-frame
//! sizes used by the demo building; a full table can be loaded from a CSV
//! export of the AISC shapes database.
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::materials::builtin_shapes;
//!
//! let w24 = builtin_shapes().lookup("W24X94").unwrap();
//! assert_eq!(w24.zx_in3, 254.0);
//! assert!(builtin_shapes().lookup("W99X1").is_err());
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::{ResilienceError, ResilienceResult};

const TABLE_NAME: &str = "W-shape database";

/// Wide-flange section properties (US customary units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelShape {
    /// AISC Manual label (e.g., "W24X94")
    pub label: String,
    /// Nominal weight (lb/ft)
    pub weight_plf: f64,
    /// Cross-sectional area (in²)
    pub area_in2: f64,
    /// Overall depth d (in)
    pub depth_in: f64,
    /// Flange width bf (in)
    pub bf_in: f64,
    /// Flange thickness tf (in)
    pub tf_in: f64,
    /// Web thickness tw (in)
    pub tw_in: f64,
    /// Strong-axis moment of inertia (in⁴)
    pub ix_in4: f64,
    /// Strong-axis elastic section modulus (in³)
    pub sx_in3: f64,
    /// Strong-axis radius of gyration (in)
    pub rx_in: f64,
    /// Strong-axis plastic section modulus (in³)
    pub zx_in3: f64,
    /// Weak-axis moment of inertia (in⁴)
    pub iy_in4: f64,
    /// Weak-axis radius of gyration (in)
    pub ry_in: f64,
}

impl SteelShape {
    /// Clear web height between flanges, d - 2tf (in)
    pub fn web_height_in(&self) -> f64 {
        self.depth_in - 2.0 * self.tf_in
    }

    /// Web slenderness h / tw
    pub fn web_slenderness(&self) -> f64 {
        self.web_height_in() / self.tw_in
    }

    /// Flange slenderness bf / 2tf
    pub fn flange_slenderness(&self) -> f64 {
        self.bf_in / (2.0 * self.tf_in)
    }

    /// Check that every property used by the hinge regressions is positive.
    pub fn validate(&self) -> ResilienceResult<()> {
        for (field, value) in [
            ("area_in2", self.area_in2),
            ("depth_in", self.depth_in),
            ("bf_in", self.bf_in),
            ("tf_in", self.tf_in),
            ("tw_in", self.tw_in),
            ("ix_in4", self.ix_in4),
            ("rx_in", self.rx_in),
            ("zx_in3", self.zx_in3),
            ("ry_in", self.ry_in),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResilienceError::invalid_input(
                    format!("{}.{}", self.label, field),
                    value.to_string(),
                    "Section property must be positive",
                ));
            }
        }
        if self.web_height_in() <= 0.0 {
            return Err(ResilienceError::invalid_input(
                format!("{}.tf_in", self.label),
                self.tf_in.to_string(),
                "Flanges leave no web height",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for SteelShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (A={:.2} in², Ix={:.0} in⁴, Zx={:.1} in³)",
            self.label, self.area_in2, self.ix_in4, self.zx_in3
        )
    }
}

/// In-memory W-shape table indexed by uppercase label.
#[derive(Debug, Clone, Default)]
pub struct SteelShapeDb {
    shapes: HashMap<String, SteelShape>,
    /// Table provenance (e.g., "builtin-moment-frame")
    pub version: Option<String>,
}

impl SteelShapeDb {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Load W-shapes from a CSV export of the AISC shapes database.
    ///
    /// Rows whose `Type` column is present and not `W` are skipped. The label
    /// column may be named `AISC_Manual_Label` or `Section`.
    pub fn load_from_csv(path: &str) -> ResilienceResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ResilienceError::file_error("open", path, format!("Failed to open CSV: {}", e)))?;
        Self::parse_csv(&contents).map_err(|e| match e {
            ResilienceError::InvalidInput { reason, .. } => ResilienceError::file_error("parse", path, reason),
            other => other,
        })
    }

    /// Parse W-shapes from CSV text (see [`SteelShapeDb::load_from_csv`]).
    pub fn parse_csv(contents: &str) -> ResilienceResult<Self> {
        let mut lines = contents.lines();
        let header_line = lines
            .next()
            .ok_or_else(|| ResilienceError::invalid_input("csv", "", "CSV is empty"))?;

        let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();
        let col_index = |name: &str| -> Option<usize> { headers.iter().position(|h| h.eq_ignore_ascii_case(name)) };
        let required = |name: &str| -> ResilienceResult<usize> {
            col_index(name)
                .ok_or_else(|| ResilienceError::invalid_input("csv", name, format!("Missing '{}' column", name)))
        };

        let type_idx = col_index("Type");
        let label_idx = col_index("AISC_Manual_Label")
            .or_else(|| col_index("Section"))
            .ok_or_else(|| ResilienceError::invalid_input("csv", "label", "Missing 'AISC_Manual_Label' column"))?;
        let w_idx = col_index("W");
        let a_idx = required("A")?;
        let d_idx = required("d")?;
        let bf_idx = required("bf")?;
        let tf_idx = required("tf")?;
        let tw_idx = required("tw")?;
        let ix_idx = required("Ix")?;
        let sx_idx = col_index("Sx");
        let rx_idx = required("rx")?;
        let zx_idx = required("Zx")?;
        let iy_idx = col_index("Iy");
        let ry_idx = required("ry")?;

        let mut db = SteelShapeDb::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();

            if let Some(i) = type_idx {
                if !fields.get(i).is_some_and(|t| t.trim().eq_ignore_ascii_case("W")) {
                    continue;
                }
            }
            let label = fields.get(label_idx).map(|s| s.trim()).unwrap_or("");
            if label.is_empty() {
                continue;
            }

            let get = |idx: usize| fields.get(idx).and_then(|v| parse_optional_f64(v)).unwrap_or(0.0);
            let get_opt = |idx: Option<usize>| idx.map(get).unwrap_or(0.0);

            db.insert(SteelShape {
                label: label.to_string(),
                weight_plf: get_opt(w_idx),
                area_in2: get(a_idx),
                depth_in: get(d_idx),
                bf_in: get(bf_idx),
                tf_in: get(tf_idx),
                tw_in: get(tw_idx),
                ix_in4: get(ix_idx),
                sx_in3: get_opt(sx_idx),
                rx_in: get(rx_idx),
                zx_in3: get(zx_idx),
                iy_in4: get_opt(iy_idx),
                ry_in: get(ry_idx),
            });
        }
        Ok(db)
    }

    /// Insert a shape, replacing any shape with the same label
    pub fn insert(&mut self, shape: SteelShape) {
        self.shapes.insert(shape.label.to_uppercase(), shape);
    }

    /// Look up a shape by its AISC label (case-insensitive).
    pub fn lookup(&self, label: &str) -> ResilienceResult<&SteelShape> {
        self.shapes
            .get(&label.trim().to_uppercase())
            .ok_or_else(|| ResilienceError::data_lookup(TABLE_NAME, label))
    }

    /// Shapes whose label starts with `pattern` (e.g., "W14")
    pub fn search(&self, pattern: &str) -> Vec<&SteelShape> {
        let pattern_upper = pattern.to_uppercase();
        let mut found: Vec<&SteelShape> = self
            .shapes
            .iter()
            .filter(|(k, _)| k.starts_with(&pattern_upper))
            .map(|(_, v)| v)
            .collect();
        found.sort_by(|a, b| a.label.cmp(&b.label));
        found
    }

    /// Number of shapes in the database
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Returns None for empty strings, dashes, or invalid numbers.
fn parse_optional_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "—" {
        return None;
    }
    f64::from_str(trimmed).ok()
}

// ============================================================================
// Built-in Moment-Frame Shapes
// ============================================================================

static BUILTIN: Lazy<SteelShapeDb> = Lazy::new(|| {
    // (label, W, A, d, bf, tf, tw, Ix, Sx, rx, Zx, Iy, ry)
    let rows = [
        ("W14X48", 48.0, 14.1, 13.8, 8.03, 0.595, 0.340, 484.0, 70.2, 5.85, 78.4, 51.4, 1.91),
        ("W14X90", 90.0, 26.5, 14.0, 14.5, 0.710, 0.440, 999.0, 143.0, 6.14, 157.0, 362.0, 3.70),
        ("W14X132", 132.0, 38.8, 14.7, 14.7, 1.03, 0.645, 1530.0, 209.0, 6.28, 234.0, 548.0, 3.76),
        ("W14X233", 233.0, 68.5, 16.0, 15.9, 1.72, 1.07, 3010.0, 375.0, 6.63, 436.0, 1150.0, 4.10),
        ("W14X257", 257.0, 75.6, 16.4, 16.0, 1.89, 1.18, 3400.0, 415.0, 6.71, 487.0, 1290.0, 4.13),
        ("W12X96", 96.0, 28.2, 12.7, 12.2, 0.900, 0.550, 833.0, 131.0, 5.44, 147.0, 270.0, 3.09),
        ("W18X71", 71.0, 20.9, 18.5, 7.64, 0.810, 0.495, 1170.0, 127.0, 7.50, 146.0, 60.3, 1.70),
        ("W21X62", 62.0, 18.3, 21.0, 8.24, 0.615, 0.400, 1330.0, 127.0, 8.54, 144.0, 57.5, 1.77),
        ("W24X76", 76.0, 22.4, 23.9, 8.99, 0.680, 0.440, 2100.0, 176.0, 9.69, 200.0, 82.5, 1.92),
        ("W24X94", 94.0, 27.7, 24.3, 9.07, 0.875, 0.515, 2700.0, 222.0, 9.87, 254.0, 109.0, 1.98),
        ("W27X94", 94.0, 27.6, 26.9, 10.0, 0.745, 0.490, 3270.0, 243.0, 10.9, 278.0, 124.0, 2.12),
        ("W30X108", 108.0, 31.7, 29.8, 10.5, 0.760, 0.545, 4470.0, 299.0, 11.9, 346.0, 146.0, 2.15),
        ("W30X116", 116.0, 34.2, 30.0, 10.5, 0.850, 0.565, 4930.0, 329.0, 12.0, 378.0, 164.0, 2.19),
    ];

    let mut db = SteelShapeDb::new();
    for (label, w, a, d, bf, tf, tw, ix, sx, rx, zx, iy, ry) in rows {
        db.insert(SteelShape {
            label: label.to_string(),
            weight_plf: w,
            area_in2: a,
            depth_in: d,
            bf_in: bf,
            tf_in: tf,
            tw_in: tw,
            ix_in4: ix,
            sx_in3: sx,
            rx_in: rx,
            zx_in3: zx,
            iy_in4: iy,
            ry_in: ry,
        });
    }
    db.version = Some("builtin-moment-frame".to_string());
    db
});

/// Built-in table of W-shapes commonly used in low-rise moment frames.
pub fn builtin_shapes() -> &'static SteelShapeDb {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let db = builtin_shapes();
        assert_eq!(db.len(), 13);

        let w14 = db.lookup("W14X132").unwrap();
        assert_eq!(w14.area_in2, 38.8);
        assert!((w14.web_height_in() - 12.64).abs() < 1e-9);

        let lower = db.lookup("w14x132").unwrap();
        assert_eq!(w14.label, lower.label);
    }

    #[test]
    fn test_missing_shape_is_data_lookup() {
        let err = builtin_shapes().lookup("W44X999").unwrap_err();
        assert_eq!(err.error_code(), "DATA_LOOKUP");
    }

    #[test]
    fn test_slenderness_ratios() {
        let s = builtin_shapes().lookup("W24X94").unwrap();
        assert!((s.flange_slenderness() - 9.07 / 1.75).abs() < 1e-12);
        assert!((s.web_slenderness() - (24.3 - 1.75) / 0.515).abs() < 1e-12);
    }

    #[test]
    fn test_all_builtin_shapes_valid() {
        for s in builtin_shapes().search("W") {
            assert!(s.validate().is_ok(), "{} failed validation", s.label);
        }
    }

    #[test]
    fn test_search_sorted() {
        let found = builtin_shapes().search("W14");
        assert_eq!(found.len(), 5);
        assert!(found.windows(2).all(|w| w[0].label <= w[1].label));
    }

    #[test]
    fn test_parse_csv() {
        let csv = "Type,AISC_Manual_Label,W,A,d,bf,tf,tw,Ix,Sx,rx,Zx,Iy,ry\n\
                   W,W10X49,49,14.4,10.0,10.0,0.56,0.34,272,54.6,4.35,60.4,93.4,2.54\n\
                   HSS,HSS6X6X1/2,35.1,9.74,-,-,-,-,48.3,16.1,2.23,19.8,48.3,2.23\n\
                   \n";
        let db = SteelShapeDb::parse_csv(csv).unwrap();
        assert_eq!(db.len(), 1);
        let s = db.lookup("W10X49").unwrap();
        assert_eq!(s.zx_in3, 60.4);
        assert_eq!(s.ry_in, 2.54);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let csv = "AISC_Manual_Label,A,d\nW10X49,14.4,10.0\n";
        assert!(SteelShapeDb::parse_csv(csv).is_err());
    }

    #[test]
    fn test_parse_optional_f64() {
        assert_eq!(parse_optional_f64("123.45"), Some(123.45));
        assert_eq!(parse_optional_f64("  456  "), Some(456.0));
        assert_eq!(parse_optional_f64(""), None);
        assert_eq!(parse_optional_f64("-"), None);
        assert_eq!(parse_optional_f64("not a number"), None);
    }

    #[test]
    fn test_invalid_shape() {
        let mut s = builtin_shapes().lookup("W21X62").unwrap().clone();
        s.tw_in = 0.0;
        assert!(s.validate().is_err());
    }
}
