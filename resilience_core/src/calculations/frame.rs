//! # Frame Hinge Model
//!
//! Builds the hinge parameters of every beam and column of a planar moment
//! frame once, at model-build time. The structural solver consumes the
//! resulting [`FrameHinges`] read-only.
//!
//! Beams are addressed by `(level, bay)` and span one bay width; columns are
//! addressed by `(story, pier)` and span one story height with their gravity
//! axial demand.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::calculations::beam::{self, BeamHingeInput, BeamHingeResult};
use crate::calculations::column::{self, ColumnHingeInput, ColumnHingeResult};
use crate::errors::{ResilienceError, ResilienceResult};
use crate::materials::{SteelMaterial, SteelShapeDb};

/// Beam section at one level and bay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamPlacement {
    /// Floor level (1 = first elevated floor)
    pub level: usize,
    /// Bay index (0-based)
    pub bay: usize,
    /// W-shape label
    pub section: String,
}

/// Column section at one story and pier, with its gravity axial demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlacement {
    /// Story (1-based)
    pub story: usize,
    /// Pier line (0-based)
    pub pier: usize,
    /// W-shape label
    pub section: String,
    /// Axial compression demand magnitude (kips)
    pub axial_demand_kips: f64,
}

/// Geometry and member sizes of a planar moment frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLayout {
    /// Bay width (ft)
    pub bay_width_ft: f64,
    /// Story heights from the ground up (ft)
    pub story_heights_ft: Vec<f64>,
    /// Steel used for every member
    pub material: SteelMaterial,
    /// Beam placements
    pub beams: Vec<BeamPlacement>,
    /// Column placements
    pub columns: Vec<ColumnPlacement>,
}

impl FrameLayout {
    /// Three-story, three-bay office frame with 30 ft bays and 13 ft stories.
    pub fn three_story_office() -> Self {
        let beam_sections = ["W24X94", "W24X94", "W21X62"];
        let column_sections = ["W14X132", "W14X132", "W14X90"];
        // (exterior, interior) gravity demand per story, kips
        let axial = [(310.0, 520.0), (205.0, 345.0), (100.0, 170.0)];

        let mut beams = Vec::new();
        for (i, section) in beam_sections.iter().enumerate() {
            for bay in 0..3 {
                beams.push(BeamPlacement {
                    level: i + 1,
                    bay,
                    section: section.to_string(),
                });
            }
        }

        let mut columns = Vec::new();
        for (i, section) in column_sections.iter().enumerate() {
            let (exterior, interior) = axial[i];
            for pier in 0..4 {
                columns.push(ColumnPlacement {
                    story: i + 1,
                    pier,
                    section: section.to_string(),
                    axial_demand_kips: if pier == 0 || pier == 3 { exterior } else { interior },
                });
            }
        }

        FrameLayout {
            bay_width_ft: 30.0,
            story_heights_ft: vec![13.0; 3],
            material: SteelMaterial::a992(),
            beams,
            columns,
        }
    }

    /// Number of stories
    pub fn stories(&self) -> usize {
        self.story_heights_ft.len()
    }

    /// Validate geometry and placement indices.
    pub fn validate(&self) -> ResilienceResult<()> {
        if !self.bay_width_ft.is_finite() || self.bay_width_ft <= 0.0 {
            return Err(ResilienceError::invalid_input(
                "bay_width_ft",
                self.bay_width_ft.to_string(),
                "Bay width must be positive",
            ));
        }
        if self.story_heights_ft.is_empty() {
            return Err(ResilienceError::invalid_input("story_heights_ft", "[]", "Frame needs at least one story"));
        }
        if let Some(h) = self.story_heights_ft.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(ResilienceError::invalid_input(
                "story_heights_ft",
                h.to_string(),
                "Story height must be positive",
            ));
        }
        let stories = self.stories();
        if let Some(b) = self.beams.iter().find(|b| b.level == 0 || b.level > stories) {
            return Err(ResilienceError::invalid_input(
                "beams.level",
                b.level.to_string(),
                format!("Level must be within 1..={}", stories),
            ));
        }
        if let Some(c) = self.columns.iter().find(|c| c.story == 0 || c.story > stories) {
            return Err(ResilienceError::invalid_input(
                "columns.story",
                c.story.to_string(),
                format!("Story must be within 1..={}", stories),
            ));
        }
        Ok(())
    }
}

/// Hinge parameters of every member in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameHinges {
    /// Beam results in placement order
    pub beams: Vec<BeamHingeResult>,
    /// Column results in placement order
    pub columns: Vec<ColumnHingeResult>,
}

impl FrameHinges {
    /// Derive hinge parameters for all members of a layout.
    ///
    /// Fails fast on the first unknown section label.
    pub fn build(layout: &FrameLayout, shapes: &SteelShapeDb) -> ResilienceResult<Self> {
        layout.validate()?;

        let beams = layout
            .beams
            .iter()
            .map(|b| {
                let input = BeamHingeInput {
                    label: beam_label(b.level, b.bay),
                    section: b.section.clone(),
                    span_ft: layout.bay_width_ft,
                    material: layout.material,
                };
                beam::calculate(&input, shapes)
            })
            .collect::<ResilienceResult<Vec<_>>>()?;

        let columns = layout
            .columns
            .iter()
            .map(|c| {
                let height = layout.story_heights_ft[c.story - 1];
                let input = ColumnHingeInput {
                    label: column_label(c.story, c.pier),
                    section: c.section.clone(),
                    axial_demand_kips: c.axial_demand_kips,
                    unbraced_length_x_ft: height,
                    unbraced_length_y_ft: height,
                    material: layout.material,
                };
                column::calculate(&input, shapes)
            })
            .collect::<ResilienceResult<Vec<_>>>()?;

        debug!("Built hinges for {} beams and {} columns", beams.len(), columns.len());
        Ok(FrameHinges { beams, columns })
    }

    /// Beam hinge at a level and bay
    pub fn beam(&self, level: usize, bay: usize) -> Option<&BeamHingeResult> {
        let label = beam_label(level, bay);
        self.beams.iter().find(|b| b.label == label)
    }

    /// Column hinge at a story and pier
    pub fn column(&self, story: usize, pier: usize) -> Option<&ColumnHingeResult> {
        let label = column_label(story, pier);
        self.columns.iter().find(|c| c.label == label)
    }
}

fn beam_label(level: usize, bay: usize) -> String {
    format!("B-L{}-{}", level, bay)
}

fn column_label(story: usize, pier: usize) -> String {
    format!("C-S{}-P{}", story, pier)
}
