//! # Study Data Structures
//!
//! The `Study` struct is the root container of one loss assessment.
//! Studies serialize to `.rsa` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Study
//! ├── meta: StudyMetadata (version, analyst, study id, timestamps)
//! ├── settings: AssessmentSettings (realizations, thresholds, seeds)
//! ├── frame: Option<FrameLayout> (member sizes of the analysed frame)
//! └── samples: HashMap<Uuid, SampleRecord> (one record per assessed sample)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use resilience_core::study::Study;
//!
//! let study = Study::new("Jane Analyst", "RSA-042");
//! let json = serde_json::to_string_pretty(&study).unwrap();
//! assert!(json.contains("RSA-042"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::SampleRecord;
use crate::calculations::FrameLayout;
use crate::errors::{ResilienceError, ResilienceResult};
use crate::loss::outcome::SummaryStatistic;

/// Current schema version for .rsa files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root study container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    /// Study metadata (version, analyst, identifiers)
    pub meta: StudyMetadata,

    /// Monte Carlo and threshold settings
    pub settings: AssessmentSettings,

    /// Frame the hinge parameters were derived for
    #[serde(default)]
    pub frame: Option<FrameLayout>,

    /// Assessed samples, keyed by UUID
    pub samples: HashMap<Uuid, SampleRecord>,
}

impl Study {
    /// Create a new empty study with default settings.
    pub fn new(analyst: impl Into<String>, study_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Study {
            meta: StudyMetadata {
                version: SCHEMA_VERSION.to_string(),
                analyst: analyst.into(),
                study_id: study_id.into(),
                created: now,
                modified: now,
            },
            settings: AssessmentSettings::default(),
            frame: None,
            samples: HashMap::new(),
        }
    }

    /// Add a sample record; returns its UUID.
    pub fn add_sample(&mut self, record: SampleRecord) -> Uuid {
        let id = Uuid::new_v4();
        self.samples.insert(id, record);
        self.touch();
        id
    }

    /// Remove a sample record by UUID.
    pub fn remove_sample(&mut self, id: &Uuid) -> Option<SampleRecord> {
        let record = self.samples.remove(id);
        if record.is_some() {
            self.touch();
        }
        record
    }

    pub fn get_sample(&self, id: &Uuid) -> Option<&SampleRecord> {
        self.samples.get(id)
    }

    /// Records ordered by sample index
    pub fn ordered_samples(&self) -> Vec<&SampleRecord> {
        let mut records: Vec<&SampleRecord> = self.samples.values().collect();
        records.sort_by_key(|r| r.index);
        records
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for Study {
    fn default() -> Self {
        Study::new("", "")
    }
}

/// Study metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible analyst
    pub analyst: String,

    /// Study identifier
    pub study_id: String,

    /// When the study was created
    pub created: DateTime<Utc>,

    /// When the study was last modified
    pub modified: DateTime<Utc>,
}

/// Monte Carlo and threshold settings of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentSettings {
    /// Realizations per loss evaluation
    pub n_realizations: usize,

    /// Realizations of the worst-case run behind the replacement cost
    pub worst_case_realizations: usize,

    /// Story drift at or above which the building has collapsed
    pub collapse_drift_threshold: f64,

    /// Statistic reported per sample
    pub statistic: SummaryStatistic,

    /// Seed of sample 0; sample i uses `base_seed + i`
    pub base_seed: u64,

    /// Ground-motion and analysis time step (s)
    pub time_step: f64,

    /// Number of stories
    pub stories: usize,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        AssessmentSettings {
            n_realizations: 1000,
            worst_case_realizations: 1000,
            collapse_drift_threshold: 0.10,
            statistic: SummaryStatistic::Mean,
            base_seed: 1,
            time_step: 0.01,
            stories: 3,
        }
    }
}

impl AssessmentSettings {
    pub fn validate(&self) -> ResilienceResult<()> {
        if self.n_realizations == 0 {
            return Err(ResilienceError::invalid_input("n_realizations", "0", "At least one realization is required"));
        }
        if self.worst_case_realizations == 0 {
            return Err(ResilienceError::invalid_input(
                "worst_case_realizations",
                "0",
                "At least one realization is required",
            ));
        }
        if !self.collapse_drift_threshold.is_finite() || self.collapse_drift_threshold <= 0.0 {
            return Err(ResilienceError::invalid_input(
                "collapse_drift_threshold",
                self.collapse_drift_threshold.to_string(),
                "Threshold must be positive",
            ));
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ResilienceError::invalid_input(
                "time_step",
                self.time_step.to_string(),
                "Time step must be positive",
            ));
        }
        if self.stories == 0 {
            return Err(ResilienceError::invalid_input("stories", "0", "At least one story is required"));
        }
        Ok(())
    }
}
