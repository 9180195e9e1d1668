//! # resilience_core - Seismic Resilience Loss Engine
//!
//! `resilience_core` assesses the earthquake losses of a steel moment-frame
//! building. Synthetic ground motions drive a nonlinear structural model;
//! the resulting drifts, floor accelerations and residual drift are turned
//! into a probabilistic repair or replacement cost by a component-based
//! fragility and consequence model.
//!
//! ## Design Philosophy
//!
//! - **Seeded**: all randomness flows through one explicitly passed [`LossRng`]
//! - **JSON-First**: inputs, results and studies implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Pluggable**: the ground-motion generator and the structural solver are traits
//!
//! ## Quick Start
//!
//! ```rust
//! use resilience_core::demand::DemandVector;
//! use resilience_core::fragility::FragilityCatalog;
//! use resilience_core::loss::{ConsequenceParameters, LossRng, ResilienceOutcomeModel};
//! use resilience_core::study::AssessmentSettings;
//!
//! let mut rng = LossRng::from_seed_u64(7);
//! let settings = AssessmentSettings { worst_case_realizations: 100, ..Default::default() };
//! let model = ResilienceOutcomeModel::new(
//!     FragilityCatalog::default(),
//!     ConsequenceParameters::default(),
//!     &settings,
//!     &mut rng,
//! )
//! .unwrap();
//!
//! let demand = DemandVector::zero(3);
//! let outcome = model.evaluate(&demand, 100, &mut rng).unwrap();
//! assert_eq!(outcome.summary, 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Plastic-hinge parameters of beams, columns and frames
//! - [`fragility`] - Component fragility catalog
//! - [`loss`] - Repair-cost simulation and the resilience outcome model
//! - [`assessment`] - Collaborator traits and per-sample orchestration
//! - [`parameters`] - The uncertain input parameters
//! - [`ground_motion`] - Acceleration records and intensity measures
//! - [`study`] - Study container and settings
//! - [`file_io`] - File operations with atomic saves and locking

pub mod assessment;
pub mod calculations;
pub mod demand;
pub mod errors;
pub mod file_io;
pub mod fragility;
pub mod ground_motion;
pub mod loss;
pub mod materials;
pub mod parameters;
pub mod stats;
pub mod study;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use assessment::{
    AnalysisSettings, BatchSummary, GroundMotionGenerator, ResilienceAssessment, SampleRecord, StructuralSolver,
};
pub use demand::DemandVector;
pub use errors::{ResilienceError, ResilienceResult};
pub use file_io::{load_study, save_study, StudyLock};
pub use fragility::{CatalogMultipliers, FragilityCatalog};
pub use loss::{LossRng, RepairCostEngine, ResilienceOutcomeModel};
pub use parameters::UncertainParameters;
pub use study::{AssessmentSettings, Study, StudyMetadata};
