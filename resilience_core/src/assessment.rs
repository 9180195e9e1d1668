//! # Assessment Orchestration
//!
//! Runs the per-sample pipeline
//!
//! ```text
//! UncertainParameters ─► GroundMotionGenerator ─► StructuralSolver ─► DemandVector
//!                                                                        │
//!                 FragilityCatalog + ConsequenceParameters ─► ResilienceOutcomeModel ─► loss
//! ```
//!
//! The generator and the solver are external collaborators behind the
//! [`GroundMotionGenerator`] and [`StructuralSolver`] traits. A collaborator
//! failure invalidates only its own sample: the sample is kept as a
//! sentinel record with no demand and no loss, and batch statistics skip it.
//!
//! Sample `i` draws all of its randomness from a generator seeded with
//! `base_seed + i`, so any sample can be rerun on its own.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::demand::DemandVector;
use crate::errors::{ResilienceError, ResilienceResult};
use crate::fragility::FragilityCatalog;
use crate::ground_motion::{AriasSummary, GroundMotion, GroundMotionScenario};
use crate::loss::outcome::ResilienceOutcomeModel;
use crate::loss::sampling::LossRng;
use crate::parameters::UncertainParameters;
use crate::stats::{mean, median};
use crate::study::{AssessmentSettings, Study};

/// Settings handed to the structural solver for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Integration time step (s)
    pub time_step: f64,
    /// Multiplier on the seismic mass
    pub mass_multiplier: f64,
    /// Viscous damping ratio
    pub damping_ratio: f64,
}

/// Stochastic ground-motion simulation.
pub trait GroundMotionGenerator {
    fn generate(&self, scenario: &GroundMotionScenario, rng: &mut LossRng) -> ResilienceResult<GroundMotion>;
}

/// Nonlinear time-history analysis of the building model.
///
/// Returns the EDP vector `[IDR_1 .. IDR_s, PFA_0 .. PFA_s, RIDR]`. A
/// non-converged analysis reports [`ResilienceError::SolverNonConvergence`]
/// or returns a vector containing NaN.
pub trait StructuralSolver {
    fn run_nonlinear_history(&self, motion: &GroundMotion, settings: &AnalysisSettings) -> ResilienceResult<Vec<f64>>;
}

/// How a sample ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "details")]
pub enum SampleStatus {
    Completed,
    /// A collaborator failed; the sample carries no demand or loss
    Failed { code: String, reason: String },
}

/// Result of assessing one parameter sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Position of the sample in its batch
    pub index: usize,
    /// Seed the sample's random stream was built from
    pub seed: u64,
    pub parameters: UncertainParameters,
    pub status: SampleStatus,
    /// Demands reported by the solver; `None` for sentinel records
    pub demand: Option<DemandVector>,
    pub arias: Option<AriasSummary>,
    /// Reduced total loss; `None` for sentinel records
    pub loss: Option<f64>,
    pub collapse: bool,
    /// Rounded probability of demolition
    pub irreparable_probability: f64,
}

impl SampleRecord {
    fn sentinel(index: usize, seed: u64, parameters: UncertainParameters, error: &ResilienceError) -> Self {
        SampleRecord {
            index,
            seed,
            parameters,
            status: SampleStatus::Failed {
                code: error.error_code().to_string(),
                reason: error.to_string(),
            },
            demand: None,
            arias: None,
            loss: None,
            collapse: false,
            irreparable_probability: 0.0,
        }
    }

    /// True for a failed sample
    pub fn is_sentinel(&self) -> bool {
        !matches!(self.status, SampleStatus::Completed)
    }

    /// EDP row in solver layout; all NaN for a sentinel record.
    pub fn edp_row(&self, stories: usize) -> Vec<f64> {
        match &self.demand {
            Some(demand) => demand.to_edp_vec(),
            None => DemandVector::nan_sentinel(stories).to_edp_vec(),
        }
    }

    /// Loss, or NaN for a sentinel record
    pub fn loss_or_nan(&self) -> f64 {
        self.loss.unwrap_or(f64::NAN)
    }
}

/// Statistics over a batch of sample records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub samples: usize,
    pub completed: usize,
    pub failed: usize,
    pub collapsed: usize,
    /// Mean loss over completed samples
    pub mean_loss: Option<f64>,
    /// Median loss over completed samples
    pub median_loss: Option<f64>,
    /// Completed samples whose loss was the replacement cost by collapse,
    /// as a share of completed samples
    pub collapse_rate: Option<f64>,
}

impl BatchSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SampleRecord>) -> Self {
        let mut samples = 0;
        let mut collapsed = 0;
        let mut losses = Vec::new();
        for record in records {
            samples += 1;
            if let Some(loss) = record.loss {
                losses.push(loss);
                if record.collapse {
                    collapsed += 1;
                }
            }
        }
        let completed = losses.len();
        BatchSummary {
            samples,
            completed,
            failed: samples - completed,
            collapsed,
            mean_loss: mean(&losses),
            median_loss: median(&losses),
            collapse_rate: (completed > 0).then(|| collapsed as f64 / completed as f64),
        }
    }
}

/// Drives the generator, the solver and the loss model over parameter samples.
pub struct ResilienceAssessment<'a, G: GroundMotionGenerator, S: StructuralSolver> {
    generator: &'a G,
    solver: &'a S,
    settings: AssessmentSettings,
}

impl<'a, G: GroundMotionGenerator, S: StructuralSolver> ResilienceAssessment<'a, G, S> {
    pub fn new(generator: &'a G, solver: &'a S, settings: AssessmentSettings) -> ResilienceResult<Self> {
        settings.validate()?;
        Ok(ResilienceAssessment { generator, solver, settings })
    }

    pub fn settings(&self) -> &AssessmentSettings {
        &self.settings
    }

    /// Seed of sample `index`
    pub fn sample_seed(&self, index: usize) -> u64 {
        self.settings.base_seed.wrapping_add(index as u64)
    }

    /// Assess one sample.
    ///
    /// Collaborator failures and NaN demands yield a sentinel record. Any
    /// other error (bad parameters, catalog lookups) is returned.
    pub fn run_sample(&self, index: usize, parameters: &UncertainParameters) -> ResilienceResult<SampleRecord> {
        let seed = self.sample_seed(index);
        let mut rng = LossRng::from_seed_u64(seed);

        let (motion, demand) = match self.analyse(parameters, &mut rng) {
            Ok(result) => result,
            Err(e) if e.is_sample_fatal() => {
                warn!("Sample {} failed ({}); stored as sentinel", index, e);
                return Ok(SampleRecord::sentinel(index, seed, *parameters, &e));
            }
            Err(e) => return Err(e),
        };

        if !demand.is_complete() {
            let e = ResilienceError::solver_non_convergence("Solver returned NaN demands");
            warn!("Sample {} returned NaN demands; stored as sentinel", index);
            return Ok(SampleRecord::sentinel(index, seed, *parameters, &e));
        }

        let catalog = FragilityCatalog::new(parameters.catalog_multipliers())?;
        let model = ResilienceOutcomeModel::new(catalog, parameters.consequence_parameters(), &self.settings, &mut rng)?;
        let outcome = model.evaluate(&demand, self.settings.n_realizations, &mut rng)?;
        let collapse = model.is_collapse(&demand);

        info!(
            "Sample {}: max drift {:.4}, residual {:.4}, loss {:.0}{}",
            index,
            demand.max_drift(),
            demand.residual_drift,
            outcome.summary,
            if collapse { " (collapse)" } else { "" }
        );

        Ok(SampleRecord {
            index,
            seed,
            parameters: *parameters,
            status: SampleStatus::Completed,
            arias: Some(motion.arias()),
            demand: Some(demand),
            loss: Some(outcome.summary),
            collapse,
            irreparable_probability: outcome.irreparable_probability,
        })
    }

    fn analyse(
        &self,
        parameters: &UncertainParameters,
        rng: &mut LossRng,
    ) -> ResilienceResult<(GroundMotion, DemandVector)> {
        let scenario = parameters.ground_motion_scenario();
        scenario.validate()?;
        let motion = self.generator.generate(&scenario, rng)?;
        let edp = self
            .solver
            .run_nonlinear_history(&motion, &parameters.analysis_settings(self.settings.time_step))?;
        let demand = DemandVector::from_edp_slice(&edp, self.settings.stories)?;
        Ok((motion, demand))
    }

    /// Assess every sample in order.
    pub fn run_batch(&self, samples: &[UncertainParameters]) -> ResilienceResult<Vec<SampleRecord>> {
        samples
            .iter()
            .enumerate()
            .map(|(i, p)| self.run_sample(i, p))
            .collect()
    }

    /// Assess sample rows and store the records in a study.
    pub fn run_into_study(&self, study: &mut Study, rows: &[Vec<f64>]) -> ResilienceResult<BatchSummary> {
        let parameters = rows
            .iter()
            .map(|row| UncertainParameters::from_row(row))
            .collect::<ResilienceResult<Vec<_>>>()?;
        let records = self.run_batch(&parameters)?;
        let summary = BatchSummary::from_records(&records);
        study.settings = self.settings;
        for record in records {
            study.add_sample(record);
        }
        info!(
            "Assessed {} samples ({} failed, {} collapsed)",
            summary.samples, summary.failed, summary.collapsed
        );
        Ok(summary)
    }
}
