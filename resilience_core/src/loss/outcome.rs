//! # Resilience Outcome Model
//!
//! Turns a demand vector into a distribution of total loss:
//!
//! 1. **Collapse** - the largest story drift reaches the collapse threshold;
//!    every realization costs the replacement cost.
//! 2. **Irreparable** - otherwise a share of realizations, set by the
//!    residual-drift fragility rounded to a whole percent, is demolished and
//!    costs the replacement cost.
//! 3. **Repairable** - the remaining realizations take the building repair
//!    cost from [`RepairCostEngine`].
//!
//! The replacement cost is the largest worst-case repair cost of the
//! building at saturated demands, scaled by the replacement multiplier. It
//! is computed once when the model is built.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::demand::DemandVector;
use crate::errors::{ResilienceError, ResilienceResult};
use crate::fragility::FragilityCatalog;
use crate::loss::repair::{CostMode, RepairCostBreakdown, RepairCostEngine};
use crate::loss::sampling::LossRng;
use crate::stats::{lognormal_cdf, mean, median, to_percent};
use crate::study::AssessmentSettings;

/// Story drift used for the saturated worst-case run.
const SATURATED_DRIFT: f64 = 10.0;
/// Floor acceleration used for the saturated worst-case run (g).
const SATURATED_ACCELERATION: f64 = 100.0;

/// Statistic used to reduce the realizations to one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryStatistic {
    #[default]
    Mean,
    Median,
}

impl SummaryStatistic {
    /// Reduce a slice; `None` when empty.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        match self {
            SummaryStatistic::Mean => mean(values),
            SummaryStatistic::Median => median(values),
        }
    }
}

/// Residual-drift fragility and replacement-cost scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsequenceParameters {
    /// Median residual drift at which the building is demolished (M_rf)
    pub median_residual_drift: f64,
    /// Logarithmic dispersion of the residual-drift fragility (S_rf)
    pub residual_dispersion: f64,
    /// Replacement cost over the worst-case repair cost (C_rep)
    pub replacement_multiplier: f64,
}

impl Default for ConsequenceParameters {
    fn default() -> Self {
        Self {
            median_residual_drift: 0.01,
            residual_dispersion: 0.3,
            replacement_multiplier: 1.0,
        }
    }
}

impl ConsequenceParameters {
    pub fn validate(&self) -> ResilienceResult<()> {
        let fields = [
            ("median_residual_drift", self.median_residual_drift),
            ("residual_dispersion", self.residual_dispersion),
            ("replacement_multiplier", self.replacement_multiplier),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResilienceError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be finite and positive",
                ));
            }
        }
        Ok(())
    }

    /// Probability of demolition at a residual drift, rounded to a whole percent.
    pub fn irreparable_probability(&self, residual_drift: f64) -> f64 {
        let p = lognormal_cdf(residual_drift, self.median_residual_drift, self.residual_dispersion);
        to_percent(p) as f64 / 100.0
    }
}

/// Branch a realization took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Collapse,
    Irreparable,
    Repairable,
}

/// One Monte Carlo trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Realization {
    pub cost: f64,
    pub kind: OutcomeKind,
}

/// Loss distribution of one demand vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossOutcome {
    /// Realizations in shuffled order
    pub realizations: Vec<Realization>,
    /// Reduced loss
    pub summary: f64,
    /// Statistic used for `summary`
    pub statistic: SummaryStatistic,
    /// Rounded probability of demolition (0 for collapse)
    pub irreparable_probability: f64,
    /// Cost split of the repairable realizations, before shuffling; `None` on collapse
    #[serde(default)]
    pub repair: Option<RepairCostBreakdown>,
}

/// Mean repair cost per damage category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryMeans {
    pub structural: f64,
    pub nonstructural: f64,
    pub contents: f64,
}

impl CategoryMeans {
    pub fn total(&self) -> f64 {
        self.structural + self.nonstructural + self.contents
    }
}

impl LossOutcome {
    pub fn costs(&self) -> Vec<f64> {
        self.realizations.iter().map(|r| r.cost).collect()
    }

    /// Number of realizations of one kind
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.realizations.iter().filter(|r| r.kind == kind).count()
    }

    pub fn is_collapse(&self) -> bool {
        !self.realizations.is_empty() && self.count(OutcomeKind::Collapse) == self.realizations.len()
    }

    /// Category means over the repairable realizations of this outcome.
    ///
    /// `None` on collapse or when every realization was demolished.
    pub fn category_means(&self) -> Option<CategoryMeans> {
        let repair = self.repair.as_ref()?;
        Some(CategoryMeans {
            structural: mean(&repair.structural)?,
            nonstructural: mean(&repair.nonstructural)?,
            contents: mean(&repair.contents)?,
        })
    }
}

/// Losses of several demand vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchLoss {
    /// One entry per demand; `None` for incomplete demands
    pub outcomes: Vec<Option<LossOutcome>>,
    /// Collapse flag per demand
    pub collapse_mask: Vec<bool>,
    /// Indices of incomplete demands left out of the statistics
    pub excluded: Vec<usize>,
}

impl BatchLoss {
    /// Summaries of the evaluated demands, in demand order
    pub fn summaries(&self) -> Vec<f64> {
        self.outcomes.iter().flatten().map(|o| o.summary).collect()
    }

    /// Mean of the per-demand summaries; `None` when nothing was evaluated.
    pub fn mean_summary(&self) -> Option<f64> {
        mean(&self.summaries())
    }
}

/// Collapse / demolition / repair branching over the loss engine.
#[derive(Debug, Clone)]
pub struct ResilienceOutcomeModel {
    catalog: FragilityCatalog,
    consequence: ConsequenceParameters,
    collapse_drift_threshold: f64,
    statistic: SummaryStatistic,
    replacement_cost: f64,
}

impl ResilienceOutcomeModel {
    /// Build the model and derive the replacement cost.
    pub fn new(
        catalog: FragilityCatalog,
        consequence: ConsequenceParameters,
        settings: &AssessmentSettings,
        rng: &mut LossRng,
    ) -> ResilienceResult<Self> {
        consequence.validate()?;
        settings.validate()?;

        let engine = RepairCostEngine::new(&catalog);
        let idr = vec![SATURATED_DRIFT; settings.stories];
        let pfa = vec![SATURATED_ACCELERATION; settings.stories + 1];
        let worst = engine.total_repair_cost(
            &idr,
            &pfa,
            settings.worst_case_realizations,
            CostMode::WorstCase,
            rng,
        )?;
        let max_repair = worst.max_total();
        let replacement_cost = consequence.replacement_multiplier * max_repair;
        debug!(
            "Replacement cost {:.0} = {} x worst-case repair {:.0}",
            replacement_cost, consequence.replacement_multiplier, max_repair
        );

        Ok(ResilienceOutcomeModel {
            catalog,
            consequence,
            collapse_drift_threshold: settings.collapse_drift_threshold,
            statistic: settings.statistic,
            replacement_cost,
        })
    }

    pub fn replacement_cost(&self) -> f64 {
        self.replacement_cost
    }

    pub fn catalog(&self) -> &FragilityCatalog {
        &self.catalog
    }

    pub fn consequence(&self) -> &ConsequenceParameters {
        &self.consequence
    }

    /// True when the demand reaches the collapse drift threshold
    pub fn is_collapse(&self, demand: &DemandVector) -> bool {
        demand.max_drift() >= self.collapse_drift_threshold
    }

    /// Loss distribution of one demand vector with `n` realizations.
    pub fn evaluate(&self, demand: &DemandVector, n: usize, rng: &mut LossRng) -> ResilienceResult<LossOutcome> {
        if !demand.is_complete() {
            return Err(ResilienceError::numeric_domain(
                "demand vector",
                f64::NAN,
                "Demand vector contains NaN",
            ));
        }

        if self.is_collapse(demand) {
            return Ok(LossOutcome {
                realizations: vec![
                    Realization { cost: self.replacement_cost, kind: OutcomeKind::Collapse };
                    n
                ],
                summary: self.replacement_cost,
                statistic: self.statistic,
                irreparable_probability: 0.0,
                repair: None,
            });
        }

        let p = self.consequence.irreparable_probability(demand.residual_drift);
        let n_demolished = ((n as f64 * p) as usize).min(n);

        let mut realizations =
            vec![Realization { cost: self.replacement_cost, kind: OutcomeKind::Irreparable }; n_demolished];

        let engine = RepairCostEngine::new(&self.catalog);
        let repair = engine.total_repair_cost(
            &demand.idr,
            &demand.pfa,
            n - n_demolished,
            CostMode::Nominal,
            rng,
        )?;
        realizations.extend(
            repair
                .total
                .iter()
                .map(|&cost| Realization { cost, kind: OutcomeKind::Repairable }),
        );
        rng.shuffle(&mut realizations);

        let costs: Vec<f64> = realizations.iter().map(|r| r.cost).collect();
        let summary = self.statistic.reduce(&costs).unwrap_or(0.0);

        Ok(LossOutcome {
            realizations,
            summary,
            statistic: self.statistic,
            irreparable_probability: p,
            repair: Some(repair),
        })
    }

    /// Evaluate many demand vectors on one random stream.
    ///
    /// Incomplete demands are skipped, logged and listed in
    /// [`BatchLoss::excluded`]; they never abort the batch.
    ///
    /// The per-demand loop with a boolean collapse flag per demand gives the
    /// same result as masking a 2-D realizations-by-demands cost matrix:
    /// collapsed columns hold the replacement cost and the rest hold the
    /// branched repair costs. Evaluating a single demand here matches
    /// [`Self::evaluate`] on the same seed.
    pub fn evaluate_batch(
        &self,
        demands: &[DemandVector],
        n: usize,
        rng: &mut LossRng,
    ) -> ResilienceResult<BatchLoss> {
        let collapse_mask: Vec<bool> = demands
            .iter()
            .map(|d| d.is_complete() && self.is_collapse(d))
            .collect();

        let mut outcomes = Vec::with_capacity(demands.len());
        let mut excluded = Vec::new();
        for (i, demand) in demands.iter().enumerate() {
            if !demand.is_complete() {
                warn!("Demand {} is incomplete; excluded from loss statistics", i);
                excluded.push(i);
                outcomes.push(None);
                continue;
            }
            outcomes.push(Some(self.evaluate(demand, n, rng)?));
        }

        Ok(BatchLoss { outcomes, collapse_mask, excluded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> AssessmentSettings {
        AssessmentSettings {
            worst_case_realizations: 200,
            ..Default::default()
        }
    }

    fn model(seed: u64) -> ResilienceOutcomeModel {
        let mut rng = LossRng::from_seed_u64(seed);
        ResilienceOutcomeModel::new(
            FragilityCatalog::default(),
            ConsequenceParameters::default(),
            &small_settings(),
            &mut rng,
        )
        .unwrap()
    }

    fn moderate_demand() -> DemandVector {
        DemandVector::new(vec![0.012, 0.018, 0.01], vec![0.35, 0.6, 0.75, 0.95], 0.002).unwrap()
    }

    #[test]
    fn test_replacement_cost_positive_and_scaled() {
        let base = model(1);
        assert!(base.replacement_cost() > 0.0);

        let mut rng = LossRng::from_seed_u64(1);
        let doubled = ResilienceOutcomeModel::new(
            FragilityCatalog::default(),
            ConsequenceParameters { replacement_multiplier: 2.0, ..Default::default() },
            &small_settings(),
            &mut rng,
        )
        .unwrap();
        assert!((doubled.replacement_cost() - 2.0 * base.replacement_cost()).abs() < 1e-6);
    }

    #[test]
    fn test_collapse_costs_replacement_exactly() {
        let m = model(2);
        let mut demand = moderate_demand();
        demand.idr[1] = 0.10;
        let mut rng = LossRng::from_seed_u64(3);
        let outcome = m.evaluate(&demand, 50, &mut rng).unwrap();
        assert!(outcome.is_collapse());
        assert!(outcome.costs().iter().all(|c| *c == m.replacement_cost()));
        assert_eq!(outcome.summary, m.replacement_cost());
    }

    #[test]
    fn test_zero_demand_zero_loss() {
        let m = model(4);
        let mut rng = LossRng::from_seed_u64(5);
        let outcome = m.evaluate(&DemandVector::zero(3), 100, &mut rng).unwrap();
        assert_eq!(outcome.summary, 0.0);
        assert_eq!(outcome.count(OutcomeKind::Repairable), 100);
    }

    #[test]
    fn test_irreparable_share() {
        let m = model(6);
        let mut demand = moderate_demand();
        // Residual drift at the median gives a 50% demolition probability
        demand.residual_drift = 0.01;
        let mut rng = LossRng::from_seed_u64(7);
        let outcome = m.evaluate(&demand, 200, &mut rng).unwrap();
        assert_eq!(outcome.irreparable_probability, 0.5);
        assert_eq!(outcome.count(OutcomeKind::Irreparable), 100);
        assert_eq!(outcome.count(OutcomeKind::Repairable), 100);
        assert_eq!(outcome.realizations.len(), 200);
    }

    #[test]
    fn test_category_means_add_up_to_repairable_mean() {
        let m = model(14);
        let mut demand = moderate_demand();
        demand.residual_drift = 0.008;
        let mut rng = LossRng::from_seed_u64(15);
        let outcome = m.evaluate(&demand, 300, &mut rng).unwrap();
        assert!(outcome.count(OutcomeKind::Irreparable) > 0);

        let repairable: Vec<f64> = outcome
            .realizations
            .iter()
            .filter(|r| r.kind == OutcomeKind::Repairable)
            .map(|r| r.cost)
            .collect();
        let means = outcome.category_means().unwrap();
        let expected = mean(&repairable).unwrap();
        assert!((means.total() - expected).abs() < 1e-6 * expected.max(1.0));
        assert_eq!(outcome.repair.as_ref().unwrap().len(), repairable.len());
    }

    #[test]
    fn test_collapse_has_no_repair_split() {
        let m = model(16);
        let mut demand = moderate_demand();
        demand.idr[2] = 0.15;
        let mut rng = LossRng::from_seed_u64(17);
        let outcome = m.evaluate(&demand, 10, &mut rng).unwrap();
        assert!(outcome.repair.is_none());
        assert!(outcome.category_means().is_none());
    }

    #[test]
    fn test_median_statistic() {
        let mut rng = LossRng::from_seed_u64(8);
        let settings = AssessmentSettings {
            statistic: SummaryStatistic::Median,
            ..small_settings()
        };
        let m = ResilienceOutcomeModel::new(
            FragilityCatalog::default(),
            ConsequenceParameters::default(),
            &settings,
            &mut rng,
        )
        .unwrap();
        let outcome = m.evaluate(&moderate_demand(), 101, &mut rng).unwrap();
        assert_eq!(outcome.statistic, SummaryStatistic::Median);
        assert_eq!(Some(outcome.summary), median(&outcome.costs()));
    }

    #[test]
    fn test_single_realization_matches_batch() {
        let m = model(9);
        let demand = moderate_demand();

        let mut a = LossRng::from_seed_u64(10);
        let scalar = m.evaluate(&demand, 1, &mut a).unwrap();
        let mut b = LossRng::from_seed_u64(10);
        let batch = m.evaluate_batch(std::slice::from_ref(&demand), 1, &mut b).unwrap();

        assert_eq!(batch.outcomes[0].as_ref(), Some(&scalar));
        assert_eq!(batch.mean_summary(), Some(scalar.summary));
    }

    #[test]
    fn test_batch_excludes_incomplete() {
        let m = model(11);
        let mut collapsed = moderate_demand();
        collapsed.idr[0] = 0.2;
        let demands = vec![moderate_demand(), DemandVector::nan_sentinel(3), collapsed];
        let mut rng = LossRng::from_seed_u64(12);
        let batch = m.evaluate_batch(&demands, 20, &mut rng).unwrap();
        assert_eq!(batch.excluded, vec![1]);
        assert_eq!(batch.collapse_mask, vec![false, false, true]);
        assert!(batch.outcomes[1].is_none());
        assert_eq!(batch.summaries().len(), 2);
    }

    #[test]
    fn test_scalar_rejects_nan() {
        let m = model(13);
        let mut rng = LossRng::default();
        let err = m.evaluate(&DemandVector::nan_sentinel(3), 10, &mut rng).unwrap_err();
        assert_eq!(err.error_code(), "NUMERIC_DOMAIN");
    }

    #[test]
    fn test_consequence_validation() {
        let bad = ConsequenceParameters { residual_dispersion: 0.0, ..Default::default() };
        assert!(bad.validate().is_err());
        assert_eq!(ConsequenceParameters::default().irreparable_probability(0.0), 0.0);
    }
}
