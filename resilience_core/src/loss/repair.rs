//! # Repair Cost Engine
//!
//! Monte Carlo repair cost of the whole building for one demand vector.
//!
//! For each component and story the `n` realizations are split into damage
//! state bins in proportion to the cumulative percentages of the fragility
//! curves; each populated bin draws its own repair costs, the remainder
//! costs nothing, and the vector is shuffled so realization indices carry no
//! damage-state bias when costs are summed across components.
//!
//! Acceleration-sensitive components on story `s` see both the floor below
//! (`PFA[s-1]`, installed on story `s-1`) and the floor above (`PFA[s]`,
//! installed on story `s`).

use log::trace;
use serde::{Deserialize, Serialize};

use crate::demand::DemandVector;
use crate::errors::{ResilienceError, ResilienceResult};
use crate::fragility::{Component, DamageCategory, EdpType, FragilityCatalog};
use crate::loss::sampling::LossRng;

/// How damage states are assigned to realizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CostMode {
    /// Damage states follow the fragility curves
    #[default]
    Nominal,
    /// Every realization takes the most severe damage state
    WorstCase,
}

/// Repair cost vectors of one demand, each of length `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairCostBreakdown {
    pub total: Vec<f64>,
    pub structural: Vec<f64>,
    pub nonstructural: Vec<f64>,
    pub contents: Vec<f64>,
    /// One vector per story, story 1 first
    pub story_totals: Vec<Vec<f64>>,
}

impl RepairCostBreakdown {
    fn zeros(stories: usize, n: usize) -> Self {
        RepairCostBreakdown {
            total: vec![0.0; n],
            structural: vec![0.0; n],
            nonstructural: vec![0.0; n],
            contents: vec![0.0; n],
            story_totals: vec![vec![0.0; n]; stories],
        }
    }

    /// Number of realizations
    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// Largest total over all realizations (0 when empty).
    pub fn max_total(&self) -> f64 {
        self.total.iter().copied().fold(0.0, f64::max)
    }

    fn accumulate(&mut self, story: usize, category: DamageCategory, cost: &[f64]) {
        let bucket = match category {
            DamageCategory::Structural => &mut self.structural,
            DamageCategory::Nonstructural => &mut self.nonstructural,
            DamageCategory::Contents => &mut self.contents,
        };
        add_into(bucket, cost);
        add_into(&mut self.story_totals[story - 1], cost);
        add_into(&mut self.total, cost);
    }
}

fn add_into(target: &mut [f64], values: &[f64]) {
    for (t, v) in target.iter_mut().zip(values) {
        *t += v;
    }
}

/// Split `n` realizations into damage-state bins.
///
/// Bin `i` receives `floor((pds_i - pds_{i-1}) / 100 * n)` realizations,
/// never fewer than zero, and the bins never hold more than `n` together.
pub fn bin_counts(percentages: &[i64], n: usize) -> Vec<usize> {
    let mut previous = 0;
    let mut assigned = 0usize;
    percentages
        .iter()
        .map(|&pds| {
            let mass = pds - previous;
            previous = pds;
            let count = if mass > 0 {
                (mass as f64 / 100.0 * n as f64) as usize
            } else {
                0
            };
            let count = count.min(n - assigned);
            assigned += count;
            count
        })
        .collect()
}

/// Damage simulation and repair costing over the fragility catalog.
#[derive(Debug, Clone, Copy)]
pub struct RepairCostEngine<'a> {
    catalog: &'a FragilityCatalog,
}

impl<'a> RepairCostEngine<'a> {
    pub fn new(catalog: &'a FragilityCatalog) -> Self {
        RepairCostEngine { catalog }
    }

    pub fn catalog(&self) -> &FragilityCatalog {
        self.catalog
    }

    /// Repair cost of one component on one story, `n` realizations.
    ///
    /// Returns zeros without evaluating the fragility curves when the
    /// component is not installed on `story`.
    pub fn component_repair_cost(
        &self,
        story: usize,
        edp: f64,
        id: &str,
        n: usize,
        mode: CostMode,
        rng: &mut LossRng,
    ) -> ResilienceResult<Vec<f64>> {
        let component = self.catalog.by_id(id)?;
        self.component_cost(component, story, edp, n, mode, rng)
    }

    fn component_cost(
        &self,
        component: &Component,
        story: usize,
        edp: f64,
        n: usize,
        mode: CostMode,
        rng: &mut LossRng,
    ) -> ResilienceResult<Vec<f64>> {
        if !component.on_story(story) {
            return Ok(vec![0.0; n]);
        }
        let percentile = self.catalog.multipliers().quantity_percentile;

        match mode {
            CostMode::WorstCase => {
                component.sample_realized_cost(component.highest_damage_state(), n, percentile, rng)
            }
            CostMode::Nominal => {
                let percentages = component.damage_state_percentages(edp)?;
                let counts = bin_counts(&percentages, n);

                let mut cost = Vec::with_capacity(n);
                for (i, &count) in counts.iter().enumerate() {
                    if count > 0 {
                        cost.extend(component.sample_realized_cost(i + 1, count, percentile, rng)?);
                    }
                }
                cost.resize(n, 0.0);
                rng.shuffle(&mut cost);

                // Elevator states also carry an unconditional occurrence probability
                if let Some(p) = component.fixed_probability {
                    cost.iter_mut().for_each(|c| *c *= p);
                }
                trace!("{} story {} edp {}: bins {:?}", component.id, story, edp, counts);
                Ok(cost)
            }
        }
    }

    /// Building repair cost for one demand, `n` realizations.
    ///
    /// `pfa` must hold one more value than `idr` (ground level first).
    pub fn total_repair_cost(
        &self,
        idr: &[f64],
        pfa: &[f64],
        n: usize,
        mode: CostMode,
        rng: &mut LossRng,
    ) -> ResilienceResult<RepairCostBreakdown> {
        if pfa.len() != idr.len() + 1 {
            return Err(ResilienceError::invalid_input(
                "pfa",
                format!("{} values", pfa.len()),
                format!("Expected {} floor accelerations", idr.len() + 1),
            ));
        }

        let stories = idr.len();
        let mut breakdown = RepairCostBreakdown::zeros(stories, n);

        for story in 1..=stories {
            for component in self.catalog.components() {
                let cost = match component.edp {
                    EdpType::Pid => self.component_cost(component, story, idr[story - 1], n, mode, rng)?,
                    EdpType::Pfa => {
                        let mut below =
                            self.component_cost(component, story - 1, pfa[story - 1], n, mode, rng)?;
                        let above = self.component_cost(component, story, pfa[story], n, mode, rng)?;
                        add_into(&mut below, &above);
                        below
                    }
                };
                breakdown.accumulate(story, component.category, &cost);
            }
        }

        Ok(breakdown)
    }

    /// Repair cost for several demands sharing one random stream.
    ///
    /// A single demand produces exactly what [`Self::total_repair_cost`]
    /// produces for the same seed.
    pub fn total_repair_cost_batch(
        &self,
        demands: &[DemandVector],
        n: usize,
        mode: CostMode,
        rng: &mut LossRng,
    ) -> ResilienceResult<Vec<RepairCostBreakdown>> {
        demands
            .iter()
            .map(|d| self.total_repair_cost(&d.idr, &d.pfa, n, mode, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_counts() {
        assert_eq!(bin_counts(&[30, 50, 60], 1000), vec![300, 200, 100]);
        assert_eq!(bin_counts(&[0, 0], 1000), vec![0, 0]);
        assert_eq!(bin_counts(&[100], 7), vec![7]);
        // Negative masses from crossing curves get nothing
        assert_eq!(bin_counts(&[40, 39, 60], 100), vec![40, 0, 21]);
        // floor(0.29 * 100) is 28 in floating point
        assert_eq!(bin_counts(&[29], 100), vec![28]);
        let counts = bin_counts(&[60, 100, 130], 10);
        assert!(counts.iter().sum::<usize>() <= 10);
    }

    #[test]
    fn test_absent_story_short_circuits() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::from_seed_u64(1);
        // Cooling tower sits on story 3 only; NaN is never evaluated
        let cost = engine
            .component_repair_cost(1, f64::NAN, "D3031.021a", 50, CostMode::Nominal, &mut rng)
            .unwrap();
        assert_eq!(cost, vec![0.0; 50]);
    }

    #[test]
    fn test_nominal_bins_populated() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::from_seed_u64(2);
        let edp = 1.5;
        let pds = catalog.damage_state_percentages(edp, "C3027.002").unwrap();
        assert_eq!(pds, vec![50]);
        let cost = engine
            .component_repair_cost(2, edp, "C3027.002", 1000, CostMode::Nominal, &mut rng)
            .unwrap();
        assert_eq!(cost.len(), 1000);
        assert_eq!(cost.iter().filter(|c| **c == 0.0).count(), 500);
    }

    #[test]
    fn test_elevator_probability_applied() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut a = LossRng::from_seed_u64(9);
        let mut b = LossRng::from_seed_u64(9);
        let scaled = engine
            .component_repair_cost(1, 5.0, "D1014.011-1", 200, CostMode::Nominal, &mut a)
            .unwrap();
        let raw = catalog.sample_realized_cost("D1014.011-1", 1, 200, &mut b).unwrap();
        // All 200 realizations exceed DS1 at 5 g
        let mut raw_sorted: Vec<f64> = raw.iter().map(|c| c * 0.26).collect();
        let mut scaled_sorted = scaled.clone();
        raw_sorted.sort_by(|x, y| x.total_cmp(y));
        scaled_sorted.sort_by(|x, y| x.total_cmp(y));
        assert_eq!(raw_sorted, scaled_sorted);
    }

    #[test]
    fn test_zero_demand_costs_nothing() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::from_seed_u64(3);
        let b = engine
            .total_repair_cost(&[0.0; 3], &[0.0; 4], 100, CostMode::Nominal, &mut rng)
            .unwrap();
        assert!(b.total.iter().all(|c| *c == 0.0));
        assert_eq!(b.story_totals.len(), 3);
    }

    #[test]
    fn test_floor_acceleration_reaches_stories_above_and_below() {
        let catalog = FragilityCatalog::default().subset(&["C3032.001a"]).unwrap();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::from_seed_u64(12);
        let n = 1000;

        // Only floor 2 shakes
        let b = engine
            .total_repair_cost(&[0.0; 3], &[0.0, 0.0, 2.0, 0.0], n, CostMode::Nominal, &mut rng)
            .unwrap();
        let damaged: usize = bin_counts(&catalog.damage_state_percentages(2.0, "C3032.001a").unwrap(), n)
            .iter()
            .sum();
        assert!(damaged > 0);

        let nonzero = |v: &[f64]| v.iter().filter(|c| **c != 0.0).count();
        assert_eq!(nonzero(&b.story_totals[0]), 0);
        assert_eq!(nonzero(&b.story_totals[1]), damaged);
        assert_eq!(nonzero(&b.story_totals[2]), damaged);
        assert!(b.structural.iter().all(|c| *c == 0.0));

        // Ground shaking alone costs nothing; roof shaking lands on story 3 only
        let ground = engine
            .total_repair_cost(&[0.0; 3], &[2.0, 0.0, 0.0, 0.0], n, CostMode::Nominal, &mut rng)
            .unwrap();
        assert!(ground.total.iter().all(|c| *c == 0.0));
        let roof = engine
            .total_repair_cost(&[0.0; 3], &[0.0, 0.0, 0.0, 2.0], n, CostMode::Nominal, &mut rng)
            .unwrap();
        assert_eq!(nonzero(&roof.story_totals[0]), 0);
        assert_eq!(nonzero(&roof.story_totals[1]), 0);
        assert_eq!(nonzero(&roof.story_totals[2]), damaged);
    }

    #[test]
    fn test_category_split_sums_to_total() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::from_seed_u64(4);
        let b = engine
            .total_repair_cost(&[0.02, 0.03, 0.015], &[0.4, 0.8, 1.0, 1.3], 300, CostMode::Nominal, &mut rng)
            .unwrap();
        for i in 0..300 {
            let parts = b.structural[i] + b.nonstructural[i] + b.contents[i];
            let stories: f64 = b.story_totals.iter().map(|s| s[i]).sum();
            assert!((parts - b.total[i]).abs() < 1e-6 * b.total[i].abs().max(1.0));
            assert!((stories - b.total[i]).abs() < 1e-6 * b.total[i].abs().max(1.0));
        }
        assert!(b.max_total() > 0.0);
    }

    #[test]
    fn test_worst_case_bounds_nominal() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::from_seed_u64(6);
        let worst = engine
            .total_repair_cost(&[10.0; 3], &[100.0; 4], 1000, CostMode::WorstCase, &mut rng)
            .unwrap();
        let nominal = engine
            .total_repair_cost(&[0.05, 0.06, 0.04], &[1.5, 2.0, 2.2, 2.5], 1000, CostMode::Nominal, &mut rng)
            .unwrap();
        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        assert!(mean(&worst.total) >= mean(&nominal.total));
    }

    #[test]
    fn test_batch_of_one_matches_scalar() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let demand = DemandVector::new(vec![0.01, 0.015, 0.008], vec![0.3, 0.6, 0.7, 0.9], 0.001).unwrap();

        let mut a = LossRng::from_seed_u64(21);
        let scalar = engine
            .total_repair_cost(&demand.idr, &demand.pfa, 64, CostMode::Nominal, &mut a)
            .unwrap();
        let mut b = LossRng::from_seed_u64(21);
        let batch = engine
            .total_repair_cost_batch(std::slice::from_ref(&demand), 64, CostMode::Nominal, &mut b)
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0], scalar);
    }

    #[test]
    fn test_mismatched_floor_count() {
        let catalog = FragilityCatalog::default();
        let engine = RepairCostEngine::new(&catalog);
        let mut rng = LossRng::default();
        let err = engine
            .total_repair_cost(&[0.01; 3], &[0.1; 3], 10, CostMode::Nominal, &mut rng)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
