//! # Fragility and Consequence Data
//!
//! Component descriptors used by the loss engine: which demand drives each
//! component, its damage states (fragility curve plus repair-cost
//! consequence), and how many units sit on a story.
//!
//! The catalog itself lives in [`catalog`]. Descriptors are immutable after
//! construction; uncertainty multipliers are applied once, in
//! [`FragilityCatalog::new`].

pub mod catalog;

use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, ResilienceResult};
use crate::loss::sampling::LossRng;
use crate::stats::{inverse_normal_cdf, lognormal_cdf, normal_cdf_with, to_percent};

pub use catalog::FragilityCatalog;

/// Percentile bounds applied before the inverse normal CDF.
const PERCENTILE_FLOOR: f64 = 1e-9;

/// Engineering demand parameter that drives a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdpType {
    /// Peak inter-story drift ratio
    Pid,
    /// Peak floor acceleration (g)
    Pfa,
}

/// Damage category used to split the repair cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCategory {
    Structural,
    Nonstructural,
    Contents,
}

impl DamageCategory {
    /// Single-letter code
    pub fn code(&self) -> char {
        match self {
            DamageCategory::Structural => 'S',
            DamageCategory::Nonstructural => 'N',
            DamageCategory::Contents => 'C',
        }
    }
}

/// Probability family of a fragility curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FragilityFamily {
    #[default]
    Lognormal,
    /// Normal curve; the dispersion is read as a coefficient of variation
    Normal,
}

/// Probability family of a repair-cost draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostDistribution {
    Normal,
    Lognormal,
}

/// One damage state: fragility curve and repair-cost consequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageState {
    /// Median demand (rad for drift, g for acceleration)
    pub median_demand: f64,
    /// Dispersion of the fragility curve
    pub dispersion: f64,
    /// Fragility curve family
    pub family: FragilityFamily,
    /// Quantity at or below which the lower unit cost applies
    pub lower_quantity: f64,
    /// Quantity at or above which the upper unit cost applies
    pub upper_quantity: f64,
    /// Unit repair cost at the lower quantity
    pub lower_unit_cost: f64,
    /// Unit repair cost at the upper quantity
    pub upper_unit_cost: f64,
    /// Distribution of the cost draw
    pub cost_distribution: CostDistribution,
    /// Coefficient of variation of the cost draw
    pub cost_cv: f64,
}

impl DamageState {
    /// Probability that `edp` reaches or exceeds this state.
    pub fn exceedance(&self, edp: f64) -> f64 {
        match self.family {
            FragilityFamily::Lognormal => lognormal_cdf(edp, self.median_demand, self.dispersion),
            FragilityFamily::Normal => {
                normal_cdf_with(edp, self.median_demand, self.dispersion * self.median_demand)
            }
        }
    }

    /// Unit repair cost at a realized quantity.
    ///
    /// Linear between the two anchors, flat outside them.
    pub fn unit_cost(&self, quantity: f64) -> f64 {
        if quantity <= self.lower_quantity {
            self.lower_unit_cost
        } else if quantity >= self.upper_quantity {
            self.upper_unit_cost
        } else {
            self.lower_unit_cost
                - (quantity - self.lower_quantity) * (self.lower_unit_cost - self.upper_unit_cost)
                    / (self.upper_quantity - self.lower_quantity)
        }
    }
}

/// Quantity of a component on one story.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityModel {
    /// Nominal number of units
    pub unit: f64,
    /// Median quantity of the lognormal quantity model
    pub median: f64,
    /// Logarithmic dispersion of the quantity
    pub dispersion: f64,
}

impl QuantityModel {
    /// Quantity at the given non-exceedance percentile.
    ///
    /// `unit / q50 * exp(ln q50 + beta * Phi^-1(p))`; exactly `unit` when the
    /// dispersion is zero.
    pub fn realized(&self, percentile: f64) -> f64 {
        if self.dispersion == 0.0 {
            return self.unit;
        }
        let p = percentile.clamp(PERCENTILE_FLOOR, 1.0 - PERCENTILE_FLOOR);
        let z = inverse_normal_cdf(p);
        self.unit / self.median * (self.median.ln() + self.dispersion * z).exp()
    }
}

/// A fragility catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Fragility id, e.g. `C3032.001a`
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// 1-based catalog index
    pub index: usize,
    /// Stories the component is installed on
    pub stories: Vec<usize>,
    /// Quantity per story
    pub quantity: QuantityModel,
    /// Driving demand
    pub edp: EdpType,
    /// Cost category
    pub category: DamageCategory,
    /// Unconditional probability that the component applies at all
    pub fixed_probability: Option<f64>,
    /// Damage states in order of increasing median demand
    pub damage_states: Vec<DamageState>,
}

impl Component {
    /// True when the component is installed on `story`
    pub fn on_story(&self, story: usize) -> bool {
        self.stories.contains(&story)
    }

    /// Damage state by 1-based number.
    pub fn damage_state(&self, ds: usize) -> ResilienceResult<&DamageState> {
        ds.checked_sub(1)
            .and_then(|i| self.damage_states.get(i))
            .ok_or_else(|| ResilienceError::data_lookup("damage states", format!("{} DS{}", self.id, ds)))
    }

    /// Number of the most severe damage state
    pub fn highest_damage_state(&self) -> usize {
        self.damage_states.len()
    }

    /// Cumulative integer percentages `[pds1, pds1 + pds2, ...]` at a demand.
    ///
    /// Each state's probability mass (successive difference of the
    /// exceedance curves) is rounded to a whole percent, ties to even,
    /// before accumulation. Negative demands are treated as zero.
    pub fn damage_state_percentages(&self, edp: f64) -> ResilienceResult<Vec<i64>> {
        if edp.is_nan() {
            return Err(ResilienceError::numeric_domain(
                format!("{} demand", self.id),
                edp,
                "Demand is not a number",
            ));
        }
        let edp = edp.max(0.0);

        let exceedance: Vec<f64> = self.damage_states.iter().map(|ds| ds.exceedance(edp)).collect();
        let mut cumulative = 0;
        let percentages = exceedance
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let next = exceedance.get(i + 1).copied().unwrap_or(0.0);
                cumulative += to_percent(p - next);
                cumulative
            })
            .collect();
        Ok(percentages)
    }

    /// Realized quantity at the given percentile
    pub fn realized_quantity(&self, percentile: f64) -> f64 {
        self.quantity.realized(percentile)
    }

    /// Interpolated unit repair cost of a damage state at the realized quantity.
    pub fn unit_repair_cost(&self, ds: usize, percentile: f64) -> ResilienceResult<f64> {
        let state = self.damage_state(ds)?;
        Ok(state.unit_cost(self.realized_quantity(percentile)))
    }

    /// `n` independent repair-cost draws for a damage state, scaled by the
    /// realized quantity.
    pub fn sample_realized_cost(
        &self,
        ds: usize,
        n: usize,
        percentile: f64,
        rng: &mut LossRng,
    ) -> ResilienceResult<Vec<f64>> {
        let state = self.damage_state(ds)?;
        let quantity = self.realized_quantity(percentile);
        let cost = state.unit_cost(quantity);

        let draws = (0..n)
            .map(|_| {
                let draw = match state.cost_distribution {
                    CostDistribution::Normal => rng.normal(cost, state.cost_cv * cost),
                    CostDistribution::Lognormal => rng.lognormal(cost.ln(), state.cost_cv),
                };
                draw * quantity
            })
            .collect();
        Ok(draws)
    }
}

/// Multipliers that scale the catalog for one uncertainty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogMultipliers {
    /// Quantity percentile P_nsq
    pub quantity_percentile: f64,
    /// Beam-column joint medians
    pub beam_column_joint: f64,
    /// Curtain wall medians
    pub curtain_wall: f64,
    /// Wall partition medians
    pub wall_partition: f64,
    /// Suspended ceiling medians
    pub suspended_ceiling: f64,
    /// Traction elevator medians
    pub elevator: f64,
    /// HVAC medians
    pub hvac: f64,
}

impl Default for CatalogMultipliers {
    fn default() -> Self {
        Self {
            quantity_percentile: 0.5,
            beam_column_joint: 1.0,
            curtain_wall: 1.0,
            wall_partition: 1.0,
            suspended_ceiling: 1.0,
            elevator: 1.0,
            hvac: 1.0,
        }
    }
}

impl CatalogMultipliers {
    pub fn validate(&self) -> ResilienceResult<()> {
        let p = self.quantity_percentile;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ResilienceError::invalid_input(
                "quantity_percentile",
                p.to_string(),
                "Percentile must be within [0, 1]",
            ));
        }
        let scales = [
            ("beam_column_joint", self.beam_column_joint),
            ("curtain_wall", self.curtain_wall),
            ("wall_partition", self.wall_partition),
            ("suspended_ceiling", self.suspended_ceiling),
            ("elevator", self.elevator),
            ("hvac", self.hvac),
        ];
        for (field, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResilienceError::invalid_input(
                    field,
                    value.to_string(),
                    "Multiplier must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ceiling_ds1() -> DamageState {
        DamageState {
            median_demand: 1.17,
            dispersion: 0.25,
            family: FragilityFamily::Lognormal,
            lower_quantity: 1.0,
            upper_quantity: 10.0,
            lower_unit_cost: 435.0,
            upper_unit_cost: 290.0,
            cost_distribution: CostDistribution::Normal,
            cost_cv: 0.55,
        }
    }

    #[test]
    fn test_unit_cost_interpolation() {
        let ds = ceiling_ds1();
        assert_eq!(ds.unit_cost(0.5), 435.0);
        assert_eq!(ds.unit_cost(1.0), 435.0);
        assert_eq!(ds.unit_cost(10.0), 290.0);
        assert_eq!(ds.unit_cost(86.4), 290.0);
        assert!((ds.unit_cost(5.5) - 362.5).abs() < 1e-9);
    }

    #[test]
    fn test_unit_cost_non_increasing() {
        let ds = ceiling_ds1();
        let mut last = f64::INFINITY;
        for i in 0..=120 {
            let cost = ds.unit_cost(i as f64 * 0.1);
            assert!(cost <= last);
            last = cost;
        }
    }

    #[test]
    fn test_exceedance_at_median() {
        let ds = ceiling_ds1();
        assert!((ds.exceedance(1.17) - 0.5).abs() < 1e-6);
        assert_eq!(ds.exceedance(0.0), 0.0);

        let normal = DamageState { family: FragilityFamily::Normal, ..ceiling_ds1() };
        assert!((normal.exceedance(1.17) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_realized_quantity() {
        let q = QuantityModel { unit: 21.6, median: 0.001, dispersion: 0.2 };
        assert!((q.realized(0.5) - 21.6).abs() < 1e-9);
        assert!(q.realized(0.9) > 21.6);
        assert!(q.realized(0.0).is_finite());

        let fixed = QuantityModel { unit: 20.0, median: 1.0, dispersion: 0.0 };
        assert_eq!(fixed.realized(0.99), 20.0);
    }

    #[test]
    fn test_multipliers_validate() {
        assert!(CatalogMultipliers::default().validate().is_ok());
        let bad = CatalogMultipliers { hvac: 0.0, ..Default::default() };
        assert_eq!(bad.validate().unwrap_err().error_code(), "INVALID_INPUT");
        let bad_p = CatalogMultipliers { quantity_percentile: 1.5, ..Default::default() };
        assert!(bad_p.validate().is_err());
    }
}
