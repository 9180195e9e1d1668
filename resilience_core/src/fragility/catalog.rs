//! # Fragility Catalog
//!
//! The 27 component entries of the three-story office building: structural
//! connections and base plates, envelope, partitions, ceilings, MEP
//! equipment and the traction elevator.
//!
//! Static rows are scaled by [`CatalogMultipliers`] when the catalog is
//! built; afterwards the catalog is read-only and can be shared across
//! samples.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    CatalogMultipliers, Component, CostDistribution, DamageCategory, DamageState, EdpType,
    FragilityFamily, QuantityModel,
};
use crate::errors::{ResilienceError, ResilienceResult};
use crate::loss::sampling::LossRng;

/// Which multiplier scales the medians of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Fixed,
    BeamColumnJoint,
    CurtainWall,
    WallPartition,
    SuspendedCeiling,
    Elevator,
    Hvac,
}

impl Scale {
    fn factor(self, m: &CatalogMultipliers) -> f64 {
        match self {
            Scale::Fixed => 1.0,
            Scale::BeamColumnJoint => m.beam_column_joint,
            Scale::CurtainWall => m.curtain_wall,
            Scale::WallPartition => m.wall_partition,
            Scale::SuspendedCeiling => m.suspended_ceiling,
            Scale::Elevator => m.elevator,
            Scale::Hvac => m.hvac,
        }
    }
}

struct RawState {
    median: f64,
    dispersion: f64,
    lq: f64,
    uq: f64,
    lrc: f64,
    urc: f64,
    dist: CostDistribution,
    cv: f64,
}

#[allow(clippy::too_many_arguments)]
const fn ds(median: f64, dispersion: f64, lq: f64, uq: f64, lrc: f64, urc: f64, dist: CostDistribution, cv: f64) -> RawState {
    RawState { median, dispersion, lq, uq, lrc, urc, dist, cv }
}

struct RawComponent {
    id: &'static str,
    description: &'static str,
    stories: &'static [usize],
    unit: f64,
    median_quantity: f64,
    quantity_dispersion: f64,
    edp: EdpType,
    category: DamageCategory,
    fixed_probability: Option<f64>,
    scale: Scale,
    states: &'static [RawState],
}

use super::CostDistribution::{Lognormal as LN, Normal as NM};
use super::DamageCategory::{Nonstructural as NS, Structural as ST};
use super::EdpType::{Pfa, Pid};

const ALL: &[usize] = &[1, 2, 3];

static RAW: [RawComponent; 27] = [
    RawComponent {
        id: "B2022.001",
        description: "Curtain wall",
        stories: ALL,
        unit: 216.0,
        median_quantity: 0.645,
        quantity_dispersion: 0.6,
        edp: Pid,
        category: NS,
        fixed_probability: None,
        scale: Scale::CurtainWall,
        states: &[
            ds(0.0338, 0.4, 20.0, 100.0, 2060.0, 1100.0, LN, 0.17),
            ds(0.0383, 0.4, 20.0, 100.0, 2060.0, 1100.0, LN, 0.17),
        ],
    },
    RawComponent {
        id: "C1011.001a",
        description: "Wall partition",
        stories: ALL,
        unit: 21.6,
        median_quantity: 0.001,
        quantity_dispersion: 0.2,
        edp: Pid,
        category: NS,
        fixed_probability: None,
        scale: Scale::WallPartition,
        states: &[
            ds(0.005, 0.4, 1.0, 10.0, 2680.0, 1430.0, NM, 0.48),
            ds(0.01, 0.3, 1.0, 10.0, 6830.0, 3640.0, LN, 0.56),
            ds(0.021, 0.2, 1.0, 10.0, 10500.0, 7440.0, LN, 0.20),
        ],
    },
    RawComponent {
        id: "C3032.001a",
        description: "Suspended ceiling",
        stories: ALL,
        unit: 86.4,
        median_quantity: 1.0,
        quantity_dispersion: 0.0,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::SuspendedCeiling,
        states: &[
            ds(1.17, 0.25, 1.0, 10.0, 435.0, 290.0, NM, 0.55),
            ds(1.58, 0.25, 1.0, 10.0, 3410.0, 2270.0, LN, 0.52),
            ds(1.82, 0.25, 1.0, 10.0, 7010.0, 4670.0, LN, 0.20),
        ],
    },
    RawComponent {
        id: "C3027.002",
        description: "Raised access floor, seismically rated",
        stories: ALL,
        unit: 162.0,
        median_quantity: 0.75,
        quantity_dispersion: 0.2,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[ds(1.5, 0.4, 5.0, 20.0, 138.0, 92.0, NM, 1.28)],
    },
    RawComponent {
        id: "D2021.011a",
        description: "Cold or hot potable water piping",
        stories: ALL,
        unit: 0.91,
        median_quantity: 0.00004,
        quantity_dispersion: 0.7,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(1.5, 0.4, 1.0, 4.0, 319.0, 261.0, LN, 0.76),
            ds(2.6, 0.4, 1.0, 4.0, 2920.0, 2390.0, LN, 0.41),
        ],
    },
    RawComponent {
        id: "D3041.012a",
        description: "HVAC galvanized sheet metal ducting, 6 sq ft or larger",
        stories: ALL,
        unit: 0.43,
        median_quantity: 0.00002,
        quantity_dispersion: 0.2,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[
            ds(1.5, 0.4, 1.0, 5.0, 1050.0, 855.0, LN, 0.26),
            ds(2.25, 0.4, 1.0, 5.0, 8750.0, 7160.0, LN, 0.08),
        ],
    },
    RawComponent {
        id: "D3041.011a",
        description: "HVAC galvanized sheet metal ducting, under 6 sq ft",
        stories: ALL,
        unit: 1.62,
        median_quantity: 0.000075,
        quantity_dispersion: 0.2,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[
            ds(1.5, 0.4, 1.0, 5.0, 715.0, 585.0, LN, 0.37),
            ds(2.25, 0.4, 1.0, 5.0, 6990.0, 5720.0, LN, 0.1),
        ],
    },
    RawComponent {
        id: "D3041.031a",
        description: "HVAC drops and diffusers",
        stories: ALL,
        unit: 19.44,
        median_quantity: 0.009,
        quantity_dispersion: 0.5,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[ds(1.3, 0.4, 1.0, 5.0, 3300.0, 2700.0, NM, 0.21)],
    },
    RawComponent {
        id: "D3041.041a",
        description: "Variable air volume box",
        stories: ALL,
        unit: 10.8,
        median_quantity: 0.002,
        quantity_dispersion: 0.2,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[ds(1.9, 0.4, 1.0, 5.0, 16500.0, 13500.0, LN, 0.29)],
    },
    RawComponent {
        id: "D3034.002",
        description: "Independent pendant lighting",
        stories: ALL,
        unit: 648.0,
        median_quantity: 0.015,
        quantity_dispersion: 0.3,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[ds(1.5, 0.4, 5.0, 10.0, 990.0, 297.0, LN, 0.64)],
    },
    RawComponent {
        id: "D4011.021a",
        description: "Fire sprinkler water piping",
        stories: ALL,
        unit: 4.32,
        median_quantity: 0.01,
        quantity_dispersion: 0.1,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(1.1, 0.4, 3.0, 10.0, 385.0, 315.0, LN, 0.65),
            ds(2.4, 0.5, 3.0, 10.0, 2920.0, 2390.0, LN, 0.41),
        ],
    },
    RawComponent {
        id: "D4011.031a",
        description: "Fire sprinkler drop, standard threaded steel",
        stories: ALL,
        unit: 1.94,
        median_quantity: 0.009,
        quantity_dispersion: 0.2,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(0.75, 0.4, 2.0, 5.0, 550.0, 450.0, LN, 0.37),
            ds(0.95, 0.4, 2.0, 5.0, 550.0, 450.0, LN, 0.37),
        ],
    },
    RawComponent {
        id: "C2011.001b",
        description: "Prefabricated steel stair",
        stories: ALL,
        unit: 2.16,
        median_quantity: 0.0001,
        quantity_dispersion: 0.2,
        edp: Pid,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(0.005, 0.6, 1.0, 10.0, 4340.0, 1300.0, NM, 0.46),
            ds(0.017, 0.6, 1.0, 10.0, 11100.0, 3330.0, NM, 0.49),
            ds(0.028, 0.45, 1.0, 10.0, 37600.0, 11300.0, LN, 0.10),
        ],
    },
    RawComponent {
        id: "D5012.021a",
        description: "Low voltage switchgear",
        stories: ALL,
        unit: 0.03,
        median_quantity: 0.0003,
        quantity_dispersion: 0.4,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[ds(1.28, 0.4, 1.0, 5.0, 10200.0, 8350.0, LN, 0.16)],
    },
    RawComponent {
        id: "D1014.011-1",
        description: "Traction elevator, damage state 1",
        stories: &[1],
        unit: 1.81,
        median_quantity: 0.000028,
        quantity_dispersion: 0.7,
        edp: Pfa,
        category: NS,
        fixed_probability: Some(0.26),
        scale: Scale::Elevator,
        states: &[ds(0.39, 0.45, 5.0, 10.0, 8800.0, 2640.0, LN, 0.87)],
    },
    RawComponent {
        id: "D1014.011-2",
        description: "Traction elevator, damage state 2",
        stories: &[1],
        unit: 1.81,
        median_quantity: 0.000028,
        quantity_dispersion: 0.7,
        edp: Pfa,
        category: NS,
        fixed_probability: Some(0.79),
        scale: Scale::Elevator,
        states: &[ds(0.39, 0.45, 5.0, 10.0, 37400.0, 11200.0, NM, 0.28)],
    },
    RawComponent {
        id: "D1014.011-3",
        description: "Traction elevator, damage state 3",
        stories: &[1],
        unit: 1.81,
        median_quantity: 0.000028,
        quantity_dispersion: 0.7,
        edp: Pfa,
        category: NS,
        fixed_probability: Some(0.68),
        scale: Scale::Elevator,
        states: &[ds(0.39, 0.45, 5.0, 10.0, 32000.0, 9600.0, NM, 0.41)],
    },
    RawComponent {
        id: "D1014.011-4",
        description: "Traction elevator, damage state 4",
        stories: &[1],
        unit: 1.81,
        median_quantity: 0.000028,
        quantity_dispersion: 0.7,
        edp: Pfa,
        category: NS,
        fixed_probability: Some(0.17),
        scale: Scale::Elevator,
        states: &[ds(0.39, 0.45, 5.0, 10.0, 5000.0, 1500.0, NM, 0.49)],
    },
    RawComponent {
        id: "D3031.011a",
        description: "Chiller",
        stories: &[1],
        unit: 2.46,
        median_quantity: 0.00285,
        quantity_dispersion: 0.1,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[ds(0.2, 0.4, 1.0, 5.0, 50800.0, 41600.0, LN, 0.18)],
    },
    RawComponent {
        id: "D3031.021a",
        description: "Cooling tower",
        stories: &[3],
        unit: 2.46,
        median_quantity: 0.00285,
        quantity_dispersion: 0.1,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[ds(0.5, 0.4, 1.0, 5.0, 26100.0, 21300.0, LN, 0.17)],
    },
    RawComponent {
        id: "D3052.011a",
        description: "Air handling unit",
        stories: ALL,
        unit: 3.78,
        median_quantity: 0.7,
        quantity_dispersion: 0.2,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Hvac,
        states: &[ds(0.25, 0.4, 1.0, 5.0, 11330.0, 9282.0, LN, 0.16)],
    },
    RawComponent {
        id: "D5012.013a",
        description: "Motor control center",
        stories: &[1],
        unit: 2.59,
        median_quantity: 0.00004,
        quantity_dispersion: 0.5,
        edp: Pfa,
        category: NS,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[ds(0.73, 0.45, 1.0, 5.0, 4570.0, 3740.0, NM, 0.18)],
    },
    RawComponent {
        id: "B1031.011c",
        description: "Steel column base plate",
        stories: &[1],
        unit: 20.0,
        median_quantity: 1.0,
        quantity_dispersion: 0.0,
        edp: Pid,
        category: ST,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(0.04, 0.4, 5.0, 20.0, 1400.0, 860.0, LN, 0.37),
            ds(0.07, 0.4, 5.0, 20.0, 37500.0, 26500.0, LN, 0.31),
            ds(0.1, 0.4, 5.0, 20.0, 47500.0, 33700.0, LN, 0.27),
        ],
    },
    RawComponent {
        id: "B1035.002",
        description: "Pre-Northridge RBS connection, beam depth 30 in or more, one side",
        stories: &[1, 2],
        unit: 8.0,
        median_quantity: 1.0,
        quantity_dispersion: 0.0,
        edp: Pid,
        category: ST,
        fixed_probability: None,
        scale: Scale::BeamColumnJoint,
        states: &[
            ds(0.03, 0.3, 3.0, 7.0, 23000.0, 15600.0, NM, 0.33),
            ds(0.04, 0.3, 3.0, 7.0, 40500.0, 27500.0, NM, 0.28),
            ds(0.05, 0.3, 3.0, 7.0, 40500.0, 27500.0, LN, 0.28),
        ],
    },
    RawComponent {
        id: "B1035.012",
        description: "Pre-Northridge RBS connection, beam depth 30 in or more, both sides",
        stories: &[1, 2],
        unit: 12.0,
        median_quantity: 1.0,
        quantity_dispersion: 0.0,
        edp: Pid,
        category: ST,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(0.03, 0.3, 3.0, 7.0, 40000.0, 27200.0, NM, 0.31),
            ds(0.04, 0.3, 3.0, 7.0, 73100.0, 49700.0, NM, 0.25),
            ds(0.05, 0.3, 3.0, 7.0, 73100.0, 49700.0, NM, 0.25),
        ],
    },
    RawComponent {
        id: "B1035.001",
        description: "Pre-Northridge RBS connection, beam depth 27 in or less, one side",
        stories: &[3],
        unit: 8.0,
        median_quantity: 1.0,
        quantity_dispersion: 0.0,
        edp: Pid,
        category: ST,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(0.03, 0.3, 3.0, 7.0, 21800.0, 14800.0, NM, 0.35),
            ds(0.04, 0.3, 5.0, 30.0, 36600.0, 24900.0, NM, 0.31),
            ds(0.05, 0.3, 5.0, 30.0, 36600.0, 24900.0, NM, 0.31),
        ],
    },
    RawComponent {
        id: "B1035.011",
        description: "Pre-Northridge RBS connection, beam depth 27 in or less, both sides",
        stories: &[3],
        unit: 12.0,
        median_quantity: 1.0,
        quantity_dispersion: 0.0,
        edp: Pid,
        category: ST,
        fixed_probability: None,
        scale: Scale::Fixed,
        states: &[
            ds(0.03, 0.3, 3.0, 7.0, 37500.0, 25500.0, NM, 0.33),
            ds(0.04, 0.3, 5.0, 30.0, 65400.0, 44500.0, NM, 0.28),
            ds(0.05, 0.3, 5.0, 30.0, 65400.0, 44500.0, NM, 0.28),
        ],
    },
];

impl RawComponent {
    fn build(&self, index: usize, multipliers: &CatalogMultipliers) -> Component {
        let factor = self.scale.factor(multipliers);
        Component {
            id: self.id.to_string(),
            description: self.description.to_string(),
            index,
            stories: self.stories.to_vec(),
            quantity: QuantityModel {
                unit: self.unit,
                median: self.median_quantity,
                dispersion: self.quantity_dispersion,
            },
            edp: self.edp,
            category: self.category,
            fixed_probability: self.fixed_probability,
            damage_states: self
                .states
                .iter()
                .map(|s| DamageState {
                    median_demand: s.median * factor,
                    dispersion: s.dispersion,
                    family: FragilityFamily::Lognormal,
                    lower_quantity: s.lq,
                    upper_quantity: s.uq,
                    lower_unit_cost: s.lrc,
                    upper_unit_cost: s.urc,
                    cost_distribution: s.dist,
                    cost_cv: s.cv,
                })
                .collect(),
        }
    }
}

/// Immutable, multiplier-scaled set of component descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragilityCatalog {
    multipliers: CatalogMultipliers,
    components: Vec<Component>,
}

impl Default for FragilityCatalog {
    fn default() -> Self {
        Self::build(CatalogMultipliers::default())
    }
}

impl FragilityCatalog {
    /// Build the catalog with medians scaled by `multipliers`.
    pub fn new(multipliers: CatalogMultipliers) -> ResilienceResult<Self> {
        multipliers.validate()?;
        let catalog = Self::build(multipliers);
        debug!(
            "Fragility catalog built with {} components (P_nsq = {})",
            catalog.components.len(),
            multipliers.quantity_percentile
        );
        Ok(catalog)
    }

    fn build(multipliers: CatalogMultipliers) -> Self {
        let components = RAW
            .iter()
            .enumerate()
            .map(|(i, raw)| raw.build(i + 1, &multipliers))
            .collect();
        FragilityCatalog { multipliers, components }
    }

    /// All components in catalog order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn multipliers(&self) -> &CatalogMultipliers {
        &self.multipliers
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component by fragility id.
    pub fn by_id(&self, id: &str) -> ResilienceResult<&Component> {
        self.components
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ResilienceError::data_lookup("fragility catalog", id))
    }

    /// Component by 1-based catalog index.
    pub fn by_index(&self, index: usize) -> ResilienceResult<&Component> {
        index
            .checked_sub(1)
            .and_then(|i| self.components.get(i))
            .ok_or_else(|| ResilienceError::data_lookup("fragility catalog", format!("#{}", index)))
    }

    /// Components of one damage category, in catalog order
    pub fn by_category(&self, category: DamageCategory) -> Vec<&Component> {
        self.components.iter().filter(|c| c.category == category).collect()
    }

    /// Catalog restricted to the listed components, in catalog order.
    ///
    /// Indices keep their full-catalog values. Unknown ids fail with
    /// `DataLookup`.
    pub fn subset(&self, ids: &[&str]) -> ResilienceResult<Self> {
        for id in ids {
            self.by_id(id)?;
        }
        let components = self
            .components
            .iter()
            .filter(|c| ids.contains(&c.id.as_str()))
            .cloned()
            .collect();
        Ok(FragilityCatalog { multipliers: self.multipliers, components })
    }

    /// Whether a component is installed on a story.
    pub fn component_on_story(&self, id: &str, story: usize) -> ResilienceResult<bool> {
        Ok(self.by_id(id)?.on_story(story))
    }

    /// Cumulative damage-state percentages of a component at a demand.
    pub fn damage_state_percentages(&self, edp: f64, id: &str) -> ResilienceResult<Vec<i64>> {
        self.by_id(id)?.damage_state_percentages(edp)
    }

    /// Realized quantity of a component at the catalog's quantity percentile.
    pub fn realized_quantity(&self, id: &str) -> ResilienceResult<f64> {
        Ok(self.by_id(id)?.realized_quantity(self.multipliers.quantity_percentile))
    }

    /// Interpolated unit repair cost of a component's damage state (1-based).
    pub fn unit_repair_cost(&self, id: &str, ds: usize) -> ResilienceResult<f64> {
        self.by_id(id)?
            .unit_repair_cost(ds, self.multipliers.quantity_percentile)
    }

    /// `n` repair-cost draws for a damage state, scaled by realized quantity.
    pub fn sample_realized_cost(
        &self,
        id: &str,
        ds: usize,
        n: usize,
        rng: &mut LossRng,
    ) -> ResilienceResult<Vec<f64>> {
        self.by_id(id)?
            .sample_realized_cost(ds, n, self.multipliers.quantity_percentile, rng)
    }
}
