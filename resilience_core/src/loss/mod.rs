//! # Loss Engine
//!
//! - [`sampling`] - seeded random source and cost draws
//! - [`repair`] - damage simulation and building repair cost
//! - [`outcome`] - collapse, demolition and repair branching

pub mod outcome;
pub mod repair;
pub mod sampling;

pub use outcome::{
    BatchLoss, CategoryMeans, ConsequenceParameters, LossOutcome, OutcomeKind, Realization, ResilienceOutcomeModel,
    SummaryStatistic,
};
pub use repair::{CostMode, RepairCostBreakdown, RepairCostEngine};
pub use sampling::LossRng;
