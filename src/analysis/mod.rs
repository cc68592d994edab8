//! Analysis modules.
//!
//! Aggregation of weekly rows into per-employee histories, the per-employee
//! recommendation math, and the batch planner that ties them together.

pub mod aggregator;
pub mod planner;
pub mod recommender;

pub use planner::{plan_recommendations, MissingSplitPolicy, Plan};
pub use recommender::{
    CapacityTable, DegeneratePolicy, RecommenderSettings, RoundingPolicy, PLATINUM_BENCHMARK,
};
