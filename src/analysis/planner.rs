//! Batch planning over the whole team.
//!
//! Aggregates the performance document, matches employees against the
//! split document and collects one recommendation per employee.

use crate::analysis::aggregator::group_by_employee;
use crate::analysis::recommender::{recommend, RecommenderSettings};
use crate::error::RecommendError;
use crate::models::{Recommendation, SplitDocument, WeekEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with employees that have history but no product split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSplitPolicy {
    /// Leave them out of the output.
    #[default]
    Skip,
    /// Abort the run.
    Error,
}

/// Recommendations for a run plus bookkeeping counters.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Recommendations in first-seen employee order.
    pub recommendations: Vec<Recommendation>,
    /// Distinct employees in the performance document.
    pub employees_seen: usize,
    /// Employees left out for lack of a product split.
    pub missing_split: Vec<String>,
    /// Employees left out because their value per lead was zero.
    pub skipped_degenerate: Vec<String>,
}

impl Plan {
    /// Number of flagged records in the output.
    pub fn degenerate_count(&self) -> usize {
        self.recommendations
            .iter()
            .filter(|r| r.is_degenerate())
            .count()
    }

    /// Sum of needed leads over non-degenerate records.
    pub fn total_needed_leads(&self) -> u64 {
        self.recommendations
            .iter()
            .filter_map(|r| r.needed_leads)
            .sum()
    }
}

/// Produce recommendations for every employee found in both documents.
pub fn plan_recommendations(
    weeks: &[WeekEntry],
    splits: &SplitDocument,
    settings: &RecommenderSettings,
    missing_split: MissingSplitPolicy,
) -> Result<Plan, RecommendError> {
    let histories = group_by_employee(weeks);
    debug!(
        employees = histories.len(),
        observations = histories.observation_count(),
        "aggregated weekly performance"
    );

    let mut plan = Plan {
        employees_seen: histories.len(),
        ..Default::default()
    };

    for (name, history) in histories.iter() {
        let Some(split) = splits.get(name) else {
            match missing_split {
                MissingSplitPolicy::Skip => {
                    debug!(employee = name, "no product split, skipping");
                    plan.missing_split.push(name.to_string());
                    continue;
                }
                MissingSplitPolicy::Error => {
                    return Err(RecommendError::MissingSplit {
                        name: name.to_string(),
                    })
                }
            }
        };

        match recommend(name, history, split, settings)? {
            Some(rec) => {
                if rec.is_degenerate() {
                    warn!(employee = name, "zero gross value per lead, lead count left empty");
                }
                plan.recommendations.push(rec);
            }
            None => {
                warn!(employee = name, "zero gross value per lead, skipping");
                plan.skipped_degenerate.push(name.to_string());
            }
        }
    }

    Ok(plan)
}
