//! Lead recommendation math.
//!
//! Turns one employee's ordered history and product split into a needed
//! lead count and a shed/steel split, relative to a revenue benchmark.

use crate::analysis::aggregator::mean_of;
use crate::error::RecommendError;
use crate::models::{LeadSplit, ProductSplit, Recommendation, Trend, WeeklyObservation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Default revenue target, in dollars.
pub const PLATINUM_BENCHMARK: f64 = 100_000.0;

/// Leads already assumed to be in each employee's pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityTable(BTreeMap<String, u32>);

impl CapacityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing capacity for an employee, 0 when unlisted.
    pub fn capacity_for(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, name: impl Into<String>, capacity: u32) {
        self.0.insert(name.into(), capacity);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for CapacityTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Rounding applied to the shed share of needed leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingPolicy {
    /// 2.5 -> 3, 3.5 -> 4
    #[default]
    HalfAwayFromZero,
    /// 2.5 -> 2, 3.5 -> 4
    HalfEven,
}

impl RoundingPolicy {
    pub fn round(self, value: f64) -> f64 {
        match self {
            RoundingPolicy::HalfAwayFromZero => value.round(),
            RoundingPolicy::HalfEven => value.round_ties_even(),
        }
    }
}

/// What to do when an employee's gross value per lead is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Emit the record with null lead fields and a diagnostic.
    #[default]
    Flag,
    /// Abort the run.
    Reject,
    /// Leave the employee out of the output.
    Skip,
}

/// Inputs to the recommendation math that are fixed for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderSettings {
    pub benchmark: f64,
    pub capacity: CapacityTable,
    pub rounding: RoundingPolicy,
    pub degenerate: DegeneratePolicy,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            benchmark: PLATINUM_BENCHMARK,
            capacity: CapacityTable::new(),
            rounding: RoundingPolicy::default(),
            degenerate: DegeneratePolicy::default(),
        }
    }
}

/// Build the recommendation for one employee.
///
/// Returns `Ok(None)` only when the value per lead is zero and the
/// degenerate policy is [`DegeneratePolicy::Skip`].
pub fn recommend(
    name: &str,
    history: &[WeeklyObservation],
    split: &ProductSplit,
    settings: &RecommenderSettings,
) -> Result<Option<Recommendation>, RecommendError> {
    let (first, last) = match (history.first(), history.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(RecommendError::EmptyHistory {
                name: name.to_string(),
            })
        }
    };

    let cnv_avg = mean_of(history, |o| o.cnv_pct).unwrap_or(0.0) * 100.0;
    let avg_sale = mean_of(history, |o| o.avg_sale).unwrap_or(0.0);

    let trend = if last.cnv_pct >= first.cnv_pct {
        Trend::Positive
    } else {
        Trend::Negative
    };

    let gvpl = (cnv_avg / 100.0) * avg_sale;
    let capacity = settings.capacity.capacity_for(name);

    let Some(needed_leads) = needed_leads(settings.benchmark, gvpl, capacity) else {
        return match settings.degenerate {
            DegeneratePolicy::Reject => Err(RecommendError::DegenerateValuePerLead {
                name: name.to_string(),
                cnv_avg,
                avg_sale,
            }),
            DegeneratePolicy::Skip => Ok(None),
            DegeneratePolicy::Flag => Ok(Some(Recommendation {
                name: name.to_string(),
                needed_leads: None,
                recommended_split: None,
                trend,
                cnv_avg: round2(cnv_avg),
                avg_sale: round2(avg_sale),
                diagnostic: Some(format!(
                    "zero gross value per lead (conversion {:.2}%, average sale {:.2})",
                    cnv_avg, avg_sale
                )),
            })),
        };
    };

    let recommended_split = split_leads(needed_leads, split, settings.rounding);
    debug_assert_eq!(recommended_split.total(), needed_leads);

    debug!(
        employee = name,
        weeks = history.len(),
        gvpl,
        capacity,
        needed_leads,
        shed = recommended_split.shed,
        steel = recommended_split.steel,
        "computed recommendation"
    );

    Ok(Some(Recommendation {
        name: name.to_string(),
        needed_leads: Some(needed_leads),
        recommended_split: Some(recommended_split),
        trend,
        cnv_avg: round2(cnv_avg),
        avg_sale: round2(avg_sale),
        diagnostic: None,
    }))
}

/// Largest lead count representable in output, as a float (2^64).
const LEAD_COUNT_LIMIT: f64 = u64::MAX as f64;

/// `ceil(benchmark / gvpl) - capacity`, clamped at zero.
///
/// `None` when the quotient is not finite or does not fit in a `u64`
/// (zero or vanishingly small value per lead).
pub fn needed_leads(benchmark: f64, gvpl: f64, capacity: u32) -> Option<u64> {
    if gvpl == 0.0 {
        return None;
    }

    let raw = (benchmark / gvpl).ceil();
    if !raw.is_finite() {
        return None;
    }

    let needed = raw - f64::from(capacity);
    if needed <= 0.0 {
        Some(0)
    } else if needed >= LEAD_COUNT_LIMIT {
        None
    } else {
        Some(needed as u64)
    }
}

/// Divide needed leads between shed and steel in proportion to each
/// product line's value per lead.
pub fn split_leads(needed_leads: u64, split: &ProductSplit, rounding: RoundingPolicy) -> LeadSplit {
    let shed_gvpl = split.shed_only.value_per_lead();
    let steel_gvpl = split.steel_only.value_per_lead();

    let ratio = if steel_gvpl == 0.0 {
        1.0
    } else {
        shed_gvpl / steel_gvpl
    };

    let share = if ratio.is_infinite() {
        1.0
    } else {
        let share = ratio / (1.0 + ratio);
        if share.is_finite() {
            share
        } else {
            0.5
        }
    };

    // Above 2^53 the float product can round past `needed_leads`
    let shed = (rounding
        .round(needed_leads as f64 * share)
        .clamp(0.0, needed_leads as f64) as u64)
        .min(needed_leads);

    LeadSplit {
        shed,
        steel: needed_leads - shed,
    }
}

/// Round to two decimal places for output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductLineStats;

    fn obs(cnv_pct: f64, avg_sale: f64) -> WeeklyObservation {
        WeeklyObservation {
            name: "A".to_string(),
            cnv_pct,
            avg_sale,
            leads: 20,
            quote_pct: 0.4,
        }
    }

    fn split(shed: (f64, f64), steel: (f64, f64)) -> ProductSplit {
        ProductSplit {
            shed_only: ProductLineStats {
                cnv_pct: shed.0,
                avg_sale: shed.1,
            },
            steel_only: ProductLineStats {
                cnv_pct: steel.0,
                avg_sale: steel.1,
            },
        }
    }

    fn reference_split() -> ProductSplit {
        split((0.15, 600.0), (0.10, 400.0))
    }

    #[test]
    fn test_worked_example() {
        let history = vec![obs(0.10, 500.0), obs(0.20, 500.0)];
        let settings = RecommenderSettings::default();

        let rec = recommend("A", &history, &reference_split(), &settings)
            .unwrap()
            .unwrap();

        assert_eq!(rec.name, "A");
        assert_eq!(rec.cnv_avg, 15.0);
        assert_eq!(rec.avg_sale, 500.0);
        assert_eq!(rec.trend, Trend::Positive);
        assert_eq!(rec.needed_leads, Some(1334));
        assert_eq!(
            rec.recommended_split,
            Some(LeadSplit {
                shed: 924,
                steel: 410
            })
        );
        assert!(rec.diagnostic.is_none());
    }

    #[test]
    fn test_capacity_is_subtracted() {
        let history = vec![obs(0.10, 500.0), obs(0.20, 500.0)];
        let settings = RecommenderSettings {
            capacity: [("A", 34)].into_iter().collect(),
            ..Default::default()
        };

        let rec = recommend("A", &history, &reference_split(), &settings)
            .unwrap()
            .unwrap();

        assert_eq!(rec.needed_leads, Some(1300));
    }

    #[test]
    fn test_negative_needed_leads_clamp_to_zero() {
        let history = vec![obs(0.5, 100.0)];
        let settings = RecommenderSettings {
            benchmark: 1_000.0,
            capacity: [("A", 5_000)].into_iter().collect(),
            ..Default::default()
        };

        let rec = recommend("A", &history, &reference_split(), &settings)
            .unwrap()
            .unwrap();

        assert_eq!(rec.needed_leads, Some(0));
        assert_eq!(rec.recommended_split, Some(LeadSplit { shed: 0, steel: 0 }));
    }

    #[test]
    fn test_trend_negative_when_last_below_first() {
        let history = vec![obs(0.20, 500.0), obs(0.30, 500.0), obs(0.10, 500.0)];
        let rec = recommend("A", &history, &reference_split(), &RecommenderSettings::default())
            .unwrap()
            .unwrap();

        assert_eq!(rec.trend, Trend::Negative);
    }

    #[test]
    fn test_trend_single_observation_is_positive() {
        let history = vec![obs(0.20, 500.0)];
        let rec = recommend("A", &history, &reference_split(), &RecommenderSettings::default())
            .unwrap()
            .unwrap();

        assert_eq!(rec.trend, Trend::Positive);
    }

    #[test]
    fn test_trend_equal_endpoints_is_positive() {
        let history = vec![obs(0.20, 500.0), obs(0.05, 500.0), obs(0.20, 500.0)];
        let rec = recommend("A", &history, &reference_split(), &RecommenderSettings::default())
            .unwrap()
            .unwrap();

        assert_eq!(rec.trend, Trend::Positive);
    }

    #[test]
    fn test_zero_steel_value_splits_evenly() {
        let zero_steel = split((0.2, 500.0), (0.0, 400.0));

        for rounding in [RoundingPolicy::HalfAwayFromZero, RoundingPolicy::HalfEven] {
            let result = split_leads(11, &zero_steel, rounding);
            assert_eq!(result, LeadSplit { shed: 6, steel: 5 });
        }
    }

    #[test]
    fn test_half_boundary_rounding_policies() {
        let zero_steel = split((0.2, 500.0), (0.0, 0.0));

        let away = split_leads(5, &zero_steel, RoundingPolicy::HalfAwayFromZero);
        assert_eq!(away, LeadSplit { shed: 3, steel: 2 });

        let even = split_leads(5, &zero_steel, RoundingPolicy::HalfEven);
        assert_eq!(even, LeadSplit { shed: 2, steel: 3 });
    }

    #[test]
    fn test_half_boundary_through_recommend() {
        // gvpl = 0.5 * 100 = 50, ceil(1000 / 50) = 20, minus capacity 15 = 5
        let history = vec![obs(0.5, 100.0)];
        let zero_steel = split((0.3, 300.0), (0.0, 300.0));
        let mut settings = RecommenderSettings {
            benchmark: 1_000.0,
            capacity: [("A", 15)].into_iter().collect(),
            ..Default::default()
        };

        let rec = recommend("A", &history, &zero_steel, &settings).unwrap().unwrap();
        assert_eq!(rec.needed_leads, Some(5));
        assert_eq!(rec.recommended_split, Some(LeadSplit { shed: 3, steel: 2 }));

        settings.rounding = RoundingPolicy::HalfEven;
        let rec = recommend("A", &history, &zero_steel, &settings).unwrap().unwrap();
        assert_eq!(rec.recommended_split, Some(LeadSplit { shed: 2, steel: 3 }));
    }

    #[test]
    fn test_split_always_sums_to_needed() {
        let splits = [
            reference_split(),
            split((0.01, 50.0), (0.9, 9000.0)),
            split((0.9, 9000.0), (0.01, 50.0)),
            split((0.0, 0.0), (0.2, 100.0)),
            split((0.2, 100.0), (0.0, 0.0)),
        ];

        for s in &splits {
            for needed in [0, 1, 2, 7, 11, 1334, 99_999] {
                for rounding in [RoundingPolicy::HalfAwayFromZero, RoundingPolicy::HalfEven] {
                    let result = split_leads(needed, s, rounding);
                    assert_eq!(result.total(), needed);
                }
            }
        }
    }

    #[test]
    fn test_zero_shed_value_sends_everything_to_steel() {
        let result = split_leads(10, &split((0.0, 500.0), (0.2, 400.0)), RoundingPolicy::default());
        assert_eq!(result, LeadSplit { shed: 0, steel: 10 });
    }

    #[test]
    fn test_degenerate_flag_policy() {
        let history = vec![obs(0.0, 500.0), obs(0.0, 700.0)];
        let rec = recommend("A", &history, &reference_split(), &RecommenderSettings::default())
            .unwrap()
            .unwrap();

        assert!(rec.is_degenerate());
        assert!(rec.recommended_split.is_none());
        assert_eq!(rec.avg_sale, 600.0);
        assert!(rec.diagnostic.unwrap().contains("zero gross value per lead"));
    }

    #[test]
    fn test_degenerate_reject_policy() {
        let history = vec![obs(0.2, 0.0)];
        let settings = RecommenderSettings {
            degenerate: DegeneratePolicy::Reject,
            ..Default::default()
        };

        let err = recommend("A", &history, &reference_split(), &settings).unwrap_err();
        assert!(matches!(err, RecommendError::DegenerateValuePerLead { .. }));
    }

    #[test]
    fn test_degenerate_skip_policy() {
        let history = vec![obs(0.2, 0.0)];
        let settings = RecommenderSettings {
            degenerate: DegeneratePolicy::Skip,
            ..Default::default()
        };

        let rec = recommend("A", &history, &reference_split(), &settings).unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_empty_history_is_error() {
        let err = recommend("A", &[], &reference_split(), &RecommenderSettings::default())
            .unwrap_err();
        assert!(matches!(err, RecommendError::EmptyHistory { .. }));
    }

    #[test]
    fn test_needed_leads_edges() {
        assert_eq!(needed_leads(100_000.0, 0.0, 0), None);
        assert_eq!(needed_leads(100_000.0, 1e-320, 0), None);
        assert_eq!(needed_leads(100_000.0, 75.0, 0), Some(1334));
        assert_eq!(needed_leads(100_000.0, 75.0, 1334), Some(0));
        assert_eq!(needed_leads(100_000.0, 75.0, 2000), Some(0));
    }

    #[test]
    fn test_needed_leads_beyond_u32_range() {
        assert_eq!(needed_leads(1e11, 1.0, 0), Some(100_000_000_000));
        assert_eq!(needed_leads(1e11, 1.0, 25), Some(99_999_999_975));
        assert_eq!(needed_leads(1e19, 1.0, 0), Some(10_000_000_000_000_000_000));
        assert_eq!(needed_leads(1e20, 1.0, 0), None);
    }

    #[test]
    fn test_tiny_value_per_lead_keeps_full_lead_count() {
        // gvpl = 0.5 * 100 = 50, ceil(5e11 / 50) = 10_000_000_000
        let history = vec![obs(0.5, 100.0)];
        let settings = RecommenderSettings {
            benchmark: 5e11,
            ..Default::default()
        };

        let rec = recommend("A", &history, &reference_split(), &settings)
            .unwrap()
            .unwrap();
        assert_eq!(rec.needed_leads, Some(10_000_000_000));
        assert_eq!(rec.recommended_split.unwrap().total(), 10_000_000_000);

        // cnvPct 0.0001, avgSale 0.01 gives gvpl ~1e-6; the count is ~1e11
        let history = vec![obs(0.0001, 0.01)];
        let rec = recommend("A", &history, &reference_split(), &RecommenderSettings::default())
            .unwrap()
            .unwrap();
        let needed = rec.needed_leads.unwrap();
        assert!(needed > u64::from(u32::MAX));
        assert!((99_999_999_000..=100_000_001_000).contains(&needed));
    }

    #[test]
    fn test_split_huge_counts_never_exceed_needed() {
        for needed in [u64::MAX - 1, (1 << 53) + 1, 10_000_000_000] {
            let result = split_leads(needed, &reference_split(), RoundingPolicy::default());
            assert_eq!(result.total(), needed);
        }
    }

    #[test]
    fn test_capacity_table_defaults_to_zero() {
        let table: CapacityTable = [("Chris Knighton", 25)].into_iter().collect();
        assert_eq!(table.capacity_for("Chris Knighton"), 25);
        assert_eq!(table.capacity_for("Nobody"), 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(15.000000000000002), 15.0);
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
