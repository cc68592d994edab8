//! Data models for the lead planner.
//!
//! This module contains the input document shapes (weekly performance rows
//! and product splits) and the recommendation records written as output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One employee's performance for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyObservation {
    /// Employee identity.
    pub name: String,
    /// Conversion rate as a fraction (0.0 - 1.0).
    pub cnv_pct: f64,
    /// Average sale amount in dollars.
    pub avg_sale: f64,
    /// Leads worked that week.
    #[allow(dead_code)] // Carried from the source rows, not used by the math
    pub leads: u32,
    /// Quote rate as a fraction.
    #[allow(dead_code)] // Carried from the source rows, not used by the math
    pub quote_pct: f64,
}

/// One week of the performance document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekEntry {
    /// Per-employee rows, in source order.
    pub data: Vec<WeeklyObservation>,
}

/// Conversion and average sale for a single product line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLineStats {
    pub cnv_pct: f64,
    pub avg_sale: f64,
}

impl ProductLineStats {
    /// Gross value per lead for this product line.
    pub fn value_per_lead(&self) -> f64 {
        self.cnv_pct * self.avg_sale
    }
}

/// Per-employee product-mix reference statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSplit {
    pub shed_only: ProductLineStats,
    pub steel_only: ProductLineStats,
}

/// The product split document, keyed by employee name.
pub type SplitDocument = HashMap<String, ProductSplit>;

/// Direction of an employee's conversion rate across their history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Positive => write!(f, "positive"),
            Trend::Negative => write!(f, "negative"),
        }
    }
}

impl Trend {
    /// Returns an arrow for console and markdown output.
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Positive => "▲",
            Trend::Negative => "▼",
        }
    }
}

/// How recommended leads divide between the two product lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSplit {
    pub shed: u64,
    pub steel: u64,
}

impl LeadSplit {
    pub fn total(&self) -> u64 {
        self.shed + self.steel
    }
}

/// The recommendation produced for one employee.
///
/// `needed_leads` and `recommended_split` are `None` only for degenerate
/// records (zero gross value per lead), which also carry a `diagnostic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    pub needed_leads: Option<u64>,
    pub recommended_split: Option<LeadSplit>,
    pub trend: Trend,
    /// Average conversion as a percentage, rounded to 2 decimals.
    pub cnv_avg: f64,
    /// Average sale, rounded to 2 decimals.
    pub avg_sale: f64,
    /// Why no lead count could be computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Recommendation {
    /// Whether this record lacks a lead count.
    pub fn is_degenerate(&self) -> bool {
        self.needed_leads.is_none()
    }
}
