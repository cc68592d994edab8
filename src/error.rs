//! Errors raised by the recommendation engine.

/// Failures computing a recommendation for an employee.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("no weekly observations for employee: {name}")]
    EmptyHistory { name: String },

    #[error("no product split for employee: {name}")]
    MissingSplit { name: String },

    #[error("zero value per lead for employee {name} (conversion {cnv_avg:.2}%, average sale {avg_sale:.2})")]
    DegenerateValuePerLead {
        name: String,
        cnv_avg: f64,
        avg_sale: f64,
    },
}
