//! Grouping of weekly observations by employee.
//!
//! Employees keep the order in which they first appear in the performance
//! document, and each history keeps week order then row order.

use crate::models::{WeekEntry, WeeklyObservation};
use std::collections::HashMap;

/// Ordered mapping from employee name to their weekly history.
#[derive(Debug, Clone, Default)]
pub struct EmployeeHistories {
    order: Vec<String>,
    index: HashMap<String, Vec<WeeklyObservation>>,
}

impl EmployeeHistories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation to its employee's history.
    pub fn push(&mut self, observation: WeeklyObservation) {
        match self.index.get_mut(&observation.name) {
            Some(history) => history.push(observation),
            None => {
                self.order.push(observation.name.clone());
                self.index.insert(observation.name.clone(), vec![observation]);
            }
        }
    }

    /// Employees in first-seen order, with their histories.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[WeeklyObservation])> {
        self.order.iter().filter_map(|name| {
            self.index
                .get(name)
                .map(|history| (name.as_str(), history.as_slice()))
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Total observations across all employees.
    pub fn observation_count(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
impl EmployeeHistories {
    fn get(&self, name: &str) -> Option<&[WeeklyObservation]> {
        self.index.get(name).map(Vec::as_slice)
    }

    fn names(&self) -> &[String] {
        &self.order
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Group every row of every week by employee.
pub fn group_by_employee(weeks: &[WeekEntry]) -> EmployeeHistories {
    let mut grouped = EmployeeHistories::new();

    for week in weeks {
        for row in &week.data {
            grouped.push(row.clone());
        }
    }

    grouped
}

/// Mean of a field across a history. `None` for an empty history.
pub fn mean_of<F>(history: &[WeeklyObservation], field: F) -> Option<f64>
where
    F: Fn(&WeeklyObservation) -> f64,
{
    if history.is_empty() {
        return None;
    }

    let sum: f64 = history.iter().map(field).sum();
    Some(sum / history.len() as f64)
}
