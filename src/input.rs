//! Loading of the input documents.
//!
//! Both documents are read fully into memory and deserialized into typed
//! models. Any missing field or malformed JSON aborts the run.

use crate::models::{SplitDocument, WeekEntry};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Read and parse a JSON document.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the weekly performance document.
pub fn load_performance(path: &Path) -> Result<Vec<WeekEntry>> {
    let weeks: Vec<WeekEntry> = load_json(path)?;
    debug!(
        "Loaded {} weeks ({} rows) from {}",
        weeks.len(),
        weeks.iter().map(|w| w.data.len()).sum::<usize>(),
        path.display()
    );
    Ok(weeks)
}

/// Load the product split document.
pub fn load_splits(path: &Path) -> Result<SplitDocument> {
    let splits: SplitDocument = load_json(path)?;
    debug!("Loaded {} product splits from {}", splits.len(), path.display());
    Ok(splits)
}
