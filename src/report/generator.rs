//! Recommendation output generation.
//!
//! Renders the canonical JSON document or a Markdown summary table, and
//! writes output atomically so a failed run never leaves a partial file.

use crate::cli::OutputFormat;
use crate::models::Recommendation;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Render recommendations in the requested format.
pub fn render(recommendations: &[Recommendation], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => generate_json_report(recommendations),
        OutputFormat::Markdown => Ok(generate_markdown_report(recommendations)),
    }
}

/// Generate the JSON document (2-space indented array).
pub fn generate_json_report(recommendations: &[Recommendation]) -> Result<String> {
    serde_json::to_string_pretty(recommendations).map_err(Into::into)
}

/// Generate a Markdown summary of the recommendations.
pub fn generate_markdown_report(recommendations: &[Recommendation]) -> String {
    let mut output = String::new();

    output.push_str("# Lead Recommendations\n\n");

    if recommendations.is_empty() {
        output.push_str("No employees had both performance history and a product split.\n");
        return output;
    }

    output.push_str("| Employee | Needed Leads | Shed | Steel | Trend | Conversion % | Avg Sale |\n");
    output.push_str("|:---|:---:|:---:|:---:|:---:|---:|---:|\n");

    for rec in recommendations {
        output.push_str(&generate_row(rec));
    }
    output.push('\n');

    let flagged: Vec<_> = recommendations
        .iter()
        .filter_map(|r| r.diagnostic.as_ref().map(|d| (r.name.as_str(), d)))
        .collect();

    if !flagged.is_empty() {
        output.push_str("## Diagnostics\n\n");
        for (name, diagnostic) in flagged {
            output.push_str(&format!("- **{}**: {}\n", name, diagnostic));
        }
        output.push('\n');
    }

    output
}

/// Generate one table row.
fn generate_row(rec: &Recommendation) -> String {
    let needed = rec
        .needed_leads
        .map(|n| n.to_string())
        .unwrap_or_else(|| "n/a".to_string());

    let (shed, steel) = match rec.recommended_split {
        Some(split) => (split.shed.to_string(), split.steel.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };

    format!(
        "| {} | {} | {} | {} | {} {} | {:.2} | {:.2} |\n",
        rec.name,
        needed,
        shed,
        steel,
        rec.trend.arrow(),
        rec.trend,
        rec.cnv_avg,
        rec.avg_sale
    )
}

/// Write content to `path` atomically.
///
/// The content goes to a temp file beside the target, which then replaces
/// the target in one rename. Missing parent directories are created.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory {}", parent.display()))?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write output for {}", path.display()))?;
    file.flush()?;

    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;

    Ok(())
}
