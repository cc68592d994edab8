//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation of values clap itself cannot check.

use crate::analysis::RoundingPolicy;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Leadplan - weekly lead recommendations for the sales team
///
/// Reads weekly performance and product split documents, then recommends
/// how many extra leads each employee needs to reach the revenue benchmark
/// and how to divide them between shed and steel.
///
/// Examples:
///   leadplan
///   leadplan --performance data/weeklyPerformance.json --split data/productSplit.json
///   leadplan --benchmark 120000 --capacity "Jason Laird=30"
///   leadplan --strict --format markdown -o output/recommendations.md
///   leadplan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Weekly performance document (JSON)
    ///
    /// Default: data/weeklyPerformance.json, or the path from .leadplan.toml
    #[arg(long, value_name = "FILE")]
    pub performance: Option<PathBuf>,

    /// Product split document (JSON)
    ///
    /// Default: data/productSplit.json, or the path from .leadplan.toml
    #[arg(long, value_name = "FILE")]
    pub split: Option<PathBuf>,

    /// Output file path for the recommendations
    ///
    /// Default: output/recommendations.json, or the path from .leadplan.toml
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .leadplan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Revenue benchmark in dollars (default 100000)
    #[arg(long, value_name = "AMOUNT", env = "LEADPLAN_BENCHMARK")]
    pub benchmark: Option<f64>,

    /// Existing pipeline capacity for an employee (repeatable)
    ///
    /// Example: --capacity "Chris Knighton=25"
    #[arg(long, value_name = "NAME=N", value_parser = parse_capacity)]
    pub capacity: Vec<(String, u32)>,

    /// Rounding used when splitting leads between product lines
    #[arg(long, value_name = "POLICY")]
    pub rounding: Option<RoundingArg>,

    /// Fail on employees without a product split or with zero value per lead
    #[arg(long)]
    pub strict: bool,

    /// Output format (json, markdown)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Compute and print recommendations without writing the output file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .leadplan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the recommendations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON document (default)
    #[default]
    Json,
    /// Markdown summary table
    Markdown,
}

/// Rounding policy for --rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RoundingArg {
    /// 2.5 -> 3, 3.5 -> 4 (default)
    HalfAwayFromZero,
    /// 2.5 -> 2, 3.5 -> 4
    HalfEven,
}

impl From<RoundingArg> for RoundingPolicy {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::HalfAwayFromZero => RoundingPolicy::HalfAwayFromZero,
            RoundingArg::HalfEven => RoundingPolicy::HalfEven,
        }
    }
}

/// Parse a `NAME=N` capacity override.
fn parse_capacity(s: &str) -> Result<(String, u32), String> {
    let (name, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=N, got '{}'", s))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing employee name in '{}'", s));
    }

    let capacity = value
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid capacity '{}': {}", value.trim(), e))?;

    Ok((name.to_string(), capacity))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(benchmark) = self.benchmark {
            if !benchmark.is_finite() || benchmark <= 0.0 {
                return Err("Benchmark must be a positive amount".to_string());
            }
        }

        for path in [&self.performance, &self.split].into_iter().flatten() {
            if !path.exists() {
                return Err(format!("Input file does not exist: {}", path.display()));
            }
            if !path.is_file() {
                return Err(format!("Input path is not a file: {}", path.display()));
            }
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose`; `--quiet` overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
