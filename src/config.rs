//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.leadplan.toml` files.

use crate::analysis::{
    CapacityTable, DegeneratePolicy, MissingSplitPolicy, RecommenderSettings, RoundingPolicy,
    PLATINUM_BENCHMARK,
};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".leadplan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Recommendation math settings.
    #[serde(default)]
    pub recommender: RecommenderConfig,

    /// Existing pipeline capacity per employee.
    #[serde(default = "default_capacity")]
    pub capacity: CapacityTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            recommender: RecommenderConfig::default(),
            capacity: default_capacity(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Weekly performance document.
    #[serde(default = "default_performance")]
    pub performance: String,

    /// Product split document.
    #[serde(default = "default_split")]
    pub split: String,

    /// Recommendations output path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            performance: default_performance(),
            split: default_split(),
            output: default_output(),
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

fn default_performance() -> String {
    "data/weeklyPerformance.json".to_string()
}

fn default_split() -> String {
    "data/productSplit.json".to_string()
}

fn default_output() -> String {
    "output/recommendations.json".to_string()
}

/// Recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Revenue target in dollars.
    #[serde(default = "default_benchmark")]
    pub benchmark: f64,

    /// Rounding for the shed share of leads.
    #[serde(default)]
    pub rounding: RoundingPolicy,

    /// Employees without a product split: "skip" or "error".
    #[serde(default)]
    pub missing_split: MissingSplitPolicy,

    /// Zero value per lead: "flag", "reject" or "skip".
    #[serde(default)]
    pub degenerate: DegeneratePolicy,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            benchmark: default_benchmark(),
            rounding: RoundingPolicy::default(),
            missing_split: MissingSplitPolicy::default(),
            degenerate: DegeneratePolicy::default(),
        }
    }
}

fn default_benchmark() -> f64 {
    PLATINUM_BENCHMARK
}

fn default_capacity() -> CapacityTable {
    [("Chris Knighton", 25), ("Jason Laird", 20)]
        .into_iter()
        .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.leadplan.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref performance) = args.performance {
            self.general.performance = performance.display().to_string();
        }
        if let Some(ref split) = args.split {
            self.general.split = split.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(benchmark) = args.benchmark {
            self.recommender.benchmark = benchmark;
        }
        if let Some(rounding) = args.rounding {
            self.recommender.rounding = rounding.into();
        }

        // --strict turns both lenient policies into hard failures
        if args.strict {
            self.recommender.missing_split = MissingSplitPolicy::Error;
            self.recommender.degenerate = DegeneratePolicy::Reject;
        }

        for (name, capacity) in &args.capacity {
            self.capacity.insert(name.clone(), *capacity);
        }
    }

    /// Settings handed to the recommender.
    pub fn recommender_settings(&self) -> RecommenderSettings {
        RecommenderSettings {
            benchmark: self.recommender.benchmark,
            capacity: self.capacity.clone(),
            rounding: self.recommender.rounding,
            degenerate: self.recommender.degenerate,
        }
    }

    /// Validate values that serde accepts but the math cannot use.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.recommender.benchmark.is_finite() && self.recommender.benchmark > 0.0,
            "benchmark must be a positive amount (got {})",
            self.recommender.benchmark
        );
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
