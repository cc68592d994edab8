//! Leadplan - weekly lead recommendations for the sales team
//!
//! Reads historical weekly performance and per-employee product splits,
//! then writes how many extra leads each employee needs to reach the
//! revenue benchmark and how to divide them between shed and steel.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, bad config, strict-mode failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod input;
mod models;
mod report;

use analysis::Plan;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging so `[general] verbose` can raise the level
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, config.general.verbose);

    info!("Leadplan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run(&args, &config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .leadplan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize inputs, benchmark, rounding, and capacity.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = args.log_level(config_verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete batch and print the console summary.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    let (plan, output) = execute(config, args.dry_run)?;

    if args.dry_run {
        println!("{}", output);
        println!("\n✅ Dry run complete. Nothing was written.");
    }

    if args.quiet {
        return Ok(());
    }

    // Print summary
    println!("\n📊 Recommendation Summary:");
    println!("   Employees in performance data: {}", plan.employees_seen);
    println!("   Recommendations: {}", plan.recommendations.len());
    println!("   Total needed leads: {}", plan.total_needed_leads());
    if !plan.missing_split.is_empty() {
        println!("   Without product split: {}", plan.missing_split.join(", "));
    }
    let degenerate = plan.degenerate_count() + plan.skipped_degenerate.len();
    if degenerate > 0 {
        warn!("{} employee(s) have zero gross value per lead", degenerate);
        println!("   Zero value per lead: {}", degenerate);
    }
    println!("   Duration: {:.3}s", start_time.elapsed().as_secs_f64());

    if !args.dry_run {
        println!(
            "\n✅ Recommendations saved to: {}",
            config.general.output
        );
    }

    Ok(())
}

/// Load, aggregate, recommend and render, then write the output unless
/// `dry_run` is set.
///
/// The output file is only touched after every earlier step succeeded.
fn execute(config: &Config, dry_run: bool) -> Result<(Plan, String)> {
    config.validate()?;

    let settings = config.recommender_settings();
    debug!(
        benchmark = settings.benchmark,
        capacity_entries = settings.capacity.len(),
        rounding = ?settings.rounding,
        "Recommender settings"
    );

    // Step 1: Load both documents
    let performance_path = Path::new(&config.general.performance);
    let split_path = Path::new(&config.general.split);

    info!("Loading weekly performance from {}", performance_path.display());
    let weeks = input::load_performance(performance_path)?;

    info!("Loading product splits from {}", split_path.display());
    let splits = input::load_splits(split_path)?;

    // Step 2: Aggregate and recommend
    let plan = analysis::plan_recommendations(
        &weeks,
        &splits,
        &settings,
        config.recommender.missing_split,
    )?;

    if !plan.missing_split.is_empty() {
        info!(
            "Skipped {} employee(s) without a product split",
            plan.missing_split.len()
        );
    }

    // Step 3: Render and write
    let output = report::render(&plan.recommendations, config.general.format)?;

    if !dry_run {
        report::write_atomic(Path::new(&config.general.output), &output)?;
    }

    Ok((plan, output))
}

/// Load configuration from file or use defaults.
///
/// Also returns the path the configuration came from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // A malformed default config aborts the run
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(CONFIG_FILE_NAME)))),
        None => Ok((Config::default(), None)),
    }
}
