//! auto-update-report - unified dependency report for build pipelines
//!
//! Merges dependency relocation data, filtered Renovate update suggestions,
//! and Dependency-Track vulnerability and policy-violation exports into one
//! JSON array keyed by package coordinate.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, unreadable or malformed input, write failure)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scanner;
mod sources;

use analysis::{PassStats, ReportAggregator};
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{BuildTool, MergedRecord, ReportSummary};
use scanner::FileScanner;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};
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

    init_logging(&args);

    info!("auto-update-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Report generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default config file.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

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
    println!("   Edit it to customize input names, report directory, and output path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete merge workflow.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let project_root = args.project_root.clone().context("Project root is required")?;
    let build_tool = args.build_tool.context("Build tool is required")?;

    let scanner = FileScanner::new(project_root, config.general.exclude_dir.clone());

    if args.dry_run {
        return handle_dry_run(&scanner, &config);
    }

    let progress = create_progress(args.quiet);
    let built = build_report(&scanner, build_tool, &config, &progress);
    progress.finish_and_clear();
    let built = built?;

    let output_path = config.output_path();
    let output = report::generate_json_report(&built.records, config.report.pretty)?;
    report::write_report(&output_path, &output)?;
    info!(
        "Wrote {} records to {}",
        built.records.len(),
        output_path.display()
    );

    if !args.quiet {
        println!("\n📊 Report Summary:");
        for line in report::generate_summary_text(&built.summary).lines() {
            println!("   {}", line);
        }
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    Ok(())
}

/// The merged records of a run and their summary.
struct BuiltReport {
    records: Vec<MergedRecord>,
    summary: ReportSummary,
}

/// Run the four merge passes in order.
///
/// Nothing is written here; any error leaves the previous report untouched.
fn build_report(
    scanner: &FileScanner,
    build_tool: BuildTool,
    config: &Config,
    progress: &ProgressBar,
) -> Result<BuiltReport> {
    let mut aggregator = ReportAggregator::new();

    // Pass 1: relocations
    progress.set_message("Merging relocation data");
    let relocation_files = scanner.find(&config.sources.relocations)?;
    info!("Found {} relocation file(s)", relocation_files.len());
    let mut stats = PassStats::default();
    for path in &relocation_files {
        let dependencies = sources::load_relocations(path)?;
        stats += aggregator.merge_relocations(dependencies);
    }
    log_pass("relocations", stats, aggregator.records().len());
    progress.inc(1);

    // Pass 2: Renovate update suggestions
    progress.set_message(format!("Merging {} update suggestions", build_tool));
    let renovate_files = scanner.find(&config.sources.renovate)?;
    info!("Found {} renovate file(s)", renovate_files.len());
    let mut stats = PassStats::default();
    for path in &renovate_files {
        let entries = sources::load_renovate(path, build_tool)?;
        stats += aggregator.merge_updates(entries);
    }
    log_pass("updates", stats, aggregator.records().len());
    progress.inc(1);

    // Pass 3: vulnerabilities
    progress.set_message("Merging vulnerabilities");
    let vulnerability_path = config.vulnerability_report_path();
    let findings = sources::load_vulnerabilities(&vulnerability_path)?;
    info!(
        "Loaded {} vulnerabilities from {}",
        findings.len(),
        vulnerability_path.display()
    );
    let stats = aggregator.merge_vulnerabilities(findings);
    log_pass("vulnerabilities", stats, aggregator.records().len());
    progress.inc(1);

    // Pass 4: policy violations
    progress.set_message("Merging policy violations");
    let violation_path = config.policy_violation_report_path();
    let findings = sources::load_policy_violations(&violation_path)?;
    info!(
        "Loaded {} policy violations from {}",
        findings.len(),
        violation_path.display()
    );
    let stats = aggregator.merge_policy_violations(findings);
    log_pass("policy violations", stats, aggregator.records().len());
    progress.inc(1);

    let records = aggregator.into_records();
    let summary =
        ReportSummary::from_records(&records, relocation_files.len(), renovate_files.len());

    Ok(BuiltReport { records, summary })
}

fn log_pass(name: &str, stats: PassStats, total: usize) {
    info!(
        "{}: {} inserted, {} merged, {} skipped ({} records)",
        name, stats.inserted, stats.merged, stats.skipped, total
    );
}

/// Progress bar over the four merge passes.
fn create_progress(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(4);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Input files a run would read.
#[derive(Debug)]
struct InputPlan {
    relocation_files: Vec<PathBuf>,
    renovate_files: Vec<PathBuf>,
    /// Dependency-Track exports that are not present in the report directory.
    missing_reports: Vec<PathBuf>,
}

/// Scan the project tree and check the report directory without reading anything.
fn discover_inputs(scanner: &FileScanner, config: &Config) -> Result<InputPlan> {
    let relocation_files = scanner.find(&config.sources.relocations)?;
    let renovate_files = scanner.find(&config.sources.renovate)?;

    let missing_reports = [
        config.vulnerability_report_path(),
        config.policy_violation_report_path(),
    ]
    .into_iter()
    .filter(|path| !path.is_file())
    .collect();

    Ok(InputPlan {
        relocation_files,
        renovate_files,
        missing_reports,
    })
}

/// Handle --dry-run: list the input files, exit without merging.
fn handle_dry_run(scanner: &FileScanner, config: &Config) -> Result<()> {
    println!(
        "\n🔍 Dry run: scanning {} (no report written)...\n",
        scanner.root().display()
    );

    let plan = discover_inputs(scanner, config)?;

    for (name, files) in [
        (&config.sources.relocations, &plan.relocation_files),
        (&config.sources.renovate, &plan.renovate_files),
    ] {
        println!("   {} ({} found)", name, files.len());
        for file in files {
            println!("     📄 {}", file.display());
        }
    }

    for path in [
        config.vulnerability_report_path(),
        config.policy_violation_report_path(),
    ] {
        let marker = if plan.missing_reports.contains(&path) {
            "❓ missing"
        } else {
            "📄"
        };
        println!("   {} {}", marker, path.display());
    }

    if !plan.missing_reports.is_empty() {
        println!(
            "\n   ⚠️  {} report(s) missing; a real run would fail.",
            plan.missing_reports.len()
        );
    }

    println!("\n   Output would be written to {}", config.output_path().display());
    println!("\n✅ Dry run complete.");
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location; a file that exists but does not parse is an error
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
