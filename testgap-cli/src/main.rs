#![deny(missing_docs)]
//! TestGap command-line interface.
//!
//! Provides batch coverage-gap reporting and test-skeleton scaffolding for a
//! web application source tree.

use chrono::Local;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use testgap_core::{
    GapReport, InspectConfig, PriorityPolicy, ReportOptions, ScaffoldOutcome, ScanConfig,
    ScanPlan, StdFileSystem, language_distribution, render_json, render_markdown, render_text,
    scaffold, scan_group,
};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Default report location, relative to the scanned root.
const DEFAULT_REPORT_PATH: &str = "docs/test-coverage/coverage-gap-analysis.md";

#[derive(Parser)]
#[command(name = "testgap", version, about = "Test coverage gap toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct RootArgs {
    /// Source tree to analyze.
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for the report document.
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
    /// Write the report here instead of the default location under the root.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("targets")
        .required(true)
        .args(&["file", "paths"])
))]
struct TargetArgs {
    /// File containing target paths (one per line, `#` comments allowed).
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Target paths relative to the root.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the tree for coverage gaps and write the analysis report.
    Report {
        #[command(flatten)]
        root: RootArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate test skeletons for listed target files.
    Scaffold {
        #[command(flatten)]
        root: RootArgs,
        #[command(flatten)]
        targets: TargetArgs,
    },
}

#[cfg(not(test))]
fn main() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report { root, output } => run_report(root.root, output)?,
        Commands::Scaffold { root, targets } => {
            run_scaffold(root.root, targets.file, targets.paths)?
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

fn run_report(root: PathBuf, output: OutputArgs) -> CliResult<()> {
    let fs = StdFileSystem::new();
    let scan_config = ScanConfig::default();
    let policy = PriorityPolicy::default();

    println!("=== Component Test Coverage Gap Analysis ===");
    println!("Analyzing {} ...", root.display());

    let plan = ScanPlan::conventional(&fs, &root, &scan_config)?;
    if plan.groups.is_empty() {
        println!("No source groups found under {}.", root.display());
        return Ok(());
    }

    let mut scans = Vec::with_capacity(plan.groups.len());
    for group in &plan.groups {
        scans.push(scan_group(&fs, &root, group, &scan_config, &policy)?);
    }

    let languages = match language_distribution(&fs, &root, &scan_config) {
        Ok(languages) => languages,
        Err(err) => {
            println!("language stats unavailable: {err}");
            Default::default()
        }
    };

    let report = GapReport::build(
        root.clone(),
        scans,
        languages,
        Local::now(),
        &ReportOptions::default(),
    );

    let path = output
        .report_output
        .unwrap_or_else(|| root.join(DEFAULT_REPORT_PATH));
    let contents = match output.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Markdown => render_markdown(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;

    print!("{}", render_text(&report));
    println!("Report written to {}", path.display());

    Ok(())
}

fn run_scaffold(root: PathBuf, file: Option<PathBuf>, paths: Vec<PathBuf>) -> CliResult<()> {
    let targets = match file {
        Some(file) => load_target_list(&file)?,
        None => paths,
    };
    if targets.is_empty() {
        return Err("no scaffold targets provided".into());
    }

    println!("=== Generating Test Skeletons for {} Targets ===", targets.len());

    let summary = process_targets(&root, &targets);

    println!();
    println!(
        "Summary: {} created, {} skipped, {} errors",
        summary.created, summary.skipped, summary.errors
    );

    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ScaffoldSummary {
    created: usize,
    skipped: usize,
    errors: usize,
}

fn process_targets(root: &Path, targets: &[PathBuf]) -> ScaffoldSummary {
    let fs = StdFileSystem::new();
    let scan_config = ScanConfig::default();
    let inspect_config = InspectConfig::default();
    let total = targets.len();
    let mut summary = ScaffoldSummary::default();

    for (index, target) in targets.iter().enumerate() {
        println!("[{}/{}] {}", index + 1, total, target.display());
        match scaffold(&fs, root, target, &scan_config, &inspect_config) {
            Ok(ScaffoldOutcome::Created { test_path, spec }) => {
                summary.created += 1;
                let note = if spec.is_client { " (client component)" } else { "" };
                println!("  created {}{note}", test_path.display());
            }
            Ok(ScaffoldOutcome::SkippedExisting { test_path }) => {
                summary.skipped += 1;
                println!("  already exists, skipped {}", test_path.display());
            }
            Err(err) => {
                summary.errors += 1;
                println!("  error: {err}");
            }
        }
    }

    summary
}

fn load_target_list(path: &Path) -> CliResult<Vec<PathBuf>> {
    let contents = std::fs::read_to_string(path)?;
    let targets = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect();
    Ok(targets)
}
