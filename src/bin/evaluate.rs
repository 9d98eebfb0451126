//! Batch evaluation CLI.
//!
//! Replays a recorded-runs file through the evaluation harness and writes
//! the batch report in JSON and markdown form.
//!
//! # Usage
//!
//! ```bash
//! evaluate --runs runs.json
//! evaluate --runs runs.json --config fiteval.toml --output ./reports --limit 5
//! ```
//!
//! The runs file holds the measured output of the external pipelines:
//!
//! ```json
//! {
//!   "candidate": [ { "query": "...", "response": "...", ... } ],
//!   "baseline":  [ { "query": "...", "response": "...", ... } ]
//! }
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default: warn).

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use fiteval::utilities::printer::{Printer, PrinterColor};
use fiteval::{
    BatchReport, EvaluationConfig, EvaluationHarness, PipelineRun, SystemEvaluator,
    TestDataset,
};

/// Which report representations to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Markdown,
    Both,
}

#[derive(Debug, Parser)]
#[command(
    name = "evaluate",
    version = fiteval::VERSION,
    about = "Score recorded fitness-assistant pipeline runs and emit reports"
)]
struct Args {
    /// Recorded-runs JSON file (candidate plus optional baseline runs).
    #[arg(short, long)]
    runs: PathBuf,

    /// Optional TOML file overriding the default evaluation configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the reports are written into.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Which representations to write.
    #[arg(short, long, value_enum, default_value = "both")]
    format: ReportFormat,

    /// Evaluate only the first N candidate runs.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Disable colored output.
    #[arg(long)]
    plain: bool,
}

/// On-disk shape of the recorded-runs file.
#[derive(Debug, Deserialize)]
struct RecordedRuns {
    candidate: Vec<PipelineRun>,
    #[serde(default)]
    baseline: Vec<PipelineRun>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EvaluationConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EvaluationConfig::default(),
    };

    let raw = std::fs::read_to_string(&args.runs)
        .with_context(|| format!("reading runs file {}", args.runs.display()))?;
    let mut runs: RecordedRuns =
        serde_json::from_str(&raw).context("parsing runs file")?;

    if let Some(limit) = args.limit {
        runs.candidate.truncate(limit);
        runs.baseline.truncate(limit);
    }

    let mut harness = EvaluationHarness::new(
        TestDataset::builtin(),
        SystemEvaluator::new(config),
    );
    let report = harness
        .evaluate_runs(&runs.candidate, &runs.baseline)
        .context("evaluating recorded runs")?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");

    let printer = Printer::new(args.plain);
    if matches!(args.format, ReportFormat::Json | ReportFormat::Both) {
        let path = args.output.join(format!("evaluation_results_{}.json", stamp));
        std::fs::write(&path, report.to_json()?)?;
        printer.print(
            &format!("JSON report saved: {}", path.display()),
            PrinterColor::Green,
        );
    }
    if matches!(args.format, ReportFormat::Markdown | ReportFormat::Both) {
        let path = args.output.join(format!("evaluation_report_{}.md", stamp));
        std::fs::write(&path, report.to_markdown()?)?;
        printer.print(
            &format!("Markdown report saved: {}", path.display()),
            PrinterColor::Green,
        );
    }

    print_summary(&printer, &report);
    Ok(())
}

/// Print the headline numbers and findings to the console.
fn print_summary(printer: &Printer, report: &BatchReport) {
    println!();
    printer.heading("Summary Statistics");
    printer.metric("quality", report.summary.avg_quality_score);
    printer.metric("efficiency", report.summary.avg_efficiency_score);
    printer.metric("final", report.summary.avg_final_score);
    println!(
        "  response time: {:.2}s over {} evaluations",
        report.summary.avg_response_time, report.summary.total_evaluations
    );

    println!();
    printer.heading("Key Findings");
    for finding in &report.key_findings {
        printer.print(&format!("- {}", finding), PrinterColor::BoldWhite);
    }

    if let Some(comparison) = &report.comparison {
        println!();
        printer.heading("Recommendation");
        printer.print(&comparison.recommendation, PrinterColor::BoldYellow);
    }
}
