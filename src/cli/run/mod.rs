//! Run command - evaluates the selected test cases and writes reports

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::{init_logging, load_config, SelectionArgs, Status};
use crate::config::AppConfig;
use crate::domain::evaluation::{CaseEvaluation, EvaluationRun};
use crate::infrastructure::observability::init_metrics;
use crate::infrastructure::report::{write_report, ConsoleReporter, ReportFormat, TracebackStyle};
use crate::infrastructure::services::{
    resolve_workers, EvaluationOptions, EvaluationService, FailureInspector,
};

/// Number of concurrent workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workers {
    Auto,
    Count(usize),
}

impl Workers {
    /// Worker count where 0 means one per available CPU
    fn requested(self) -> usize {
        match self {
            Workers::Auto => 0,
            Workers::Count(n) => n,
        }
    }
}

impl std::str::FromStr for Workers {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Workers::Auto);
        }

        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Workers::Count(n)),
            _ => Err(format!("Invalid worker count '{}' (expected a positive number or 'auto')", s)),
        }
    }
}

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Increase console verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Evaluate cases concurrently: a number or `auto`
    #[arg(short = 'n', long, value_name = "N|auto")]
    pub workers: Option<Workers>,

    /// Write a self-contained HTML report
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// Write a JSON report
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Write a JUnit XML report
    #[arg(long, value_name = "PATH")]
    pub junit_xml: Option<PathBuf>,

    /// Stop after the first failure
    #[arg(short = 'x', long)]
    pub exitfirst: bool,

    /// Stop after N failures
    #[arg(long, value_name = "N")]
    pub maxfail: Option<usize>,

    /// Show each failure as JSON and wait for Enter (runs sequentially)
    #[arg(long)]
    pub pdb: bool,

    /// Failure detail in the console summary: short, long or no
    #[arg(long = "tb", value_name = "STYLE", default_value = "short")]
    pub traceback: TracebackStyle,

    /// Base URL of the OLD (confidence-based) search service
    #[arg(long, value_name = "URL")]
    pub old_url: Option<String>,

    /// Base URL of the RAG (LLM-based) search service
    #[arg(long, value_name = "URL")]
    pub rag_url: Option<String>,

    /// Replay recorded classifications from a JSON fixture
    #[arg(long, value_name = "PATH", conflicts_with_all = ["old_url", "rag_url"])]
    pub replay: Option<PathBuf>,

    /// Flag RAG calls slower than this
    #[arg(long, value_name = "MS")]
    pub slow_threshold_ms: Option<f64>,

    /// Write Prometheus metrics for the run to this file
    #[arg(long, value_name = "PATH")]
    pub metrics_file: Option<PathBuf>,
}

impl RunArgs {
    pub fn maxfail(&self) -> Option<usize> {
        if self.exitfirst {
            Some(1)
        } else {
            self.maxfail
        }
    }

    /// Command-line flags take precedence over configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ref url) = self.old_url {
            config.adapters.old.base_url = Some(url.clone());
        }
        if let Some(ref url) = self.rag_url {
            config.adapters.rag.base_url = Some(url.clone());
        }
        if let Some(ref path) = self.replay {
            config.adapters.replay_file = Some(path.clone());
        }
        if let Some(threshold) = self.slow_threshold_ms {
            config.evaluation.slow_threshold_ms = threshold;
        }
        if let Some(workers) = self.workers {
            config.evaluation.workers = workers.requested();
        }
        if let Some(ref path) = self.html {
            config.reports.html = Some(path.clone());
        }
        if let Some(ref path) = self.json {
            config.reports.json = Some(path.clone());
        }
        if let Some(ref path) = self.junit_xml {
            config.reports.junit_xml = Some(path.clone());
        }
        if let Some(ref path) = self.metrics_file {
            config.metrics.file = Some(path.clone());
        }
    }
}

/// Prints the failing case as JSON and waits for Enter on stdin
struct StdinInspector;

#[async_trait]
impl FailureInspector for StdinInspector {
    async fn inspect(&self, evaluation: &CaseEvaluation) {
        match serde_json::to_string_pretty(evaluation) {
            Ok(json) => eprintln!("\n>>> failure in {}\n{}", evaluation.test_case.id(), json),
            Err(e) => eprintln!("\n>>> failure in {} ({})", evaluation.test_case.id(), e),
        }
        eprintln!(">>> press Enter to continue");

        let mut line = String::new();
        let _ = BufReader::new(tokio::io::stdin()).read_line(&mut line).await;
    }
}

/// Run the evaluation
pub async fn run(args: RunArgs) -> anyhow::Result<Status> {
    let mut config = load_config().context("Failed to load configuration")?;
    args.apply(&mut config);
    init_logging(&config);

    let selection = args.selection.selection()?;
    let registry = args
        .selection
        .registry()
        .context("Failed to collect test cases")?;

    if registry.select(&selection).is_empty() {
        println!("no test cases selected ({} collected)", registry.len());
        return Ok(Status::NoTestsCollected);
    }

    let metrics = init_metrics(config.metrics.file.is_some());
    let evaluator =
        crate::create_evaluator(&config).context("Failed to create classifiers")?;

    let options = EvaluationOptions::default()
        .with_workers(resolve_workers(config.evaluation.workers))
        .with_maxfail(args.maxfail());

    let mut service = EvaluationService::new(evaluator, options);
    if args.pdb {
        service = service.with_inspector(Arc::new(StdinInspector));
    }

    let run = service
        .run(&registry, &selection, args.selection.selection_info())
        .await;

    print!(
        "{}",
        ConsoleReporter::new(args.verbose, args.traceback).render(&run)
    );

    write_reports(&config, &run)?;

    if let (Some(metrics), Some(path)) = (metrics, config.metrics.file.as_ref()) {
        metrics.write_to(path)?;
    }

    info!(run_id = %run.run_id, "Run complete");

    Ok(if run.succeeded() {
        Status::Passed
    } else {
        Status::Failed
    })
}

fn write_reports(config: &AppConfig, run: &EvaluationRun) -> anyhow::Result<()> {
    let targets = [
        (ReportFormat::Html, config.reports.html.as_ref()),
        (ReportFormat::Json, config.reports.json.as_ref()),
        (ReportFormat::JunitXml, config.reports.junit_xml.as_ref()),
    ];

    for (format, path) in targets {
        if let Some(path) = path {
            write_report(format, run, path)?;
            println!("{} report written to {}", format.as_str(), path.display());
        }
    }

    Ok(())
}
