use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use updater_core::batch::{BatchOrchestrator, BatchReport, SyncSummary};
use updater_core::config::{UpdaterConfig, default_config_path};
use updater_core::{ProcessRunner, RepositoryHandle, SyncEngine, SyncOutcome};

#[derive(Debug, Parser)]
#[command(
    name = "grammar-updater",
    author,
    version,
    about = "Merge upstream changes into every grammar repository under a path"
)]
pub(crate) struct Cli {
    #[arg(value_parser = existing_dir, help = "Directory to search for repositories")]
    pub(crate) path: PathBuf,
    #[arg(long, help = "Config file (defaults to the platform config directory)")]
    pub(crate) config: Option<PathBuf>,
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("path does not exist: {value}"));
    }
    if !path.is_dir() {
        return Err(format!("path is not a directory: {value}"));
    }
    Ok(path)
}

pub(crate) fn run(args: Cli) -> anyhow::Result<ExitCode> {
    let config = match args.config.or_else(default_config_path) {
        Some(path) => UpdaterConfig::load(&path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => {
            debug!("no config directory available; using defaults");
            UpdaterConfig::default()
        }
    };

    let runner = ProcessRunner;
    let engine = SyncEngine::new(&runner, &config)?;
    let progress = |repo: &RepositoryHandle, outcome: &SyncOutcome| {
        println!("{repo}: {outcome}");
    };
    let report = BatchOrchestrator::new(engine)
        .with_progress(&progress)
        .run(&args.path)
        .context("discover repositories")?;

    println!("{}", summary_line(report.summary));
    print_failures(&report);
    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn summary_line(summary: SyncSummary) -> String {
    format!(
        "Repositories: total={} up_to_date={} updated={} failed={}",
        summary.total(),
        summary.up_to_date,
        summary.updated,
        summary.failed
    )
}

fn print_failures(report: &BatchReport) {
    for result in &report.results {
        if let SyncOutcome::Failed(err) = &result.outcome {
            eprintln!("Failed: {}: {err}", result.repo);
        }
    }
}
