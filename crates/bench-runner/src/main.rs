//! Command-line entry point for the benchmark harness.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use bench_runner::datasets;
use bench_runner::runner::{BatchRunner, DeliberationProcessor, Mode, WorkItem};
use bench_runner::store::{merge_by_id, repair_concatenated, ResultStore};
use deliberation::{DeliberationConfig, OpenAiProvider};

#[derive(Parser)]
#[command(name = "bench-runner", about = "Deliberation benchmark harness", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a dataset through a deliberation strategy.
    Run {
        /// Dataset driver: feverous, sem-tab-facts, tat-qa, or wikisql.
        #[arg(long)]
        dataset: String,
        /// Input records (JSONL or a JSON array).
        #[arg(long)]
        input: PathBuf,
        /// Output JSONL file; doubles as the resumption ledger.
        #[arg(long)]
        output: PathBuf,
        /// Deliberation strategy.
        #[arg(long, value_enum, default_value_t = Mode::Panel)]
        mode: Mode,
        /// Items per batch; also the worker count.
        #[arg(long, default_value_t = 10)]
        batch_size: usize,
        /// Override the configured model identifier.
        #[arg(long)]
        model: Option<String>,
        /// Override the sampling temperature.
        #[arg(long)]
        temperature: Option<f32>,
        /// Reflection budget for both strategies.
        #[arg(long)]
        reflection_turns: Option<u32>,
        /// Log full persona outputs at info level.
        #[arg(long)]
        verbose: bool,
    },
    /// Repair a damaged result file and drop duplicate records.
    Merge {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Identifier field records are keyed by.
        #[arg(long, default_value = "index")]
        id_field: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Run {
            dataset,
            input,
            output,
            mode,
            batch_size,
            model,
            temperature,
            reflection_turns,
            verbose,
        } => {
            run(
                dataset,
                input,
                output,
                mode,
                batch_size,
                model,
                temperature,
                reflection_turns,
                verbose,
            )
            .await
        }
        Command::Merge {
            input,
            output,
            id_field,
        } => merge(input, output, &id_field),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run(
    dataset: String,
    input: PathBuf,
    output: PathBuf,
    mode: Mode,
    batch_size: usize,
    model: Option<String>,
    temperature: Option<f32>,
    reflection_turns: Option<u32>,
    verbose: bool,
) -> Result<()> {
    let benchmark = datasets::by_name(&dataset)
        .with_context(|| format!("unknown dataset: {dataset}"))?;

    let mut config = DeliberationConfig::default();
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(temperature) = temperature {
        config.temperature = temperature;
    }
    if let Some(turns) = reflection_turns {
        config.reflection_turns = turns;
    }
    config.verbose = verbose;

    let provider = Arc::new(OpenAiProvider::from_env()?);

    let content =
        fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let id_field = benchmark.id_field();
    let mut items = Vec::new();
    for record in repair_concatenated(&content)? {
        match WorkItem::from_record(record, id_field) {
            Some(item) => items.push(item),
            None => warn!(field = id_field, "skipping input record without identifier"),
        }
    }
    if items.is_empty() {
        bail!("no usable input records in {}", input.display());
    }

    info!(
        dataset = benchmark.name(),
        mode = ?mode,
        items = items.len(),
        model = %config.model,
        started_at = %Utc::now().to_rfc3339(),
        "starting benchmark run"
    );

    let store = Arc::new(ResultStore::with_id_field(&output, id_field));
    let processor = Arc::new(DeliberationProcessor::new(provider, config, benchmark, mode));
    let summary = BatchRunner::new(Arc::clone(&store), batch_size)
        .run(items, processor)
        .await?;

    info!(
        completed = summary.completed,
        skipped = summary.skipped,
        failed = summary.failed,
        output = %store.path().display(),
        "run finished"
    );
    Ok(())
}

fn merge(input: PathBuf, output: PathBuf, id_field: &str) -> Result<()> {
    let content =
        fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let merged = merge_by_id(repair_concatenated(&content)?, id_field);

    let mut lines = String::new();
    for record in &merged {
        lines.push_str(&record.to_string());
        lines.push('\n');
    }
    fs::write(&output, lines).with_context(|| format!("writing {}", output.display()))?;

    info!(records = merged.len(), output = %output.display(), "merged result file");
    Ok(())
}
