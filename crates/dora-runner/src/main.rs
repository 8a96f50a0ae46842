//! # dora
//!
//! Command-line front end for the Doraemon quant backend.
//!
//! Loads an optional JSON configuration file, builds the HTTP transport and
//! the stores, runs one action and prints its result as JSON on stdout.
//! Logs go to stderr (and optionally a daily-rotated file).
//!
//! # Usage
//!
//! ```bash
//! dora symbols --market US --query apple
//! dora backtest -p market=US -p symbols=usAAPL -p cash=1000000 --wait
//! dora jobs --limit 10
//! dora --config dora.json export 12 --format csv --section orders
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use dora_client::{ExportFormat, HttpTransport, QuantApi, TaskApi};
use dora_core::config::{AppConfig, load_config};
use dora_core::{FilterUpdate, Job, JobId, JobKind, NewTask, SymbolKind};
use dora_store::{QuantStore, TaskStore};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

/// Doraemon quant backend client.
#[derive(Parser)]
#[command(name = "dora", about = "Doraemon quant backend client")]
struct Cli {
    /// Configuration file path (JSON). Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search symbols (one page).
    Symbols {
        #[arg(long)]
        market: Option<String>,
        #[arg(short, long)]
        query: Option<String>,
        /// stock, index or all.
        #[arg(long)]
        kind: Option<SymbolKind>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Look up a single symbol.
    Symbol {
        symbol: String,
        #[arg(long, default_value = "CN")]
        market: String,
    },
    /// Import a market's symbol table on the backend.
    Import {
        #[arg(long, default_value = "CN")]
        market: String,
    },
    /// Start a quant environment verification job.
    Verify {
        /// Poll until the job finishes.
        #[arg(long)]
        wait: bool,
    },
    /// Start a K-line data update job.
    KlUpdate(JobArgs),
    /// Start a backtest job.
    Backtest(JobArgs),
    /// Start a parameter grid search job.
    GridSearch(JobArgs),
    /// Start an analysis tool job.
    Tool(JobArgs),
    /// Create a job of any backend type.
    CreateJob {
        job_type: String,
        #[command(flatten)]
        args: JobArgs,
    },
    /// List recent jobs.
    Jobs {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one job.
    Job {
        id: JobId,
        /// Poll until the job finishes.
        #[arg(long)]
        wait: bool,
    },
    /// Delete a job that is not running.
    DeleteJob { id: JobId },
    /// Export a finished job's result.
    Export {
        id: JobId,
        /// json or csv.
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Top-level result section to export.
        #[arg(long)]
        section: Option<String>,
    },
    /// Show the backend feature map.
    Features,
    /// Check backend liveness.
    Health,
    /// Manage to-do tasks.
    #[command(subcommand)]
    Tasks(TaskCommand),
}

#[derive(Subcommand)]
enum TaskCommand {
    List,
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    Toggle {
        id: i64,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        completed: bool,
    },
    Remove {
        id: i64,
    },
}

#[derive(Args)]
struct JobArgs {
    /// Job parameter as key=value; values that parse as JSON keep their type.
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Whole parameter object as JSON; --param entries are applied on top.
    #[arg(long)]
    params_json: Option<String>,

    /// Poll until the job finishes.
    #[arg(long)]
    wait: bool,
}

impl JobArgs {
    fn to_params(&self) -> Result<Value> {
        let mut params = match &self.params_json {
            Some(raw) => serde_json::from_str(raw).context("--params-json is not valid JSON")?,
            None => json!({}),
        };
        let obj = params
            .as_object_mut()
            .ok_or_else(|| anyhow!("--params-json must be a JSON object"))?;
        for (key, value) in &self.params {
            obj.insert(key.clone(), value.clone());
        }
        Ok(params)
    }
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in {raw:?}"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.log_level = level.clone();
    }

    // 2. Initialize logging
    let log_dir = cli.log_dir.as_deref().or(config.logging.log_path.as_deref());
    dora_core::logging::init_logging(&config.logging.log_level, log_dir, &config.logging.module_name);
    info!("dora starting, backend={}", config.api.api_root());

    // 3. Build transport and stores
    let transport = Arc::new(HttpTransport::new(&config.api)?);
    let quant = QuantStore::new(QuantApi::new(transport.clone()), &config.store);
    let tasks = TaskStore::new(TaskApi::new(transport));

    // 4. Run the command
    run(cli.command, &quant, &tasks).await
}

async fn run(command: Command, quant: &QuantStore, tasks: &TaskStore) -> Result<()> {
    match command {
        Command::Symbols {
            market,
            query,
            kind,
            page,
            page_size,
        } => {
            let update = FilterUpdate {
                market,
                query,
                kind,
                page,
                page_size,
            };
            quant.refresh(update).await;
            let state = quant.snapshot();
            if let Some(err) = state.symbols_status.error {
                bail!("symbol search failed: {err}");
            }
            print_json(&json!({
                "filter": state.filter,
                "total": state.total,
                "items": state.symbols,
            }))
        }
        Command::Symbol { symbol, market } => print_json(&quant.lookup_symbol(&symbol, &market).await?),
        Command::Import { market } => match quant.import_symbols(&market).await {
            Some(result) => print_json(&result),
            None => bail!(
                "symbol import failed: {}",
                quant.snapshot().symbols_status.error.unwrap_or_default()
            ),
        },
        Command::Verify { wait } => {
            let job = quant.start_verify().await?;
            finish_job(quant, job, wait).await
        }
        Command::KlUpdate(args) => start(quant, JobKind::KlUpdate, args).await,
        Command::Backtest(args) => start(quant, JobKind::Backtest, args).await,
        Command::GridSearch(args) => start(quant, JobKind::GridSearch, args).await,
        Command::Tool(args) => start(quant, JobKind::Tool, args).await,
        Command::CreateJob { job_type, args } => {
            let job = quant.create_job(&job_type, args.to_params()?).await?;
            finish_job(quant, job, args.wait).await
        }
        Command::Jobs { limit } => {
            quant.fetch_jobs(limit.unwrap_or(quant.job_fetch_limit())).await;
            let state = quant.snapshot();
            if let Some(err) = state.jobs_status.error {
                bail!("listing jobs failed: {err}");
            }
            print_json(&state.jobs)
        }
        Command::Job { id, wait } => {
            let job = if wait {
                quant.wait_for_job(id).await?
            } else {
                quant.fetch_job(id).await?
            };
            print_json(&job)
        }
        Command::DeleteJob { id } => {
            quant.delete_job(id).await?;
            print_json(&json!({ "id": id }))
        }
        Command::Export {
            id,
            format,
            section,
        } => {
            let body = quant.export_job(id, format, section.as_deref()).await?;
            println!("{body}");
            Ok(())
        }
        Command::Features => print_json(&quant.features().await?),
        Command::Health => print_json(&quant.health().await?),
        Command::Tasks(cmd) => run_tasks(cmd, tasks).await,
    }
}

async fn start(quant: &QuantStore, kind: JobKind, args: JobArgs) -> Result<()> {
    let job = quant.start_job(kind, args.to_params()?).await?;
    finish_job(quant, job, args.wait).await
}

async fn finish_job(quant: &QuantStore, job: Job, wait: bool) -> Result<()> {
    let job = if wait {
        quant.wait_for_job(job.id).await?
    } else {
        job
    };
    print_json(&job)
}

async fn run_tasks(command: TaskCommand, tasks: &TaskStore) -> Result<()> {
    match command {
        TaskCommand::List => {
            tasks.fetch_tasks().await;
            let state = tasks.snapshot();
            if let Some(err) = state.status.error {
                bail!("listing tasks failed: {err}");
            }
            print_json(&state.items)
        }
        TaskCommand::Add { title, description } => {
            let task = NewTask {
                description,
                ..NewTask::new(title)
            };
            print_json(&tasks.add_task(task).await?)
        }
        TaskCommand::Toggle { id, completed } => {
            tasks.toggle_task(id, completed).await?;
            print_json(&json!({ "id": id, "completed": completed }))
        }
        TaskCommand::Remove { id } => {
            tasks.remove_task(id).await?;
            print_json(&json!({ "id": id }))
        }
    }
}
