use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "browser")]
use scrapjobs_client::BrowserEngine;
use scrapjobs_client::HttpEngine;
use scrapjobs_core::config::{
    DEFAULT_BATCH_SIZE, HarvestConfig, HarvestMode, RetryPolicy, SessionConfig, SourceSelection,
};
use scrapjobs_core::harvest::{HarvestOutcome, Harvester};
use scrapjobs_core::models::{Record, SourceId};
use scrapjobs_core::output::{RecordSink, read_record, record_files, write_json};
use scrapjobs_core::scheduler::TracingHarvestReporter;
use scrapjobs_core::sources::builtin_registry;
use scrapjobs_core::traits::Engine;
use scrapjobs_db::{Database, DatabaseConfig};

/// Pause between retries of a transient failure.
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "scrapjobs", version, about = "Harvest job postings from job boards")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum EngineKind {
    /// Headless Chromium, renders JavaScript
    #[default]
    Browser,
    /// Plain HTTP fetch, server-rendered markup only
    Http,
}

#[derive(Args)]
struct SessionArgs {
    /// Page automation engine
    #[arg(long, global = true, env = "SCRAPJOBS_ENGINE", value_enum, default_value_t)]
    engine: EngineKind,

    /// Timeout for a single navigation or element wait, in seconds
    #[arg(long, global = true, env = "SCRAPJOBS_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Show the browser window
    #[arg(long, global = true, env = "SCRAPJOBS_HEADFUL")]
    headful: bool,

    /// Chrome/Chromium binary to launch
    #[arg(long, global = true, env = "CHROME_BIN")]
    chrome_bin: Option<PathBuf>,
}

impl SessionArgs {
    fn to_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            headless: !self.headful,
            chrome_bin: self.chrome_bin.clone(),
            ..SessionConfig::default()
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Write one JSON file per record into this directory instead of stdout
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of URLs extracted concurrently
    #[arg(short, long, env = "SCRAPJOBS_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Extra tag appended to every record (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Retries for timeouts and navigation errors
    #[arg(long, env = "SCRAPJOBS_RETRIES", default_value_t = 0)]
    retries: u32,

    /// Also insert the records into PostgreSQL (requires DATABASE_URL)
    #[arg(long)]
    save: bool,
}

impl RunArgs {
    fn to_config(&self, mode: HarvestMode) -> HarvestConfig {
        HarvestConfig::new(mode)
            .with_batch_size(self.batch_size)
            .with_retry(RetryPolicy::new(self.retries, RETRY_BACKOFF))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Discover job links and print them as a JSON array
    Links {
        /// Source to discover from (all sources with a listing page if omitted)
        source: Option<SourceId>,
    },

    /// Extract job postings from a JSON array of URLs
    Jobs {
        /// File holding the URL array (stdin if omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Discover job links and extract them in one session
    Harvest {
        /// Source to harvest (all sources with a listing page if omitted)
        source: Option<SourceId>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Insert record files into PostgreSQL (requires DATABASE_URL)
    Ingest {
        /// Directory of record files (a JSON array of file paths on stdin if omitted)
        #[arg(long)]
        from: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scrapjobs=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cancel = shutdown_token();
    let config = cli.session.to_config();

    match cli.session.engine {
        EngineKind::Http => execute(HttpEngine::new(config), cli.command, &cancel).await,
        #[cfg(feature = "browser")]
        EngineKind::Browser => execute(BrowserEngine::new(config), cli.command, &cancel).await,
        #[cfg(not(feature = "browser"))]
        EngineKind::Browser => {
            anyhow::bail!("scrapjobs was built without the `browser` feature; use --engine http")
        }
    }
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Shutdown signal received, stopping after the current batch");
            token.cancel();
        }
    });
    cancel
}

async fn execute<E>(engine: E, command: Commands, cancel: &CancellationToken) -> Result<()>
where
    E: Engine,
    E::Session: 'static,
{
    match command {
        Commands::Links { source } => cmd_links(engine, selection(source), cancel).await,
        Commands::Jobs { file, run } => {
            let urls = read_urls(file.as_deref())?;
            let config = run.to_config(HarvestMode::Urls(urls));
            cmd_harvest(engine, &config, &run, cancel).await
        }
        Commands::Harvest { source, run } => {
            let config = run.to_config(HarvestMode::Discover(selection(source)));
            cmd_harvest(engine, &config, &run, cancel).await
        }
        Commands::Ingest { from } => cmd_ingest(from.as_deref()).await,
    }
}

fn selection(source: Option<SourceId>) -> SourceSelection {
    source.map_or(SourceSelection::All, SourceSelection::One)
}

async fn cmd_links<E>(engine: E, selection: SourceSelection, cancel: &CancellationToken) -> Result<()>
where
    E: Engine,
    E::Session: 'static,
{
    let harvester = Harvester::new(engine, builtin_registry(&[]));
    let report = harvester
        .discover(&selection, cancel)
        .await
        .context("Link discovery failed")?;

    for failure in &report.failures {
        tracing::warn!(source = %failure.source, reason = %failure.reason, "Source skipped");
    }
    tracing::info!(links = report.links.len(), "Discovery complete");

    write_json(&report.links, std::io::stdout().lock())?;
    Ok(())
}

async fn cmd_harvest<E>(
    engine: E,
    config: &HarvestConfig,
    run: &RunArgs,
    cancel: &CancellationToken,
) -> Result<()>
where
    E: Engine,
    E::Session: 'static,
{
    let harvester = Harvester::new(engine, builtin_registry(&run.tags));
    let outcome = harvester
        .harvest(config, &TracingHarvestReporter, cancel)
        .await
        .context("Harvest failed")?;

    log_failures(&outcome);

    let sink = RecordSink::from_output_dir(run.output_dir.clone());
    let written = sink.write(&outcome.records)?;
    if !written.is_empty() {
        tracing::info!(files = written.len(), "Records saved");
    }

    if run.save {
        save_records(&outcome.records).await?;
    }
    Ok(())
}

async fn cmd_ingest(from: Option<&Path>) -> Result<()> {
    let files = match from {
        Some(dir) => record_files(dir)
            .with_context(|| format!("Failed to list record files in {}", dir.display()))?,
        None => parse_paths(&read_input(None)?)?,
    };
    let records = load_records(&files);
    tracing::info!(files = files.len(), records = records.len(), "Record files loaded");

    save_records(&records).await
}

/// Reads every record file, skipping the unreadable ones.
fn load_records(files: &[PathBuf]) -> Vec<Record> {
    files
        .iter()
        .filter_map(|path| match read_record(path) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Record file skipped");
                None
            }
        })
        .collect()
}

async fn save_records(records: &[Record]) -> Result<()> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db.migrate().await?;

    let repo = db.job_repo();
    let report = repo.insert_all(records).await?;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        stored = repo.count().await?,
        "Jobs saved to PostgreSQL"
    );
    Ok(())
}

fn log_failures(outcome: &HarvestOutcome) {
    for failure in &outcome.source_failures {
        tracing::warn!(source = %failure.source, reason = %failure.reason, "Source skipped");
    }
    for failure in &outcome.failures {
        tracing::warn!(url = %failure.url, error = %failure.error, "Job skipped");
    }
    tracing::info!(
        records = outcome.records.len(),
        failed = outcome.failures.len(),
        "Harvest complete"
    );
}

/// Read a JSON array of URLs from `path`, or from stdin when absent.
fn read_urls(path: Option<&Path>) -> Result<Vec<String>> {
    parse_urls(&read_input(path)?)
}

/// Contents of `path`, or all of stdin when absent.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_urls(input: &str) -> Result<Vec<String>> {
    serde_json::from_str(input).context("Expected a JSON array of URL strings")
}

fn parse_paths(input: &str) -> Result<Vec<PathBuf>> {
    serde_json::from_str(input).context("Expected a JSON array of record file paths")
}
