//! Crawl and plan commands

use crate::calendar::CalendarDate;
use crate::config::{CrawlConfig, LoadType};
use crate::crawler::config::{MAX_CONCURRENCY, MAX_RETRIES_LIMIT};
use crate::crawler::events::{CrawlEvent, EventSink, TeeSink, TracingSink};
use crate::crawler::progress::ProgressTracker;
use crate::crawler::{CrawlResult, Crawler, RateLimiter};
use crate::fetcher::loader_http::LoaderHttpClient;
use crate::fetcher::DocumentFetcher;
use crate::identifier::SymbolIdentifier;
use crate::output::{write_result, ResultFormat};
use crate::shutdown::SharedShutdown;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::CliError;

/// Parse and validate concurrency value
fn parse_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("concurrency must be at least 1".to_string());
    }
    if value > MAX_CONCURRENCY {
        return Err(format!(
            "concurrency {value} exceeds maximum of {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}

/// Parse a progress step in percent (0 < step <= 100)
fn parse_progress_step(s: &str) -> Result<f64, String> {
    let step: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid percentage"))?;
    if !(step > 0.0 && step <= 100.0) {
        return Err("progress step must be greater than 0 and at most 100".to_string());
    }
    Ok(step)
}

/// Parse a positive timeout in (fractional) seconds
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number of seconds"))?;
    if secs <= 0.0 {
        return Err("timeout must be greater than zero".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// Parse a Shamsi date or `today`
fn parse_date_arg(s: &str) -> Result<CalendarDate, CliError> {
    if s.eq_ignore_ascii_case("today") {
        Ok(CalendarDate::today()?)
    } else {
        Ok(CalendarDate::parse(s)?)
    }
}

/// Energy Symbol Crawler CLI
#[derive(Parser, Debug)]
#[command(name = "energy-symbol-crawler")]
#[command(about = "Crawl daily electricity contract pages from the TSETMC symbol loader", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl symbol pages for every load type and delivery date
    Crawl(CrawlArgs),

    /// List the identifiers a crawl would request, without network access
    Plan(PlanArgs),

    /// Validate identifiers or config files
    Validate(super::ValidateCommand),
}

/// Options that shape the crawl configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// First delivery date (yyyy/MM/dd Shamsi, or `today`)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last delivery date (yyyy/MM/dd Shamsi, or `today`)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Load type as NAME=CODE; repeat to crawl several, in order
    #[arg(long = "load-type")]
    pub load_types: Vec<String>,

    /// User-Agent header
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Venue base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

impl ConfigArgs {
    /// Build and validate the effective configuration
    pub fn resolve(&self) -> Result<CrawlConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_json_file(path)?,
            None => CrawlConfig::default(),
        };

        if let Some(start) = &self.start_date {
            config.start_date = parse_date_arg(start)?;
        }
        if let Some(end) = &self.end_date {
            config.end_date = parse_date_arg(end)?;
        }
        if !self.load_types.is_empty() {
            let load_types = self
                .load_types
                .iter()
                .map(|s| LoadType::parse(s))
                .collect::<Result<Vec<_>, _>>()?;
            config = config.with_load_types(load_types);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments of the crawl command
#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Configuration options
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Requests in flight at once (1-16)
    #[arg(long, default_value = "1", value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// Retries per identifier for transient errors (0-10)
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=MAX_RETRIES_LIMIT as i64))]
    pub max_retries: u32,

    /// Maximum requests per second
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Log a progress summary every N percent of the crawl
    #[arg(long, default_value = "10", value_parser = parse_progress_step)]
    pub progress_step: f64,

    /// Write the result to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Result file format (json or csv)
    #[arg(long, default_value = "json")]
    pub format: ResultFormatArg,
}

/// Result format flag
#[derive(Debug, Clone, Copy)]
pub struct ResultFormatArg(pub ResultFormat);

impl FromStr for ResultFormatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self(ResultFormat::Json)),
            "csv" => Ok(Self(ResultFormat::Csv)),
            _ => Err(format!("Invalid result format: {s}. Valid options: json, csv")),
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

impl CrawlArgs {
    /// Run the crawl and write its result
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = self.config.resolve()?;

        if self.output.is_none() && matches!(self.format.0, ResultFormat::Csv) {
            return Err(CliError::InvalidArgument(
                "--format csv requires --output".to_string(),
            ));
        }

        let mut client = LoaderHttpClient::from_config(&config)?;
        if let Some(rate) = self.rate_limit {
            client = client.with_rate_limiter(Arc::new(RateLimiter::per_second(rate)?));
        }
        let fetcher: Arc<dyn DocumentFetcher> = Arc::new(client);

        let crawler = Crawler::new(fetcher)
            .with_concurrency(self.concurrency)
            .with_max_retries(self.max_retries)
            .with_progress_tracker(
                ProgressTracker::default().with_percentage_step(self.progress_step),
            )
            .with_shutdown(shutdown);

        let bar = match cli.output_format {
            OutputFormat::Human => create_progress_bar(config.total_identifiers()),
            OutputFormat::Json => ProgressBar::hidden(),
        };
        let sink = TeeSink::new(TracingSink, ProgressBarSink::new(bar));

        let result = crawler.run(&config, &sink).await?;

        match &self.output {
            Some(path) => {
                write_result(&result, path, self.format.0)?;
                info!("Result written to {}", path.display());
            }
            None => {
                let text = serde_json::to_string_pretty(&result).map_err(|e| {
                    CliError::InvalidArgument(format!("Failed to serialize result: {e}"))
                })?;
                println!("{text}");
            }
        }

        print_summary(cli.output_format, &config, &result, self.output.as_ref());
        Ok(())
    }
}

fn print_summary(
    format: OutputFormat,
    config: &CrawlConfig,
    result: &CrawlResult,
    output: Option<&PathBuf>,
) {
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "status": if result.interrupted { "interrupted" } else { "completed" },
                "start_date": config.start_date.to_string(),
                "end_date": config.end_date.to_string(),
                "attempted": result.attempted,
                "records": result.entries.len(),
                "failures": result.failures.len(),
                "trades": result.trade_count(),
                "output": output.map(|p| p.display().to_string()),
            });
            eprintln!("{summary}");
        }
        OutputFormat::Human => {
            eprintln!();
            eprintln!(
                "Crawl {}: {} to {}",
                if result.interrupted { "interrupted" } else { "completed" },
                config.start_date,
                config.end_date
            );
            eprintln!("  Attempted: {}", result.attempted);
            eprintln!("  Records:   {}", result.entries.len());
            eprintln!("  Trades:    {}", result.trade_count());
            eprintln!("  Failed:    {}", result.failures.len());
            for failure in &result.failures {
                eprintln!("    {} ({}): {}", failure.identifier, failure.load_type, failure.error);
            }
            if let Some(path) = output {
                eprintln!("  Output:    {}", path.display());
            }
        }
    }
}

/// Arguments of the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Configuration options
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl PlanArgs {
    /// Print every identifier in crawl order
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = self.config.resolve()?;

        let mut counter = 0u64;
        let mut planned = Vec::new();
        for load_type in &config.load_types {
            for date in config.date_range() {
                counter += 1;
                let identifier = SymbolIdentifier::generate(&config, &load_type.code, &date);
                match cli.output_format {
                    OutputFormat::Human => {
                        println!("{counter},{},{identifier},{date}", load_type.name)
                    }
                    OutputFormat::Json => planned.push(serde_json::json!({
                        "counter": counter,
                        "load_type": load_type.name,
                        "identifier": identifier,
                        "date": date,
                    })),
                }
            }
        }

        if cli.output_format == OutputFormat::Json {
            println!("{}", serde_json::Value::Array(planned));
        }
        Ok(())
    }
}

/// Drives an indicatif progress bar from crawl events
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    /// Wrap a progress bar
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl EventSink for ProgressBarSink {
    fn emit(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::Started { total, .. } => self.bar.set_length(*total),
            CrawlEvent::Attempt { identifier, .. } => self.bar.set_message(identifier.to_string()),
            CrawlEvent::Completed { .. } | CrawlEvent::FetchFailed { .. } => self.bar.inc(1),
            CrawlEvent::Interrupted { .. } => self.bar.abandon_with_message("interrupted"),
            CrawlEvent::Finished { .. } => self.bar.finish_with_message("done"),
            _ => {}
        }
    }
}

/// Create progress bar with style
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("Crawling symbols");
    pb
}
