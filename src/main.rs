//! Pitwall - Formula 1 driver career stats
//!
//! A CLI tool that looks a driver up on an Ergast-compatible statistics
//! API, collects every race result of their career, and adds standings
//! and a Wikipedia biography.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, malformed response, etc.)
//!   3 - Driver not found

mod analysis;
mod api;
mod cli;
mod config;
mod error;
mod interactive;
mod models;
mod report;
mod search;

use anyhow::{Context, Result};
use api::{ErgastClient, WikipediaClient};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::{RaceView, SearchOutcome, SearchStatus};
use search::{Aggregator, AggregatorConfig, SearchSession};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code when the driver lookup comes back empty.
const EXIT_NOT_FOUND: i32 = 3;

type DefaultAggregator = Aggregator<ErgastClient, WikipediaClient>;

#[tokio::main]
async fn main() -> Result<()> {
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

    // Load configuration first so it can raise the log level
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("Pitwall v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Search failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .pitwall.toml.
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
    println!("   Edit it to point at a different API mirror or change the season range.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_logging(level: tracing::Level) {
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

/// Run a single search or the interactive prompt. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    config.validate().context("Invalid configuration")?;

    let aggregator = build_aggregator(&config)?;

    if args.interactive {
        interactive::run(Arc::new(aggregator)).await?;
        return Ok(0);
    }

    run_search(&args, &config, aggregator).await
}

/// Build the API clients and the aggregator from configuration.
fn build_aggregator(config: &Config) -> Result<DefaultAggregator> {
    let http = api::build_http_client(config.api.timeout_seconds, &config.api.user_agent)?;

    info!("Statistics API: {}", config.api.ergast_url);
    debug!("Encyclopedia API: {}", config.api.wiki_url);

    let stats = ErgastClient::new(
        http.clone(),
        config.api.ergast_url.clone(),
        config.search.results_limit,
    );
    let biography = WikipediaClient::new(http, config.api.wiki_url.clone());

    let aggregator_config = AggregatorConfig {
        floor_year: config.search.floor_year,
        concurrency: config.search.concurrency,
        current_year: None,
        fetch_biography: config.search.fetch_biography,
    };

    Ok(Aggregator::new(stats, biography, aggregator_config))
}

/// Run one search and write the report.
async fn run_search(args: &Args, config: &Config, aggregator: DefaultAggregator) -> Result<i32> {
    let start_time = Instant::now();
    let session = SearchSession::new();

    let Some(ticket) = session.begin(&args.driver_query()) else {
        // Blank input is a no-op
        return Ok(0);
    };

    let aggregator = if args.show_progress() {
        aggregator.with_progress(season_progress_bar())
    } else {
        aggregator
    };

    if !args.quiet {
        eprintln!("🔍 Searching for {}...", ticket.query());
    }
    debug!(
        "Seasons from {} with {} requests in flight",
        aggregator.config().floor_year,
        aggregator.config().concurrency
    );

    let result = aggregator.resolve_driver_stats(ticket.query()).await;

    let Some(mut state) = session.finish(&ticket, result) else {
        warn!("Search result was superseded");
        return Ok(1);
    };

    if config.general.podiums_only {
        state = session.set_view(RaceView::Podiums);
    }

    let outcome = match (&state.status, state.outcome.as_deref()) {
        (SearchStatus::Success, Some(outcome)) => outcome,
        (SearchStatus::NotFound, _) => {
            eprintln!("❌ Driver not found. Please enter a valid F1 driver name.");
            return Ok(EXIT_NOT_FOUND);
        }
        (SearchStatus::Error(msg), _) => {
            error!("{}", msg);
            eprintln!("❌ Error fetching data: {}. Please try again.", msg);
            return Ok(1);
        }
        _ => return Ok(0),
    };

    let output = render(outcome, state.view, args.format)?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Report saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    info!(
        "Search for {} finished in {:.1}s",
        outcome.driver.id,
        start_time.elapsed().as_secs_f64()
    );

    Ok(0)
}

/// Render an outcome in the requested format.
fn render(outcome: &SearchOutcome, view: RaceView, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report::generate_text_report(outcome, view),
        OutputFormat::Markdown => report::generate_markdown_report(outcome, view, Utc::now()),
        OutputFormat::Json => report::generate_json_report(outcome, view, Utc::now())?,
    })
}

fn season_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    match ProgressStyle::default_bar().template("   {bar:40.cyan/blue} {pos}/{len} seasons") {
        Ok(style) => bar.set_style(style.progress_chars("█▓░")),
        Err(e) => debug!("Falling back to default progress style: {}", e),
    }
    bar
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
