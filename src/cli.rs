//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Pitwall - Formula 1 driver career stats
///
/// Looks up a driver on an Ergast-compatible statistics API, collects
/// every race result since 1950, counts podiums and championships, and
/// adds a short Wikipedia biography.
///
/// Examples:
///   pitwall Lewis Hamilton
///   pitwall "Max Verstappen" --podiums
///   pitwall alonso --format json --output alonso.json
///   pitwall --interactive
///   pitwall --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Driver name to search for (e.g. Max Verstappen)
    #[arg(
        value_name = "DRIVER",
        required_unless_present_any = ["interactive", "init_config"]
    )]
    pub driver: Vec<String>,

    /// Show only podium finishes in the race list
    #[arg(short, long)]
    pub podiums: bool,

    /// Output format (text, markdown, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .pitwall.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Base URL of the Ergast-compatible statistics API
    #[arg(long, value_name = "URL", env = "PITWALL_ERGAST_URL")]
    pub ergast_url: Option<String>,

    /// Base URL of the Wikipedia REST API
    #[arg(long, value_name = "URL", env = "PITWALL_WIKI_URL")]
    pub wiki_url: Option<String>,

    /// Oldest season to query (default: 1950)
    #[arg(long, value_name = "YEAR")]
    pub from_year: Option<i32>,

    /// Maximum number of season requests in flight (default: 8)
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Result limit per season request (default: 100)
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Request timeout in seconds (default: 30)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the Wikipedia biography lookup
    #[arg(long)]
    pub no_bio: bool,

    /// Read driver names from stdin, one search per line
    ///
    /// A new line supersedes any search still in flight.
    /// Commands: :podiums, :all, :toggle, :quit
    #[arg(short, long, conflicts_with = "output")]
    pub interactive: bool,

    /// Generate a default .pitwall.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text card (default)
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The driver name as a single string.
    pub fn driver_query(&self) -> String {
        self.driver.join(" ")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Positional names are ignored in interactive mode
        if !self.interactive && self.driver_query().trim().is_empty() {
            return Err("Driver name must not be empty".to_string());
        }

        for url in [&self.ergast_url, &self.wiki_url].into_iter().flatten() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!(
                    "API URL must start with 'http://' or 'https://': {}",
                    url
                ));
            }
        }

        if let Some(year) = self.from_year {
            if year < crate::search::DEFAULT_FLOOR_YEAR {
                return Err(format!(
                    "No championship seasons before {}",
                    crate::search::DEFAULT_FLOOR_YEAR
                ));
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.limit == Some(0) {
            return Err("Limit must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_default` is the config file setting; `--quiet` wins over both.
    pub fn log_level(&self, verbose_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether to draw the season progress bar.
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.interactive && self.format == OutputFormat::Text
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            driver: vec!["Lewis".to_string(), "Hamilton".to_string()],
            podiums: false,
            format: OutputFormat::Text,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            ergast_url: None,
            wiki_url: None,
            from_year: None,
            concurrency: None,
            limit: None,
            timeout: None,
            no_bio: false,
            interactive: false,
            init_config: false,
        }
    }

    #[test]
    fn test_driver_query() {
        let args = make_args();
        assert_eq!(args.driver_query(), "Lewis Hamilton");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from(["pitwall", "Max", "Verstappen", "--podiums"]).unwrap();
        assert_eq!(args.driver_query(), "Max Verstappen");
        assert!(args.podiums);
        assert_eq!(args.format, OutputFormat::Text);

        let args = Args::try_parse_from(["pitwall", "--interactive"]).unwrap();
        assert!(args.interactive);
        assert!(args.driver.is_empty());

        assert!(Args::try_parse_from(["pitwall"]).is_err());
    }

    #[test]
    fn test_validation_blank_driver() {
        let mut args = make_args();
        args.driver = vec!["  ".to_string()];
        assert!(args.validate().is_err());

        args.interactive = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.ergast_url = Some("ftp://mirror".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_numbers() {
        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.from_year = Some(1949);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_show_progress() {
        let mut args = make_args();
        assert!(args.show_progress());

        args.format = OutputFormat::Json;
        assert!(!args.show_progress());
    }
}
