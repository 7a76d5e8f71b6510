//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.pitwall.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".pitwall.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Upstream service settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Search behaviour.
    #[serde(default)]
    pub search: SearchConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Show podium finishes instead of all races by default.
    #[serde(default)]
    pub podiums_only: bool,
}

/// Upstream HTTP services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Ergast-compatible statistics API.
    #[serde(default = "default_ergast_url")]
    pub ergast_url: String,

    /// Base URL of the Wikipedia REST API.
    #[serde(default = "default_wiki_url")]
    pub wiki_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ergast_url: default_ergast_url(),
            wiki_url: default_wiki_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_ergast_url() -> String {
    // ergast.com was retired; jolpica serves the same API
    "https://api.jolpi.ca/ergast/f1".to_string()
}

fn default_wiki_url() -> String {
    "https://en.wikipedia.org/api/rest_v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("pitwall/{}", env!("CARGO_PKG_VERSION"))
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Oldest season to query.
    #[serde(default = "default_floor_year")]
    pub floor_year: i32,

    /// Maximum season requests in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// `limit` parameter for results and standings requests.
    #[serde(default = "default_results_limit")]
    pub results_limit: usize,

    /// Fetch the Wikipedia summary.
    #[serde(default = "default_true")]
    pub fetch_biography: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            floor_year: default_floor_year(),
            concurrency: default_concurrency(),
            results_limit: default_results_limit(),
            fetch_biography: true,
        }
    }
}

fn default_floor_year() -> i32 {
    crate::search::DEFAULT_FLOOR_YEAR
}

fn default_concurrency() -> usize {
    8
}

fn default_results_limit() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.pitwall.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.ergast_url {
            self.api.ergast_url = url.clone();
        }
        if let Some(ref url) = args.wiki_url {
            self.api.wiki_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(year) = args.from_year {
            self.search.floor_year = year;
        }
        if let Some(concurrency) = args.concurrency {
            self.search.concurrency = concurrency;
        }
        if let Some(limit) = args.limit {
            self.search.results_limit = limit;
        }
        if args.no_bio {
            self.search.fetch_biography = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.podiums {
            self.general.podiums_only = true;
        }
    }

    /// Check the merged settings.
    ///
    /// Applies the same limits as the command-line checks so values that
    /// only come from the config file are held to them too.
    pub fn validate(&self) -> Result<()> {
        for url in [&self.api.ergast_url, &self.api.wiki_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("API URL must start with 'http://' or 'https://': {}", url);
            }
        }

        let floor = crate::search::DEFAULT_FLOOR_YEAR;
        if self.search.floor_year < floor {
            bail!(
                "floor_year {} is before the first championship season ({})",
                self.search.floor_year,
                floor
            );
        }
        if self.search.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.search.results_limit == 0 {
            bail!("results_limit must be at least 1");
        }
        if self.api.timeout_seconds == 0 {
            bail!("timeout_seconds must be at least 1");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
