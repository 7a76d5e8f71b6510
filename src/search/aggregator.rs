//! Driver search pipeline.
//!
//! Resolves a driver, fans out one results request per season with a
//! concurrency cap, then adds standings and a biography:
//! - Lookup, season results and standings failures abort the search
//! - Biography failures degrade to placeholder text

use crate::analysis::{
    candidate_slugs, championship_seasons, count_championships, podium_finishes, season_range,
    sort_newest_first, wiki_title,
};
use crate::api::{BiographyApi, StatsApi};
use crate::error::SearchError;
use crate::models::{Biography, CareerSummary, DriverProfile, RaceRecord, SearchOutcome};
use chrono::{Datelike, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Earliest season of the world championship.
pub const DEFAULT_FLOOR_YEAR: i32 = 1950;

/// Configuration for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Oldest season to query.
    pub floor_year: i32,
    /// Maximum number of season requests in flight.
    pub concurrency: usize,
    /// Newest season to query. `None` uses the current calendar year.
    pub current_year: Option<i32>,
    /// Fetch the encyclopedia summary after the race data.
    pub fetch_biography: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            floor_year: DEFAULT_FLOOR_YEAR,
            concurrency: 8,
            current_year: None,
            fetch_biography: true,
        }
    }
}

/// Combines the statistics and encyclopedia services into one search.
pub struct Aggregator<S, B> {
    stats: S,
    biography: B,
    config: AggregatorConfig,
    progress: ProgressBar,
}

impl<S: StatsApi, B: BiographyApi> Aggregator<S, B> {
    pub fn new(stats: S, biography: B, config: AggregatorConfig) -> Self {
        Self {
            stats,
            biography,
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-season fetch progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Run a complete search for a free-text driver name.
    pub async fn resolve_driver_stats(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let slugs = candidate_slugs(query);
        if slugs.is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let driver = self.lookup_driver(query, &slugs).await?;
        info!("Resolved {:?} to driver {}", query.trim(), driver.id);

        let mut races = self.fetch_career(&driver.id).await?;
        sort_newest_first(&mut races);
        let podiums = podium_finishes(&races);
        info!(
            "Collected {} races ({} podiums) for {}",
            races.len(),
            podiums.len(),
            driver.id
        );

        let standings = self.stats.driver_standings(&driver.id).await?;
        let championships = count_championships(&standings);
        let title_seasons = championship_seasons(&standings);
        debug!(
            "{} standings seasons, {} titles",
            standings.len(),
            championships
        );

        let biography = self.fetch_biography(&driver).await;
        let career = CareerSummary::from_races(&races);

        Ok(SearchOutcome {
            driver,
            races,
            podiums,
            championships,
            title_seasons,
            career,
            biography: biography.extract,
            image_url: biography.thumbnail_url,
            biography_url: biography.page_url,
        })
    }

    async fn lookup_driver(
        &self,
        query: &str,
        slugs: &[String],
    ) -> Result<DriverProfile, SearchError> {
        for slug in slugs {
            debug!("Looking up driver slug {}", slug);
            if let Some(driver) = self.stats.lookup_driver(slug).await? {
                return Ok(driver);
            }
        }

        Err(SearchError::DriverNotFound(query.trim().to_string()))
    }

    /// Fetch every season from the current year down to the floor.
    ///
    /// Nothing is returned until all seasons have completed. The first
    /// failure aborts the remaining requests.
    async fn fetch_career(&self, driver_id: &str) -> Result<Vec<RaceRecord>, SearchError> {
        let current = self
            .config
            .current_year
            .unwrap_or_else(|| Utc::now().year());
        let seasons = season_range(current, self.config.floor_year);
        debug!(
            "Fetching {} seasons ({}..={}) for {}",
            seasons.len(),
            self.config.floor_year,
            current,
            driver_id
        );

        self.progress.set_length(seasons.len() as u64);
        self.progress.set_position(0);

        let result: Result<Vec<Vec<RaceRecord>>, SearchError> = stream::iter(seasons)
            .map(|year| async move {
                let races = self.stats.season_results(year, driver_id).await;
                self.progress.inc(1);
                races
            })
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await;

        self.progress.finish_and_clear();

        Ok(result?.into_iter().flatten().collect())
    }

    async fn fetch_biography(&self, driver: &DriverProfile) -> Biography {
        if !self.config.fetch_biography {
            return Biography::placeholder();
        }

        let title = wiki_title(&driver.full_name());
        match self.biography.page_summary(&title).await {
            Ok(bio) => bio,
            Err(e) => {
                warn!("{}", e);
                Biography::placeholder()
            }
        }
    }
}
