//! Clients for the statistics and encyclopedia services.
//!
//! The aggregator only talks to these through the [`StatsApi`] and
//! [`BiographyApi`] traits.

pub mod ergast;
pub mod wikipedia;

pub use ergast::ErgastClient;
pub use wikipedia::WikipediaClient;

use crate::error::SearchError;
use crate::models::{Biography, DriverProfile, RaceRecord, StandingRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Motorsport statistics service.
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Look up a driver by slug. `Ok(None)` when the service knows no such driver.
    async fn lookup_driver(&self, slug: &str) -> Result<Option<DriverProfile>, SearchError>;

    /// All races of `driver_id` in one season.
    async fn season_results(
        &self,
        year: i32,
        driver_id: &str,
    ) -> Result<Vec<RaceRecord>, SearchError>;

    /// Final standings of `driver_id` for every season they competed in.
    async fn driver_standings(&self, driver_id: &str)
        -> Result<Vec<StandingRecord>, SearchError>;
}

/// Encyclopedia summary service.
#[async_trait]
pub trait BiographyApi: Send + Sync {
    /// Summary of the page with the given title.
    async fn page_summary(&self, title: &str) -> Result<Biography, SearchError>;
}

/// Build the HTTP client shared by both services.
pub fn build_http_client(timeout_seconds: u64, user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .build()
        .context("Failed to create HTTP client")
}

/// Append path segments to a base URL. Segments are percent-encoded.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, SearchError> {
    let mut url =
        Url::parse(base).map_err(|e| SearchError::InvalidUrl(format!("{}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| SearchError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// GET a URL and return the body, failing on non-2xx statuses.
pub(crate) async fn get_text(client: &reqwest::Client, url: Url) -> Result<String, SearchError> {
    let url_str = url.to_string();
    debug!("GET {}", url_str);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SearchError::Http {
            url: url_str.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Status {
            url: url_str,
            status,
        });
    }

    response
        .text()
        .await
        .map_err(|source| SearchError::Http {
            url: url_str,
            source,
        })
}
