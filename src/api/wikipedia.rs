//! Wikipedia REST page summary client.

use super::{endpoint, get_text, BiographyApi};
use crate::error::SearchError;
use crate::models::{Biography, BIOGRAPHY_PLACEHOLDER};
use async_trait::async_trait;
use serde::Deserialize;

/// Client for the encyclopedia summary service.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    /// Create a client against `base_url` (e.g. `https://en.wikipedia.org/api/rest_v1`).
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BiographyApi for WikipediaClient {
    async fn page_summary(&self, title: &str) -> Result<Biography, SearchError> {
        let unavailable = |e: SearchError| SearchError::BiographyUnavailable {
            title: title.to_string(),
            reason: e.to_string(),
        };

        let url = endpoint(&self.base_url, &["page", "summary", title]).map_err(unavailable)?;
        let body = get_text(&self.http, url).await.map_err(unavailable)?;

        parse_summary(title, &body)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageSummary {
    extract: Option<String>,
    thumbnail: Option<Thumbnail>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnail {
    source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentUrls {
    desktop: Option<PageUrls>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageUrls {
    page: Option<String>,
}

/// Parse a page summary. A missing extract falls back to the placeholder
/// text while any thumbnail is still kept.
pub(crate) fn parse_summary(title: &str, body: &str) -> Result<Biography, SearchError> {
    let summary: PageSummary =
        serde_json::from_str(body).map_err(|e| SearchError::BiographyUnavailable {
            title: title.to_string(),
            reason: e.to_string(),
        })?;

    Ok(Biography {
        extract: summary
            .extract
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| BIOGRAPHY_PLACEHOLDER.to_string()),
        thumbnail_url: summary.thumbnail.and_then(|t| t.source),
        page_url: summary
            .content_urls
            .and_then(|c| c.desktop)
            .and_then(|d| d.page),
    })
}
