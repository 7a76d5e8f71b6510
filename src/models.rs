//! Data models for driver searches.
//!
//! This module contains the core data structures produced by a search:
//! the driver profile, individual race results, standings and the
//! combined outcome handed to the report generators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finishing positions that count as a podium.
pub const PODIUM_POSITIONS: [&str; 3] = ["1", "2", "3"];

/// Text shown when no biography could be fetched.
pub const BIOGRAPHY_PLACEHOLDER: &str = "No description available.";

/// A driver as returned by the statistics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverProfile {
    /// Canonical identifier (e.g. `hamilton`, `max_verstappen`).
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub nationality: String,
    /// Date of birth, if the service returned a parseable one.
    pub date_of_birth: Option<NaiveDate>,
    /// Three-letter code (e.g. `HAM`). Older drivers have none.
    pub code: Option<String>,
    /// Permanent car number, drivers since 2014 only.
    pub permanent_number: Option<String>,
    /// Reference page URL.
    pub url: Option<String>,
}

impl DriverProfile {
    /// Given and family name joined with a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }
}

/// A single race entry of the queried driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub season: i32,
    pub round: u32,
    pub race_name: String,
    pub date: NaiveDate,
    /// Finishing position as reported by the service. Kept as a string
    /// since some results carry codes rather than numbers.
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RaceRecord {
    /// Whether the driver finished first, second or third.
    pub fn is_podium(&self) -> bool {
        self.position
            .as_deref()
            .is_some_and(|p| PODIUM_POSITIONS.contains(&p))
    }

    /// Whether the driver won the race.
    pub fn is_win(&self) -> bool {
        self.position.as_deref() == Some("1")
    }

    /// Position for display, `N/A` when missing.
    pub fn position_label(&self) -> &str {
        self.position.as_deref().unwrap_or("N/A")
    }
}

/// Final classification of the driver in one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRecord {
    pub season: i32,
    pub position: Option<String>,
}

impl StandingRecord {
    pub fn is_champion(&self) -> bool {
        self.position.as_deref() == Some("1")
    }
}

/// Encyclopedia summary of a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biography {
    pub extract: String,
    pub thumbnail_url: Option<String>,
    pub page_url: Option<String>,
}

impl Biography {
    /// The fallback used when the encyclopedia lookup fails.
    pub fn placeholder() -> Self {
        Self {
            extract: BIOGRAPHY_PLACEHOLDER.to_string(),
            thumbnail_url: None,
            page_url: None,
        }
    }
}

/// Aggregate numbers derived from a race sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerSummary {
    /// Number of race entries.
    pub starts: usize,
    pub wins: usize,
    pub podiums: usize,
    pub first_season: Option<i32>,
    pub last_season: Option<i32>,
}

impl CareerSummary {
    /// Creates a summary from a list of races.
    pub fn from_races(races: &[RaceRecord]) -> Self {
        let mut summary = Self {
            starts: races.len(),
            ..Self::default()
        };

        for race in races {
            if race.is_win() {
                summary.wins += 1;
            }
            if race.is_podium() {
                summary.podiums += 1;
            }
            summary.first_season = Some(
                summary
                    .first_season
                    .map_or(race.season, |s| s.min(race.season)),
            );
            summary.last_season = Some(
                summary
                    .last_season
                    .map_or(race.season, |s| s.max(race.season)),
            );
        }

        summary
    }
}

/// Everything a successful search produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub driver: DriverProfile,
    /// All races, newest first.
    pub races: Vec<RaceRecord>,
    /// Podium finishes, same order as `races`.
    pub podiums: Vec<RaceRecord>,
    pub championships: usize,
    /// Seasons the driver won the title in, oldest first.
    pub title_seasons: Vec<i32>,
    pub career: CareerSummary,
    pub biography: String,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography_url: Option<String>,
}

impl SearchOutcome {
    /// Races for the given view.
    pub fn races_for(&self, view: RaceView) -> &[RaceRecord] {
        match view {
            RaceView::All => &self.races,
            RaceView::Podiums => &self.podiums,
        }
    }
}

/// Which subset of the race list is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceView {
    #[default]
    All,
    Podiums,
}

impl RaceView {
    pub fn toggled(self) -> Self {
        match self {
            RaceView::All => RaceView::Podiums,
            RaceView::Podiums => RaceView::All,
        }
    }

    /// Heading used above the race list.
    pub fn title(&self) -> &'static str {
        match self {
            RaceView::All => "All Races (Newest First)",
            RaceView::Podiums => "Podium Finishes",
        }
    }
}

/// Status of the current search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    NotFound,
    Error(String),
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Idle => write!(f, "Idle"),
            SearchStatus::Loading => write!(f, "Loading"),
            SearchStatus::Success => write!(f, "Success"),
            SearchStatus::NotFound => write!(f, "Not found"),
            SearchStatus::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}
