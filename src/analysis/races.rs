//! Race list processing and statistics.
//!
//! Pure helpers used by the search pipeline and the report generators:
//! query normalization, ordering, podium filtering and title counting.

use crate::models::{CareerSummary, RaceRecord, StandingRecord};
use std::collections::BTreeMap;

/// Normalize a free-text driver name into a lookup key.
///
/// Lowercases and joins whitespace-separated words with `_`.
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_driver_key(query: &str) -> Option<String> {
    let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join("_"))
    }
}

/// Slugs to try, in order, when looking up a driver.
///
/// The full key comes first (`max_verstappen`). For multi-word queries
/// the last word follows, since many drivers are keyed by family name
/// alone (`hamilton`).
pub fn candidate_slugs(query: &str) -> Vec<String> {
    let Some(full) = normalize_driver_key(query) else {
        return Vec::new();
    };

    let mut slugs = vec![full.clone()];
    if let Some((_, last)) = full.rsplit_once('_') {
        if !last.is_empty() {
            slugs.push(last.to_string());
        }
    }

    slugs
}

/// Encyclopedia page title for a display name (`Lewis_Hamilton`).
pub fn wiki_title(full_name: &str) -> String {
    full_name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Seasons to query, newest first, from `current` down to `floor`.
pub fn season_range(current: i32, floor: i32) -> Vec<i32> {
    (floor..=current).rev().collect()
}

/// Sort races by date, newest first. Ties keep their relative order.
pub fn sort_newest_first(races: &mut [RaceRecord]) {
    races.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Podium finishes, preserving the order of `races`.
pub fn podium_finishes(races: &[RaceRecord]) -> Vec<RaceRecord> {
    races.iter().filter(|r| r.is_podium()).cloned().collect()
}

/// Number of seasons the driver finished first in the standings.
pub fn count_championships(standings: &[StandingRecord]) -> usize {
    standings.iter().filter(|s| s.is_champion()).count()
}

/// Seasons the driver won the title in, oldest first.
pub fn championship_seasons(standings: &[StandingRecord]) -> Vec<i32> {
    let mut seasons: Vec<i32> = standings
        .iter()
        .filter(|s| s.is_champion())
        .map(|s| s.season)
        .collect();
    seasons.sort_unstable();
    seasons
}

/// Per-season tallies, newest season first.
pub fn season_breakdown(races: &[RaceRecord]) -> Vec<(i32, CareerSummary)> {
    let mut by_season: BTreeMap<i32, Vec<RaceRecord>> = BTreeMap::new();

    for race in races {
        by_season.entry(race.season).or_default().push(race.clone());
    }

    by_season
        .into_iter()
        .rev()
        .map(|(season, races)| (season, CareerSummary::from_races(&races)))
        .collect()
}
