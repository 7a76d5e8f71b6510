//! Report generation.
//!
//! Renders a search outcome as a terminal card, a Markdown document or
//! JSON. All renderers take the race view so the same outcome can be
//! shown as all races or podiums only.

use crate::analysis::season_breakdown;
use crate::models::{CareerSummary, DriverProfile, RaceRecord, RaceView, SearchOutcome};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder for a missing value.
const NOT_AVAILABLE: &str = "N/A";

/// Generate the plain text card shown in the terminal.
pub fn generate_text_report(outcome: &SearchOutcome, view: RaceView) -> String {
    let mut output = String::new();
    let driver = &outcome.driver;

    output.push_str(&format!("🏎️  {}\n", driver.full_name()));
    output.push_str(&format!("{}\n", "=".repeat(40)));

    match outcome.image_url {
        Some(ref url) => output.push_str(&format!("Portrait: {}\n", url)),
        None => output.push_str("No Image Available\n"),
    }
    output.push_str(&format!("Nationality: {}\n", driver.nationality));
    output.push_str(&format!("DOB: {}\n", format_birth_date(driver)));
    output.push_str(&format!(
        "Code: {}\n",
        driver.code.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    if let Some(ref number) = driver.permanent_number {
        output.push_str(&format!("Number: {}\n", number));
    }
    output.push_str(&format!(
        "🏆 Championships: {}{}\n",
        outcome.championships,
        title_years(&outcome.title_seasons)
    ));
    output.push_str(&format!("{}\n", career_line(&outcome.career)));
    output.push_str(&format!("\n📖 {}\n", outcome.biography));

    let races = outcome.races_for(view);
    output.push_str(&format!("\n🏁 {}:\n", view.title()));

    if races.is_empty() {
        output.push_str("  (none)\n");
    }

    for race in races {
        output.push_str(&format!(
            "  {} ({}) - {}\n",
            race.race_name, race.season, race.date
        ));
        output.push_str(&format!("    Position: {}\n", race.position_label()));
    }

    output
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(
    outcome: &SearchOutcome,
    view: RaceView,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", outcome.driver.full_name()));

    output.push_str(&generate_profile_section(outcome));
    output.push_str(&generate_biography_section(outcome));
    output.push_str(&generate_seasons_section(&outcome.races));
    output.push_str(&generate_races_section(outcome.races_for(view), view));
    output.push_str(&generate_footer(generated_at));

    output
}

/// Generate the driver profile section.
fn generate_profile_section(outcome: &SearchOutcome) -> String {
    let driver = &outcome.driver;
    let career = &outcome.career;
    let mut section = String::new();

    section.push_str("## Profile\n\n");
    section.push_str(&format!("- **Nationality:** {}\n", driver.nationality));
    section.push_str(&format!(
        "- **Date of Birth:** {}\n",
        format_birth_date(driver)
    ));
    section.push_str(&format!(
        "- **Code:** {}\n",
        driver.code.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    if let Some(ref number) = driver.permanent_number {
        section.push_str(&format!("- **Number:** {}\n", number));
    }
    section.push_str(&format!(
        "- **Championships:** {}{}\n",
        outcome.championships,
        title_years(&outcome.title_seasons)
    ));
    section.push_str(&format!("- **Starts:** {}\n", career.starts));
    section.push_str(&format!("- **Wins:** {}\n", career.wins));
    section.push_str(&format!("- **Podiums:** {}\n", career.podiums));
    if let (Some(first), Some(last)) = (career.first_season, career.last_season) {
        section.push_str(&format!("- **Seasons:** {}-{}\n", first, last));
    }
    section.push('\n');

    section
}

/// Generate the biography section.
fn generate_biography_section(outcome: &SearchOutcome) -> String {
    let mut section = String::new();

    section.push_str("## Biography\n\n");
    if let Some(ref image) = outcome.image_url {
        section.push_str(&format!(
            "![{}]({})\n\n",
            outcome.driver.full_name(),
            image
        ));
    }
    section.push_str(&outcome.biography);
    section.push_str("\n\n");
    if let Some(ref url) = outcome.biography_url {
        section.push_str(&format!("[Read more]({})\n\n", url));
    }

    section
}

/// Generate the per-season table.
fn generate_seasons_section(races: &[RaceRecord]) -> String {
    let breakdown = season_breakdown(races);
    if breakdown.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Seasons\n\n");
    section.push_str("| Season | Starts | Wins | Podiums |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");

    for (season, tally) in breakdown {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            season, tally.starts, tally.wins, tally.podiums
        ));
    }
    section.push('\n');

    section
}

/// Generate the race list section.
fn generate_races_section(races: &[RaceRecord], view: RaceView) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", view.title()));

    if races.is_empty() {
        section.push_str("No races to show.\n\n");
        return section;
    }

    section.push_str("| Date | Race | Season | Constructor | Position |\n");
    section.push_str("|:---|:---|:---:|:---|:---:|\n");

    for race in races {
        section.push_str(&generate_race_row(race));
    }
    section.push('\n');

    section
}

/// Generate a single race table row.
fn generate_race_row(race: &RaceRecord) -> String {
    let position = if race.is_podium() {
        format!("**{}**", race.position_label())
    } else {
        race.position_label().to_string()
    };

    format!(
        "| {} | {} | {} | {} | {} |\n",
        race.date,
        race.race_name,
        race.season,
        race.constructor.as_deref().unwrap_or("-"),
        position
    )
}

/// Generate the report footer.
fn generate_footer(generated_at: DateTime<Utc>) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Generated by pitwall on {}. Data: Ergast API, Wikipedia.*\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    footer
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    view: RaceView,
    #[serde(flatten)]
    outcome: &'a SearchOutcome,
}

/// Generate a JSON report.
pub fn generate_json_report(
    outcome: &SearchOutcome,
    view: RaceView,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let report = JsonReport {
        generated_at,
        view,
        outcome,
    };
    serde_json::to_string_pretty(&report).map_err(Into::into)
}

fn format_birth_date(driver: &DriverProfile) -> String {
    driver
        .date_of_birth
        .map(|d| d.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Title years as a suffix, e.g. ` (2008, 2014)`.
fn title_years(seasons: &[i32]) -> String {
    if seasons.is_empty() {
        return String::new();
    }

    let years: Vec<String> = seasons.iter().map(|s| s.to_string()).collect();
    format!(" ({})", years.join(", "))
}

fn career_line(career: &CareerSummary) -> String {
    let seasons = match (career.first_season, career.last_season) {
        (Some(first), Some(last)) => format!(" | Seasons: {}-{}", first, last),
        _ => String::new(),
    };

    format!(
        "Starts: {} | Wins: {} | Podiums: {}{}",
        career.starts, career.wins, career.podiums, seasons
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_test_race(name: &str, date: (i32, u32, u32), position: &str) -> RaceRecord {
        RaceRecord {
            season: date.0,
            round: date.1,
            race_name: name.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            position: Some(position.to_string()),
            circuit: None,
            constructor: Some("Mercedes".to_string()),
            points: None,
            status: None,
        }
    }

    fn create_test_outcome() -> SearchOutcome {
        let races = vec![
            create_test_race("Bahrain Grand Prix", (2021, 3, 28), "1"),
            create_test_race("Tuscan Grand Prix", (2020, 9, 13), "2"),
            create_test_race("Russian Grand Prix", (2020, 9, 27), "R"),
        ];
        let podiums = races[..2].to_vec();

        SearchOutcome {
            driver: DriverProfile {
                id: "hamilton".to_string(),
                given_name: "Lewis".to_string(),
                family_name: "Hamilton".to_string(),
                nationality: "British".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1985, 1, 7),
                code: Some("HAM".to_string()),
                permanent_number: Some("44".to_string()),
                url: None,
            },
            career: CareerSummary::from_races(&races),
            races,
            podiums,
            championships: 7,
            title_seasons: vec![2008, 2014, 2015, 2017, 2018, 2019, 2020],
            biography: "British racing driver.".to_string(),
            image_url: Some("https://img/hamilton.jpg".to_string()),
            biography_url: Some("https://en.wikipedia.org/wiki/Lewis_Hamilton".to_string()),
        }
    }

    #[test]
    fn test_generate_text_report() {
        let outcome = create_test_outcome();
        let text = generate_text_report(&outcome, RaceView::All);

        assert!(text.contains("Lewis Hamilton"));
        assert!(text.contains("Nationality: British"));
        assert!(text.contains("DOB: 1985-01-07"));
        assert!(text.contains("Code: HAM"));
        assert!(text.contains(
            "Championships: 7 (2008, 2014, 2015, 2017, 2018, 2019, 2020)"
        ));
        assert!(text.contains("All Races (Newest First)"));
        assert!(text.contains("Bahrain Grand Prix (2021) - 2021-03-28"));
        assert!(text.contains("Russian Grand Prix"));
        assert!(text.contains("Position: R"));
    }

    #[test]
    fn test_text_report_podium_view() {
        let outcome = create_test_outcome();
        let text = generate_text_report(&outcome, RaceView::Podiums);

        assert!(text.contains("Podium Finishes"));
        assert!(text.contains("Tuscan Grand Prix"));
        assert!(!text.contains("Russian Grand Prix"));
    }

    #[test]
    fn test_text_report_missing_fields() {
        let mut outcome = create_test_outcome();
        outcome.driver.code = None;
        outcome.driver.date_of_birth = None;
        outcome.image_url = None;
        outcome.podiums.clear();

        let text = generate_text_report(&outcome, RaceView::Podiums);
        assert!(text.contains("Code: N/A"));
        assert!(text.contains("DOB: N/A"));
        assert!(text.contains("No Image Available"));
        assert!(text.contains("(none)"));

        outcome.championships = 0;
        outcome.title_seasons.clear();
        let text = generate_text_report(&outcome, RaceView::All);
        assert!(text.contains("Championships: 0\n"));
    }

    #[test]
    fn test_generate_markdown_report() {
        let outcome = create_test_outcome();
        let markdown = generate_markdown_report(&outcome, RaceView::All, Utc::now());

        assert!(markdown.contains("# Lewis Hamilton"));
        assert!(markdown.contains("## Profile"));
        assert!(markdown.contains("- **Championships:** 7 (2008, 2014"));
        assert!(markdown.contains("## Biography"));
        assert!(markdown.contains("![Lewis Hamilton](https://img/hamilton.jpg)"));
        assert!(markdown.contains("## Seasons"));
        assert!(markdown.contains("| 2020 | 2 | 0 | 1 |"));
        assert!(markdown.contains("## All Races (Newest First)"));
        assert!(markdown.contains("**1**"));
        assert!(markdown.contains("Generated by pitwall"));
    }

    #[test]
    fn test_generate_race_row() {
        let row = generate_race_row(&create_test_race("Monaco Grand Prix", (2019, 5, 26), "1"));
        assert_eq!(
            row,
            "| 2019-05-26 | Monaco Grand Prix | 2019 | Mercedes | **1** |\n"
        );

        let row = generate_race_row(&create_test_race("Monaco Grand Prix", (2019, 5, 26), "R"));
        assert!(row.ends_with("| R |\n"));
    }

    #[test]
    fn test_generate_json_report() {
        let outcome = create_test_outcome();
        let json = generate_json_report(&outcome, RaceView::Podiums, Utc::now()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["view"], "podiums");
        assert_eq!(value["championships"], 7);
        assert_eq!(value["title_seasons"][0], 2008);
        assert_eq!(value["driver"]["id"], "hamilton");
        assert_eq!(value["races"].as_array().unwrap().len(), 3);
        assert_eq!(value["podiums"].as_array().unwrap().len(), 2);
        assert_eq!(value["races"][0]["date"], "2021-03-28");
    }
}
