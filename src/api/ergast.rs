//! Ergast-compatible motorsport statistics client.
//!
//! Responses are wrapped in a deeply nested `MRData` envelope. Every
//! container on the way down is optional: a missing table decodes as
//! empty rather than failing the request.

use super::{endpoint, get_text, StatsApi};
use crate::error::SearchError;
use crate::models::{DriverProfile, RaceRecord, StandingRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

/// Client for the statistics service.
#[derive(Debug, Clone)]
pub struct ErgastClient {
    http: reqwest::Client,
    base_url: String,
    results_limit: usize,
}

impl ErgastClient {
    /// Create a client against `base_url` (e.g. `https://api.jolpi.ca/ergast/f1`).
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, results_limit: usize) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            results_limit,
        }
    }

    fn driver_url(&self, slug: &str) -> Result<Url, SearchError> {
        endpoint(&self.base_url, &["drivers", &format!("{}.json", slug)])
    }

    fn results_url(&self, year: i32, driver_id: &str) -> Result<Url, SearchError> {
        let year = year.to_string();
        let mut url = endpoint(
            &self.base_url,
            &[year.as_str(), "drivers", driver_id, "results.json"],
        )?;
        url.query_pairs_mut()
            .append_pair("limit", &self.results_limit.to_string());
        Ok(url)
    }

    fn standings_url(&self, driver_id: &str) -> Result<Url, SearchError> {
        let mut url = endpoint(
            &self.base_url,
            &["drivers", driver_id, "driverStandings.json"],
        )?;
        url.query_pairs_mut()
            .append_pair("limit", &self.results_limit.to_string());
        Ok(url)
    }
}

#[async_trait]
impl StatsApi for ErgastClient {
    async fn lookup_driver(&self, slug: &str) -> Result<Option<DriverProfile>, SearchError> {
        let url = self.driver_url(slug)?;
        let url_str = url.to_string();
        let body = get_text(&self.http, url).await?;
        parse_driver_table(&url_str, &body)
    }

    async fn season_results(
        &self,
        year: i32,
        driver_id: &str,
    ) -> Result<Vec<RaceRecord>, SearchError> {
        let url = self.results_url(year, driver_id)?;
        let url_str = url.to_string();
        let body = get_text(&self.http, url).await?;
        let races = parse_race_table(&url_str, &body, year)?;
        debug!("{}: {} races in {}", driver_id, races.len(), year);
        Ok(races)
    }

    async fn driver_standings(
        &self,
        driver_id: &str,
    ) -> Result<Vec<StandingRecord>, SearchError> {
        let url = self.standings_url(driver_id)?;
        let url_str = url.to_string();
        let body = get_text(&self.http, url).await?;
        parse_standings_table(&url_str, &body, driver_id)
    }
}

// === Wire format ===

#[derive(Debug, Default, Deserialize)]
struct DriverResponse {
    #[serde(rename = "MRData", default)]
    data: DriverData,
}

#[derive(Debug, Default, Deserialize)]
struct DriverData {
    #[serde(rename = "DriverTable", default)]
    table: DriverTable,
}

#[derive(Debug, Default, Deserialize)]
struct DriverTable {
    #[serde(rename = "Drivers", default)]
    drivers: Vec<RawDriver>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawDriver {
    driver_id: String,
    permanent_number: Option<String>,
    code: Option<String>,
    url: Option<String>,
    given_name: String,
    family_name: String,
    date_of_birth: Option<String>,
    nationality: String,
}

#[derive(Debug, Default, Deserialize)]
struct RaceResponse {
    #[serde(rename = "MRData", default)]
    data: RaceData,
}

#[derive(Debug, Default, Deserialize)]
struct RaceData {
    #[serde(rename = "RaceTable", default)]
    table: RaceTable,
}

#[derive(Debug, Default, Deserialize)]
struct RaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<RawRace>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRace {
    season: Option<String>,
    round: Option<String>,
    #[serde(rename = "raceName")]
    race_name: String,
    #[serde(rename = "Circuit")]
    circuit: Option<RawCircuit>,
    date: Option<String>,
    #[serde(rename = "Results")]
    results: Vec<RawResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCircuit {
    #[serde(rename = "circuitName")]
    circuit_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResult {
    position: Option<String>,
    points: Option<String>,
    status: Option<String>,
    #[serde(rename = "Constructor")]
    constructor: Option<RawConstructor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConstructor {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StandingsResponse {
    #[serde(rename = "MRData", default)]
    data: StandingsData,
}

#[derive(Debug, Default, Deserialize)]
struct StandingsData {
    #[serde(rename = "StandingsTable", default)]
    table: StandingsTable,
}

#[derive(Debug, Default, Deserialize)]
struct StandingsTable {
    #[serde(rename = "StandingsLists", default)]
    lists: Vec<RawStandingsList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStandingsList {
    season: Option<String>,
    #[serde(rename = "DriverStandings")]
    standings: Vec<RawDriverStanding>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDriverStanding {
    position: Option<String>,
    #[serde(rename = "Driver")]
    driver: Option<RawDriverRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDriverRef {
    #[serde(rename = "driverId")]
    driver_id: Option<String>,
}

fn malformed(url: &str, reason: impl ToString) -> SearchError {
    SearchError::Malformed {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a driver lookup response. The first driver wins.
pub(crate) fn parse_driver_table(
    url: &str,
    body: &str,
) -> Result<Option<DriverProfile>, SearchError> {
    let response: DriverResponse = serde_json::from_str(body).map_err(|e| malformed(url, e))?;

    let Some(raw) = response.data.table.drivers.into_iter().next() else {
        return Ok(None);
    };

    if raw.driver_id.is_empty() {
        return Err(malformed(url, "driver entry without driverId"));
    }

    let date_of_birth = raw.date_of_birth.as_deref().and_then(|d| {
        NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|e| warn!("Ignoring date of birth {:?}: {}", d, e))
            .ok()
    });

    Ok(Some(DriverProfile {
        id: raw.driver_id,
        given_name: raw.given_name,
        family_name: raw.family_name,
        nationality: raw.nationality,
        date_of_birth,
        code: raw.code.filter(|c| !c.is_empty()),
        permanent_number: raw.permanent_number,
        url: raw.url,
    }))
}

/// Parse a season results response.
///
/// The race date is required since the combined sequence is ordered by it.
/// A missing or unparseable season falls back to the requested year.
pub(crate) fn parse_race_table(
    url: &str,
    body: &str,
    year: i32,
) -> Result<Vec<RaceRecord>, SearchError> {
    let response: RaceResponse = serde_json::from_str(body).map_err(|e| malformed(url, e))?;

    response
        .data
        .table
        .races
        .into_iter()
        .map(|raw| -> Result<RaceRecord, SearchError> {
            let date_str = raw
                .date
                .ok_or_else(|| malformed(url, format!("race {:?} has no date", raw.race_name)))?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|e| malformed(url, format!("bad race date {:?}: {}", date_str, e)))?;

            let season = raw
                .season
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(year);
            let round = raw
                .round
                .as_deref()
                .and_then(|r| r.parse().ok())
                .unwrap_or(0);

            // Results are filtered by driver, so the first entry is theirs.
            let result = raw.results.into_iter().next().unwrap_or_default();

            Ok(RaceRecord {
                season,
                round,
                race_name: raw.race_name,
                date,
                position: result.position,
                circuit: raw.circuit.and_then(|c| c.circuit_name),
                constructor: result.constructor.and_then(|c| c.name),
                points: result.points,
                status: result.status,
            })
        })
        .collect()
}

/// Parse a standings response, keeping the entries that belong to `driver_id`.
pub(crate) fn parse_standings_table(
    url: &str,
    body: &str,
    driver_id: &str,
) -> Result<Vec<StandingRecord>, SearchError> {
    let response: StandingsResponse =
        serde_json::from_str(body).map_err(|e| malformed(url, e))?;

    let mut records = Vec::new();

    for list in response.data.table.lists {
        let entry = list.standings.into_iter().find(|s| {
            s.driver
                .as_ref()
                .and_then(|d| d.driver_id.as_deref())
                == Some(driver_id)
        });

        let Some(entry) = entry else {
            continue;
        };

        let season_str = list.season.unwrap_or_default();
        let season = season_str
            .parse()
            .map_err(|_| malformed(url, format!("bad standings season {:?}", season_str)))?;

        records.push(StandingRecord {
            season,
            position: entry.position,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost/test.json";

    const DRIVER_JSON: &str = r#"{
        "MRData": {
            "xmlns": "",
            "series": "f1",
            "total": "1",
            "DriverTable": {
                "driverId": "hamilton",
                "Drivers": [{
                    "driverId": "hamilton",
                    "permanentNumber": "44",
                    "code": "HAM",
                    "url": "http://en.wikipedia.org/wiki/Lewis_Hamilton",
                    "givenName": "Lewis",
                    "familyName": "Hamilton",
                    "dateOfBirth": "1985-01-07",
                    "nationality": "British"
                }]
            }
        }
    }"#;

    const RESULTS_JSON: &str = r#"{
        "MRData": {
            "RaceTable": {
                "season": "2021",
                "driverId": "hamilton",
                "Races": [
                    {
                        "season": "2021",
                        "round": "1",
                        "raceName": "Bahrain Grand Prix",
                        "Circuit": {"circuitId": "bahrain", "circuitName": "Bahrain International Circuit"},
                        "date": "2021-03-28",
                        "Results": [{
                            "number": "44",
                            "position": "1",
                            "positionText": "1",
                            "points": "25",
                            "Constructor": {"constructorId": "mercedes", "name": "Mercedes"},
                            "status": "Finished"
                        }]
                    },
                    {
                        "season": "2021",
                        "round": "2",
                        "raceName": "Emilia Romagna Grand Prix",
                        "date": "2021-04-18",
                        "Results": [{"position": "2", "points": "19"}]
                    }
                ]
            }
        }
    }"#;

    const STANDINGS_JSON: &str = r#"{
        "MRData": {
            "StandingsTable": {
                "driverId": "hamilton",
                "StandingsLists": [
                    {"season": "2007", "round": "17", "DriverStandings": [
                        {"position": "2", "Driver": {"driverId": "hamilton"}}
                    ]},
                    {"season": "2008", "round": "18", "DriverStandings": [
                        {"position": "1", "Driver": {"driverId": "hamilton"}}
                    ]},
                    {"season": "2009", "round": "17", "DriverStandings": [
                        {"position": "1", "Driver": {"driverId": "button"}}
                    ]}
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_driver() {
        let driver = parse_driver_table(URL, DRIVER_JSON).unwrap().unwrap();
        assert_eq!(driver.id, "hamilton");
        assert_eq!(driver.full_name(), "Lewis Hamilton");
        assert_eq!(driver.nationality, "British");
        assert_eq!(driver.code.as_deref(), Some("HAM"));
        assert_eq!(driver.permanent_number.as_deref(), Some("44"));
        assert_eq!(driver.date_of_birth, NaiveDate::from_ymd_opt(1985, 1, 7));
    }

    #[test]
    fn test_parse_driver_empty_table() {
        let body = r#"{"MRData": {"DriverTable": {"Drivers": []}}}"#;
        assert!(parse_driver_table(URL, body).unwrap().is_none());

        // Missing containers read as empty
        assert!(parse_driver_table(URL, r#"{"MRData": {}}"#).unwrap().is_none());
        assert!(parse_driver_table(URL, "{}").unwrap().is_none());
    }

    #[test]
    fn test_parse_driver_without_code() {
        let body = r#"{"MRData": {"DriverTable": {"Drivers": [{
            "driverId": "fangio", "givenName": "Juan", "familyName": "Fangio",
            "dateOfBirth": "1911-06-24", "nationality": "Argentine"
        }]}}}"#;
        let driver = parse_driver_table(URL, body).unwrap().unwrap();
        assert_eq!(driver.code, None);
        assert_eq!(driver.permanent_number, None);
    }

    #[test]
    fn test_parse_driver_invalid_json() {
        let err = parse_driver_table(URL, "<html>502</html>").unwrap_err();
        assert!(matches!(err, SearchError::Malformed { .. }));
    }

    #[test]
    fn test_parse_races() {
        let races = parse_race_table(URL, RESULTS_JSON, 2021).unwrap();
        assert_eq!(races.len(), 2);

        let bahrain = &races[0];
        assert_eq!(bahrain.season, 2021);
        assert_eq!(bahrain.round, 1);
        assert_eq!(bahrain.race_name, "Bahrain Grand Prix");
        assert_eq!(bahrain.date, NaiveDate::from_ymd_opt(2021, 3, 28).unwrap());
        assert_eq!(bahrain.position.as_deref(), Some("1"));
        assert_eq!(
            bahrain.circuit.as_deref(),
            Some("Bahrain International Circuit")
        );
        assert_eq!(bahrain.constructor.as_deref(), Some("Mercedes"));
        assert_eq!(bahrain.status.as_deref(), Some("Finished"));

        let imola = &races[1];
        assert_eq!(imola.position.as_deref(), Some("2"));
        assert_eq!(imola.circuit, None);
        assert_eq!(imola.constructor, None);
    }

    #[test]
    fn test_parse_races_empty_season() {
        let body = r#"{"MRData": {"RaceTable": {"season": "1950", "Races": []}}}"#;
        assert!(parse_race_table(URL, body, 1950).unwrap().is_empty());
    }

    #[test]
    fn test_parse_races_season_fallback() {
        let body = r#"{"MRData": {"RaceTable": {"Races": [
            {"raceName": "Monaco Grand Prix", "date": "1955-05-22", "Results": []}
        ]}}}"#;
        let races = parse_race_table(URL, body, 1955).unwrap();
        assert_eq!(races[0].season, 1955);
        assert_eq!(races[0].round, 0);
        assert_eq!(races[0].position, None);
    }

    #[test]
    fn test_parse_races_bad_date() {
        let body = r#"{"MRData": {"RaceTable": {"Races": [
            {"season": "2020", "raceName": "X", "date": "someday"}
        ]}}}"#;
        assert!(matches!(
            parse_race_table(URL, body, 2020),
            Err(SearchError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_standings_filters_driver() {
        let standings = parse_standings_table(URL, STANDINGS_JSON, "hamilton").unwrap();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].season, 2007);
        assert_eq!(standings[0].position.as_deref(), Some("2"));
        assert!(standings[1].is_champion());
    }

    #[test]
    fn test_parse_standings_bad_season() {
        let body = r#"{"MRData": {"StandingsTable": {"StandingsLists": [
            {"season": "", "DriverStandings": [{"position": "1", "Driver": {"driverId": "x"}}]}
        ]}}}"#;
        assert!(parse_standings_table(URL, body, "x").is_err());
    }

    #[test]
    fn test_urls() {
        let client = ErgastClient::new(
            reqwest::Client::new(),
            "https://api.jolpi.ca/ergast/f1",
            100,
        );

        assert_eq!(
            client.driver_url("max_verstappen").unwrap().as_str(),
            "https://api.jolpi.ca/ergast/f1/drivers/max_verstappen.json"
        );
        assert_eq!(
            client.results_url(2021, "hamilton").unwrap().as_str(),
            "https://api.jolpi.ca/ergast/f1/2021/drivers/hamilton/results.json?limit=100"
        );
        assert_eq!(
            client.standings_url("hamilton").unwrap().as_str(),
            "https://api.jolpi.ca/ergast/f1/drivers/hamilton/driverStandings.json?limit=100"
        );
    }

    async fn serve_once(response: &'static [u8]) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response).await.unwrap();
            let _ = socket.shutdown().await;
        });
        addr
    }

    fn local_client(addr: std::net::SocketAddr) -> ErgastClient {
        let http = crate::api::build_http_client(5, "pitwall-test").unwrap();
        ErgastClient::new(http, format!("http://{}/ergast/f1", addr), 100)
    }

    #[tokio::test]
    async fn test_unreachable_service_is_fetch_error() {
        // Bind and release a port so nothing is listening on it
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let err = local_client(addr)
            .lookup_driver("hamilton")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Http { .. }));
        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let addr = serve_once(
            b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;

        let err = local_client(addr)
            .season_results(2021, "hamilton")
            .await
            .unwrap_err();
        match err {
            SearchError::Status { ref url, status } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert!(url.ends_with("/ergast/f1/2021/drivers/hamilton/results.json?limit=100"));
            }
            ref other => panic!("expected a status error, got {:?}", other),
        }
        assert!(err.is_fetch_error());
    }

    #[tokio::test]
    async fn test_successful_response_is_decoded() {
        let addr = serve_once(
            b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 44\r\nconnection: close\r\n\r\n{\"MRData\": {\"DriverTable\": {\"Drivers\": []}}}",
        )
        .await;

        let driver = local_client(addr).lookup_driver("nobody").await.unwrap();
        assert!(driver.is_none());
    }
}
