//! File report notifiers.
//!
//! Both notifiers write the available-flights view of the table, replacing
//! the previous report atomically (write to a temp file, then rename).
//!
//! ```text
//! report.html     # rendered only when a flight was added or got cheaper
//! current.json    # rewritten after every cycle
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::ChangeKind;
use crate::pipeline::SearchStates;

use super::Notifier;
use super::render::render_html;

/// Write bytes atomically (write to temp, then rename).
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Writes an HTML report whenever a flight was added or got cheaper.
#[derive(Debug, Clone)]
pub struct HtmlReportNotifier {
    path: PathBuf,
}

impl HtmlReportNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Notifier for HtmlReportNotifier {
    fn name(&self) -> &str {
        "html"
    }

    async fn notify(&self, states: &SearchStates) -> Result<()> {
        let (available, improved) = states.only_available();
        if !improved {
            log::debug!("No added or cheaper flights, leaving {} as is", self.path.display());
            return Ok(());
        }

        write_atomic(&self.path, render_html(&available).as_bytes())
            .await
            .map_err(|e| AppError::notify(self.name(), e))?;
        log::info!(
            "HTML report: {} flights written to {}",
            available.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// One available flight in the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFlight {
    /// Stable flight fingerprint
    pub id: String,
    pub search: String,
    pub search_note: Option<String>,
    pub change: ChangeKind,
    pub origin: String,
    pub destination: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub stops: Vec<String>,
    pub cheapest_fare_cents: Option<u32>,
}

/// Contents of the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    pub count: usize,
    /// Whether any listed flight was added or got cheaper this cycle
    pub has_improvements: bool,
    pub flights: Vec<ReportFlight>,
}

impl ReportData {
    /// Build the report from the available-flights view of `states`.
    pub fn from_states(states: &SearchStates) -> Self {
        let (available, has_improvements) = states.only_available();
        let flights: Vec<ReportFlight> = available
            .entries()
            .map(|(search, state)| {
                let snapshot = &state.snapshot;
                ReportFlight {
                    id: snapshot.identity().fingerprint(),
                    search: search.to_string(),
                    search_note: search.note.clone(),
                    change: state.change,
                    origin: snapshot.origin_airport.clone(),
                    destination: snapshot.destination_airport.clone(),
                    departure: snapshot.departure_local_time,
                    arrival: snapshot.arrival_local_time,
                    stops: snapshot.stops.clone(),
                    cheapest_fare_cents: snapshot.cheapest_available_fare().map(|f| f.cents),
                }
            })
            .collect();

        Self {
            updated_at: Utc::now(),
            count: flights.len(),
            has_improvements,
            flights,
        }
    }
}

/// Rewrites a JSON view of available flights after every cycle.
#[derive(Debug, Clone)]
pub struct JsonReportNotifier {
    path: PathBuf,
}

impl JsonReportNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Notifier for JsonReportNotifier {
    fn name(&self) -> &str {
        "json"
    }

    async fn notify(&self, states: &SearchStates) -> Result<()> {
        let report = ReportData::from_states(states);
        let bytes = serde_json::to_vec_pretty(&report)?;
        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| AppError::notify(self.name(), e))?;
        log::info!(
            "JSON report: {} flights written to {}",
            report.count,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{Fare, FlightSnapshot, SearchDefinition};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn search() -> SearchDefinition {
        SearchDefinition {
            min_departure_time: at(0),
            max_arrival_time: at(23),
            origin_airports: BTreeSet::from(["MDW".to_string()]),
            destination_airports: BTreeSet::from(["BNA".to_string()]),
            max_fare_cents: None,
            max_number_stops: None,
            note: Some("conference".to_string()),
        }
    }

    fn flight(hour: u32, cents: u32) -> FlightSnapshot {
        FlightSnapshot {
            origin_airport: "MDW".to_string(),
            destination_airport: "BNA".to_string(),
            departure_local_time: at(hour),
            arrival_local_time: at(hour + 2),
            stops: vec![],
            fares: vec![Fare::new(cents, 3)],
        }
    }

    #[tokio::test]
    async fn html_report_written_only_on_improvement() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/report.html");
        let notifier = HtmlReportNotifier::new(&path);

        let mut states = SearchStates::new();
        states.update(&search(), vec![flight(8, 10_000)]);
        notifier.notify(&states).await.unwrap();
        assert!(path.exists());

        std::fs::remove_file(&path).unwrap();
        states.update(&search(), vec![flight(8, 12_000)]);
        notifier.notify(&states).await.unwrap();
        assert!(!path.exists());

        states.update(&search(), vec![flight(8, 11_000)]);
        notifier.notify(&states).await.unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("fare decreased"));
        assert!(!dir.path().join("reports/report.tmp").exists());
    }

    #[tokio::test]
    async fn html_report_hides_removed_flights() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.html");
        let notifier = HtmlReportNotifier::new(&path);

        let mut states = SearchStates::new();
        states.update(&search(), vec![flight(8, 10_000)]);
        states.update(&search(), vec![flight(14, 9_000)]);
        notifier.notify(&states).await.unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(">2:00 PM<"));
        assert!(!html.contains(">8:00 AM<"));
        assert!(!html.contains("removed"));
    }

    #[tokio::test]
    async fn json_report_lists_available_flights() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("current.json");
        let notifier = JsonReportNotifier::new(&path);

        let mut states = SearchStates::new();
        states.update(&search(), vec![flight(8, 10_000), flight(12, 8_000)]);
        states.update(&search(), vec![flight(12, 8_000)]);
        notifier.notify(&states).await.unwrap();

        let report: ReportData =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(report.count, 1);
        assert!(!report.has_improvements);

        let listed = &report.flights[0];
        assert_eq!(listed.id, flight(12, 8_000).identity().fingerprint());
        assert_eq!(listed.change, ChangeKind::Unchanged);
        assert_eq!(listed.cheapest_fare_cents, Some(8_000));
        assert_eq!(listed.search_note.as_deref(), Some("conference"));
    }

    #[tokio::test]
    async fn unwritable_path_is_notify_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is expected.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let notifier = JsonReportNotifier::new(blocker.join("current.json"));

        let err = notifier.notify(&SearchStates::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Notify { .. }));
    }
}
