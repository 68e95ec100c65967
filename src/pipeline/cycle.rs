// src/pipeline/cycle.rs

//! One polling cycle: fetch and diff every search, then notify once.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::SearchDefinition;
use crate::notify::Notifier;
use crate::services::FlightFetcher;

use super::diff::DiffSummary;
use super::state::SearchStates;

/// Summary of a completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub search_count: usize,
    /// Flights tracked across all searches after the cycle
    pub flight_count: usize,
    pub summary: DiffSummary,
}

/// Owns the state table and drives cycles over a fixed list of searches.
///
/// Cycles take `&mut self`, so two cycles can never touch the table at the
/// same time.
pub struct SearchStateUpdater {
    searches: Vec<SearchDefinition>,
    fetcher: Box<dyn FlightFetcher>,
    notifier: Box<dyn Notifier>,
    states: SearchStates,
}

impl SearchStateUpdater {
    pub fn new(
        searches: Vec<SearchDefinition>,
        fetcher: impl FlightFetcher + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            searches,
            fetcher: Box::new(fetcher),
            notifier: Box::new(notifier),
            states: SearchStates::new(),
        }
    }

    pub fn searches(&self) -> &[SearchDefinition] {
        &self.searches
    }

    pub fn states(&self) -> &SearchStates {
        &self.states
    }

    /// Fetch and diff every search in order, then notify.
    ///
    /// A fetch failure aborts the cycle before notifying; searches diffed
    /// earlier in the cycle keep their new state. A notify failure leaves the
    /// table as diffed.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let start_time = Utc::now();
        let mut summary = DiffSummary::default();

        for search in &self.searches {
            let snapshots = self.fetcher.fetch(search).await.map_err(|e| match e {
                AppError::Fetch { .. } => e,
                other => AppError::fetch(search.to_string(), other),
            })?;

            let fetched = snapshots.len();
            let diff = self.states.update(search, snapshots);
            log::info!(
                "Search '{}': {} fetched, {} added, {} removed, {} up, {} down, {} unchanged",
                search,
                fetched,
                diff.added,
                diff.removed,
                diff.fare_increased,
                diff.fare_decreased,
                diff.unchanged
            );
            if diff.rejected > 0 {
                log::warn!("Search '{}': {} malformed flights skipped", search, diff.rejected);
            }
            summary.absorb(&diff);
        }

        let notifier = self.notifier.name().to_string();
        self.notifier.notify(&self.states).await.map_err(|e| match e {
            AppError::Notify { .. } => e,
            other => AppError::notify(notifier, other),
        })?;

        Ok(CycleReport {
            start_time,
            end_time: Utc::now(),
            search_count: self.searches.len(),
            flight_count: self.states.len(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::models::{ChangeKind, Fare, FlightSnapshot};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 9)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn search(origin: &str) -> SearchDefinition {
        SearchDefinition {
            min_departure_time: at(0),
            max_arrival_time: at(23),
            origin_airports: BTreeSet::from([origin.to_string()]),
            destination_airports: BTreeSet::from(["SEA".to_string()]),
            max_fare_cents: None,
            max_number_stops: None,
            note: None,
        }
    }

    fn flight(origin: &str, cents: u32) -> FlightSnapshot {
        FlightSnapshot {
            origin_airport: origin.to_string(),
            destination_airport: "SEA".to_string(),
            departure_local_time: at(9),
            arrival_local_time: at(11),
            stops: vec![],
            fares: vec![Fare::new(cents, 2)],
        }
    }

    /// Replies per search from a queue; `None` is a failed fetch.
    #[derive(Default)]
    struct ScriptedFetcher {
        replies: Mutex<HashMap<SearchDefinition, VecDeque<Option<Vec<FlightSnapshot>>>>>,
    }

    impl ScriptedFetcher {
        fn reply(self, search: &SearchDefinition, reply: Option<Vec<FlightSnapshot>>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .entry(search.clone())
                .or_default()
                .push_back(reply);
            self
        }
    }

    #[async_trait]
    impl FlightFetcher for ScriptedFetcher {
        async fn fetch(&self, search: &SearchDefinition) -> Result<Vec<FlightSnapshot>> {
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(search)
                .and_then(|queue| queue.pop_front())
                .flatten();
            reply.ok_or_else(|| AppError::Io(std::io::Error::other("connection reset")))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        seen: Arc<Mutex<Vec<SearchStates>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn notify(&self, states: &SearchStates) -> Result<()> {
            self.seen.lock().unwrap().push(states.clone());
            if self.fail {
                return Err(AppError::Io(std::io::Error::other("smtp down")));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn cycle_diffs_all_searches_then_notifies_once() {
        let (a, b) = (search("SFO"), search("PDX"));
        let fetcher = ScriptedFetcher::default()
            .reply(&a, Some(vec![flight("SFO", 10_000)]))
            .reply(&b, Some(vec![flight("PDX", 8_000)]));
        let notifier = RecordingNotifier::default();
        let seen = Arc::clone(&notifier.seen);

        let mut updater = SearchStateUpdater::new(vec![a, b], fetcher, notifier);
        let report = updater.run_cycle().await.unwrap();

        assert_eq!(report.search_count, 2);
        assert_eq!(report.flight_count, 2);
        assert_eq!(report.summary.added, 2);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(seen.lock().unwrap()[0], *updater.states());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_earlier_searches_and_skips_notify() {
        let (a, b) = (search("SFO"), search("PDX"));
        let fetcher = ScriptedFetcher::default()
            .reply(&a, Some(vec![flight("SFO", 10_000)]))
            .reply(&b, None);
        let notifier = RecordingNotifier::default();
        let seen = Arc::clone(&notifier.seen);

        let mut updater = SearchStateUpdater::new(vec![a.clone(), b.clone()], fetcher, notifier);
        let err = updater.run_cycle().await.unwrap_err();

        assert!(err.is_fetch());
        assert!(seen.lock().unwrap().is_empty());
        let id = flight("SFO", 10_000).identity();
        assert_eq!(updater.states().get(&a, &id).unwrap().change, ChangeKind::Added);
        assert!(updater.states().flights(&b).is_none());
    }

    #[tokio::test]
    async fn notify_failure_keeps_diff() {
        let a = search("SFO");
        let fetcher = ScriptedFetcher::default().reply(&a, Some(vec![flight("SFO", 10_000)]));
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };

        let mut updater = SearchStateUpdater::new(vec![a.clone()], fetcher, notifier);
        let err = updater.run_cycle().await.unwrap_err();

        assert!(matches!(err, AppError::Notify { ref notifier, .. } if notifier == "recording"));
        assert_eq!(updater.states().len(), 1);
    }

    #[tokio::test]
    async fn failed_cycle_does_not_poison_the_next() {
        let a = search("SFO");
        let fetcher = ScriptedFetcher::default()
            .reply(&a, Some(vec![flight("SFO", 10_000)]))
            .reply(&a, None)
            .reply(&a, Some(vec![flight("SFO", 9_000)]));
        let mut updater =
            SearchStateUpdater::new(vec![a.clone()], fetcher, RecordingNotifier::default());

        updater.run_cycle().await.unwrap();
        assert!(updater.run_cycle().await.is_err());
        updater.run_cycle().await.unwrap();

        let id = flight("SFO", 9_000).identity();
        assert_eq!(
            updater.states().get(&a, &id).unwrap().change,
            ChangeKind::FareDecreased
        );
    }
}
