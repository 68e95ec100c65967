// src/pipeline/schedule.rs

//! Fixed-period scheduling of polling cycles.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::cycle::SearchStateUpdater;

/// Run a cycle now, then once per `period`, until `shutdown` resolves.
///
/// Cycles run back to back on this task, so a tick never starts before the
/// previous cycle (notification included) returns. Shutdown is only observed
/// between cycles. Cycle errors are logged and the next tick proceeds.
/// Returns the number of cycles run.
pub async fn run_watcher<S>(updater: &mut SearchStateUpdater, period: Duration, shutdown: S) -> usize
where
    S: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut cycles = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("Shutdown requested, stopping after {cycles} cycles");
                break;
            }
            _ = interval.tick() => {}
        }

        cycles += 1;
        log::info!("Updating flights (cycle {cycles})");
        match updater.run_cycle().await {
            Ok(report) => {
                let elapsed = report.end_time - report.start_time;
                log::info!(
                    "Cycle {} done in {}ms: {} searches, {} flights tracked, {} added, {} removed, {} up, {} down",
                    cycles,
                    elapsed.num_milliseconds(),
                    report.search_count,
                    report.flight_count,
                    report.summary.added,
                    report.summary.removed,
                    report.summary.fare_increased,
                    report.summary.fare_decreased,
                );
            }
            Err(e) => log::error!("Error updating flights: {e}"),
        }
    }
    cycles
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{FlightSnapshot, SearchDefinition};
    use crate::notify::Notifier;
    use crate::pipeline::SearchStates;
    use crate::services::FlightFetcher;

    fn search() -> SearchDefinition {
        let day = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        SearchDefinition {
            min_departure_time: day.and_hms_opt(0, 0, 0).unwrap(),
            max_arrival_time: day.and_hms_opt(23, 0, 0).unwrap(),
            origin_airports: BTreeSet::from(["AUS".to_string()]),
            destination_airports: BTreeSet::from(["ELP".to_string()]),
            max_fare_cents: None,
            max_number_stops: None,
            note: None,
        }
    }

    /// Fails every call listed in `failing_calls`, returns nothing otherwise.
    struct FlakyFetcher {
        calls: AtomicUsize,
        failing_calls: Vec<usize>,
    }

    #[async_trait]
    impl FlightFetcher for FlakyFetcher {
        async fn fetch(&self, search: &SearchDefinition) -> Result<Vec<FlightSnapshot>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing_calls.contains(&call) {
                return Err(AppError::fetch(search.to_string(), "timed out"));
            }
            Ok(Vec::new())
        }
    }

    /// Counts notifications and requests shutdown after `stop_after`.
    struct StopAfter {
        count: Arc<AtomicUsize>,
        stop_after: usize,
        shutdown: Arc<Notify>,
    }

    #[async_trait]
    impl Notifier for StopAfter {
        fn name(&self) -> &str {
            "stop-after"
        }

        async fn notify(&self, _states: &SearchStates) -> Result<()> {
            let seen = self.count.fetch_add(1, Ordering::SeqCst) + 1;
            if seen >= self.stop_after {
                self.shutdown.notify_one();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn runs_immediately_and_stops_on_shutdown() {
        let shutdown = Arc::new(Notify::new());
        let count = Arc::new(AtomicUsize::new(0));
        let notifier = StopAfter {
            count: Arc::clone(&count),
            stop_after: 2,
            shutdown: Arc::clone(&shutdown),
        };
        let fetcher = FlakyFetcher {
            calls: AtomicUsize::new(0),
            failing_calls: vec![],
        };
        let mut updater = SearchStateUpdater::new(vec![search()], fetcher, notifier);

        let signal = Arc::clone(&shutdown);
        let cycles = run_watcher(&mut updater, Duration::from_millis(5), async move {
            signal.notified().await
        })
        .await;

        assert_eq!(cycles, 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn keeps_running_after_failed_cycle() {
        let shutdown = Arc::new(Notify::new());
        let count = Arc::new(AtomicUsize::new(0));
        let notifier = StopAfter {
            count: Arc::clone(&count),
            stop_after: 1,
            shutdown: Arc::clone(&shutdown),
        };
        let fetcher = FlakyFetcher {
            calls: AtomicUsize::new(0),
            failing_calls: vec![1],
        };
        let mut updater = SearchStateUpdater::new(vec![search()], fetcher, notifier);

        let signal = Arc::clone(&shutdown);
        let cycles = run_watcher(&mut updater, Duration::from_millis(5), async move {
            signal.notified().await
        })
        .await;

        assert_eq!(cycles, 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_before_start_runs_nothing() {
        let fetcher = FlakyFetcher {
            calls: AtomicUsize::new(0),
            failing_calls: vec![],
        };
        let notifier = StopAfter {
            count: Arc::new(AtomicUsize::new(0)),
            stop_after: usize::MAX,
            shutdown: Arc::new(Notify::new()),
        };
        let mut updater = SearchStateUpdater::new(vec![search()], fetcher, notifier);

        let cycles = run_watcher(&mut updater, Duration::from_secs(3600), async {}).await;
        assert_eq!(cycles, 0);
    }
}
