//! State diff engine.
//!
//! Folds one poll's batch of flight snapshots for a search into the flights
//! already known for that search, classifying every flight as added,
//! removed, cheaper, pricier or unchanged.
//!
//! Entries are never deleted. A flight missing from the batch keeps its last
//! snapshot tagged `Removed`; if it shows up again later it counts as a fresh
//! `Added`, not as a price change against the pre-removal fare.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{ChangeKind, FlightIdentity, FlightSnapshot, FlightState, compare_fares};

/// Flights known for one search, keyed by identity in departure order.
pub type FlightStates = BTreeMap<FlightIdentity, FlightState>;

/// Per-kind counts of one diff, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub fare_increased: usize,
    pub fare_decreased: usize,
    pub unchanged: usize,
    /// Malformed snapshots skipped before diffing
    pub rejected: usize,
}

impl DiffSummary {
    fn record(&mut self, change: ChangeKind) {
        match change {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::FareIncreased => self.fare_increased += 1,
            ChangeKind::FareDecreased => self.fare_decreased += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }
    }

    pub fn count(&self, change: ChangeKind) -> usize {
        match change {
            ChangeKind::Added => self.added,
            ChangeKind::Removed => self.removed,
            ChangeKind::FareIncreased => self.fare_increased,
            ChangeKind::FareDecreased => self.fare_decreased,
            ChangeKind::Unchanged => self.unchanged,
        }
    }

    /// Check if anything other than `Unchanged` was recorded.
    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.fare_increased + self.fare_decreased > 0
    }

    /// Accumulate another summary into this one.
    pub fn absorb(&mut self, other: &DiffSummary) {
        self.added += other.added;
        self.removed += other.removed;
        self.fare_increased += other.fare_increased;
        self.fare_decreased += other.fare_decreased;
        self.unchanged += other.unchanged;
        self.rejected += other.rejected;
    }
}

/// Classify a freshly polled snapshot against the flight's prior state.
pub fn classify(previous: Option<&FlightState>, current: &FlightSnapshot) -> ChangeKind {
    let previous = match previous {
        Some(state) if !state.is_removed() => state,
        _ => return ChangeKind::Added,
    };

    match compare_fares(
        current.cheapest_available_fare(),
        previous.snapshot.cheapest_available_fare(),
    ) {
        Ordering::Greater => ChangeKind::FareIncreased,
        Ordering::Less => ChangeKind::FareDecreased,
        Ordering::Equal => ChangeKind::Unchanged,
    }
}

/// Apply one poll's batch to the flights known for a search.
///
/// Malformed snapshots are skipped with a warning. Within a batch the last
/// snapshot for an identity wins. The result does not depend on batch order
/// beyond that.
pub fn apply_batch(flights: &mut FlightStates, snapshots: Vec<FlightSnapshot>) -> DiffSummary {
    let mut summary = DiffSummary::default();

    let mut current: HashMap<FlightIdentity, FlightSnapshot> =
        HashMap::with_capacity(snapshots.len());
    for snapshot in snapshots {
        if let Err(e) = snapshot.validate() {
            log::warn!("Skipping snapshot: {e}");
            summary.rejected += 1;
            continue;
        }
        let identity = snapshot.identity();
        if current.insert(identity.clone(), snapshot).is_some() {
            log::debug!("Duplicate flight in batch, keeping the last: {identity}");
        }
    }

    // Known flights missing from this batch keep their last snapshot.
    // Only fresh removals are counted.
    for (identity, state) in flights.iter_mut() {
        if !current.contains_key(identity) && !state.is_removed() {
            state.change = ChangeKind::Removed;
            summary.record(ChangeKind::Removed);
        }
    }

    for (identity, snapshot) in current {
        let change = classify(flights.get(&identity), &snapshot);
        summary.record(change);
        flights.insert(identity, FlightState::new(snapshot, change));
    }

    summary
}
