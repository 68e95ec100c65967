//! Search state table.
//!
//! Maps every search to the flights known for it. Entries are created the
//! first time a search is polled and live for the rest of the process.

use std::collections::BTreeMap;

use crate::models::{ChangeKind, FlightIdentity, FlightSnapshot, FlightState, SearchDefinition};

use super::diff::{DiffSummary, FlightStates, apply_batch};

/// Flight states per search.
///
/// Iteration is ordered by search (chronological departure window), then by
/// flight departure time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStates {
    searches: BTreeMap<SearchDefinition, FlightStates>,
}

impl SearchStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff a fresh batch into the entry for `search`.
    ///
    /// Other searches are never touched, even when they share flights.
    pub fn update(&mut self, search: &SearchDefinition, snapshots: Vec<FlightSnapshot>) -> DiffSummary {
        let flights = self.searches.entry(search.clone()).or_default();
        apply_batch(flights, snapshots)
    }

    pub fn get(&self, search: &SearchDefinition, identity: &FlightIdentity) -> Option<&FlightState> {
        self.searches.get(search)?.get(identity)
    }

    pub fn flights(&self, search: &SearchDefinition) -> Option<&FlightStates> {
        self.searches.get(search)
    }

    /// Searches with their flights, in display order.
    pub fn searches(&self) -> impl Iterator<Item = (&SearchDefinition, &FlightStates)> {
        self.searches.iter()
    }

    /// Flattened `(search, flight)` pairs, in display order.
    pub fn entries(&self) -> impl Iterator<Item = (&SearchDefinition, &FlightState)> {
        self.searches
            .iter()
            .flat_map(|(search, flights)| flights.values().map(move |state| (search, state)))
    }

    /// Drop removed flights; also report whether anything remaining was
    /// added or got cheaper.
    pub fn only_available(&self) -> (SearchStates, bool) {
        let mut any_improved = false;
        let searches = self
            .searches
            .iter()
            .map(|(search, flights)| {
                let kept: FlightStates = flights
                    .iter()
                    .filter(|(_, state)| !state.is_removed())
                    .map(|(identity, state)| {
                        any_improved |= state.change.is_improvement();
                        (identity.clone(), state.clone())
                    })
                    .collect();
                (search.clone(), kept)
            })
            .collect();

        (SearchStates { searches }, any_improved)
    }

    /// Number of flights currently tagged with `change`.
    pub fn count(&self, change: ChangeKind) -> usize {
        self.entries().filter(|(_, state)| state.change == change).count()
    }

    pub fn search_count(&self) -> usize {
        self.searches.len()
    }

    /// Total flights across all searches.
    pub fn len(&self) -> usize {
        self.searches.values().map(|flights| flights.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
