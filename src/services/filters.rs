// src/services/filters.rs

//! Search filters applied to fetched flights before they reach the diff.

use chrono::NaiveDateTime;

use crate::models::{FlightSnapshot, SearchDefinition};

/// A predicate over fetched flights.
pub trait FlightFilter: Send + Sync {
    fn matches(&self, flight: &FlightSnapshot) -> bool;
}

/// Flights with at most this many stops.
pub struct MaxStopsFilter(pub usize);

impl FlightFilter for MaxStopsFilter {
    fn matches(&self, flight: &FlightSnapshot) -> bool {
        flight.stop_count() <= self.0
    }
}

/// Flights whose cheapest available fare exists and is within the ceiling.
pub struct MaxAvailableFareFilter(pub u32);

impl FlightFilter for MaxAvailableFareFilter {
    fn matches(&self, flight: &FlightSnapshot) -> bool {
        flight
            .cheapest_available_fare()
            .is_some_and(|fare| fare.cents <= self.0)
    }
}

/// Flights leaving at or after a time.
pub struct DepartAfterFilter(pub NaiveDateTime);

impl FlightFilter for DepartAfterFilter {
    fn matches(&self, flight: &FlightSnapshot) -> bool {
        flight.departure_local_time >= self.0
    }
}

/// Flights arriving at or before a time.
pub struct ArriveBeforeFilter(pub NaiveDateTime);

impl FlightFilter for ArriveBeforeFilter {
    fn matches(&self, flight: &FlightSnapshot) -> bool {
        flight.arrival_local_time <= self.0
    }
}

/// Every filter a search declares.
pub fn filters_for(search: &SearchDefinition) -> Vec<Box<dyn FlightFilter>> {
    let mut filters: Vec<Box<dyn FlightFilter>> = vec![
        Box::new(DepartAfterFilter(search.min_departure_time)),
        Box::new(ArriveBeforeFilter(search.max_arrival_time)),
    ];
    if let Some(cents) = search.max_fare_cents {
        filters.push(Box::new(MaxAvailableFareFilter(cents)));
    }
    if let Some(stops) = search.max_number_stops {
        filters.push(Box::new(MaxStopsFilter(usize::from(stops))));
    }
    filters
}

/// Keep only flights matching every filter of `search`.
pub fn apply_search_filters(
    search: &SearchDefinition,
    flights: Vec<FlightSnapshot>,
) -> Vec<FlightSnapshot> {
    let filters = filters_for(search);
    flights
        .into_iter()
        .filter(|flight| filters.iter().all(|filter| filter.matches(flight)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::Fare;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn flight(departs: u32, arrives: u32, stops: usize, fares: &[(u32, u32)]) -> FlightSnapshot {
        FlightSnapshot {
            origin_airport: "DAL".to_string(),
            destination_airport: "HOU".to_string(),
            departure_local_time: at(departs),
            arrival_local_time: at(arrives),
            stops: vec!["AUS".to_string(); stops],
            fares: fares.iter().map(|&(c, s)| Fare::new(c, s)).collect(),
        }
    }

    fn search(max_fare: Option<u32>, max_stops: Option<u8>) -> SearchDefinition {
        SearchDefinition {
            min_departure_time: at(8),
            max_arrival_time: at(20),
            origin_airports: BTreeSet::from(["DAL".to_string()]),
            destination_airports: BTreeSet::from(["HOU".to_string()]),
            max_fare_cents: max_fare,
            max_number_stops: max_stops,
            note: None,
        }
    }

    #[test]
    fn time_window_is_inclusive() {
        let kept = apply_search_filters(
            &search(None, None),
            vec![
                flight(8, 20, 0, &[]),
                flight(7, 10, 0, &[]),
                flight(18, 21, 0, &[]),
            ],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].departure_local_time, at(8));
    }

    #[test]
    fn max_fare_requires_available_fare() {
        let kept = apply_search_filters(
            &search(Some(10_000), None),
            vec![
                flight(9, 10, 0, &[(9_000, 0)]),
                flight(10, 11, 0, &[(10_000, 2)]),
                flight(11, 12, 0, &[(10_001, 2)]),
            ],
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].departure_local_time, at(10));
    }

    #[test]
    fn max_stops() {
        let kept = apply_search_filters(
            &search(None, Some(1)),
            vec![flight(9, 12, 0, &[]), flight(9, 13, 1, &[]), flight(9, 14, 2, &[])],
        );
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|f| f.stop_count() <= 1));
    }

    #[test]
    fn filters_for_counts_optional_limits() {
        assert_eq!(filters_for(&search(None, None)).len(), 2);
        assert_eq!(filters_for(&search(Some(1), Some(0))).len(), 4);
    }
}
