// src/models/flight.rs

//! Flight occurrence, its identity across polls, and its tracked state.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::fare::{Fare, cheapest_available};
use crate::utils::airport::is_airport_code;

/// Key recognizing the same flight occurrence across polls.
///
/// Field order drives the derived ordering, so maps keyed by identity
/// iterate in departure order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightIdentity {
    pub departure_local_time: NaiveDateTime,
    pub arrival_local_time: NaiveDateTime,
    pub origin_airport: String,
    pub destination_airport: String,
    pub stops: Vec<String>,
}

impl FlightIdentity {
    /// Stable hex SHA-256 of the identity fields.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.origin_airport.as_bytes());
        hasher.update(b"|");
        hasher.update(self.destination_airport.as_bytes());
        hasher.update(b"|");
        hasher.update(self.departure_local_time.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(self.arrival_local_time.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(self.stops.join(":").as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for FlightIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {}",
            self.origin_airport,
            self.departure_local_time.format("%Y-%m-%d %H:%M"),
            self.destination_airport,
            self.arrival_local_time.format("%Y-%m-%d %H:%M"),
        )?;
        if !self.stops.is_empty() {
            write!(f, " via {}", self.stops.join(","))?;
        }
        Ok(())
    }
}

/// One flight occurrence and its fares as returned by a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSnapshot {
    pub origin_airport: String,
    pub destination_airport: String,
    pub departure_local_time: NaiveDateTime,
    pub arrival_local_time: NaiveDateTime,

    /// Intermediate airports in travel order
    #[serde(default)]
    pub stops: Vec<String>,

    #[serde(default)]
    pub fares: Vec<Fare>,
}

impl FlightSnapshot {
    pub fn identity(&self) -> FlightIdentity {
        FlightIdentity {
            departure_local_time: self.departure_local_time,
            arrival_local_time: self.arrival_local_time,
            origin_airport: self.origin_airport.clone(),
            destination_airport: self.destination_airport.clone(),
            stops: self.stops.clone(),
        }
    }

    pub fn cheapest_available_fare(&self) -> Option<&Fare> {
        cheapest_available(&self.fares)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Reject snapshots that cannot yield a trustworthy identity.
    ///
    /// Times are local to each airport, so an arrival earlier on the clock
    /// than the departure is legitimate when flying west.
    pub fn validate(&self) -> Result<()> {
        if !is_airport_code(&self.origin_airport) {
            return Err(AppError::malformed(format!(
                "invalid origin airport '{}'",
                self.origin_airport
            )));
        }
        if !is_airport_code(&self.destination_airport) {
            return Err(AppError::malformed(format!(
                "invalid destination airport '{}'",
                self.destination_airport
            )));
        }
        if let Some(stop) = self.stops.iter().find(|s| !is_airport_code(s)) {
            return Err(AppError::malformed(format!("invalid stop airport '{stop}'")));
        }
        Ok(())
    }
}

/// Classification of a flight's most recent change within one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Unchanged,
    FareIncreased,
    FareDecreased,
    Added,
    Removed,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 5] = [
        ChangeKind::Unchanged,
        ChangeKind::FareIncreased,
        ChangeKind::FareDecreased,
        ChangeKind::Added,
        ChangeKind::Removed,
    ];

    /// One-character marker used in console output.
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeKind::Unchanged => "-",
            ChangeKind::FareIncreased => "▲",
            ChangeKind::FareDecreased => "▼",
            ChangeKind::Added => "+",
            ChangeKind::Removed => "x",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Unchanged => "unchanged",
            ChangeKind::FareIncreased => "fare increased",
            ChangeKind::FareDecreased => "fare decreased",
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
        }
    }

    /// Changes worth telling someone about.
    pub fn is_improvement(&self) -> bool {
        matches!(self, ChangeKind::Added | ChangeKind::FareDecreased)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Last known snapshot of a flight within one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightState {
    pub snapshot: FlightSnapshot,
    pub change: ChangeKind,
}

impl FlightState {
    pub fn new(snapshot: FlightSnapshot, change: ChangeKind) -> Self {
        Self { snapshot, change }
    }

    pub fn is_removed(&self) -> bool {
        self.change == ChangeKind::Removed
    }
}
