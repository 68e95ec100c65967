// src/models/search.rs

//! User-declared flight searches.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::airport::normalize_airport_code;
use crate::utils::format::{format_cents, format_datetime};

/// An immutable search polled every cycle.
///
/// Equality, hashing and ordering are by value; searches order
/// chronologically by their departure window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchDefinition {
    /// Earliest local departure time, inclusive
    pub min_departure_time: NaiveDateTime,

    /// Latest local arrival time, inclusive
    pub max_arrival_time: NaiveDateTime,

    pub origin_airports: BTreeSet<String>,

    pub destination_airports: BTreeSet<String>,

    /// Ceiling on the cheapest available fare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fare_cents: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_number_stops: Option<u8>,

    /// Free-text note shown alongside results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SearchDefinition {
    /// Load search definitions from a JSON array file.
    ///
    /// Airport codes are normalized and every search is validated.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a JSON array of search definitions.
    pub fn from_json(content: &str) -> Result<Vec<Self>> {
        let searches: Vec<Self> = serde_json::from_str(content)?;
        searches.into_iter().map(Self::normalized).collect()
    }

    /// Upper-case every airport code, then validate.
    pub fn normalized(self) -> Result<Self> {
        let normalize_all = |codes: BTreeSet<String>| -> Result<BTreeSet<String>> {
            codes.iter().map(|c| normalize_airport_code(c)).collect()
        };

        let search = Self {
            origin_airports: normalize_all(self.origin_airports)?,
            destination_airports: normalize_all(self.destination_airports)?,
            ..self
        };
        search.validate()?;
        Ok(search)
    }

    /// Validate the search for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.origin_airports.is_empty() {
            return Err(AppError::validation(format!(
                "search '{self}' has no origin airports"
            )));
        }
        if self.destination_airports.is_empty() {
            return Err(AppError::validation(format!(
                "search '{self}' has no destination airports"
            )));
        }
        for code in self.origin_airports.iter().chain(&self.destination_airports) {
            normalize_airport_code(code)?;
        }
        if self.max_arrival_time < self.min_departure_time {
            return Err(AppError::validation(format!(
                "search '{self}' ends before it starts"
            )));
        }
        Ok(())
    }

    /// Every (origin, destination) pair the search covers.
    pub fn routes(&self) -> Vec<(&str, &str)> {
        self.origin_airports
            .iter()
            .flat_map(|origin| {
                self.destination_airports
                    .iter()
                    .map(move |destination| (origin.as_str(), destination.as_str()))
            })
            .collect()
    }

    /// Calendar days on which a matching flight could depart.
    pub fn departure_dates(&self) -> Vec<NaiveDate> {
        let last = self.max_arrival_time.date();
        self.min_departure_time
            .date()
            .iter_days()
            .take_while(|day| *day <= last)
            .collect()
    }
}

impl fmt::Display for SearchDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |codes: &BTreeSet<String>| codes.iter().cloned().collect::<Vec<_>>().join(",");

        write!(
            f,
            "{} -> {} | {} .. {}",
            join(&self.origin_airports),
            join(&self.destination_airports),
            format_datetime(&self.min_departure_time),
            format_datetime(&self.max_arrival_time),
        )?;
        if let Some(cents) = self.max_fare_cents {
            write!(f, " | max {}", format_cents(cents))?;
        }
        if let Some(stops) = self.max_number_stops {
            write!(f, " | max {stops} stops")?;
        }
        if let Some(note) = &self.note {
            write!(f, " | {note}")?;
        }
        Ok(())
    }
}
