// src/services/api_model.rs

//! Wire model of the mobile flight products endpoint.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Fare, FlightSnapshot};

/// Response of `GET /api/extensions/v1/mobile/flights/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFlightsResponse {
    #[serde(default)]
    pub trips: Vec<Trip>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub air_products: Vec<AirProduct>,
}

/// One bookable itinerary with its fare options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirProduct {
    #[serde(default)]
    pub fare_products: Vec<FareProduct>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareProduct {
    #[serde(default)]
    pub fare_type: String,
    pub currency_price: Option<CurrencyPrice>,
    /// Seat count, normally a decimal string
    #[serde(default)]
    pub seats_available: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPrice {
    #[serde(default)]
    pub total_fare_cents: Value,
}

/// Fields are kept raw so one bad segment only spoils its own product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default)]
    pub origination_airport_code: String,
    #[serde(default)]
    pub destination_airport_code: String,
    /// `YYYY-MM-DDTHH:MM` local time
    #[serde(default)]
    pub departure_date_time: String,
    #[serde(default)]
    pub arrival_date_time: String,
}

const LOCAL_MINUTES: &str = "%Y-%m-%dT%H:%M";

fn parse_local_minutes(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), LOCAL_MINUTES)
        .map_err(|e| AppError::malformed(format!("bad local timestamp '{raw}': {e}")))
}

/// Accept `"12"` as well as `12`.
fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::String(raw) => raw.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

impl AirProduct {
    /// Turn the product into a snapshot.
    ///
    /// Stops are the destinations of every segment but the last.
    pub fn to_snapshot(&self) -> Result<FlightSnapshot> {
        let (first, last) = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AppError::malformed("air product has no segments")),
        };

        let fares = self
            .fare_products
            .iter()
            .map(FareProduct::to_fare)
            .collect::<Result<Vec<_>>>()?;

        let stops = self.segments[..self.segments.len() - 1]
            .iter()
            .map(|segment| segment.destination_airport_code.clone())
            .collect();

        Ok(FlightSnapshot {
            origin_airport: first.origination_airport_code.clone(),
            destination_airport: last.destination_airport_code.clone(),
            departure_local_time: parse_local_minutes(&first.departure_date_time)?,
            arrival_local_time: parse_local_minutes(&last.arrival_date_time)?,
            stops,
            fares,
        })
    }
}

impl FareProduct {
    pub fn to_fare(&self) -> Result<Fare> {
        let price = self.currency_price.as_ref().ok_or_else(|| {
            AppError::malformed(format!("fare '{}' has no price", self.fare_type))
        })?;
        let cents = parse_count(&price.total_fare_cents).ok_or_else(|| {
            AppError::malformed(format!(
                "fare '{}' has unexpected price {}",
                self.fare_type, price.total_fare_cents
            ))
        })?;
        let seats = parse_count(&self.seats_available).ok_or_else(|| {
            AppError::malformed(format!(
                "unexpected seats available value {}",
                self.seats_available
            ))
        })?;
        Ok(Fare::new(cents, seats))
    }
}

impl ListFlightsResponse {
    /// Convert every air product, skipping malformed ones with a warning.
    ///
    /// A response with more than one trip is not a one-way listing and is
    /// rejected outright.
    pub fn into_snapshots(self) -> Result<Vec<FlightSnapshot>> {
        if self.trips.len() > 1 {
            return Err(AppError::fetch(
                "flight listing",
                format!("unexpected number of trips: {}", self.trips.len()),
            ));
        }

        let snapshots = self
            .trips
            .iter()
            .flat_map(|trip| &trip.air_products)
            .filter_map(|product| match product.to_snapshot() {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    log::warn!("Skipping air product: {e}");
                    None
                }
            })
            .collect();
        Ok(snapshots)
    }
}
