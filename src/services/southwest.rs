// src/services/southwest.rs

//! Client for the airline's mobile flight pricing API.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ClientConfig, FlightSnapshot, SearchDefinition};
use crate::utils::airport::normalize_airport_code;
use crate::utils::http::create_async_client;

use super::FlightFetcher;
use super::api_model::ListFlightsResponse;
use super::filters::apply_search_filters;

const PRODUCTS_PATH: &str = "/api/extensions/v1/mobile/flights/products";
const API_KEY_HEADER: &str = "X-API-Key";

/// Fetches one-way flight listings and applies search filters.
pub struct SouthwestClient {
    client: Client,
    base_url: Url,
    api_key: String,
    max_concurrent: usize,
}

impl SouthwestClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            base_url: Url::parse(&config.base_url)?,
            api_key: config.api_key.clone(),
            max_concurrent: config.max_concurrent.max(1),
        })
    }

    /// Build the listing URL for one route on one day.
    pub fn products_url(&self, date: NaiveDate, origin: &str, destination: &str) -> Result<Url> {
        let mut url = self.base_url.join(PRODUCTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("currency-type", "Dollars")
            .append_pair("number-adult-passengers", "1")
            .append_pair("number-senior-passengers", "0")
            .append_pair("promo-code", "")
            .append_pair("origination-airport", origin)
            .append_pair("destination-airport", destination)
            .append_pair("departure-date", &date.format("%Y-%m-%d").to_string());
        Ok(url)
    }

    /// List every flight for one route departing on `date`.
    pub async fn list_flights(
        &self,
        date: NaiveDate,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<FlightSnapshot>> {
        let origin = normalize_airport_code(origin)?;
        let destination = normalize_airport_code(destination)?;
        let context = format!("{origin}->{destination} on {date}");

        let url = self.products_url(date, &origin, &destination)?;
        log::debug!("Listing flights {context}: {url}");

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::fetch(&context, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::fetch(&context, e))?;
        if !status.is_success() {
            return Err(AppError::fetch(
                &context,
                format!("unexpected status {status}: {body}"),
            ));
        }

        let listing: ListFlightsResponse = serde_json::from_str(&body)?;
        listing.into_snapshots()
    }

    /// Fetch every route and day of a search, then apply its filters.
    pub async fn search_flights(&self, search: &SearchDefinition) -> Result<Vec<FlightSnapshot>> {
        let jobs: Vec<_> = search
            .departure_dates()
            .into_iter()
            .flat_map(|date| {
                search
                    .routes()
                    .into_iter()
                    .map(move |(origin, destination)| (date, origin.to_string(), destination.to_string()))
            })
            .collect();

        let results: Vec<Result<Vec<FlightSnapshot>>> = stream::iter(jobs)
            .map(|(date, origin, destination)| async move {
                self.list_flights(date, &origin, &destination).await
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut flights = Vec::new();
        for result in results {
            flights.extend(result?);
        }

        let fetched = flights.len();
        let kept = apply_search_filters(search, flights);
        log::debug!("Search '{search}': {fetched} fetched, {} after filters", kept.len());
        Ok(kept)
    }
}

#[async_trait]
impl FlightFetcher for SouthwestClient {
    async fn fetch(&self, search: &SearchDefinition) -> Result<Vec<FlightSnapshot>> {
        self.search_flights(search).await.map_err(|e| match e {
            AppError::Fetch { .. } => e,
            other => AppError::fetch(search.to_string(), other),
        })
    }
}
