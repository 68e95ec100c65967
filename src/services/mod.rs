//! Service layer for the fare watcher.
//!
//! This module contains the fetch side of a polling cycle:
//! - The `FlightFetcher` seam the cycle driver depends on
//! - The pricing API client (`SouthwestClient`) and its wire model
//! - Search filters applied before results reach the diff engine

pub mod api_model;
pub mod filters;
mod southwest;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FlightSnapshot, SearchDefinition};

pub use southwest::SouthwestClient;

/// Produces the current flights for a search.
///
/// Implementations apply the search's own filters before returning.
#[async_trait]
pub trait FlightFetcher: Send + Sync {
    async fn fetch(&self, search: &SearchDefinition) -> Result<Vec<FlightSnapshot>>;
}
