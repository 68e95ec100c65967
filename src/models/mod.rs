// src/models/mod.rs

//! Domain models for the fare watcher.
//!
//! Value types shared by the fetcher, the state diff engine and the
//! notifiers, plus the application configuration.

mod config;
mod fare;
mod flight;
mod search;

// Re-export all public types
pub use config::{ClientConfig, Config, EmailConfig, LoggingConfig, NotifyConfig, WatcherConfig};
pub use fare::{Fare, cheapest_available, compare_fares};
pub use flight::{ChangeKind, FlightIdentity, FlightSnapshot, FlightState};
pub use search::SearchDefinition;
