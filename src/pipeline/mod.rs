//! Core polling pipeline.
//!
//! - `diff`: classify one poll's flights against what a search already knows
//! - `state`: the per-search state table and its read views
//! - `cycle`: fetch and diff every search, then notify
//! - `schedule`: run cycles at startup and on a fixed period

pub mod cycle;
pub mod diff;
pub mod schedule;
pub mod state;

pub use cycle::{CycleReport, SearchStateUpdater};
pub use diff::{DiffSummary, FlightStates, apply_batch, classify};
pub use schedule::run_watcher;
pub use state::SearchStates;
