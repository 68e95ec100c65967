//! Utility functions and helpers.

pub mod airport;
pub mod format;
pub mod http;
