// src/lib.rs

//! Farewatch: polls airline fares for declared searches and reports what
//! changed since the previous poll.

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod utils;
