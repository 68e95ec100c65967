// src/error.rs

//! Unified error handling for the fare watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for fare watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fetching flights for a search failed
    #[error("Fetch error for {context}: {message}")]
    Fetch { context: String, message: String },

    /// A fetched flight could not be turned into a usable snapshot
    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// A notifier failed to deliver
    #[error("Notify error in {notifier}: {message}")]
    Notify { notifier: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with context.
    pub fn fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed snapshot error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSnapshot(message.into())
    }

    /// Create a notify error for the named notifier.
    pub fn notify(notifier: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Notify {
            notifier: notifier.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error came from the fetch boundary.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Http(_))
    }
}
