// src/config.rs

//! Configuration loading utilities.
//!
//! Loads the TOML configuration and the search definitions it points at.
//! Relative paths in the configuration are resolved against the directory
//! holding the configuration file.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Config, SearchDefinition};

/// Load configuration from a TOML file.
///
/// Falls back to defaults only if the file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path)?;
    let base_dir = base_dir(path);
    config.notify.html_report = config
        .notify
        .html_report
        .map(|p| resolve(base_dir, &p));
    config.notify.json_report = config
        .notify
        .json_report
        .map(|p| resolve(base_dir, &p));
    if let Some(email) = config.notify.email.as_mut() {
        email.password_file = resolve(base_dir, &email.password_file);
    }
    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid config {}: {e}", path.display())))?;
    Ok(config)
}

/// Load search definitions from a JSON file.
pub fn load_searches(path: &Path) -> Result<Vec<SearchDefinition>> {
    if !path.exists() {
        return Err(AppError::config(format!(
            "Searches file not found: {}",
            path.display()
        )));
    }
    let searches = SearchDefinition::load_all(path)
        .map_err(|e| AppError::config(format!("Invalid searches {}: {e}", path.display())))?;
    if searches.is_empty() {
        log::warn!("No searches declared in {}", path.display());
    }
    Ok(searches)
}

/// Load and validate both config and search definitions.
pub fn load_all(config_path: &Path) -> Result<(Config, Vec<SearchDefinition>)> {
    let config = load_config(config_path)?;
    let searches_path = config.searches_path(base_dir(config_path));
    let searches = load_searches(&searches_path)?;
    log::debug!(
        "Loaded {} searches from {}",
        searches.len(),
        searches_path.display()
    );
    Ok((config, searches))
}

fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or(Path::new(""))
}

fn resolve(base_dir: &Path, path: &str) -> String {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        return path.to_string_lossy().into_owned();
    }
    base_dir.join(path).to_string_lossy().into_owned()
}
