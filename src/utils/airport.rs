// src/utils/airport.rs

//! IATA airport code handling.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};

static AIRPORT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("airport code pattern is valid"));

/// Whether `code` is already a normalized three-letter airport code.
pub fn is_airport_code(code: &str) -> bool {
    AIRPORT_CODE.is_match(code)
}

/// Upper-case an airport code and check it is three letters.
pub fn normalize_airport_code(code: &str) -> Result<String> {
    let normalized = code.trim().to_uppercase();
    if is_airport_code(&normalized) {
        Ok(normalized)
    } else {
        Err(AppError::validation(format!("Invalid airport code '{code}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case() {
        assert_eq!(normalize_airport_code("sfo").unwrap(), "SFO");
        assert_eq!(normalize_airport_code(" Lax ").unwrap(), "LAX");
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(normalize_airport_code("SF").is_err());
        assert!(normalize_airport_code("SFOX").is_err());
        assert!(normalize_airport_code("S1O").is_err());
        assert!(normalize_airport_code("").is_err());
    }

    #[test]
    fn is_airport_code_requires_upper_case() {
        assert!(is_airport_code("DEN"));
        assert!(!is_airport_code("den"));
    }
}
