// src/models/fare.rs

//! Fare value type and the single fare comparison rule.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A priced offer with seat availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fare {
    /// Total fare in cents
    pub cents: u32,

    /// Seats remaining at this price
    pub seats_available: u32,
}

impl Fare {
    pub fn new(cents: u32, seats_available: u32) -> Self {
        Self {
            cents,
            seats_available,
        }
    }

    /// A fare can be bought only while seats remain.
    pub fn is_available(&self) -> bool {
        self.seats_available > 0
    }
}

/// Cheapest fare that still has seats, or `None` when everything is sold out.
///
/// Ties between equally priced fares resolve to whichever is seen first.
pub fn cheapest_available(fares: &[Fare]) -> Option<&Fare> {
    fares
        .iter()
        .filter(|fare| fare.is_available())
        .min_by_key(|fare| fare.cents)
}

/// Compare two optional fares by price.
///
/// A missing fare (nothing bookable) sorts above every defined fare, so
/// losing availability reads as a price increase. Two missing fares are equal.
/// Every fare comparison in the crate goes through here.
pub fn compare_fares(a: Option<&Fare>, b: Option<&Fare>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cents.cmp(&b.cents),
    }
}
