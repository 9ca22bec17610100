//! Odds math module
//!
//! American odds conversions, expected value, Kelly sizing and vig removal

mod devig;
mod math;

pub use devig::devig;
pub use math::{
    break_even_probability, expected_value_per_dollar, implied_probability, kelly_fraction,
    payout_multiple,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Odds construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OddsError {
    /// American odds of zero have no payout meaning
    #[error("American odds cannot be zero")]
    Zero,
}

/// A signed American price
///
/// Positive values pay `odds` per $100 risked, negative values require
/// risking `|odds|` to win $100. Zero is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct AmericanOdds(i32);

impl AmericanOdds {
    /// Create a price, rejecting zero
    pub fn new(odds: i32) -> Result<Self, OddsError> {
        if odds == 0 {
            return Err(OddsError::Zero);
        }
        Ok(Self(odds))
    }

    /// Raw signed value
    pub fn value(self) -> i32 {
        self.0
    }

    /// True for underdog-style (positive) prices
    pub fn is_plus(self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<i32> for AmericanOdds {
    type Error = OddsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AmericanOdds> for i32 {
    fn from(odds: AmericanOdds) -> Self {
        odds.0
    }
}

impl fmt::Display for AmericanOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
