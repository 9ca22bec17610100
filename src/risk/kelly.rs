//! Kelly criterion stake sizing

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fractional Kelly stake calculator
#[derive(Debug, Clone)]
pub struct KellyCalculator {
    /// Kelly fraction (e.g., 0.5 for half Kelly)
    pub fraction: Decimal,
    /// Maximum bet as percentage of bankroll
    pub max_bet_pct: Decimal,
}

impl KellyCalculator {
    /// Create a new Kelly calculator
    pub fn new(fraction: Decimal, max_bet_pct: Decimal) -> Self {
        Self {
            fraction,
            max_bet_pct,
        }
    }

    /// Bankroll fraction to risk for a full-Kelly value
    ///
    /// Negative Kelly means no bet. The weighted fraction is capped at
    /// `max_bet_pct`.
    pub fn bet_fraction(&self, full_kelly: f64) -> Decimal {
        let kelly = Decimal::try_from(full_kelly.max(0.0)).unwrap_or(Decimal::ZERO);
        (kelly * self.fraction).min(self.max_bet_pct).max(dec!(0))
    }

    /// Stake in dollars, rounded to cents
    pub fn stake(&self, full_kelly: f64, bankroll: Decimal) -> Decimal {
        (bankroll * self.bet_fraction(full_kelly))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(dec!(0.5), dec!(0.02))
    }
}
