//! Feed types

use crate::ladder::FavoriteLadder;
use crate::odds::AmericanOdds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which team a quote belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];
}

/// One side of a spread market
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SideQuote {
    pub odds: Option<AmericanOdds>,
    pub line: Option<f64>,
}

impl SideQuote {
    pub fn new(odds: Option<AmericanOdds>, line: Option<f64>) -> Self {
        Self { odds, line }
    }

    /// Both price and line are present
    pub fn priced(&self) -> Option<(AmericanOdds, f64)> {
        Some((self.odds?, self.line?))
    }

    fn is_empty(&self) -> bool {
        self.odds.is_none() && self.line.is_none()
    }
}

/// Spread quotes for both sides
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpreadQuote {
    pub home: SideQuote,
    pub away: SideQuote,
}

impl SpreadQuote {
    pub fn side(&self, side: Side) -> &SideQuote {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Moneyline prices for both sides
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoneylineQuote {
    pub home: Option<AmericanOdds>,
    pub away: Option<AmericanOdds>,
}

impl MoneylineQuote {
    pub fn side(&self, side: Side) -> Option<AmericanOdds> {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

/// Markets quoted by the evaluated book for a game
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarketQuotes {
    Spread(SpreadQuote),
    Moneyline(MoneylineQuote),
    Both {
        spread: SpreadQuote,
        moneyline: MoneylineQuote,
    },
}

impl MarketQuotes {
    /// Combine optional markets, dropping fully empty ones
    pub fn from_parts(spread: Option<SpreadQuote>, moneyline: Option<MoneylineQuote>) -> Option<Self> {
        let spread = spread.filter(|s| !(s.home.is_empty() && s.away.is_empty()));
        let moneyline = moneyline.filter(|m| m.home.is_some() || m.away.is_some());
        match (spread, moneyline) {
            (Some(spread), Some(moneyline)) => Some(Self::Both { spread, moneyline }),
            (Some(spread), None) => Some(Self::Spread(spread)),
            (None, Some(moneyline)) => Some(Self::Moneyline(moneyline)),
            (None, None) => None,
        }
    }

    pub fn spread(&self) -> Option<&SpreadQuote> {
        match self {
            Self::Spread(spread) | Self::Both { spread, .. } => Some(spread),
            Self::Moneyline(_) => None,
        }
    }

    pub fn moneyline(&self) -> Option<&MoneylineQuote> {
        match self {
            Self::Moneyline(moneyline) | Self::Both { moneyline, .. } => Some(moneyline),
            Self::Spread(_) => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spread(_) => "SPREAD",
            Self::Moneyline(_) => "ML",
            Self::Both { .. } => "BOTH",
        }
    }
}

/// A game quoted by the evaluated book
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    /// Stable event identifier
    pub game_id: String,
    pub home: String,
    pub away: String,
    /// Kickoff time
    pub start_utc: DateTime<Utc>,
    pub quotes: MarketQuotes,
}

impl Game {
    /// Team name for a side
    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// "AWAY @ HOME"
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away, self.home)
    }
}

/// De-vigged moneyline probabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoneylinePair {
    pub home: f64,
    pub away: f64,
}

impl MoneylinePair {
    pub fn side(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

/// Reference data for a single game
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceEntry {
    pub fav_ladder: FavoriteLadder,
    pub moneyline: Option<MoneylinePair>,
}

impl ReferenceEntry {
    /// Entry carries nothing to evaluate against
    pub fn is_empty(&self) -> bool {
        self.fav_ladder.is_empty() && self.moneyline.is_none()
    }
}

/// Reference entries keyed by game id
pub type ReferenceMap = HashMap<String, ReferenceEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn odds(v: i32) -> Option<AmericanOdds> {
        AmericanOdds::new(v).ok()
    }

    #[test]
    fn test_market_quotes_from_parts() {
        let spread = SpreadQuote {
            home: SideQuote::new(odds(-110), Some(-3.5)),
            away: SideQuote::new(odds(-110), Some(3.5)),
        };
        let ml = MoneylineQuote {
            home: odds(-180),
            away: odds(155),
        };

        let both = MarketQuotes::from_parts(Some(spread), Some(ml)).unwrap();
        assert_eq!(both.label(), "BOTH");
        assert!(both.spread().is_some() && both.moneyline().is_some());

        let only_ml = MarketQuotes::from_parts(Some(SpreadQuote::default()), Some(ml)).unwrap();
        assert_eq!(only_ml.label(), "ML");
        assert!(only_ml.spread().is_none());

        assert!(MarketQuotes::from_parts(None, Some(MoneylineQuote::default())).is_none());
    }

    #[test]
    fn test_side_quote_priced_requires_both() {
        assert!(SideQuote::new(odds(-110), None).priced().is_none());
        assert!(SideQuote::new(None, Some(2.5)).priced().is_none());
        assert_eq!(
            SideQuote::new(odds(-110), Some(2.5)).priced(),
            Some((AmericanOdds::new(-110).unwrap(), 2.5))
        );
    }
}
