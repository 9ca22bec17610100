//! Signal types

use crate::feed::Side;
use crate::odds::AmericanOdds;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Market an alert was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    #[serde(rename = "SPREAD")]
    Spread,
    #[serde(rename = "ML")]
    Moneyline,
}

impl MarketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::Spread => "SPREAD",
            MarketKind::Moneyline => "ML",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positive-EV opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier
    pub id: Uuid,
    pub game_id: String,
    /// "AWAY @ HOME"
    pub matchup: String,
    /// Kickoff time
    pub start_utc: DateTime<Utc>,
    pub market: MarketKind,
    pub side: Side,
    /// Team, plus the signed line for spreads
    pub pick: String,
    pub odds: AmericanOdds,
    /// Spread line for the picked side
    pub line: Option<f64>,
    /// Fair win probability
    pub p_true: f64,
    /// Fair push probability
    pub p_push: f64,
    /// Expected profit per dollar staked
    pub edge: f64,
    /// Full Kelly fraction, possibly negative
    pub kelly: f64,
    /// Recommended stake in dollars
    pub stake: Decimal,
    /// Edge threshold this alert cleared
    pub threshold: f64,
    /// Alert creation timestamp
    pub timestamp: DateTime<Utc>,
}

/// Pick label: the team for moneylines, "TEAM +3.5" for spreads
pub fn pick_label(team: &str, line: Option<f64>) -> String {
    match line {
        Some(line) => format!("{} {:+}", team, line),
        None => team.to_string(),
    }
}
