//! Tick driver state and cadence

use crate::feed::{Game, SideQuote};
use crate::odds::AmericanOdds;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Polling interval by weekday
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollCadence {
    pub interval: std::time::Duration,
    pub sunday_interval: std::time::Duration,
}

impl Default for PollCadence {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(900),
            sunday_interval: std::time::Duration::from_secs(300),
        }
    }
}

impl PollCadence {
    /// Delay until the tick after one started at `now`
    pub fn interval_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        if now.weekday() == Weekday::Sun {
            self.sunday_interval
        } else {
            self.interval
        }
    }
}

/// State carried between ticks
#[derive(Debug, Clone, Default)]
pub struct TickState {
    /// Signature of the last fetched book quotes
    pub last_signature: Option<u64>,
    /// Skip the next tick once
    pub skip_next: bool,
    /// (year, month) of the last quota notice
    pub quota_notice_month: Option<(i32, u32)>,
    /// Ticks before this instant are skipped
    pub backoff_until: Option<DateTime<Utc>>,
}

impl TickState {
    /// Remember a new quote signature; returns true when it matched the last one
    pub fn observe_signature(&mut self, signature: u64) -> bool {
        let unchanged = self.last_signature == Some(signature);
        self.last_signature = Some(signature);
        if unchanged {
            self.skip_next = true;
        }
        unchanged
    }

    /// Consume a pending skip
    pub fn take_skip(&mut self) -> bool {
        std::mem::take(&mut self.skip_next)
    }

    /// Whether `now` falls inside the quota backoff window
    pub fn in_backoff(&self, now: DateTime<Utc>) -> bool {
        self.backoff_until.is_some_and(|until| now < until)
    }

    /// Start a backoff; returns true when no quota notice was sent yet this month
    pub fn enter_quota_backoff(&mut self, now: DateTime<Utc>, backoff: Duration) -> bool {
        self.backoff_until = Some(now + backoff);
        let month = (now.year(), now.month());
        if self.quota_notice_month == Some(month) {
            return false;
        }
        self.quota_notice_month = Some(month);
        true
    }
}

/// Order-sensitive hash of every game's quoted prices and lines
pub fn quote_signature(games: &[Game]) -> u64 {
    let mut hasher = DefaultHasher::new();
    games.len().hash(&mut hasher);
    for game in games {
        game.game_id.hash(&mut hasher);
        game.quotes.label().hash(&mut hasher);
        if let Some(spread) = game.quotes.spread() {
            hash_side(&spread.home, &mut hasher);
            hash_side(&spread.away, &mut hasher);
        }
        if let Some(ml) = game.quotes.moneyline() {
            hash_odds(ml.home, &mut hasher);
            hash_odds(ml.away, &mut hasher);
        }
    }
    hasher.finish()
}

fn hash_side(quote: &SideQuote, hasher: &mut DefaultHasher) {
    hash_odds(quote.odds, hasher);
    quote.line.map(f64::to_bits).hash(hasher);
}

fn hash_odds(odds: Option<AmericanOdds>, hasher: &mut DefaultHasher) {
    odds.map(AmericanOdds::value).hash(hasher);
}
