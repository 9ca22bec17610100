//! Odds feed module
//!
//! Quotes from the evaluated book and reference probabilities from the sharp
//! book, both sourced from The Odds API

mod client;
mod error;
mod hardrock;
mod reference;
mod types;
pub mod wire;

pub use client::{OddsApiClient, OddsApiConfig, ODDS_API_URL};
pub use error::FeedError;
pub use hardrock::{games_from_events, HardRockFeed, HARDROCK_BOOKMAKER};
pub use reference::{reference_from_events, PinnacleReference, PINNACLE_BOOKMAKER};
pub use types::{
    Game, MarketQuotes, MoneylinePair, MoneylineQuote, ReferenceEntry, ReferenceMap, Side,
    SideQuote, SpreadQuote,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of games quoted by the evaluated book
#[async_trait]
pub trait OddsFeed: Send + Sync {
    /// Upcoming games inside the lookahead window, sorted by kickoff
    async fn fetch_games(&self, now: DateTime<Utc>) -> Result<Vec<Game>, FeedError>;
}

/// Source of fair probabilities for the same games
#[async_trait]
pub trait ReferenceFeed: Send + Sync {
    /// Reference entries for the games it covers; others are absent
    async fn fetch_reference(&self, games: &[Game]) -> Result<ReferenceMap, FeedError>;
}
