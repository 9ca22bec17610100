//! Hard Rock odds feed
//!
//! Pulls spread and moneyline quotes for upcoming games from The Odds API,
//! keeping games that kick off inside the lookahead window.

use super::wire::{ApiEvent, MARKET_H2H, MARKET_SPREADS};
use super::{
    FeedError, Game, MarketQuotes, MoneylineQuote, OddsApiClient, OddsFeed, SideQuote,
    SpreadQuote,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Bookmaker key for Hard Rock
pub const HARDROCK_BOOKMAKER: &str = "hardrock";

/// Odds feed for the evaluated book
pub struct HardRockFeed {
    client: OddsApiClient,
    bookmaker: String,
    days_from: u32,
}

impl HardRockFeed {
    pub fn new(client: OddsApiClient, bookmaker: impl Into<String>, days_from: u32) -> Self {
        Self {
            client,
            bookmaker: bookmaker.into(),
            days_from,
        }
    }
}

#[async_trait]
impl OddsFeed for HardRockFeed {
    async fn fetch_games(&self, now: DateTime<Utc>) -> Result<Vec<Game>, FeedError> {
        let markets = format!("{},{}", MARKET_SPREADS, MARKET_H2H);
        let events = self
            .client
            .fetch_odds(
                &self.bookmaker,
                &markets,
                &[("daysFrom", self.days_from.to_string())],
            )
            .await?;

        let lookahead = Duration::days(i64::from(self.days_from));
        let games = games_from_events(&events, &self.bookmaker, now, lookahead);
        tracing::info!(
            events = events.len(),
            games = games.len(),
            bookmaker = %self.bookmaker,
            "Fetched book odds"
        );
        Ok(games)
    }
}

/// Convert raw events into games sorted by kickoff
///
/// Events that already started, kick off after `now + lookahead`, lack an
/// identity, or carry no usable market for `bookmaker` are dropped.
pub fn games_from_events(
    events: &[ApiEvent],
    bookmaker: &str,
    now: DateTime<Utc>,
    lookahead: Duration,
) -> Vec<Game> {
    let horizon = now + lookahead;
    let mut games: Vec<Game> = events
        .iter()
        .filter_map(|event| {
            let game = game_from_event(event, bookmaker)?;
            if game.start_utc < now || game.start_utc > horizon {
                tracing::debug!(game_id = %game.game_id, start = %game.start_utc, "Skipping game outside window");
                return None;
            }
            Some(game)
        })
        .collect();

    games.sort_by(|a, b| {
        a.start_utc
            .cmp(&b.start_utc)
            .then_with(|| a.game_id.cmp(&b.game_id))
    });
    games
}

fn game_from_event(event: &ApiEvent, bookmaker: &str) -> Option<Game> {
    let game_id = event.id.clone()?;
    let home = event.home_team.clone()?;
    let Some(away) = event.away() else {
        tracing::debug!(game_id = %game_id, "Skipping event without away team");
        return None;
    };
    let Some(start_utc) = event.start() else {
        tracing::debug!(game_id = %game_id, "Skipping event without kickoff time");
        return None;
    };

    let book = event.bookmaker(bookmaker)?;

    let spread = book.market(MARKET_SPREADS).map(|market| {
        let side = |team: &str| {
            market
                .outcome(team)
                .map(|o| SideQuote::new(o.odds(), o.line()))
                .unwrap_or_default()
        };
        SpreadQuote {
            home: side(home.as_str()),
            away: side(away.as_str()),
        }
    });

    let moneyline = book.market(MARKET_H2H).map(|market| MoneylineQuote {
        home: market.outcome(&home).and_then(|o| o.odds()),
        away: market.outcome(&away).and_then(|o| o.odds()),
    });

    let Some(quotes) = MarketQuotes::from_parts(spread, moneyline) else {
        tracing::debug!(game_id = %game_id, "Skipping event without usable markets");
        return None;
    };

    Some(Game {
        game_id,
        home,
        away,
        start_utc,
        quotes,
    })
}
