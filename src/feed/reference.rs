//! Pinnacle reference feed
//!
//! Builds a favorite ladder and a de-vigged moneyline pair per game from the
//! sharp book. Games without reference coverage are simply absent from the
//! result; nothing is derived from the evaluated book's own prices.

use super::wire::{ApiEvent, MARKET_ALT_SPREADS, MARKET_H2H, MARKET_SPREADS};
use super::{FeedError, Game, MoneylinePair, OddsApiClient, ReferenceEntry, ReferenceFeed, ReferenceMap};
use crate::ladder::{FavoriteLadder, SpreadRow};
use crate::odds::{devig, implied_probability};
use async_trait::async_trait;
use std::collections::HashSet;

/// Bookmaker key for Pinnacle
pub const PINNACLE_BOOKMAKER: &str = "pinnacle";

/// Reference feed backed by a sharp book
pub struct PinnacleReference {
    client: OddsApiClient,
    bookmaker: String,
    markets: Vec<String>,
}

impl PinnacleReference {
    /// `markets` is a comma-separated list; `alternate_spreads` is fetched
    /// per event because the bulk endpoint does not serve it.
    pub fn new(client: OddsApiClient, bookmaker: impl Into<String>, markets: &str) -> Self {
        let markets = markets
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        Self {
            client,
            bookmaker: bookmaker.into(),
            markets,
        }
    }

    /// Markets for the bulk request; falls back to main spreads and
    /// moneylines when only per-event markets were configured
    fn bulk_markets(&self) -> String {
        let bulk: Vec<&str> = self
            .markets
            .iter()
            .map(String::as_str)
            .filter(|m| *m != MARKET_ALT_SPREADS)
            .collect();
        if bulk.is_empty() {
            return format!("{},{}", MARKET_SPREADS, MARKET_H2H);
        }
        bulk.join(",")
    }

    fn wants_alternates(&self) -> bool {
        self.markets.iter().any(|m| m == MARKET_ALT_SPREADS)
    }

    async fn attach_alternates(&self, event: &mut ApiEvent) -> Result<(), FeedError> {
        let Some(id) = event.id.clone() else {
            return Ok(());
        };
        match self
            .client
            .fetch_event_odds(&id, &self.bookmaker, MARKET_ALT_SPREADS)
            .await
        {
            Ok(extra) => {
                merge_bookmaker_markets(event, extra, &self.bookmaker);
                Ok(())
            }
            Err(e) if e.is_quota() => Err(e),
            Err(e) => {
                tracing::warn!(game_id = %id, error = %e, "Alternate spreads unavailable, using main lines");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ReferenceFeed for PinnacleReference {
    async fn fetch_reference(&self, games: &[Game]) -> Result<ReferenceMap, FeedError> {
        if games.is_empty() {
            return Ok(ReferenceMap::new());
        }
        let wanted: HashSet<&str> = games.iter().map(|g| g.game_id.as_str()).collect();

        let mut events = self
            .client
            .fetch_odds(&self.bookmaker, &self.bulk_markets(), &[])
            .await?;
        events.retain(|e| e.id.as_deref().is_some_and(|id| wanted.contains(id)));

        if self.wants_alternates() {
            for event in events.iter_mut() {
                self.attach_alternates(event).await?;
            }
        }

        let reference = reference_from_events(&events, &self.bookmaker, &wanted);
        tracing::info!(
            requested = wanted.len(),
            covered = reference.len(),
            bookmaker = %self.bookmaker,
            "Fetched reference probabilities"
        );
        Ok(reference)
    }
}

/// Build reference entries for the wanted games
pub fn reference_from_events(
    events: &[ApiEvent],
    bookmaker: &str,
    wanted: &HashSet<&str>,
) -> ReferenceMap {
    events
        .iter()
        .filter_map(|event| {
            let id = event.id.as_deref().filter(|id| wanted.contains(id))?;
            let entry = entry_from_event(event, bookmaker)?;
            Some((id.to_string(), entry))
        })
        .collect()
}

fn entry_from_event(event: &ApiEvent, bookmaker: &str) -> Option<ReferenceEntry> {
    let book = event.bookmaker(bookmaker)?;

    let rows: Vec<SpreadRow> = book
        .markets
        .iter()
        .filter(|m| m.key == MARKET_SPREADS || m.key == MARKET_ALT_SPREADS)
        .flat_map(|m| m.outcomes.iter())
        .filter_map(|o| Some(SpreadRow::new(o.name.clone(), o.line()?, o.odds()?)))
        .collect();
    let fav_ladder = FavoriteLadder::from_quotes(&rows);

    let moneyline = book.market(MARKET_H2H).and_then(|market| {
        let home = market.outcome(event.home_team.as_deref()?)?.odds()?;
        let away = market.outcome(&event.away()?)?.odds()?;
        let (p_home, p_away) = devig(implied_probability(home), implied_probability(away));
        Some(MoneylinePair {
            home: p_home,
            away: p_away,
        })
    });

    let entry = ReferenceEntry {
        fav_ladder,
        moneyline,
    };
    (!entry.is_empty()).then_some(entry)
}

fn merge_bookmaker_markets(event: &mut ApiEvent, extra: ApiEvent, bookmaker: &str) {
    for book in extra.bookmakers.into_iter().filter(|b| b.key == bookmaker) {
        match event.bookmakers.iter_mut().find(|b| b.key == bookmaker) {
            Some(existing) => existing.markets.extend(book.markets),
            None => event.bookmakers.push(book),
        }
    }
}
