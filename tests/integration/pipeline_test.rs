//! End-to-end cycle tests
//!
//! Raw aggregator payloads go through the feed parsers, the engine, a
//! file-backed store and a recording notifier.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hardrock_ev::feed::wire::ApiEvent;
use hardrock_ev::feed::{
    games_from_events, reference_from_events, FeedError, Game, MarketQuotes, MoneylinePair,
    MoneylineQuote, OddsFeed, ReferenceEntry, ReferenceFeed, ReferenceMap, HARDROCK_BOOKMAKER,
    PINNACLE_BOOKMAKER,
};
use hardrock_ev::notify::{format_alert_line, Notifier, NotifyError, ALERT_TITLE};
use hardrock_ev::odds::AmericanOdds;
use hardrock_ev::risk::KellyCalculator;
use hardrock_ev::scheduler::{CycleOutcome, Poller, PollerOptions, SkipCause};
use hardrock_ev::signal::{EngineConfig, SignalEngine};
use hardrock_ev::store::SqliteSignalStore;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 9, 7, 12, 0, 0).unwrap()
}

fn hardrock_events() -> Vec<ApiEvent> {
    serde_json::from_value(json!([
        {
            "id": "G1",
            "commence_time": "2099-09-07T17:00:00Z",
            "home_team": "HOM",
            "away_team": "AWY",
            "bookmakers": [{
                "key": "hardrock",
                "markets": [{"key": "h2h", "outcomes": [
                    {"name": "HOM", "price": 150},
                    {"name": "AWY", "price": -170}
                ]}]
            }]
        },
        {
            "id": "G2",
            "commence_time": "2099-09-07T20:25:00Z",
            "home_team": "HM2",
            "teams": ["HM2", "AW2"],
            "bookmakers": [{
                "key": "hardrock",
                "markets": [{"key": "spreads", "outcomes": [
                    {"name": "HM2", "price": 110, "point": -2.5},
                    {"name": "AW2", "price": "105", "point": "2.5"}
                ]}]
            }]
        },
        {
            "id": "G3",
            "commence_time": "2099-09-08T00:20:00Z",
            "home_team": "HM3",
            "away_team": "AW3",
            "bookmakers": [{
                "key": "hardrock",
                "markets": [{"key": "h2h", "outcomes": [
                    {"name": "HM3", "price": -110},
                    {"name": "AW3", "price": -110}
                ]}]
            }]
        }
    ]))
    .unwrap()
}

fn pinnacle_events() -> Vec<ApiEvent> {
    serde_json::from_value(json!([
        {
            "id": "G1",
            "home_team": "HOM",
            "away_team": "AWY",
            "bookmakers": [{
                "key": "pinnacle",
                "markets": [{"key": "h2h", "outcomes": [
                    {"name": "HOM", "price": 120},
                    {"name": "AWY", "price": -130}
                ]}]
            }]
        },
        {
            "id": "G2",
            "home_team": "HM2",
            "away_team": "AW2",
            "bookmakers": [{
                "key": "pinnacle",
                "markets": [{"key": "spreads", "outcomes": [
                    {"name": "HM2", "price": -105, "point": -2.5},
                    {"name": "AW2", "price": -115, "point": 2.5}
                ]}]
            }]
        }
    ]))
    .unwrap()
}

/// Parses a fixed payload on every call
struct PayloadOdds {
    events: Vec<ApiEvent>,
}

#[async_trait]
impl OddsFeed for PayloadOdds {
    async fn fetch_games(&self, now: DateTime<Utc>) -> Result<Vec<Game>, FeedError> {
        Ok(games_from_events(&self.events, HARDROCK_BOOKMAKER, now, Duration::days(7)))
    }
}

struct PayloadReference {
    events: Vec<ApiEvent>,
}

#[async_trait]
impl ReferenceFeed for PayloadReference {
    async fn fetch_reference(&self, games: &[Game]) -> Result<ReferenceMap, FeedError> {
        let wanted: HashSet<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
        Ok(reference_from_events(&self.events, PINNACLE_BOOKMAKER, &wanted))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn push(&self, title: &str, lines: &[String]) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), lines.to_vec()));
        Ok(())
    }
}

fn engine(bankroll: rust_decimal::Decimal) -> SignalEngine {
    SignalEngine::new(
        EngineConfig {
            bankroll,
            ..Default::default()
        },
        KellyCalculator::default(),
    )
}

#[tokio::test]
async fn test_cycle_from_raw_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteSignalStore::open(dir.path().join("signals.db")).unwrap());
    let notifier = Arc::new(RecordingNotifier::default());

    let mut poller = Poller::new(
        Arc::new(PayloadOdds {
            events: hardrock_events(),
        }),
        Arc::new(PayloadReference {
            events: pinnacle_events(),
        }),
        engine(dec!(500)),
        store.clone(),
        notifier.clone(),
        PollerOptions::default(),
    );

    let first = poller.run_cycle(now()).await;
    assert_eq!(first, CycleOutcome::Alerted { emitted: 2, persisted: 2 });
    assert_eq!(store.count().unwrap(), 2);

    {
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (title, lines) = &sent[0];
        assert_eq!(title, ALERT_TITLE);
        assert_eq!(lines.len(), 2);

        // Highest edge first: moneyline fallback on G1, then the G2 underdog
        assert!(lines[0].starts_with("AWY @ HOM  ML  Pick: **HOM**  Odds: 150  True: 0.45"));
        assert!(lines[0].contains("Stake: $10.00"));
        assert!(lines[0].ends_with("(KO 2099-09-07T17:00:00Z)"));
        assert!(lines[1].starts_with("AW2 @ HM2  SPREAD  Pick: **AW2 +2.5**  Odds: 105  True: 0.51"));
        assert!(!lines[1].contains("Push:"));
    }

    // Unchanged quotes: nothing new to notify, and the following tick is banked
    let second = poller.run_cycle(now() + Duration::minutes(15)).await;
    assert_eq!(second, CycleOutcome::Alerted { emitted: 2, persisted: 0 });
    let third = poller.run_cycle(now() + Duration::minutes(30)).await;
    assert_eq!(third, CycleOutcome::Skipped(SkipCause::UnchangedQuotes));
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_moneyline_alert_line() {
    let game = Game {
        game_id: "G1".to_string(),
        home: "HOM".to_string(),
        away: "AWY".to_string(),
        start_utc: Utc.with_ymd_and_hms(2099, 9, 7, 17, 0, 0).unwrap(),
        quotes: MarketQuotes::Moneyline(MoneylineQuote {
            home: AmericanOdds::new(150).ok(),
            away: AmericanOdds::new(-160).ok(),
        }),
    };
    let reference: ReferenceMap = [(
        "G1".to_string(),
        ReferenceEntry {
            fav_ladder: Default::default(),
            moneyline: Some(MoneylinePair { home: 0.45, away: 0.55 }),
        },
    )]
    .into();

    let evaluation = engine(dec!(100)).evaluate(&[game], &reference, now());
    assert_eq!(evaluation.alerts.len(), 1);
    let line = format_alert_line(&evaluation.alerts[0]);
    for part in [
        "AWY @ HOM",
        "Pick: **HOM**",
        "Odds: 150",
        "True: 0.45",
        "Edge: 12.5%",
        "Kelly: 8.3%",
        "Stake: $2.00",
    ] {
        assert!(line.contains(part), "missing {:?} in {:?}", part, line);
    }
}
