//! The Odds API v4 payload types
//!
//! Prices and points are kept as raw JSON values and coerced on read, so a
//! single malformed outcome drops that field instead of failing the payload.

use crate::odds::AmericanOdds;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Market key for main spreads
pub const MARKET_SPREADS: &str = "spreads";
/// Market key for alternate spreads
pub const MARKET_ALT_SPREADS: &str = "alternate_spreads";
/// Market key for moneylines
pub const MARKET_H2H: &str = "h2h";

/// An event from the odds endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEvent {
    pub id: Option<String>,
    pub commence_time: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub bookmakers: Vec<ApiBookmaker>,
}

/// One bookmaker's markets for an event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiBookmaker {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub markets: Vec<ApiMarket>,
}

/// A market and its outcomes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMarket {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<ApiOutcome>,
}

/// A priced outcome
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiOutcome {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub point: Option<Value>,
}

impl ApiEvent {
    /// Away team, falling back to the non-home entry of `teams`
    pub fn away(&self) -> Option<String> {
        if let Some(away) = &self.away_team {
            return Some(away.clone());
        }
        let home = self.home_team.as_deref()?;
        self.teams.iter().find(|t| t.as_str() != home).cloned()
    }

    /// Kickoff in UTC; naive timestamps are taken as UTC
    pub fn start(&self) -> Option<DateTime<Utc>> {
        parse_utc(self.commence_time.as_deref()?)
    }

    pub fn bookmaker(&self, key: &str) -> Option<&ApiBookmaker> {
        self.bookmakers.iter().find(|b| b.key == key)
    }
}

impl ApiBookmaker {
    pub fn market(&self, key: &str) -> Option<&ApiMarket> {
        self.markets.iter().find(|m| m.key == key)
    }
}

impl ApiMarket {
    pub fn outcome(&self, name: &str) -> Option<&ApiOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

impl ApiOutcome {
    pub fn odds(&self) -> Option<AmericanOdds> {
        self.price.as_ref().and_then(coerce_odds)
    }

    pub fn line(&self) -> Option<f64> {
        self.point.as_ref().and_then(coerce_point)
    }
}

/// Integral, non-zero American price from a number or numeric string
pub fn coerce_odds(value: &Value) -> Option<AmericanOdds> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw.fract() != 0.0 || raw.abs() > f64::from(i32::MAX) {
        return None;
    }
    AmericanOdds::new(raw as i32).ok()
}

/// Finite spread point from a number or numeric string
pub fn coerce_point(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then_some(raw)
}

/// Decode an odds response event by event
///
/// The body must be a JSON array. Events whose envelope does not match the
/// expected shape are logged and dropped so the rest of the slate survives.
pub fn decode_events(body: &str) -> Result<Vec<ApiEvent>, serde_json::Error> {
    let raw: Vec<Value> = serde_json::from_str(body)?;
    let total = raw.len();
    let events: Vec<ApiEvent> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<ApiEvent>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!(index, error = %e, "Dropping malformed event");
                None
            }
        })
        .collect();
    if events.len() < total {
        tracing::warn!(dropped = total - events.len(), total, "Malformed events skipped");
    }
    Ok(events)
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_odds() {
        assert_eq!(coerce_odds(&json!(-110)).map(|o| o.value()), Some(-110));
        assert_eq!(coerce_odds(&json!(150.0)).map(|o| o.value()), Some(150));
        assert_eq!(coerce_odds(&json!("+120")).map(|o| o.value()), Some(120));
        assert!(coerce_odds(&json!(0)).is_none());
        assert!(coerce_odds(&json!(-110.5)).is_none());
        assert!(coerce_odds(&json!("n/a")).is_none());
        assert!(coerce_odds(&json!(null)).is_none());
    }

    #[test]
    fn test_coerce_point() {
        assert_eq!(coerce_point(&json!(-2.5)), Some(-2.5));
        assert_eq!(coerce_point(&json!("3")), Some(3.0));
        assert!(coerce_point(&json!("pk")).is_none());
        assert!(coerce_point(&json!([1])).is_none());
    }

    #[test]
    fn test_event_away_and_start() {
        let event: ApiEvent = serde_json::from_value(json!({
            "id": "g1",
            "commence_time": "2099-09-07T17:00:00Z",
            "home_team": "JAX",
            "teams": ["JAX", "MIA"]
        }))
        .unwrap();
        assert_eq!(event.away().as_deref(), Some("MIA"));
        assert_eq!(
            event.start().unwrap().to_rfc3339(),
            "2099-09-07T17:00:00+00:00"
        );
    }

    #[test]
    fn test_naive_start_is_utc() {
        let event = ApiEvent {
            commence_time: Some("2099-09-07T17:00:00".to_string()),
            ..Default::default()
        };
        assert_eq!(
            event.start().unwrap().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "2099-09-07T17:00:00Z"
        );
    }

    #[test]
    fn test_malformed_outcome_fields_dropped() {
        let market: ApiMarket = serde_json::from_value(json!({
            "key": "spreads",
            "outcomes": [
                {"name": "A", "price": "bad", "point": -3.5},
                {"name": "B", "price": -110, "point": {"x": 1}}
            ]
        }))
        .unwrap();
        let a = market.outcome("A").unwrap();
        assert!(a.odds().is_none());
        assert_eq!(a.line(), Some(-3.5));
        let b = market.outcome("B").unwrap();
        assert_eq!(b.odds().map(|o| o.value()), Some(-110));
        assert!(b.line().is_none());
    }

    #[test]
    fn test_malformed_event_does_not_sink_the_slate() {
        let body = json!([
            {"id": "good", "home_team": "KC", "away_team": "BUF", "bookmakers": []},
            {"id": "nulls", "home_team": "LV", "teams": null, "bookmakers": null},
            {"id": 42, "home_team": "DEN"},
            {"id": "also_good", "home_team": "SF", "teams": ["SF", "ARI"]}
        ])
        .to_string();

        let events = decode_events(&body).unwrap();
        let ids: Vec<_> = events.iter().filter_map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec!["good", "also_good"]);
        assert_eq!(events[1].away().as_deref(), Some("ARI"));
    }

    #[test]
    fn test_non_array_body_is_an_error() {
        assert!(decode_events(r#"{"message": "bad key"}"#).is_err());
        assert!(decode_events("[]").unwrap().is_empty());
    }
}
