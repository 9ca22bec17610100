//! Operator notifications
//!
//! Alert summaries are posted to a Discord webhook as a single message.

use crate::signal::Alert;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Title used for alert summaries
pub const ALERT_TITLE: &str = "NFL +EV Signals (Hard Rock)";

/// Kickoff timestamp format in alert lines
const KICKOFF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(String),
    #[error("webhook returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Request(e.to_string())
    }
}

/// Delivers a titled list of lines to an operator channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, title: &str, lines: &[String]) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct DiscordMessage<'a> {
    content: &'a str,
}

/// Discord webhook notifier
///
/// Without a webhook URL every push is logged and skipped.
#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        if webhook_url.is_some() {
            tracing::info!("Discord notifications enabled");
        }
        Ok(Self {
            client,
            webhook_url,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn push(&self, title: &str, lines: &[String]) -> Result<(), NotifyError> {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::error!("DISCORD_WEBHOOK_URL is not set; skipping notification");
            return Ok(());
        };

        let content = message_content(title, lines);
        let resp = self
            .client
            .post(url)
            .json(&DiscordMessage { content: &content })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Http {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(lines = lines.len(), "Discord notification sent");
        Ok(())
    }
}

/// Prints notifications to stdout instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn push(&self, title: &str, lines: &[String]) -> Result<(), NotifyError> {
        println!("{}", message_content(title, lines));
        Ok(())
    }
}

/// Bold title followed by one line per entry
pub fn message_content(title: &str, lines: &[String]) -> String {
    let mut content = format!("**{}**", title);
    for line in lines {
        content.push('\n');
        content.push_str(line);
    }
    content
}

/// One alert as a notification line
pub fn format_alert_line(alert: &Alert) -> String {
    let push = if alert.p_push > 0.0 {
        format!("Push: {:.1}%  ", alert.p_push * 100.0)
    } else {
        String::new()
    };
    format!(
        "{}  {}  Pick: **{}**  Odds: {}  True: {:.2}  {}Edge: {:.1}%  Kelly: {:.1}%  Stake: ${:.2}  (KO {})",
        alert.matchup,
        alert.market,
        alert.pick,
        alert.odds,
        alert.p_true,
        push,
        alert.edge * 100.0,
        alert.kelly.max(0.0) * 100.0,
        alert.stake,
        alert.start_utc.format(KICKOFF_FORMAT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Side;
    use crate::odds::AmericanOdds;
    use crate::signal::MarketKind;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn alert(market: MarketKind, pick: &str, p_push: f64) -> Alert {
        let start = Utc.with_ymd_and_hms(2099, 9, 7, 17, 0, 0).unwrap();
        Alert {
            id: Uuid::new_v4(),
            game_id: "G1".to_string(),
            matchup: "AWY @ HOM".to_string(),
            start_utc: start,
            market,
            side: Side::Home,
            pick: pick.to_string(),
            odds: AmericanOdds::new(150).unwrap(),
            line: None,
            p_true: 0.45,
            p_push,
            edge: 0.125,
            kelly: 0.083_333,
            stake: dec!(2),
            threshold: 0.03,
            timestamp: start,
        }
    }

    #[test]
    fn test_moneyline_line_format() {
        let line = format_alert_line(&alert(MarketKind::Moneyline, "HOM", 0.0));
        assert_eq!(
            line,
            "AWY @ HOM  ML  Pick: **HOM**  Odds: 150  True: 0.45  Edge: 12.5%  Kelly: 8.3%  Stake: $2.00  (KO 2099-09-07T17:00:00Z)"
        );
    }

    #[test]
    fn test_spread_line_shows_push() {
        let line = format_alert_line(&alert(MarketKind::Spread, "HOM -7", 0.08));
        assert!(line.contains("SPREAD  Pick: **HOM -7**"));
        assert!(line.contains("Push: 8.0%  Edge: 12.5%"));
    }

    #[test]
    fn test_negative_kelly_shown_as_zero() {
        let mut a = alert(MarketKind::Moneyline, "HOM", 0.0);
        a.kelly = -0.2;
        assert!(format_alert_line(&a).contains("Kelly: 0.0%"));
    }

    #[test]
    fn test_message_content() {
        let lines = vec!["one".to_string(), "two".to_string()];
        assert_eq!(message_content("T", &lines), "**T**\none\ntwo");
        let body = serde_json::to_value(DiscordMessage { content: "**T**" }).unwrap();
        assert_eq!(body, serde_json::json!({"content": "**T**"}));
    }

    #[tokio::test]
    async fn test_missing_webhook_skips() {
        let notifier = DiscordNotifier::new(Some("  ".to_string()), Duration::from_secs(1)).unwrap();
        assert!(!notifier.is_configured());
        assert!(notifier.push(ALERT_TITLE, &["x".to_string()]).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_errors() {
        let notifier = DiscordNotifier::new(
            Some("http://127.0.0.1:9/webhook".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = notifier.push(ALERT_TITLE, &[]).await.unwrap_err();
        assert!(matches!(err, NotifyError::Request(_)));
    }
}
