//! Configuration types for hardrock-ev

use crate::feed::{OddsApiConfig, HARDROCK_BOOKMAKER, ODDS_API_URL, PINNACLE_BOOKMAKER};
use crate::risk::KellyCalculator;
use crate::scheduler::{PollCadence, PollerOptions};
use crate::signal::{EngineConfig, ThresholdPolicy};
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable carrying The Odds API key
pub const API_KEY_ENV: &str = "THEODDSAPI";
/// Environment variable carrying the Discord webhook
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";

/// Quota backoff is capped at a year
const MAX_BACKOFF_SECS: u64 = 366 * 24 * 3600;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Odds source for the evaluated book
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    /// Falls back to `THEODDSAPI`
    pub api_key: Option<String>,
    pub sport: String,
    pub regions: String,
    pub bookmaker: String,
    /// Lookahead window in days
    pub days_from: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: ODDS_API_URL.to_string(),
            api_key: None,
            sport: "americanfootball_nfl".to_string(),
            regions: "us".to_string(),
            bookmaker: HARDROCK_BOOKMAKER.to_string(),
            days_from: 7,
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

/// Sharp reference book
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub bookmaker: String,
    /// Comma-separated market keys
    pub markets: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            bookmaker: PINNACLE_BOOKMAKER.to_string(),
            markets: "spreads,h2h".to_string(),
        }
    }
}

/// Edge thresholds and ranking
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    pub min_edge: f64,
    pub uncertainty_bump: f64,
    pub key_number_bump: f64,
    pub key_numbers: Vec<f64>,
    pub key_number_tolerance: f64,
    pub moneyline_min_edge: f64,
    /// Unset means unbounded interpolation
    pub max_interp_gap: Option<f64>,
    pub max_alerts: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        let policy = ThresholdPolicy::default();
        Self {
            min_edge: policy.min_edge,
            uncertainty_bump: policy.uncertainty_bump,
            key_number_bump: policy.key_number_bump,
            key_numbers: policy.key_numbers,
            key_number_tolerance: policy.key_number_tolerance,
            moneyline_min_edge: policy.moneyline_min_edge,
            max_interp_gap: Some(1.0),
            max_alerts: 5,
        }
    }
}

/// Bankroll and stake sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskConfig {
    pub bankroll: Decimal,
    /// Weight applied to full Kelly
    pub kelly_fraction: Decimal,
    /// Stake cap as a fraction of bankroll
    pub max_unit_pct: Decimal,
    /// Smaller stakes are not alerted
    pub min_stake: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            bankroll: Decimal::new(500, 0),
            kelly_fraction: Decimal::new(5, 1),
            max_unit_pct: Decimal::new(2, 2),
            min_stake: Decimal::ONE,
        }
    }
}

/// Signal database
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/signals.db"),
        }
    }
}

/// Operator notifications
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Falls back to `DISCORD_WEBHOOK_URL`
    pub webhook_url: Option<String>,
    pub suppress_repeats: bool,
    pub notify_empty: bool,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            suppress_repeats: true,
            notify_empty: false,
            timeout_secs: 10,
        }
    }
}

/// Polling cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub sunday_interval_secs: u64,
    pub quota_backoff_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 900,
            sunday_interval_secs: 300,
            quota_backoff_secs: 6 * 3600,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Prometheus listener, disabled when unset
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment secrets
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Fill missing secrets from `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.feed.api_key.as_deref().map_or(true, str::is_empty) {
            self.feed.api_key = lookup(API_KEY_ENV).filter(|v| !v.is_empty());
        }
        if self.notify.webhook_url.as_deref().map_or(true, str::is_empty) {
            self.notify.webhook_url = lookup(WEBHOOK_ENV).filter(|v| !v.is_empty());
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let mask = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some("***".to_string());
            }
        };
        mask(&mut copy.feed.api_key);
        mask(&mut copy.notify.webhook_url);
        copy
    }

    pub fn odds_api(&self) -> OddsApiConfig {
        OddsApiConfig {
            base_url: self.feed.base_url.clone(),
            api_key: self.feed.api_key.clone(),
            sport: self.feed.sport.clone(),
            regions: self.feed.regions.clone(),
            timeout: Duration::from_secs(self.feed.timeout_secs),
            max_retries: self.feed.max_retries,
            retry_backoff: Duration::from_millis(self.feed.retry_backoff_ms),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        let s = &self.signal;
        EngineConfig {
            thresholds: ThresholdPolicy {
                min_edge: s.min_edge,
                uncertainty_bump: s.uncertainty_bump,
                key_number_bump: s.key_number_bump,
                key_numbers: s.key_numbers.clone(),
                key_number_tolerance: s.key_number_tolerance,
                moneyline_min_edge: s.moneyline_min_edge,
            },
            max_interp_gap: s.max_interp_gap,
            bankroll: self.risk.bankroll,
            min_stake: self.risk.min_stake,
            max_alerts: s.max_alerts,
        }
    }

    pub fn kelly(&self) -> KellyCalculator {
        KellyCalculator::new(self.risk.kelly_fraction, self.risk.max_unit_pct)
    }

    pub fn poller_options(&self) -> PollerOptions {
        PollerOptions {
            suppress_repeats: self.notify.suppress_repeats,
            notify_empty: self.notify.notify_empty,
            quota_backoff: chrono::Duration::seconds(
                i64::try_from(self.schedule.quota_backoff_secs.min(MAX_BACKOFF_SECS)).unwrap_or(0),
            ),
        }
    }

    pub fn cadence(&self) -> PollCadence {
        PollCadence {
            interval: Duration::from_secs(self.schedule.interval_secs),
            sunday_interval: Duration::from_secs(self.schedule.sunday_interval_secs),
        }
    }
}
