//! The Odds API client
//!
//! Shared HTTP plumbing for the book feed and the reference feed: query
//! construction, retries on transient failures and quota detection.

use super::wire::{decode_events, ApiEvent};
use super::FeedError;
use reqwest::{Client, Response};
use std::time::Duration;

/// The Odds API base URL
pub const ODDS_API_URL: &str = "https://api.the-odds-api.com";

/// Header carrying the remaining request budget
const REMAINING_HEADER: &str = "x-requests-remaining";

/// Configuration for the Odds API client
#[derive(Debug, Clone)]
pub struct OddsApiConfig {
    /// Base URL for the API
    pub base_url: String,
    /// API key, sent as `apiKey` when present
    pub api_key: Option<String>,
    /// Sport key (e.g., "americanfootball_nfl")
    pub sport: String,
    /// Region filter
    pub regions: String,
    /// Request timeout
    pub timeout: Duration,
    /// Extra attempts on timeouts, transport errors and 5xx
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each attempt
    pub retry_backoff: Duration,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            base_url: ODDS_API_URL.to_string(),
            api_key: None,
            sport: "americanfootball_nfl".to_string(),
            regions: "us".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Client for The Odds API
#[derive(Debug, Clone)]
pub struct OddsApiClient {
    config: OddsApiConfig,
    client: Client,
}

impl OddsApiClient {
    /// Create a client with the given configuration
    pub fn new(config: OddsApiConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OddsApiConfig {
        &self.config
    }

    /// Fetch all events for the sport with one bookmaker's markets
    pub async fn fetch_odds(
        &self,
        bookmaker: &str,
        markets: &str,
        extra: &[(&str, String)],
    ) -> Result<Vec<ApiEvent>, FeedError> {
        let url = format!("{}/v4/sports/{}/odds", self.config.base_url, self.config.sport);
        let params = self.params(bookmaker, markets, extra);
        let body = self.get_with_retry(&url, &params).await?;
        decode_events(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }

    /// Fetch a single event, used for markets only served per event
    pub async fn fetch_event_odds(
        &self,
        event_id: &str,
        bookmaker: &str,
        markets: &str,
    ) -> Result<ApiEvent, FeedError> {
        let url = format!(
            "{}/v4/sports/{}/events/{}/odds",
            self.config.base_url, self.config.sport, event_id
        );
        let params = self.params(bookmaker, markets, &[]);
        let body = self.get_with_retry(&url, &params).await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }

    fn params(&self, bookmaker: &str, markets: &str, extra: &[(&str, String)]) -> Vec<(String, String)> {
        let mut params = vec![
            ("regions".to_string(), self.config.regions.clone()),
            ("markets".to_string(), markets.to_string()),
            ("bookmakers".to_string(), bookmaker.to_string()),
            ("oddsFormat".to_string(), "american".to_string()),
            ("dateFormat".to_string(), "iso".to_string()),
        ];
        params.extend(extra.iter().map(|(k, v)| (k.to_string(), v.clone())));
        if let Some(key) = &self.config.api_key {
            params.push(("apiKey".to_string(), key.clone()));
        }
        params
    }

    async fn get_with_retry(&self, url: &str, params: &[(String, String)]) -> Result<String, FeedError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, params).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_backoff * 2u32.saturating_pow(attempt);
                    tracing::warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Retrying Odds API request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &str, params: &[(String, String)]) -> Result<String, FeedError> {
        tracing::debug!(url = %url, "Requesting Odds API");

        let response = self.client.get(url).query(params).send().await?;
        log_remaining(&response);

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FeedError::from_status(status.as_u16(), &body));
        }
        Ok(body)
    }
}

fn log_remaining(response: &Response) {
    let Some(remaining) = response
        .headers()
        .get(REMAINING_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
    else {
        return;
    };

    if remaining <= 0.0 {
        tracing::warn!(remaining, "Odds API request budget exhausted");
    } else {
        tracing::debug!(remaining, "Odds API requests remaining");
    }
}
