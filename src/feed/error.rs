//! Feed errors

use thiserror::Error;

/// Errors raised while fetching odds or reference data
#[derive(Debug, Error)]
pub enum FeedError {
    /// Rate limit or plan exhaustion; callers back off instead of retrying
    #[error("Odds API quota exhausted: {0}")]
    QuotaExceeded(String),
    /// Request timed out
    #[error("Odds API request timed out: {0}")]
    Timeout(String),
    /// Non-success HTTP status
    #[error("Odds API HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Transport-level failure
    #[error("Odds API request failed: {0}")]
    Request(String),
    /// Payload could not be decoded
    #[error("Invalid Odds API payload: {0}")]
    Decode(String),
}

impl FeedError {
    pub fn is_quota(&self) -> bool {
        matches!(self, FeedError::QuotaExceeded(_))
    }

    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Timeout(_) | FeedError::Request(_) => true,
            FeedError::Http { status, .. } => *status >= 500,
            FeedError::QuotaExceeded(_) | FeedError::Decode(_) => false,
        }
    }

    /// Classify a non-success response
    ///
    /// 402 and 429 are always quota. 401/403 are quota when the body says so,
    /// since the API reports plan exhaustion as an authorization failure.
    pub fn from_status(status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        let mentions_quota = ["quota", "usage limit", "requests remaining", "out of requests"]
            .iter()
            .any(|needle| lower.contains(needle));

        match status {
            402 | 429 => FeedError::QuotaExceeded(format!("HTTP {}: {}", status, body)),
            401 | 403 if mentions_quota => {
                FeedError::QuotaExceeded(format!("HTTP {}: {}", status, body))
            }
            _ => FeedError::Http {
                status,
                body: body.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(err.to_string())
        } else if err.is_decode() {
            FeedError::Decode(err.to_string())
        } else {
            FeedError::Request(err.to_string())
        }
    }
}
