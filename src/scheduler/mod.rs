//! Tick driver
//!
//! One tick fetches book quotes and reference data, evaluates, persists and
//! notifies, strictly in that order. Ticks never overlap: `run_forever`
//! awaits each cycle before sleeping.

mod state;

pub use state::{quote_signature, PollCadence, TickState};

use crate::feed::{FeedError, OddsFeed, ReferenceFeed};
use crate::notify::{format_alert_line, Notifier, ALERT_TITLE};
use crate::signal::{Alert, SignalEngine};
use crate::store::{SignalRecord, SignalStore};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Title for fetch failure notices
const FAILURE_TITLE: &str = "NFL +EV scan aborted";
/// Title for quota notices
const QUOTA_TITLE: &str = "NFL +EV scan paused: Odds API quota exhausted";
/// Title for the diagnostic empty-cycle notice
const EMPTY_TITLE: &str = "NFL +EV Signals (Hard Rock): no opportunities";

/// Why a tick did not run
#[derive(Debug, Clone, PartialEq)]
pub enum SkipCause {
    /// Inside the backoff window after quota exhaustion
    QuotaBackoff { until: DateTime<Utc> },
    /// Previous fetch saw the same quotes as the one before it
    UnchangedQuotes,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Skipped(SkipCause),
    /// Completed without qualifying alerts
    NoSignals,
    /// Completed with alerts; `persisted` counts new store rows
    Alerted { emitted: usize, persisted: usize },
    /// A fetch failed before evaluation
    Aborted(String),
}

impl CycleOutcome {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Skipped(_) => "skipped",
            CycleOutcome::NoSignals => "no_signals",
            CycleOutcome::Alerted { .. } => "alerted",
            CycleOutcome::Aborted(_) => "aborted",
        }
    }
}

/// Driver behavior switches
#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Only notify alerts that created a new store row
    pub suppress_repeats: bool,
    /// Send a notice when a cycle finds nothing
    pub notify_empty: bool,
    /// Ticks skipped after quota exhaustion
    pub quota_backoff: Duration,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            suppress_repeats: true,
            notify_empty: false,
            quota_backoff: Duration::hours(6),
        }
    }
}

/// Polls feeds and turns evaluations into stored, notified alerts
pub struct Poller {
    odds: Arc<dyn OddsFeed>,
    reference: Arc<dyn ReferenceFeed>,
    engine: SignalEngine,
    store: Arc<dyn SignalStore>,
    notifier: Arc<dyn Notifier>,
    options: PollerOptions,
    state: TickState,
}

impl Poller {
    pub fn new(
        odds: Arc<dyn OddsFeed>,
        reference: Arc<dyn ReferenceFeed>,
        engine: SignalEngine,
        store: Arc<dyn SignalStore>,
        notifier: Arc<dyn Notifier>,
        options: PollerOptions,
    ) -> Self {
        Self {
            odds,
            reference,
            engine,
            store,
            notifier,
            options,
            state: TickState::default(),
        }
    }

    /// Replace the carried state, e.g. to resume from a known signature
    pub fn with_state(mut self, state: TickState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &TickState {
        &self.state
    }

    /// Run one tick at `now`
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        let started = Instant::now();
        let outcome = self.tick(now).await;
        telemetry::record_cycle(outcome.label(), started.elapsed());
        outcome
    }

    async fn tick(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        if let Some(until) = self.state.backoff_until.filter(|_| self.state.in_backoff(now)) {
            tracing::info!(%until, "Quota backoff active, skipping tick");
            return CycleOutcome::Skipped(SkipCause::QuotaBackoff { until });
        }
        if self.state.take_skip() {
            tracing::info!("Quotes unchanged on last fetch, skipping tick");
            return CycleOutcome::Skipped(SkipCause::UnchangedQuotes);
        }

        let games = match self.odds.fetch_games(now).await {
            Ok(games) => games,
            Err(e) => return self.abort(now, "odds", e).await,
        };
        if self.state.observe_signature(quote_signature(&games)) {
            tracing::info!(games = games.len(), "Book quotes unchanged, next tick will be skipped");
        }

        let reference = match self.reference.fetch_reference(&games).await {
            Ok(reference) => reference,
            Err(e) => return self.abort(now, "reference", e).await,
        };

        let evaluation = self.engine.evaluate(&games, &reference, now);
        telemetry::set_gauge(GaugeMetric::GamesEvaluated, evaluation.games_evaluated as f64);
        tracing::info!(
            games = games.len(),
            evaluated = evaluation.games_evaluated,
            skipped = evaluation.skipped.len(),
            alerts = evaluation.alerts.len(),
            "Cycle evaluated"
        );

        if evaluation.alerts.is_empty() {
            if self.options.notify_empty {
                let lines = vec![format!(
                    "Checked {} games ({} with reference data), nothing cleared the edge threshold",
                    games.len(),
                    evaluation.games_evaluated
                )];
                self.send(EMPTY_TITLE, &lines).await;
            }
            return CycleOutcome::NoSignals;
        }

        let emitted = evaluation.alerts.len();
        telemetry::increment(CounterMetric::AlertsEmitted, emitted as u64);
        let (to_notify, persisted) = self.persist(&evaluation.alerts);
        telemetry::increment(CounterMetric::SignalsPersisted, persisted as u64);

        if to_notify.is_empty() {
            tracing::info!(emitted, "All alerts already notified");
        } else {
            let lines: Vec<String> = to_notify.iter().map(|a| format_alert_line(a)).collect();
            self.send(ALERT_TITLE, &lines).await;
        }

        CycleOutcome::Alerted { emitted, persisted }
    }

    /// Store alerts and pick the ones to notify
    fn persist<'a>(&self, alerts: &'a [Alert]) -> (Vec<&'a Alert>, usize) {
        let mut to_notify = Vec::with_capacity(alerts.len());
        let mut persisted = 0;

        for alert in alerts {
            match self.store.save(&SignalRecord::from(alert)) {
                Ok(true) => {
                    persisted += 1;
                    to_notify.push(alert);
                }
                Ok(false) => {
                    if !self.options.suppress_repeats {
                        to_notify.push(alert);
                    }
                }
                Err(e) => {
                    // Unstored alerts are still worth telling the operator about
                    tracing::error!(game_id = %alert.game_id, error = %e, "Failed to persist signal");
                    to_notify.push(alert);
                }
            }
        }
        (to_notify, persisted)
    }

    async fn abort(&mut self, now: DateTime<Utc>, source: &str, error: FeedError) -> CycleOutcome {
        if error.is_quota() {
            let first_this_month = self.state.enter_quota_backoff(now, self.options.quota_backoff);
            tracing::warn!(source, error = %error, backoff_until = ?self.state.backoff_until, "Quota exhausted, backing off");
            if first_this_month {
                let lines = vec![format!(
                    "{} fetch: {}. Polling paused until {}",
                    source,
                    error,
                    (now + self.options.quota_backoff).format("%Y-%m-%dT%H:%M:%SZ")
                )];
                self.send(QUOTA_TITLE, &lines).await;
            }
        } else {
            tracing::error!(source, error = %error, "Fetch failed, aborting cycle");
            let lines = vec![format!("{} fetch failed: {}", source, error)];
            self.send(FAILURE_TITLE, &lines).await;
        }
        CycleOutcome::Aborted(error.to_string())
    }

    async fn send(&self, title: &str, lines: &[String]) {
        if let Err(e) = self.notifier.push(title, lines).await {
            tracing::error!(error = %e, "Notification failed");
        }
    }
}

/// Tick until Ctrl-C, first tick immediately
pub async fn run_forever(poller: &mut Poller, cadence: PollCadence) -> anyhow::Result<()> {
    // Listen from the start so a Ctrl-C during a cycle is kept for the next wait
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let listener = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    run_until(poller, cadence, async {
        // A dropped sender means the listener failed; keep polling
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await;
    listener.abort();
    Ok(())
}

/// Tick on `cadence` until `shutdown` resolves
///
/// Shutdown is checked between ticks; a cycle in flight always completes.
pub async fn run_until<F>(poller: &mut Poller, cadence: PollCadence, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let now = Utc::now();
        let outcome = poller.run_cycle(now).await;
        let delay = cadence.interval_at(now);
        tracing::info!(outcome = ?outcome, next_in_secs = delay.as_secs(), "Tick finished");

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
