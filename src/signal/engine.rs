//! Per-game signal evaluation
//!
//! Each side with a price and line is mapped onto the game's favorite
//! ladder; the side with the highest EV is the game's candidate. Games
//! without a usable ladder fall back to the de-vigged moneyline.

use super::{pick_label, Alert, MarketKind, ThresholdPolicy};
use crate::feed::{Game, MoneylinePair, MoneylineQuote, ReferenceEntry, ReferenceMap, Side, SpreadQuote};
use crate::ladder::{FavoriteLadder, SpreadMapper};
use crate::odds::{expected_value_per_dollar, kelly_fraction, AmericanOdds};
use crate::risk::KellyCalculator;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Why a game produced no alert
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No reference entry for the game
    NoReference,
    /// No side could be priced against the reference
    NoEvaluableSide,
    /// Best side's edge fell short of its threshold
    BelowThreshold { edge: f64, threshold: f64 },
    /// Stake rounded below the minimum unit
    StakeTooSmall(Decimal),
}

/// Outcome of evaluating one polling cycle
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Qualifying alerts, highest edge first, capped
    pub alerts: Vec<Alert>,
    /// Games that produced no alert
    pub skipped: Vec<(String, SkipReason)>,
    /// Games that had reference data
    pub games_evaluated: usize,
}

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub thresholds: ThresholdPolicy,
    /// Maximum interpolation distance on the ladder
    pub max_interp_gap: Option<f64>,
    pub bankroll: Decimal,
    /// Stakes below this are suppressed
    pub min_stake: Decimal,
    /// Alerts kept per cycle
    pub max_alerts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdPolicy::default(),
            max_interp_gap: Some(1.0),
            bankroll: dec!(500),
            min_stake: dec!(1),
            max_alerts: 5,
        }
    }
}

/// A priced side before threshold checks
#[derive(Debug, Clone)]
struct Candidate {
    market: MarketKind,
    side: Side,
    odds: AmericanOdds,
    line: Option<f64>,
    p_win: f64,
    p_push: f64,
    edge: f64,
    kelly: f64,
    threshold: f64,
}

/// Computes EV and stake sizing per game
pub struct SignalEngine {
    config: EngineConfig,
    mapper: SpreadMapper,
    kelly: KellyCalculator,
}

impl SignalEngine {
    pub fn new(config: EngineConfig, kelly: KellyCalculator) -> Self {
        let mapper = SpreadMapper::new(config.max_interp_gap);
        Self {
            config,
            mapper,
            kelly,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate every game, rank the alerts and cap them
    pub fn evaluate(&self, games: &[Game], reference: &ReferenceMap, now: DateTime<Utc>) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for game in games {
            let Some(entry) = reference.get(&game.game_id) else {
                tracing::debug!(game_id = %game.game_id, "No reference data for game");
                evaluation
                    .skipped
                    .push((game.game_id.clone(), SkipReason::NoReference));
                continue;
            };
            evaluation.games_evaluated += 1;

            match self.evaluate_game(game, entry, now) {
                Ok(alert) => evaluation.alerts.push(alert),
                Err(reason) => {
                    tracing::debug!(game_id = %game.game_id, ?reason, "Game skipped");
                    evaluation.skipped.push((game.game_id.clone(), reason));
                }
            }
        }

        evaluation
            .alerts
            .sort_by(|a, b| b.edge.total_cmp(&a.edge));
        evaluation.alerts.truncate(self.config.max_alerts);
        evaluation
    }

    /// Best alert for a single game, if it qualifies
    pub fn evaluate_game(
        &self,
        game: &Game,
        entry: &ReferenceEntry,
        now: DateTime<Utc>,
    ) -> Result<Alert, SkipReason> {
        let mut candidates = match game.quotes.spread() {
            Some(spread) if !entry.fav_ladder.is_empty() => {
                self.spread_candidates(game, spread, &entry.fav_ladder)
            }
            _ => Vec::new(),
        };

        if candidates.is_empty() {
            if let (Some(quote), Some(pair)) = (game.quotes.moneyline(), entry.moneyline.as_ref()) {
                candidates = self.moneyline_candidates(quote, pair);
            }
        }

        let best = candidates
            .into_iter()
            .max_by(|a, b| a.edge.total_cmp(&b.edge))
            .ok_or(SkipReason::NoEvaluableSide)?;

        if best.edge < best.threshold {
            return Err(SkipReason::BelowThreshold {
                edge: best.edge,
                threshold: best.threshold,
            });
        }

        let stake = self.kelly.stake(best.kelly, self.config.bankroll);
        if stake < self.config.min_stake {
            return Err(SkipReason::StakeTooSmall(stake));
        }

        let alert = Alert {
            id: Uuid::new_v4(),
            game_id: game.game_id.clone(),
            matchup: game.matchup(),
            start_utc: game.start_utc,
            market: best.market,
            side: best.side,
            pick: pick_label(game.team(best.side), best.line),
            odds: best.odds,
            line: best.line,
            p_true: best.p_win,
            p_push: best.p_push,
            edge: best.edge,
            kelly: best.kelly,
            stake,
            threshold: best.threshold,
            timestamp: now,
        };
        tracing::info!(
            game_id = %alert.game_id,
            market = %alert.market,
            pick = %alert.pick,
            odds = alert.odds.value(),
            edge = alert.edge,
            threshold = alert.threshold,
            stake = %alert.stake,
            "Signal qualified"
        );
        Ok(alert)
    }

    fn spread_candidates(&self, game: &Game, spread: &SpreadQuote, ladder: &FavoriteLadder) -> Vec<Candidate> {
        Side::BOTH
            .into_iter()
            .filter_map(|side| {
                let (odds, line) = spread.side(side).priced()?;
                let Some(dist) = self.mapper.map(line, ladder) else {
                    tracing::debug!(game_id = %game.game_id, ?side, line, "Ladder cannot cover line");
                    return None;
                };
                Some(Candidate {
                    market: MarketKind::Spread,
                    side,
                    odds,
                    line: Some(line),
                    p_win: dist.p_win,
                    p_push: dist.p_push,
                    edge: expected_value_per_dollar(dist.p_win, odds, dist.p_push),
                    kelly: kelly_fraction(dist.p_win, odds, dist.p_push),
                    threshold: self.config.thresholds.spread_threshold(&dist, line),
                })
            })
            .collect()
    }

    fn moneyline_candidates(&self, quote: &MoneylineQuote, pair: &MoneylinePair) -> Vec<Candidate> {
        Side::BOTH
            .into_iter()
            .filter_map(|side| {
                let odds = quote.side(side)?;
                let p_win = pair.side(side);
                Some(Candidate {
                    market: MarketKind::Moneyline,
                    side,
                    odds,
                    line: None,
                    p_win,
                    p_push: 0.0,
                    edge: expected_value_per_dollar(p_win, odds, 0.0),
                    kelly: kelly_fraction(p_win, odds, 0.0),
                    threshold: self.config.thresholds.moneyline_threshold(),
                })
            })
            .collect()
    }
}
