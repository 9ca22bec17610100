//! American odds conversions
//!
//! All functions take an optional push probability (stake returned, no win
//! or loss). Probabilities are clamped to [0, 1] before use.

use super::AmericanOdds;

fn clamp_prob(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// Probability implied by a single-sided price, vig included
///
/// +200 -> 0.3333, -150 -> 0.60
pub fn implied_probability(odds: AmericanOdds) -> f64 {
    let o = f64::from(odds.value());
    if o > 0.0 {
        100.0 / (o + 100.0)
    } else {
        o.abs() / (o.abs() + 100.0)
    }
}

/// Net profit per $1 staked if the bet wins
///
/// +120 -> 1.2, -150 -> 0.6667
pub fn payout_multiple(odds: AmericanOdds) -> f64 {
    let o = f64::from(odds.value());
    if o > 0.0 {
        o / 100.0
    } else {
        100.0 / o.abs()
    }
}

/// Win probability at which expected value is exactly zero
///
/// `(1 - p_push) / (b + 1)`
pub fn break_even_probability(odds: AmericanOdds, p_push: f64) -> f64 {
    (1.0 - clamp_prob(p_push)) / (payout_multiple(odds) + 1.0)
}

/// Expected profit per $1 staked
///
/// `EV = p_win * b - p_loss` with `p_loss = 1 - p_win - p_push`.
pub fn expected_value_per_dollar(p_win: f64, odds: AmericanOdds, p_push: f64) -> f64 {
    let b = payout_multiple(odds);
    let p_win = clamp_prob(p_win);
    let p_push = clamp_prob(p_push);
    p_win * b - (1.0 - p_win - p_push)
}

/// Full Kelly fraction with pushes, `f* = (b*p - q) / b`
///
/// Negative results mean "do not bet"; callers clamp before sizing.
pub fn kelly_fraction(p_win: f64, odds: AmericanOdds, p_push: f64) -> f64 {
    let b = payout_multiple(odds);
    let p_win = clamp_prob(p_win);
    let p_push = clamp_prob(p_push);
    let q = 1.0 - p_win - p_push;
    (b * p_win - q) / b
}
