//! Spread line to outcome distribution mapping
//!
//! Half-point lines cannot push and map straight onto the ladder. Whole
//! numbers read the two adjacent half-point favorite lines: the mass
//! between them is the chance of landing exactly on the number.
//!
//! For a whole line `n` with `p_lo = P(fav covers -(n-0.5))` and
//! `p_hi = P(fav covers -(n+0.5))`:
//! - favorite at `-n`: win = `p_hi`, push = `p_lo - p_hi`
//! - underdog at `+n`: win = `1 - p_lo`, push = `p_lo - p_hi`

use super::{FavoriteLadder, OutcomeDistribution};

/// Lines within this distance of an integer are whole numbers
const WHOLE_TOLERANCE: f64 = 1e-6;

/// Maps spread lines with a fixed interpolation bound
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadMapper {
    /// Maximum distance from a target to either interpolation neighbor
    pub max_gap: Option<f64>,
}

impl SpreadMapper {
    /// Create a mapper with the given interpolation bound
    pub fn new(max_gap: Option<f64>) -> Self {
        Self { max_gap }
    }

    /// Map a line for one side onto the ladder
    pub fn map(&self, line: f64, ladder: &FavoriteLadder) -> Option<OutcomeDistribution> {
        map_line_to_outcomes(line, ladder, self.max_gap)
    }
}

/// Win/push/lose distribution for one side quoted at `line`
///
/// `line` is that side's spread: negative for the favorite, positive for
/// the underdog. Returns `None` when the ladder cannot cover the line.
pub fn map_line_to_outcomes(
    line: f64,
    ladder: &FavoriteLadder,
    max_gap: Option<f64>,
) -> Option<OutcomeDistribution> {
    if !line.is_finite() || line == 0.0 {
        // Pick'em has no favorite to read off the ladder
        return None;
    }

    if (line - line.round()).abs() > WHOLE_TOLERANCE {
        let hit = ladder.lookup(-line.abs(), max_gap)?;
        let p_win = if line < 0.0 {
            hit.probability
        } else {
            1.0 - hit.probability
        };
        return Some(OutcomeDistribution::new(
            p_win,
            0.0,
            1.0 - p_win,
            false,
            hit.interpolated,
        ));
    }

    let n = line.round().abs();
    let lo = ladder.lookup(-(n - 0.5), max_gap)?;
    let hi = ladder.lookup(-(n + 0.5), max_gap)?;
    let p_push = (lo.probability - hi.probability).max(0.0);
    let p_win = if line < 0.0 {
        hi.probability
    } else {
        1.0 - lo.probability
    };

    Some(OutcomeDistribution::new(
        p_win,
        p_push,
        1.0 - p_win - p_push,
        true,
        lo.interpolated || hi.interpolated,
    ))
}
