//! Favorite ladder module
//!
//! Sparse favorite-side spread ladders built from a sharp reference book,
//! and the mapping from an evaluated book's spread to win/push/lose odds.

mod builder;
mod mapper;

pub use builder::SpreadRow;
pub use mapper::{map_line_to_outcomes, SpreadMapper};

/// Tolerance for treating two spread values as the same key
const KEY_EPSILON: f64 = 1e-9;

/// Tolerance on `p_win + p_push + p_lose == 1`
const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Fair probability that the favorite covers, keyed by favorite spread
///
/// Keys are always `<= 0` and kept sorted ascending (most negative first).
/// Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteLadder {
    entries: Vec<(f64, f64)>,
}

/// Result of a ladder lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderLookup {
    /// Probability the favorite covers the looked-up spread
    pub probability: f64,
    /// True when the value came from linear interpolation
    pub interpolated: bool,
}

impl FavoriteLadder {
    /// Build a ladder from `(favorite_spread, p_cover)` pairs
    ///
    /// Positive or non-finite spreads and probabilities outside [0, 1] are
    /// dropped. A repeated spread keeps the last probability seen.
    pub fn from_entries(entries: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut sorted: Vec<(f64, f64)> = Vec::new();
        for (point, prob) in entries {
            if !point.is_finite() || point > 0.0 || !(0.0..=1.0).contains(&prob) {
                tracing::debug!(point, prob, "Dropping invalid ladder entry");
                continue;
            }
            match sorted
                .iter_mut()
                .find(|(existing, _)| (*existing - point).abs() < KEY_EPSILON)
            {
                Some(slot) => slot.1 = prob,
                None => sorted.push((point, prob)),
            }
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { entries: sorted }
    }

    /// Number of quoted spreads
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// An empty ladder cannot evaluate spreads
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact entry for a favorite spread
    pub fn get(&self, point: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| (*key - point).abs() < KEY_EPSILON)
            .map(|(_, p)| *p)
    }

    /// Entries in ascending spread order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Fair favorite-cover probability at `target`
    ///
    /// Exact keys are returned as-is. Otherwise the nearest keys on both
    /// sides are linearly interpolated. Returns `None` when either neighbor
    /// is missing, or when `max_gap` is set and either neighbor lies
    /// further than `max_gap` from the target.
    pub fn lookup(&self, target: f64, max_gap: Option<f64>) -> Option<LadderLookup> {
        if let Some(probability) = self.get(target) {
            return Some(LadderLookup {
                probability,
                interpolated: false,
            });
        }

        let lo = self.entries.iter().rev().find(|(key, _)| *key <= target)?;
        let hi = self.entries.iter().find(|(key, _)| *key >= target)?;
        let (x_lo, p_lo) = *lo;
        let (x_hi, p_hi) = *hi;

        if let Some(gap) = max_gap {
            if (target - x_lo).abs() > gap || (x_hi - target).abs() > gap {
                return None;
            }
        }

        let t = (target - x_lo) / (x_hi - x_lo);
        Some(LadderLookup {
            probability: p_lo + t * (p_hi - p_lo),
            interpolated: true,
        })
    }
}

/// Win/push/lose probabilities for one side of one spread bet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeDistribution {
    pub p_win: f64,
    pub p_push: f64,
    pub p_lose: f64,
    /// Line is a whole number, so a push is possible
    pub whole: bool,
    /// At least one ladder value was interpolated
    pub interpolated: bool,
}

impl OutcomeDistribution {
    /// Create a distribution
    ///
    /// # Panics
    ///
    /// Panics when the probabilities fall outside [0, 1] or do not sum to 1.
    /// That can only come from a mapping bug, never from input data.
    pub fn new(p_win: f64, p_push: f64, p_lose: f64, whole: bool, interpolated: bool) -> Self {
        let in_range = |p: f64| (-DISTRIBUTION_TOLERANCE..=1.0 + DISTRIBUTION_TOLERANCE).contains(&p);
        assert!(
            in_range(p_win) && in_range(p_push) && in_range(p_lose),
            "outcome probabilities out of range: win={} push={} lose={}",
            p_win,
            p_push,
            p_lose
        );
        assert!(
            (p_win + p_push + p_lose - 1.0).abs() <= DISTRIBUTION_TOLERANCE,
            "outcome probabilities do not sum to 1: win={} push={} lose={}",
            p_win,
            p_push,
            p_lose
        );
        Self {
            p_win,
            p_push,
            p_lose,
            whole,
            interpolated,
        }
    }

    /// Whether the estimate is less reliable than an exact half-point quote
    pub fn is_uncertain(&self) -> bool {
        self.whole || self.interpolated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(entries: &[(f64, f64)]) -> FavoriteLadder {
        FavoriteLadder::from_entries(entries.iter().copied())
    }

    #[test]
    fn test_exact_lookup_not_interpolated() {
        let l = ladder(&[(-7.5, 0.52), (-6.5, 0.60)]);
        let hit = l.lookup(-7.5, Some(1.0)).unwrap();
        assert!(!hit.interpolated);
        assert!((hit.probability - 0.52).abs() < 1e-9);
    }

    #[test]
    fn test_linear_interpolation_midpoint() {
        let l = ladder(&[(-7.5, 0.52), (-6.5, 0.60)]);
        let hit = l.lookup(-7.0, Some(1.0)).unwrap();
        assert!(hit.interpolated);
        assert!((hit.probability - 0.56).abs() < 1e-6);
    }

    #[test]
    fn test_interpolation_off_midpoint() {
        let l = ladder(&[(-10.5, 0.30), (-3.5, 0.65)]);
        let hit = l.lookup(-7.0, None).unwrap();
        assert!(hit.interpolated);
        assert!((hit.probability - 0.475).abs() < 1e-9);
    }

    #[test]
    fn test_max_gap_rejects_wide_neighbors() {
        let l = ladder(&[(-9.5, 0.48), (-3.5, 0.62)]);
        assert!(l.lookup(-7.0, Some(1.0)).is_none());
        assert!(l.lookup(-7.0, None).is_some());
    }

    #[test]
    fn test_lookup_outside_ladder_is_unavailable() {
        let l = ladder(&[(-7.5, 0.52), (-6.5, 0.60)]);
        assert!(l.lookup(-8.5, None).is_none());
        assert!(l.lookup(-2.5, None).is_none());
        assert!(FavoriteLadder::default().lookup(-3.0, None).is_none());
    }

    #[test]
    fn test_from_entries_filters_and_sorts() {
        let l = ladder(&[(-3.5, 0.55), (2.5, 0.4), (-7.5, 0.5), (-1.5, 1.3), (-3.5, 0.57)]);
        let entries: Vec<_> = l.iter().collect();
        assert_eq!(entries, vec![(-7.5, 0.5), (-3.5, 0.57)]);
        assert_eq!(l.len(), 2);
    }

    #[test]
    #[should_panic(expected = "do not sum to 1")]
    fn test_distribution_invariant_panics() {
        OutcomeDistribution::new(0.5, 0.2, 0.5, true, false);
    }

    #[test]
    fn test_distribution_uncertainty() {
        let exact = OutcomeDistribution::new(0.53, 0.0, 0.47, false, false);
        let whole = OutcomeDistribution::new(0.50, 0.06, 0.44, true, false);
        assert!(!exact.is_uncertain());
        assert!(whole.is_uncertain());
    }
}
