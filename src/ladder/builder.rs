//! Ladder construction from reference spread quotes

use super::{FavoriteLadder, KEY_EPSILON};
use crate::odds::{devig, implied_probability, AmericanOdds};
use std::collections::BTreeMap;

/// One outcome row of a spread market
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadRow {
    /// Team the row applies to
    pub team: String,
    /// Spread for that team (negative = laying points)
    pub point: f64,
    /// American price for the row
    pub price: AmericanOdds,
}

impl SpreadRow {
    pub fn new(team: impl Into<String>, point: f64, price: AmericanOdds) -> Self {
        Self {
            team: team.into(),
            point,
            price,
        }
    }
}

impl FavoriteLadder {
    /// Build a ladder from spread rows, main and alternate lines alike
    ///
    /// Each line pair (favorite at `-x`, underdog at `+x`) is devigged and
    /// recorded as `ladder[-x] = p_favorite_covers`. Only pairs where the
    /// game's favorite lays the points are used, so alternate lines that
    /// flip the underdog to a small negative number are ignored.
    pub fn from_quotes(rows: &[SpreadRow]) -> Self {
        let Some(favorite) = favorite_team(rows) else {
            return Self::default();
        };

        let entries = rows
            .iter()
            .filter(|row| row.team == favorite && row.point < 0.0)
            .filter_map(|fav| {
                let dog = rows.iter().find(|row| {
                    row.team != fav.team && (row.point + fav.point).abs() < KEY_EPSILON
                })?;
                let (p_fav, _) = devig(
                    implied_probability(fav.price),
                    implied_probability(dog.price),
                );
                Some((fav.point, p_fav))
            });

        Self::from_entries(entries)
    }
}

/// Team quoted with negative points most often
///
/// Ties go to the team laying the smallest number, which is the main line.
/// When both teams lay that same number as often, the priced favorite wins:
/// the team with the higher devigged cover probability at that line.
fn favorite_team(rows: &[SpreadRow]) -> Option<&str> {
    let mut counts: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.point < 0.0) {
        let entry = counts.entry(row.team.as_str()).or_insert((0, f64::INFINITY));
        entry.0 += 1;
        entry.1 = entry.1.min(row.point.abs());
    }

    let (best_count, best_min) = counts
        .values()
        .copied()
        .max_by(|(count_a, min_a), (count_b, min_b)| {
            count_a.cmp(count_b).then(min_b.total_cmp(min_a))
        })?;

    counts
        .iter()
        .filter(|(_, (count, min))| *count == best_count && (min - best_min).abs() < KEY_EPSILON)
        .map(|(team, _)| (*team, cover_probability(rows, team, best_min)))
        .reduce(|best, next| if next.1 > best.1 { next } else { best })
        .map(|(team, _)| team)
}

/// Devigged probability that `team` covers while laying `points`
///
/// Zero when the line has no opposing row to pair with.
fn cover_probability(rows: &[SpreadRow], team: &str, points: f64) -> f64 {
    let laid = rows
        .iter()
        .find(|row| row.team == team && (row.point + points).abs() < KEY_EPSILON);
    let taken = rows
        .iter()
        .find(|row| row.team != team && (row.point - points).abs() < KEY_EPSILON);
    match (laid, taken) {
        (Some(laid), Some(taken)) => {
            devig(implied_probability(laid.price), implied_probability(taken.price)).0
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team: &str, point: f64, price: i32) -> SpreadRow {
        SpreadRow::new(team, point, AmericanOdds::new(price).unwrap())
    }

    #[test]
    fn test_main_line_pair() {
        let rows = vec![row("KC", -2.5, -110), row("BUF", 2.5, -110)];
        let ladder = FavoriteLadder::from_quotes(&rows);
        assert_eq!(ladder.len(), 1);
        assert!((ladder.get(-2.5).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_alternate_lines_become_entries() {
        let rows = vec![
            row("DAL", -2.5, -140),
            row("NYG", 2.5, 120),
            row("DAL", -3.5, -105),
            row("NYG", 3.5, -115),
            row("DAL", -6.5, 150),
            row("NYG", 6.5, -170),
            row("DAL", -7.5, 175),
            row("NYG", 7.5, -205),
        ];
        let ladder = FavoriteLadder::from_quotes(&rows);
        let keys: Vec<f64> = ladder.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![-7.5, -6.5, -3.5, -2.5]);

        // Cover probability falls as the favorite lays more points
        let probs: Vec<f64> = ladder.iter().map(|(_, p)| p).collect();
        assert!(probs.windows(2).all(|w| w[0] < w[1]));

        let p_fav = implied_probability(AmericanOdds::new(-105).unwrap());
        let p_dog = implied_probability(AmericanOdds::new(-115).unwrap());
        let expected = p_fav / (p_fav + p_dog);
        assert!((ladder.get(-3.5).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_underdog_alt_lines_are_ignored() {
        let rows = vec![
            row("SF", -6.5, -110),
            row("ARI", 6.5, -110),
            row("SF", -9.5, 140),
            row("ARI", 9.5, -160),
            row("ARI", -1.5, 400),
            row("SF", 1.5, -600),
        ];
        let ladder = FavoriteLadder::from_quotes(&rows);
        assert_eq!(ladder.len(), 2);
        assert!(ladder.get(-1.5).is_none());
    }

    #[test]
    fn test_unpaired_rows_and_empty_input() {
        let rows = vec![row("LV", -4.5, -110), row("DEN", 3.5, -110)];
        assert!(FavoriteLadder::from_quotes(&rows).is_empty());
        assert!(FavoriteLadder::from_quotes(&[]).is_empty());
    }

    #[test]
    fn test_pick_em_has_no_favorite() {
        let rows = vec![row("LV", 0.0, -110), row("DEN", 0.0, -110)];
        assert!(FavoriteLadder::from_quotes(&rows).is_empty());
    }

    #[test]
    fn test_symmetric_alternates_pick_priced_favorite() {
        let rows = vec![
            row("A", -1.5, -150),
            row("B", 1.5, 130),
            row("A", 1.5, -400),
            row("B", -1.5, 320),
        ];
        let p_a = implied_probability(AmericanOdds::new(-150).unwrap());
        let p_b = implied_probability(AmericanOdds::new(130).unwrap());
        let expected = p_a / (p_a + p_b);

        assert_eq!(favorite_team(&rows), Some("A"));
        for _ in 0..50 {
            let ladder = FavoriteLadder::from_quotes(&rows);
            assert_eq!(ladder.len(), 1);
            assert!((ladder.get(-1.5).unwrap() - expected).abs() < 1e-9);
        }

        // Row order does not change the pick
        let reversed: Vec<SpreadRow> = rows.iter().rev().cloned().collect();
        assert_eq!(favorite_team(&reversed), Some("A"));
        assert!((FavoriteLadder::from_quotes(&reversed).get(-1.5).unwrap() - expected).abs() < 1e-9);
    }
}
