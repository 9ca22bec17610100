//! Vig removal

/// Normalize a complementary probability pair so it sums to 1
///
/// The ratio between the two sides is preserved. A non-positive total can
/// only come from malformed upstream prices and yields `(0.5, 0.5)`.
pub fn devig(p1: f64, p2: f64) -> (f64, f64) {
    let total = p1 + p2;
    if total > 0.0 {
        (p1 / total, p2 / total)
    } else {
        (0.5, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odds::{implied_probability, AmericanOdds};

    #[test]
    fn test_devig_sums_to_one_and_keeps_ratio() {
        let pairs = [(0.55, 0.50), (0.5238, 0.5238), (0.9, 0.2), (0.01, 0.995)];
        for (p1, p2) in pairs {
            let (a, b) = devig(p1, p2);
            assert!((a + b - 1.0).abs() < 1e-9);
            assert!((a / b - p1 / p2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_devig_pinnacle_moneyline() {
        let home = implied_probability(AmericanOdds::new(-120).unwrap());
        let away = implied_probability(AmericanOdds::new(110).unwrap());
        let (h, a) = devig(home, away);
        assert!((h - 0.533_898_3).abs() < 1e-4);
        assert!((a - 0.466_101_7).abs() < 1e-4);
    }

    #[test]
    fn test_devig_degenerate_falls_back_to_even() {
        assert_eq!(devig(0.0, 0.0), (0.5, 0.5));
        assert_eq!(devig(-0.3, 0.1), (0.5, 0.5));
    }
}
