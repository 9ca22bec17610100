//! Dynamic edge thresholds
//!
//! Spread alerts start from a floor and require more edge when the
//! probability was inferred (a push estimate or an interpolated ladder
//! value), and more again when that happens near a key number.

use crate::ladder::OutcomeDistribution;

/// Edge requirements for spread and moneyline alerts
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdPolicy {
    /// Floor for spread alerts
    pub min_edge: f64,
    /// Added for whole-number or interpolated distributions
    pub uncertainty_bump: f64,
    /// Added on top when an uncertain line sits near a key number
    pub key_number_bump: f64,
    /// Margins that land disproportionately often
    pub key_numbers: Vec<f64>,
    /// Distance from a key number that counts as "near"
    pub key_number_tolerance: f64,
    /// Fixed floor for moneyline alerts
    pub moneyline_min_edge: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            min_edge: 0.03,
            uncertainty_bump: 0.005,
            key_number_bump: 0.005,
            key_numbers: vec![3.0, 7.0],
            key_number_tolerance: 0.5,
            moneyline_min_edge: 0.03,
        }
    }
}

impl ThresholdPolicy {
    /// Edge a spread side must reach at `line`
    pub fn spread_threshold(&self, dist: &OutcomeDistribution, line: f64) -> f64 {
        self.threshold_for(dist.whole, dist.interpolated, line)
    }

    /// Threshold from raw distribution flags
    pub fn threshold_for(&self, whole: bool, interpolated: bool, line: f64) -> f64 {
        let mut threshold = self.min_edge;
        if whole || interpolated {
            threshold += self.uncertainty_bump;
            if self.near_key_number(line) {
                threshold += self.key_number_bump;
            }
        }
        threshold
    }

    /// Edge a moneyline side must reach
    pub fn moneyline_threshold(&self) -> f64 {
        self.moneyline_min_edge
    }

    /// Whether `|line|` is within tolerance of a key number
    pub fn near_key_number(&self, line: f64) -> bool {
        let margin = line.abs();
        self.key_numbers
            .iter()
            .any(|key| (margin - key).abs() <= self.key_number_tolerance + 1e-9)
    }
}
