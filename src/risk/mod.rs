//! Risk management module
//!
//! Stake sizing for qualified signals

mod kelly;

pub use kelly::KellyCalculator;
