//! hardrock-ev: positive-EV NFL signal scanner for Hard Rock Sportsbook
//!
//! This library provides the core components for:
//! - American odds math and de-vigging
//! - Favorite spread ladders and whole-number push estimation
//! - Per-game signal evaluation with dynamic edge thresholds
//! - Fractional Kelly stake sizing
//! - Odds and reference feeds from The Odds API
//! - SQLite signal persistence and Discord notifications
//! - A polling tick driver with quota backoff

pub mod cli;
pub mod config;
pub mod feed;
pub mod ladder;
pub mod notify;
pub mod odds;
pub mod risk;
pub mod scheduler;
pub mod signal;
pub mod store;
pub mod telemetry;
