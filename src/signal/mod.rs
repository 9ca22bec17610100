//! Signal generation module
//!
//! Prices every quoted side against the reference and keeps the +EV ones

mod engine;
mod threshold;
mod types;

pub use engine::{EngineConfig, Evaluation, SignalEngine, SkipReason};
pub use threshold::ThresholdPolicy;
pub use types::{pick_label, Alert, MarketKind};
