//! Decision layer: edge calculation, bet sizing, and scan orchestration.

pub mod edge;
pub mod engine;
pub mod sizing;

pub use edge::{decide, edge, MarketProbabilities};
pub use engine::{AutoExecuteReport, ScanEngine, ScanOutcome};
pub use sizing::{bet_amount, should_bet, KELLY_FRACTION_CAP};
