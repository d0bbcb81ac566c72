pub mod adapters;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod execution;
pub mod forecast;
pub mod matching;
pub mod odds;
pub mod strategy;

pub use adapters::{GammaClient, MemoryStore, PostgresStore, RecordStore, ScheduleClient};
pub use cache::{Clock, SystemClock, TtlCache};
pub use config::AppConfig;
pub use error::{Result, TipoffError};
pub use execution::{BetLifecycle, ExecutionClient, HttpExecutionClient};
pub use forecast::{ChatForecaster, Forecaster};
pub use strategy::{AutoExecuteReport, ScanEngine, ScanOutcome};
