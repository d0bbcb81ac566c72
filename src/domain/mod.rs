//! Domain types shared across the pipeline.

pub mod analysis;
pub mod bet;
pub mod market;
pub mod odds;
pub mod schedule;

pub use analysis::{
    AnalysisRecord, EdgeDecision, ForecastResult, GoalDifferenceAnalysis, MapAnalysis,
    Recommendation, TotalPointsAnalysis,
};
pub use bet::{Bet, BetRequest, BetStatus, OrderSide, StrategyConfig};
pub use market::{Category, Market, MarketEvent};
pub use odds::{ExtractedOdds, OddsSource, SeasonOdds};
pub use schedule::{GameInfo, HeadToHead, HeadToHeadGame, PlayerStats, TeamInfo, TeamStats};
