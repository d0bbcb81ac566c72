//! Forecaster collaborator: structured match facts in, probabilities out.

pub mod chat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Category, ExtractedOdds, ForecastResult, HeadToHead, PlayerStats, TeamStats,
};
use crate::error::Result;

pub use chat::ChatForecaster;

/// Rich basketball context fetched from the schedule provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketballFacts {
    pub home_stats: TeamStats,
    pub away_stats: TeamStats,
    pub home_players: Vec<PlayerStats>,
    pub away_players: Vec<PlayerStats>,
    pub head_to_head: HeadToHead,
}

/// Everything the forecaster sees for one fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFacts {
    pub category: Category,
    pub home_team: String,
    pub away_team: String,
    pub match_date: String,
    pub event_title: String,
    /// Market-implied probabilities, shown to the model as context
    pub odds: ExtractedOdds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basketball: Option<BasketballFacts>,
}

/// Opaque forecasting model.
///
/// Implementations must return probabilities in [0, 1]; the pipeline does
/// not revalidate them.
#[async_trait]
pub trait Forecaster: Send + Sync {
    async fn forecast(&self, facts: &ForecastFacts) -> Result<ForecastResult>;
}
