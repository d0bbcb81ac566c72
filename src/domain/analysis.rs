//! Forecast output and the edge decision derived from it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side recommended by the edge calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Home,
    Away,
    Draw,
    None,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Home => "home",
            Recommendation::Away => "away",
            Recommendation::Draw => "draw",
            Recommendation::None => "none",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "home" => Ok(Recommendation::Home),
            "away" => Ok(Recommendation::Away),
            "draw" => Ok(Recommendation::Draw),
            "none" => Ok(Recommendation::None),
            other => Err(format!("unknown recommendation: {other}")),
        }
    }
}

/// Predicted net goal differential (football)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDifferenceAnalysis {
    pub predicted_goal_diff: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_under_goals: Option<f64>,
}

/// Predicted map/game count (esports)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapAnalysis {
    pub predicted_maps: u32,
}

/// Predicted combined score against the posted line (basketball)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalPointsAnalysis {
    pub predicted_total: f64,
    pub over_probability: Decimal,
    pub under_probability: Decimal,
}

/// Opaque forecaster output for one fixture.
///
/// Probabilities are expected in [0, 1]; the pipeline does not revalidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub home_win_probability: Decimal,
    pub away_win_probability: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_probability: Option<Decimal>,
    pub confidence: Decimal,
    #[serde(default)]
    pub key_factors: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_difference_analysis: Option<GoalDifferenceAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_analysis: Option<MapAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points_analysis: Option<TotalPointsAnalysis>,
}

/// Pure output of the edge calculator for one fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDecision {
    pub side: Recommendation,
    /// Signed edge for the recommended side (or the best edge when `none`)
    pub edge_percent: Decimal,
    /// Forecast probability behind the recommendation, when one exists
    pub forecast_probability: Option<Decimal>,
    /// Market-implied probability behind the recommendation, when one exists
    pub market_probability: Option<Decimal>,
    pub home_edge: Option<Decimal>,
    pub away_edge: Option<Decimal>,
    pub draw_edge: Option<Decimal>,
}

/// Persisted join of fixture, forecast, market probability and decision.
///
/// This is the record bets reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub market_id: String,
    pub condition_id: String,
    pub category: String,
    pub home_team: String,
    pub away_team: String,
    pub game_date: String,
    pub home_win_prob: Decimal,
    pub away_win_prob: Decimal,
    pub draw_prob: Option<Decimal>,
    pub confidence: Decimal,
    /// Narrative payload: reasoning, key factors, line sub-analyses (JSON)
    pub reasoning: String,
    pub market_price: Option<Decimal>,
    pub edge_percent: Decimal,
    pub recommended_side: Recommendation,
    /// CLOB token for the recommended outcome, when the market exposed one
    pub token_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
