//! Normalized prediction-market records.
//!
//! The Gamma adapter decodes the provider's raw payloads (including the
//! JSON-encoded string fields) into these shapes; nothing downstream touches
//! provider quirks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basketball,
    Football,
    Esports,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Basketball => "basketball",
            Category::Football => "football",
            Category::Esports => "esports",
        }
    }

    /// Whether this category supports a three-way (draw) result
    pub fn has_draw(&self) -> bool {
        matches!(self, Category::Football)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basketball" | "nba" => Ok(Category::Basketball),
            "football" | "soccer" => Ok(Category::Football),
            "esports" => Ok(Category::Esports),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// One market inside an event: a question with its outcome set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub question: String,
    /// Short per-outcome label on grouped futures markets (e.g. a team name)
    #[serde(default)]
    pub group_item_title: Option<String>,
    /// Outcome labels, parallel to `outcome_prices`
    pub outcomes: Vec<String>,
    /// Implied probabilities in [0, 1], parallel to `outcomes`
    pub outcome_prices: Vec<Decimal>,
    /// CLOB token ids, parallel to `outcomes` when the provider supplies them
    #[serde(default)]
    pub clob_token_ids: Vec<String>,
    pub active: bool,
    pub closed: bool,
}

impl Market {
    /// Binary market with a full outcome/price pairing
    pub fn is_two_way(&self) -> bool {
        self.outcomes.len() == 2 && self.outcome_prices.len() == 2
    }

    /// Literal Yes/No outcome labels (in that order)
    pub fn is_yes_no(&self) -> bool {
        self.outcomes.len() == 2
            && self.outcomes[0].eq_ignore_ascii_case("yes")
            && self.outcomes[1].eq_ignore_ascii_case("no")
    }
}

/// A prediction-market event with its sub-markets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEvent {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Aggregate traded volume, used only for ordering
    pub volume: Decimal,
    pub liquidity: Decimal,
    /// Active, non-closed markets only; an event with none is discarded upstream
    pub markets: Vec<Market>,
    pub category: Category,
}

impl MarketEvent {
    pub fn market_url(&self) -> String {
        format!("https://polymarket.com/event/{}", self.slug)
    }

    /// Expired events carry no tradeable fixture
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        matches!(self.end_date, Some(end) if end < now)
    }
}
