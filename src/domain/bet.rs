//! Bet records, the lifecycle state machine, and user strategy policy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side sent to the execution collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bet lifecycle status.
///
/// `pending → {placed, failed}`, `placed → {filled, cancelled}`,
/// `filled → settled`. `settled`, `failed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Placed,
    Filled,
    Cancelled,
    Settled,
    Failed,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Placed => "placed",
            BetStatus::Filled => "filled",
            BetStatus::Cancelled => "cancelled",
            BetStatus::Settled => "settled",
            BetStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BetStatus::Settled | BetStatus::Failed | BetStatus::Cancelled
        )
    }

    /// Transition table for the lifecycle manager
    pub fn can_transition_to(&self, next: BetStatus) -> bool {
        matches!(
            (self, next),
            (BetStatus::Pending, BetStatus::Placed)
                | (BetStatus::Pending, BetStatus::Failed)
                | (BetStatus::Placed, BetStatus::Filled)
                | (BetStatus::Placed, BetStatus::Cancelled)
                | (BetStatus::Filled, BetStatus::Settled)
        )
    }

    /// Counted toward the daily budget
    pub fn consumes_budget(&self) -> bool {
        matches!(self, BetStatus::Placed | BetStatus::Filled)
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BetStatus::Pending),
            "placed" => Ok(BetStatus::Placed),
            "filled" => Ok(BetStatus::Filled),
            "cancelled" => Ok(BetStatus::Cancelled),
            "settled" => Ok(BetStatus::Settled),
            "failed" => Ok(BetStatus::Failed),
            other => Err(format!("unknown bet status: {other}")),
        }
    }
}

/// Placement request handed to the lifecycle manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRequest {
    pub analysis_id: Uuid,
    pub token_id: String,
    pub side: OrderSide,
    pub outcome: String,
    pub amount: Decimal,
    pub price: Decimal,
}

/// Persisted bet record; created `pending`, mutated only by the lifecycle
/// manager, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: Uuid,
    pub user_id: String,
    pub analysis_id: Uuid,
    pub token_id: String,
    pub side: OrderSide,
    pub outcome: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub status: BetStatus,
    pub order_id: Option<String>,
    pub pnl: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Bet {
    /// Fresh pending record for one placement attempt
    pub fn new_pending(user_id: &str, request: &BetRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            analysis_id: request.analysis_id,
            token_id: request.token_id.clone(),
            side: request.side,
            outcome: request.outcome.clone(),
            amount: request.amount,
            price: request.price,
            status: BetStatus::Pending,
            order_id: None,
            pnl: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }
}

/// User-owned betting policy; read by the sizer, never mutated by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub is_active: bool,
    pub min_confidence: Decimal,
    pub max_bet_amount: Decimal,
    pub daily_budget: Decimal,
    pub auto_execute: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_contract() {
        use BetStatus::*;

        assert!(Pending.can_transition_to(Placed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Placed.can_transition_to(Filled));
        assert!(Placed.can_transition_to(Cancelled));
        assert!(Filled.can_transition_to(Settled));

        assert!(!Pending.can_transition_to(Filled));
        assert!(!Placed.can_transition_to(Settled));
        assert!(!Settled.can_transition_to(Placed));
        assert!(!Failed.can_transition_to(Placed));
        assert!(!Cancelled.can_transition_to(Filled));
    }

    #[test]
    fn terminal_states() {
        assert!(BetStatus::Settled.is_terminal());
        assert!(BetStatus::Failed.is_terminal());
        assert!(BetStatus::Cancelled.is_terminal());
        assert!(!BetStatus::Pending.is_terminal());
        assert!(!BetStatus::Placed.is_terminal());
        assert!(!BetStatus::Filled.is_terminal());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BetStatus::Pending,
            BetStatus::Placed,
            BetStatus::Filled,
            BetStatus::Cancelled,
            BetStatus::Settled,
            BetStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<BetStatus>().unwrap(), status);
        }
    }
}
