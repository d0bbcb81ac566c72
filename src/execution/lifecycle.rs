//! Bet lifecycle manager.
//!
//! Exactly one create + at most one update per placement attempt. The
//! pending record is durable before the execution call goes out, so a crash
//! mid-placement leaves a reconcilable `pending` record, never a lost bet.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::RecordStore;
use crate::domain::{Bet, BetRequest, BetStatus};
use crate::error::{Result, TipoffError};
use crate::execution::{ExecutionClient, OrderSubmission};

/// Outcome of a successful placement
#[derive(Debug, Clone)]
pub struct PlacedBet {
    pub bet_id: Uuid,
    pub order_id: String,
    pub status: BetStatus,
}

/// Owns every bet-status mutation
pub struct BetLifecycle {
    store: Arc<dyn RecordStore>,
    executor: Arc<dyn ExecutionClient>,
}

impl BetLifecycle {
    pub fn new(store: Arc<dyn RecordStore>, executor: Arc<dyn ExecutionClient>) -> Self {
        Self { store, executor }
    }

    /// Create a pending bet, submit it, and transition to `placed`/`failed`.
    ///
    /// Submission failures are propagated after the bet is marked `failed` -
    /// money is at stake, so this path never swallows errors. No automatic
    /// retry: a caller retry is a new placement attempt with a new record.
    pub async fn place_bet(&self, user_id: &str, request: BetRequest) -> Result<PlacedBet> {
        if request.price <= Decimal::ZERO {
            return Err(TipoffError::Validation(format!(
                "bet price must be positive, got {}",
                request.price
            )));
        }
        if request.amount <= Decimal::ZERO {
            return Err(TipoffError::Validation(format!(
                "bet amount must be positive, got {}",
                request.amount
            )));
        }

        let bet = Bet::new_pending(user_id, &request);
        self.store.create_bet(&bet).await?;

        let order = OrderSubmission {
            token_id: request.token_id.clone(),
            price: request.price,
            size: request.amount / request.price,
            side: request.side,
        };

        match self.executor.submit(&order).await {
            Ok(ack) => {
                self.store.update_bet_placed(bet.id, &ack.order_id).await?;
                info!(
                    "bet {} placed: order {} ({} @ {})",
                    bet.id, ack.order_id, request.amount, request.price
                );
                Ok(PlacedBet {
                    bet_id: bet.id,
                    order_id: ack.order_id,
                    status: BetStatus::Placed,
                })
            }
            Err(submit_err) => {
                if let Err(mark_err) = self
                    .store
                    .update_bet_status(bet.id, BetStatus::Failed)
                    .await
                {
                    // The original submission error is the one the caller
                    // must see; the store failure is secondary
                    error!("bet {}: failed to mark as failed: {mark_err}", bet.id);
                }
                warn!("bet {} submission failed: {submit_err}", bet.id);
                Err(submit_err)
            }
        }
    }

    /// Apply an externally driven settlement transition.
    ///
    /// Re-applying the bet's current status is a no-op; transitions outside
    /// the lifecycle contract are rejected.
    pub async fn apply_settlement(
        &self,
        bet_id: Uuid,
        status: BetStatus,
        pnl: Option<Decimal>,
    ) -> Result<()> {
        let bet = self
            .store
            .get_bet(bet_id)
            .await?
            .ok_or_else(|| TipoffError::BetNotFound(bet_id.to_string()))?;

        if bet.status == status {
            info!("bet {bet_id} already {status}; settlement is a no-op");
            return Ok(());
        }
        if !bet.status.can_transition_to(status) {
            return Err(TipoffError::InvalidStateTransition {
                from: bet.status.to_string(),
                to: status.to_string(),
            });
        }

        let settled_at = status.is_terminal().then(Utc::now);
        self.store
            .update_bet_settlement(bet_id, status, pnl, settled_at)
            .await?;
        info!("bet {bet_id}: {} -> {status}", bet.status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::OrderSide;
    use crate::execution::OrderAck;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedExecutor {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExecutionClient for ScriptedExecutor {
        async fn submit(&self, _order: &OrderSubmission) -> Result<OrderAck> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TipoffError::OrderSubmission("rejected".to_string()))
            } else {
                Ok(OrderAck {
                    order_id: "ord-1".to_string(),
                    status: "placed".to_string(),
                })
            }
        }
    }

    fn request() -> BetRequest {
        BetRequest {
            analysis_id: Uuid::new_v4(),
            token_id: "tok".to_string(),
            side: OrderSide::Buy,
            outcome: "YES".to_string(),
            amount: dec!(5),
            price: dec!(0.50),
        }
    }

    #[tokio::test]
    async fn successful_placement_creates_one_placed_bet() {
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(ScriptedExecutor {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let lifecycle = BetLifecycle::new(store.clone(), executor.clone());

        let placed = lifecycle.place_bet("user-1", request()).await.unwrap();
        assert_eq!(placed.order_id, "ord-1");
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        let bets = store.bets().await;
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].status, BetStatus::Placed);
        assert_eq!(bets[0].order_id.as_deref(), Some("ord-1"));
    }

    #[tokio::test]
    async fn failed_submission_leaves_exactly_one_failed_bet_and_propagates() {
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(ScriptedExecutor {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let lifecycle = BetLifecycle::new(store.clone(), executor);

        let result = lifecycle.place_bet("user-1", request()).await;
        assert!(matches!(result, Err(TipoffError::OrderSubmission(_))));

        let bets = store.bets().await;
        assert_eq!(bets.len(), 1, "never zero, never two");
        assert_eq!(bets[0].status, BetStatus::Failed);
        assert_eq!(bets[0].order_id, None);
    }

    #[tokio::test]
    async fn settlement_transitions_and_idempotence() {
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(ScriptedExecutor {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let lifecycle = BetLifecycle::new(store.clone(), executor);

        let placed = lifecycle.place_bet("user-1", request()).await.unwrap();

        lifecycle
            .apply_settlement(placed.bet_id, BetStatus::Filled, None)
            .await
            .unwrap();
        lifecycle
            .apply_settlement(placed.bet_id, BetStatus::Settled, Some(dec!(2.40)))
            .await
            .unwrap();

        // re-applying the terminal state is a no-op, not an error
        lifecycle
            .apply_settlement(placed.bet_id, BetStatus::Settled, Some(dec!(2.40)))
            .await
            .unwrap();

        let bet = store.get_bet(placed.bet_id).await.unwrap().unwrap();
        assert_eq!(bet.status, BetStatus::Settled);
        assert_eq!(bet.pnl, Some(dec!(2.40)));
        assert!(bet.settled_at.is_some());

        // settled bets cannot move again
        let err = lifecycle
            .apply_settlement(placed.bet_id, BetStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TipoffError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn nonpositive_price_is_rejected_before_any_record() {
        let store = Arc::new(MemoryStore::new());
        let executor = Arc::new(ScriptedExecutor {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let lifecycle = BetLifecycle::new(store.clone(), executor);

        let mut bad = request();
        bad.price = Decimal::ZERO;
        assert!(lifecycle.place_bet("user-1", bad).await.is_err());
        assert!(store.bets().await.is_empty());
    }
}
