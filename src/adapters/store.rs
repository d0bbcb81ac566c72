//! Record store for bets, analyses and strategies.
//!
//! The trait is the seam the lifecycle manager and scan engine depend on;
//! `PostgresStore` is the production implementation, `MemoryStore` backs
//! dry-run mode and tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{AnalysisRecord, Bet, BetStatus, OrderSide, Recommendation, StrategyConfig};
use crate::error::{Result, TipoffError};

/// Create/read/update operations used by the pipeline
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_bet(&self, bet: &Bet) -> Result<()>;
    async fn get_bet(&self, id: Uuid) -> Result<Option<Bet>>;
    /// Record a successful submission: order id + `placed`
    async fn update_bet_placed(&self, id: Uuid, order_id: &str) -> Result<()>;
    async fn update_bet_status(&self, id: Uuid, status: BetStatus) -> Result<()>;
    /// Apply a settlement status with optional P/L and settle timestamp
    async fn update_bet_settlement(
        &self,
        id: Uuid,
        status: BetStatus,
        pnl: Option<Decimal>,
        settled_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
    /// Sum of budget-consuming bet amounts created on `day` for the user
    async fn daily_spent(&self, user_id: &str, day: NaiveDate) -> Result<Decimal>;

    async fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<()>;
    async fn latest_analysis_for_market(&self, market_id: &str) -> Result<Option<AnalysisRecord>>;

    async fn create_strategy(&self, strategy: &StrategyConfig) -> Result<()>;
    /// Active auto-execute strategies for a user
    async fn active_auto_strategies(&self, user_id: &str) -> Result<Vec<StrategyConfig>>;
}

// ==================== PostgreSQL ====================

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    fn bet_from_row(row: &sqlx::postgres::PgRow) -> Result<Bet> {
        let side: String = row.get("side");
        let status: String = row.get("status");
        Ok(Bet {
            id: row.get("id"),
            user_id: row.get("user_id"),
            analysis_id: row.get("analysis_id"),
            token_id: row.get("token_id"),
            side: match side.as_str() {
                "SELL" => OrderSide::Sell,
                _ => OrderSide::Buy,
            },
            outcome: row.get("outcome"),
            amount: row.get("amount"),
            price: row.get("price"),
            status: BetStatus::from_str(&status)
                .map_err(TipoffError::Internal)?,
            order_id: row.get("order_id"),
            pnl: row.get("pnl"),
            created_at: row.get("created_at"),
            settled_at: row.get("settled_at"),
        })
    }

    fn analysis_from_row(row: &sqlx::postgres::PgRow) -> Result<AnalysisRecord> {
        let side: String = row.get("recommended_side");
        Ok(AnalysisRecord {
            id: row.get("id"),
            market_id: row.get("market_id"),
            condition_id: row.get("condition_id"),
            category: row.get("category"),
            home_team: row.get("home_team"),
            away_team: row.get("away_team"),
            game_date: row.get("game_date"),
            home_win_prob: row.get("home_win_prob"),
            away_win_prob: row.get("away_win_prob"),
            draw_prob: row.get("draw_prob"),
            confidence: row.get("confidence"),
            reasoning: row.get("reasoning"),
            market_price: row.get("market_price"),
            edge_percent: row.get("edge_percent"),
            recommended_side: Recommendation::from_str(&side)
                .map_err(TipoffError::Internal)?,
            token_id: row.get("token_id"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    #[instrument(skip(self, bet))]
    async fn create_bet(&self, bet: &Bet) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bets (id, user_id, analysis_id, token_id, side, outcome,
                              amount, price, status, order_id, pnl, created_at, settled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(bet.id)
        .bind(&bet.user_id)
        .bind(bet.analysis_id)
        .bind(&bet.token_id)
        .bind(bet.side.as_str())
        .bind(&bet.outcome)
        .bind(bet.amount)
        .bind(bet.price)
        .bind(bet.status.as_str())
        .bind(&bet.order_id)
        .bind(bet.pnl)
        .bind(bet.created_at)
        .bind(bet.settled_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_bet(&self, id: Uuid) -> Result<Option<Bet>> {
        let row = sqlx::query("SELECT * FROM bets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::bet_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn update_bet_placed(&self, id: Uuid, order_id: &str) -> Result<()> {
        sqlx::query("UPDATE bets SET status = 'placed', order_id = $2 WHERE id = $1")
            .bind(id)
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_bet_status(&self, id: Uuid, status: BetStatus) -> Result<()> {
        sqlx::query("UPDATE bets SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_bet_settlement(
        &self,
        id: Uuid,
        status: BetStatus,
        pnl: Option<Decimal>,
        settled_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE bets SET status = $2, pnl = COALESCE($3, pnl), settled_at = COALESCE($4, settled_at) WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(pnl)
        .bind(settled_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn daily_spent(&self, user_id: &str, day: NaiveDate) -> Result<Decimal> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount), 0) AS spent
            FROM bets
            WHERE user_id = $1
              AND created_at >= $2
              AND created_at < $2 + INTERVAL '1 day'
              AND status IN ('placed', 'filled')
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("spent"))
    }

    #[instrument(skip(self, analysis))]
    async fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analyses (id, market_id, condition_id, category, home_team, away_team,
                                  game_date, home_win_prob, away_win_prob, draw_prob, confidence,
                                  reasoning, market_price, edge_percent, recommended_side,
                                  token_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(analysis.id)
        .bind(&analysis.market_id)
        .bind(&analysis.condition_id)
        .bind(&analysis.category)
        .bind(&analysis.home_team)
        .bind(&analysis.away_team)
        .bind(&analysis.game_date)
        .bind(analysis.home_win_prob)
        .bind(analysis.away_win_prob)
        .bind(analysis.draw_prob)
        .bind(analysis.confidence)
        .bind(&analysis.reasoning)
        .bind(analysis.market_price)
        .bind(analysis.edge_percent)
        .bind(analysis.recommended_side.as_str())
        .bind(&analysis.token_id)
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_analysis_for_market(&self, market_id: &str) -> Result<Option<AnalysisRecord>> {
        let row = sqlx::query(
            "SELECT * FROM analyses WHERE market_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(market_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::analysis_from_row).transpose()
    }

    #[instrument(skip(self, strategy))]
    async fn create_strategy(&self, strategy: &StrategyConfig) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO strategies (id, user_id, name, is_active, min_confidence,
                                    max_bet_amount, daily_budget, auto_execute)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(strategy.id)
        .bind(&strategy.user_id)
        .bind(&strategy.name)
        .bind(strategy.is_active)
        .bind(strategy.min_confidence)
        .bind(strategy.max_bet_amount)
        .bind(strategy.daily_budget)
        .bind(strategy.auto_execute)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn active_auto_strategies(&self, user_id: &str) -> Result<Vec<StrategyConfig>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, is_active, min_confidence,
                   max_bet_amount, daily_budget, auto_execute
            FROM strategies
            WHERE user_id = $1 AND is_active AND auto_execute
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| StrategyConfig {
                id: row.get("id"),
                user_id: row.get("user_id"),
                name: row.get("name"),
                is_active: row.get("is_active"),
                min_confidence: row.get("min_confidence"),
                max_bet_amount: row.get("max_bet_amount"),
                daily_budget: row.get("daily_budget"),
                auto_execute: row.get("auto_execute"),
            })
            .collect())
    }
}

// ==================== In-memory ====================

#[derive(Default)]
struct MemoryInner {
    bets: HashMap<Uuid, Bet>,
    analyses: Vec<AnalysisRecord>,
    strategies: HashMap<Uuid, StrategyConfig>,
}

/// In-memory store for dry-run mode and tests
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All bets, newest first (test/inspection helper)
    pub async fn bets(&self) -> Vec<Bet> {
        let inner = self.inner.read().await;
        let mut bets: Vec<Bet> = inner.bets.values().cloned().collect();
        bets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bets
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_bet(&self, bet: &Bet) -> Result<()> {
        self.inner.write().await.bets.insert(bet.id, bet.clone());
        Ok(())
    }

    async fn get_bet(&self, id: Uuid) -> Result<Option<Bet>> {
        Ok(self.inner.read().await.bets.get(&id).cloned())
    }

    async fn update_bet_placed(&self, id: Uuid, order_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let bet = inner
            .bets
            .get_mut(&id)
            .ok_or_else(|| TipoffError::BetNotFound(id.to_string()))?;
        bet.status = BetStatus::Placed;
        bet.order_id = Some(order_id.to_string());
        Ok(())
    }

    async fn update_bet_status(&self, id: Uuid, status: BetStatus) -> Result<()> {
        let mut inner = self.inner.write().await;
        let bet = inner
            .bets
            .get_mut(&id)
            .ok_or_else(|| TipoffError::BetNotFound(id.to_string()))?;
        bet.status = status;
        Ok(())
    }

    async fn update_bet_settlement(
        &self,
        id: Uuid,
        status: BetStatus,
        pnl: Option<Decimal>,
        settled_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        let bet = inner
            .bets
            .get_mut(&id)
            .ok_or_else(|| TipoffError::BetNotFound(id.to_string()))?;
        bet.status = status;
        if pnl.is_some() {
            bet.pnl = pnl;
        }
        if settled_at.is_some() {
            bet.settled_at = settled_at;
        }
        Ok(())
    }

    async fn daily_spent(&self, user_id: &str, day: NaiveDate) -> Result<Decimal> {
        let inner = self.inner.read().await;
        Ok(inner
            .bets
            .values()
            .filter(|bet| {
                bet.user_id == user_id
                    && bet.created_at.date_naive() == day
                    && bet.status.consumes_budget()
            })
            .map(|bet| bet.amount)
            .sum())
    }

    async fn create_analysis(&self, analysis: &AnalysisRecord) -> Result<()> {
        self.inner.write().await.analyses.push(analysis.clone());
        Ok(())
    }

    async fn latest_analysis_for_market(&self, market_id: &str) -> Result<Option<AnalysisRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .analyses
            .iter()
            .filter(|analysis| analysis.market_id == market_id)
            .max_by_key(|analysis| analysis.created_at)
            .cloned())
    }

    async fn create_strategy(&self, strategy: &StrategyConfig) -> Result<()> {
        self.inner
            .write()
            .await
            .strategies
            .insert(strategy.id, strategy.clone());
        Ok(())
    }

    async fn active_auto_strategies(&self, user_id: &str) -> Result<Vec<StrategyConfig>> {
        let inner = self.inner.read().await;
        let mut strategies: Vec<StrategyConfig> = inner
            .strategies
            .values()
            .filter(|s| s.user_id == user_id && s.is_active && s.auto_execute)
            .cloned()
            .collect();
        strategies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(strategies)
    }
}
