//! Order execution collaborator and the bet lifecycle manager.

pub mod lifecycle;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::domain::OrderSide;
use crate::error::{Result, TipoffError};

pub use lifecycle::BetLifecycle;

/// One order handed to the execution collaborator
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmission {
    pub token_id: String,
    pub price: Decimal,
    /// Share count: bet amount divided by price
    pub size: Decimal,
    pub side: OrderSide,
}

/// Submission acknowledgement
#[derive(Debug, Clone)]
pub struct OrderAck {
    pub order_id: String,
    pub status: String,
}

/// Execution collaborator: called exactly once per placement attempt
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn submit(&self, order: &OrderSubmission) -> Result<OrderAck>;
}

#[derive(Debug, Deserialize)]
struct PlaceOrderResponse {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// HTTP execution client against the trading service.
///
/// In dry-run mode no request is sent; a synthetic order id is returned so
/// the rest of the lifecycle still runs.
pub struct HttpExecutionClient {
    http: Client,
    base_url: String,
    dry_run: bool,
}

impl HttpExecutionClient {
    pub fn new(base_url: &str, dry_run: bool) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TipoffError::Internal(format!("failed to build execution HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            dry_run,
        })
    }
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    async fn submit(&self, order: &OrderSubmission) -> Result<OrderAck> {
        if self.dry_run {
            warn!(
                "DRY RUN: would submit {} {} shares of {} @ {}",
                order.side, order.size, order.token_id, order.price
            );
            return Ok(OrderAck {
                order_id: format!("dry-run-{}", Uuid::new_v4()),
                status: "placed".to_string(),
            });
        }

        let url = format!("{}/api/trading/place", self.base_url);
        let response = self.http.post(&url).json(order).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<PlaceOrderResponse>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(TipoffError::OrderSubmission(format!(
                "order rejected ({status}): {detail}"
            )));
        }

        let body: PlaceOrderResponse = response.json().await?;
        Ok(OrderAck {
            order_id: body.order_id.unwrap_or_else(|| "unknown".to_string()),
            status: body.status.unwrap_or_else(|| "placed".to_string()),
        })
    }
}
