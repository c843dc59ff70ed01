use crate::error::GatewayError;
use crate::types::{Action, MarketSnapshot, Prediction};
use anyhow::Result;
use async_trait::async_trait;

/// Market data collaborator: latest bar and recent history per symbol.
///
/// Implementations (exchange clients, time-series stores) live outside the
/// decision core; the orchestrator only depends on this contract.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// The most recent snapshot for `symbol`, or `None` when no data exists.
    async fn latest_snapshot(&self, symbol: &str) -> Result<Option<MarketSnapshot>>;

    /// Up to `window` most recent snapshots for `symbol`, ordered oldest
    /// first (newest last).
    async fn history(&self, symbol: &str, window: usize) -> Result<Vec<MarketSnapshot>>;
}

/// Price-movement predictor.
///
/// Must never fail outward: on missing model, insufficient history, or any
/// internal error the implementation returns `Prediction::neutral`. The
/// production model is substituted here without touching any caller.
pub trait Predictor: Send + Sync {
    fn predict(&self, symbol: &str, history: &[MarketSnapshot]) -> Prediction;
}

/// Live order placement collaborator (the exchange trade API).
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Places an order and returns the broker-assigned order id.
    async fn place_order(
        &self,
        symbol: &str,
        action: Action,
        amount: f64,
    ) -> Result<String, GatewayError>;

    /// Cancels a previously placed order.
    async fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError>;
}
