use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tradecycle_core::types::Order;
use tradecycle_orchestrator::{CycleOrchestrator, CycleSummary};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: i64,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub daily_loss: f64,
    pub open_positions: i64,
    pub executed_orders: usize,
    pub timestamp: i64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub paper_trading: bool,
    pub portfolio_value: f64,
    pub daily_loss: f64,
    pub open_positions: i64,
    pub executed_orders: usize,
    pub timestamp: i64,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

const fn default_limit() -> usize {
    50
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub orders: Vec<Order>,
    /// Full order count, not the page length, so clients can page.
    pub total: usize,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// Risk and execution counters for the monitoring layer.
pub async fn metrics(State(orch): State<Arc<CycleOrchestrator>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        daily_loss: orch.current_daily_loss(),
        open_positions: orch.open_position_count(),
        executed_orders: orch.executed_order_count(),
        timestamp: Utc::now().timestamp_millis(),
    })
}

pub async fn status(State(orch): State<Arc<CycleOrchestrator>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: orch.config().trading.enabled,
        paper_trading: orch.config().trading.paper_trading,
        portfolio_value: orch.portfolio_value().await,
        daily_loss: orch.current_daily_loss(),
        open_positions: orch.open_position_count(),
        executed_orders: orch.executed_order_count(),
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// A page of the order history, newest first.
pub async fn trading_history(
    State(orch): State<Arc<CycleOrchestrator>>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    let orders = orch.trading_history(params.limit, params.offset);
    let total = orch.order_count();
    Json(HistoryResponse { orders, total })
}

/// Manually triggers one full trading cycle outside the scheduler.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` if the cycle itself fails at
/// the top level (per-symbol errors are absorbed inside the cycle).
pub async fn run_cycle(
    State(orch): State<Arc<CycleOrchestrator>>,
) -> Result<Json<CycleSummary>, StatusCode> {
    let summary = orch.run_cycle_once().await.map_err(|err| {
        tracing::error!(error = %err, "manual cycle trigger failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(summary))
}
