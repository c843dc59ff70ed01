use async_trait::async_trait;
use tradecycle_core::types::Action;
use tradecycle_core::{ExecutionGateway, GatewayError};

/// Gateway used when live trading is enabled but no exchange client has been
/// wired in (API credentials absent). Every call fails, which the dispatcher
/// turns into Failed order records rather than crashes.
pub struct UnconfiguredGateway;

#[async_trait]
impl ExecutionGateway for UnconfiguredGateway {
    async fn place_order(
        &self,
        _symbol: &str,
        _action: Action,
        _amount: f64,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured(
            "no exchange gateway configured; set trading.paper_trading or wire a live gateway",
        ))
    }

    async fn cancel_order(&self, _order_id: &str) -> Result<(), GatewayError> {
        Err(GatewayError::NotConfigured(
            "no exchange gateway configured",
        ))
    }
}
