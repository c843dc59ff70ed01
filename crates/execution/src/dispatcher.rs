use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tradecycle_core::types::{Action, Decision, Order, OrderStatus};
use tradecycle_core::ExecutionGateway;

/// Routes an approved decision to a simulated fill or the live gateway.
///
/// Never errors past its boundary: every outcome, including gateway
/// failures, is represented as an `Order` record.
pub struct ExecutionDispatcher {
    paper_trading: bool,
    gateway: Arc<dyn ExecutionGateway>,
    executed_orders: AtomicUsize,
}

impl ExecutionDispatcher {
    #[must_use]
    pub fn new(paper_trading: bool, gateway: Arc<dyn ExecutionGateway>) -> Self {
        Self {
            paper_trading,
            gateway,
            executed_orders: AtomicUsize::new(0),
        }
    }

    /// Executes a decision, producing exactly one order record.
    ///
    /// `mark_price` is the last known close, used as the simulated execution
    /// price when the caller has one; paper fills fall back to 0.0.
    pub async fn execute(&self, decision: &Decision, mark_price: Option<f64>) -> Order {
        if decision.action == Action::Hold {
            tracing::debug!(symbol = decision.symbol, "skipping execution for Hold");
            return skipped_order(decision);
        }

        if self.paper_trading {
            let order = self.simulate_fill(decision, mark_price);
            tracing::info!(
                order_id = order.order_id,
                symbol = order.symbol,
                amount = order.amount,
                "simulated order execution"
            );
            return order;
        }

        match self
            .gateway
            .place_order(&decision.symbol, decision.action, decision.amount)
            .await
        {
            Ok(broker_id) => {
                self.executed_orders.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    order_id = broker_id,
                    symbol = decision.symbol,
                    amount = decision.amount,
                    "order executed on exchange"
                );
                let now = Utc::now();
                Order {
                    order_id: broker_id,
                    symbol: decision.symbol.clone(),
                    action: decision.action,
                    amount: decision.amount,
                    execution_price: mark_price.unwrap_or(0.0),
                    status: OrderStatus::Executed,
                    created_at: now,
                    executed_at: Some(now),
                    error_message: None,
                }
            }
            Err(err) => {
                tracing::error!(
                    symbol = decision.symbol,
                    error = %err,
                    "order execution failed"
                );
                failed_order(decision, &err.to_string())
            }
        }
    }

    /// Cancels an order: always succeeds in paper mode, delegates to the
    /// gateway in live mode, and reports failure as `false` instead of
    /// raising.
    pub async fn cancel(&self, order_id: &str) -> bool {
        if self.paper_trading {
            tracing::info!(order_id, "simulated order cancellation");
            return true;
        }

        match self.gateway.cancel_order(order_id).await {
            Ok(()) => {
                tracing::info!(order_id, "order cancelled");
                true
            }
            Err(err) => {
                tracing::error!(order_id, error = %err, "order cancellation failed");
                false
            }
        }
    }

    /// Count of simulated and live fills since startup.
    pub fn executed_order_count(&self) -> usize {
        self.executed_orders.load(Ordering::Relaxed)
    }

    fn simulate_fill(&self, decision: &Decision, mark_price: Option<f64>) -> Order {
        self.executed_orders.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        Order {
            order_id: format!("SIM-{}", now.timestamp_millis()),
            symbol: decision.symbol.clone(),
            action: decision.action,
            amount: decision.amount,
            execution_price: mark_price.unwrap_or(0.0),
            status: OrderStatus::Executed,
            created_at: now,
            executed_at: Some(now),
            error_message: None,
        }
    }
}

fn skipped_order(decision: &Decision) -> Order {
    let now = Utc::now();
    Order {
        order_id: format!("SKIPPED-{}", now.timestamp_millis()),
        symbol: decision.symbol.clone(),
        action: decision.action,
        amount: 0.0,
        execution_price: 0.0,
        status: OrderStatus::Pending,
        created_at: now,
        executed_at: None,
        error_message: None,
    }
}

fn failed_order(decision: &Decision, error_message: &str) -> Order {
    let now = Utc::now();
    Order {
        order_id: format!("FAILED-{}", now.timestamp_millis()),
        symbol: decision.symbol.clone(),
        action: decision.action,
        amount: decision.amount,
        execution_price: 0.0,
        status: OrderStatus::Failed,
        created_at: now,
        executed_at: None,
        error_message: Some(error_message.to_string()),
    }
}
