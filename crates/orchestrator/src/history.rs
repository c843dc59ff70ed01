use std::sync::Mutex;
use tradecycle_core::types::Order;

/// Append-only log of every order produced by the cycle.
///
/// Readers take the lock briefly and get a copy, so monitoring queries
/// observe a consistent snapshot without blocking the cycle for long.
#[derive(Default)]
pub struct OrderHistory {
    orders: Mutex<Vec<Order>>,
}

impl OrderHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, order: Order) {
        let Ok(mut orders) = self.orders.lock() else {
            tracing::error!(order_id = order.order_id, "history lock poisoned, order lost");
            return;
        };
        orders.push(order);
    }

    /// A page of orders, newest first.
    pub fn page(&self, limit: usize, offset: usize) -> Vec<Order> {
        self.orders.lock().map_or_else(
            |_| Vec::new(),
            |orders| {
                orders
                    .iter()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect()
            },
        )
    }

    pub fn len(&self) -> usize {
        self.orders.lock().map_or(0, |orders| orders.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
