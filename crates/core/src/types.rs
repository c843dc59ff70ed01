use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar for a trading pair, with optional technical indicators.
///
/// Snapshots are immutable once produced: whoever fetched one owns it, and
/// nothing downstream mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

/// Predicted price-movement direction for the next period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

/// A directional prediction with a confidence score in `[0, 1]`.
///
/// Produced fresh per decision request; has no persistent identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    pub direction: Direction,
    pub confidence: f64,
    pub target_price: f64,
}

impl Prediction {
    /// The fallback every predictor returns when it cannot do better:
    /// Neutral at 50% confidence with no price target.
    #[must_use]
    pub fn neutral(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            direction: Direction::Neutral,
            confidence: 0.5,
            target_price: 0.0,
        }
    }
}

/// Trade action chosen by the decision engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// A sized, auditable trade decision. Immutable value consumed by the risk
/// gate and the execution dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub symbol: String,
    pub action: Action,
    /// Monetary size in quote currency; always 0 for Hold.
    pub amount: f64,
    pub confidence: f64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl Decision {
    /// A zero-sized Hold decision with an audit reason.
    #[must_use]
    pub fn hold(symbol: &str, reason: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            action: Action::Hold,
            amount: 0.0,
            confidence: 0.5,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Executed,
    Failed,
    Cancelled,
}

/// An order record produced once per dispatched decision.
///
/// The id scheme distinguishes the execution path: "SIM-" simulated fills,
/// "SKIPPED-" Hold decisions, "FAILED-" gateway failures, anything else is a
/// broker-assigned live id. Orders are never mutated after creation; a
/// cancellation is a separate call, not an in-place edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub action: Action,
    pub amount: f64,
    pub execution_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub executed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}
