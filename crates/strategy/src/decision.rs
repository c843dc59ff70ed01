use chrono::Utc;
use tradecycle_core::config::TradingConfig;
use tradecycle_core::types::{Action, Decision, Direction, MarketSnapshot, Prediction};

/// Turns a prediction plus the current snapshot into a sized trade decision.
///
/// Pure and deterministic: no shared state, no side effects, same inputs
/// always produce the same decision. That determinism is what the test
/// suite leans on.
pub struct DecisionEngine {
    confidence_threshold: f64,
    trade_size_fraction: f64,
}

impl DecisionEngine {
    #[must_use]
    pub const fn new(confidence_threshold: f64, trade_size_fraction: f64) -> Self {
        Self {
            confidence_threshold,
            trade_size_fraction,
        }
    }

    #[must_use]
    pub const fn from_config(config: &TradingConfig) -> Self {
        Self::new(config.confidence_threshold, config.trade_size_fraction)
    }

    #[must_use]
    pub fn decide(
        &self,
        prediction: &Prediction,
        snapshot: &MarketSnapshot,
        portfolio_value: f64,
    ) -> Decision {
        if prediction.confidence < self.confidence_threshold {
            tracing::debug!(
                symbol = prediction.symbol,
                confidence = prediction.confidence,
                "confidence below threshold, holding"
            );
            return Decision::hold(&prediction.symbol, "Low confidence prediction");
        }

        let action = determine_action(prediction, snapshot);
        if action == Action::Hold {
            return Decision::hold(&prediction.symbol, "Technical analysis filters not met");
        }

        let amount = portfolio_value * self.trade_size_fraction;
        let direction = match prediction.direction {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Neutral => "Neutral",
        };

        Decision {
            symbol: prediction.symbol.clone(),
            action,
            amount,
            confidence: prediction.confidence,
            reason: format!(
                "Prediction: {direction} with {:.2}% confidence",
                prediction.confidence * 100.0
            ),
            timestamp: Utc::now(),
        }
    }
}

/// The four directional/indicator filters, evaluated in order; the first
/// match wins. Up and Down rules are mutually exclusive by direction, so no
/// tie is possible. An absent indicator passes its filter.
fn determine_action(prediction: &Prediction, snapshot: &MarketSnapshot) -> Action {
    // Strong signal, gated on RSI not being stretched.
    if prediction.direction == Direction::Up
        && prediction.confidence > 0.7
        && snapshot.rsi.is_none_or(|rsi| rsi < 70.0)
    {
        return Action::Buy;
    }

    if prediction.direction == Direction::Down
        && prediction.confidence > 0.7
        && snapshot.rsi.is_none_or(|rsi| rsi > 30.0)
    {
        return Action::Sell;
    }

    // Moderate signal, confirmed against the Bollinger envelope.
    if prediction.direction == Direction::Up
        && prediction.confidence > 0.6
        && snapshot
            .bollinger_lower
            .is_none_or(|lower| snapshot.close > lower)
    {
        return Action::Buy;
    }

    if prediction.direction == Direction::Down
        && prediction.confidence > 0.6
        && snapshot
            .bollinger_upper
            .is_none_or(|upper| snapshot.close < upper)
    {
        return Action::Sell;
    }

    Action::Hold
}
