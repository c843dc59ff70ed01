use tradecycle_core::types::{Direction, MarketSnapshot, Prediction};
use tradecycle_core::Predictor;

/// Deterministic stand-in for the production price model.
///
/// Direction follows the last close against the previous close at a fixed
/// 0.55 confidence, target price one percent away in the predicted
/// direction. It carries no predictive claim; it exists so the rest of the
/// pipeline can run before a real model is wired in, and it is swapped out
/// by substituting another `Predictor` without touching any caller.
pub struct HeuristicPredictor {
    enabled: bool,
}

impl HeuristicPredictor {
    #[must_use]
    pub const fn new() -> Self {
        Self { enabled: true }
    }

    /// A predictor that always answers Neutral, mirroring a deployment with
    /// the model switched off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for HeuristicPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for HeuristicPredictor {
    fn predict(&self, symbol: &str, history: &[MarketSnapshot]) -> Prediction {
        if !self.enabled {
            tracing::debug!(symbol, "predictor disabled, returning neutral");
            return Prediction::neutral(symbol);
        }

        let Some(latest) = history.last() else {
            tracing::warn!(symbol, "no history available for prediction");
            return Prediction::neutral(symbol);
        };

        // A single bar compares against itself and therefore predicts Down.
        let previous = if history.len() > 1 {
            &history[history.len() - 2]
        } else {
            latest
        };

        let direction = if latest.close > previous.close {
            Direction::Up
        } else {
            Direction::Down
        };

        let target_price = match direction {
            Direction::Up => latest.close * 1.01,
            Direction::Down => latest.close * 0.99,
            Direction::Neutral => 0.0,
        };

        Prediction {
            symbol: symbol.to_string(),
            direction,
            confidence: 0.55,
            target_price,
        }
    }
}
