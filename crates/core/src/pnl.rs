//! Estimated P&L heuristics used in place of real fill prices.
//!
//! Both numbers are deliberate simulation-grade simplifications: an executed
//! trade is assumed to move 0.5% in the traded direction, and a prospective
//! trade is assumed to risk losing 1% of its size. They live here, behind two
//! functions, so a fill-price-derived implementation can replace them without
//! touching the risk gate or the orchestrator.

use crate::types::Action;

/// Estimated P&L contribution of an executed trade: `amount × 0.5%`, signed
/// positive for Buy and negative for Sell. Hold contributes nothing.
#[must_use]
pub fn estimated_fill_pnl(action: Action, amount: f64) -> f64 {
    match action {
        Action::Buy => amount * 0.005,
        Action::Sell => -(amount * 0.005),
        Action::Hold => 0.0,
    }
}

/// Estimated worst-case loss of a prospective trade: `amount × 1%`, used by
/// the daily-loss check before execution.
#[must_use]
pub fn estimated_potential_loss(amount: f64) -> f64 {
    amount * 0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_pnl_is_positive_half_percent() {
        assert!((estimated_fill_pnl(Action::Buy, 200.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sell_pnl_is_negative_half_percent() {
        assert!((estimated_fill_pnl(Action::Sell, 200.0) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hold_contributes_nothing() {
        assert!((estimated_fill_pnl(Action::Hold, 500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn potential_loss_is_one_percent() {
        assert!((estimated_potential_loss(100.0) - 1.0).abs() < f64::EPSILON);
    }
}
