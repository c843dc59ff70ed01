use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tradecycle_core::config::RiskConfig;
use tradecycle_core::pnl::estimated_potential_loss;
use tradecycle_core::types::{Action, Decision};

/// Daily loss ledger and open-position counters.
///
/// Reset to zero loss and an empty position map exactly once when the
/// calendar date advances past `last_reset`, and only then. Mutated nowhere
/// except inside `RiskGate`.
#[derive(Debug)]
struct RiskState {
    last_reset: NaiveDate,
    daily_loss: f64,
    open_positions: HashMap<String, i64>,
}

impl RiskState {
    fn new(today: NaiveDate) -> Self {
        Self {
            last_reset: today,
            daily_loss: 0.0,
            open_positions: HashMap::new(),
        }
    }

    fn roll_over_if_new_day(&mut self, today: NaiveDate) {
        if today != self.last_reset {
            self.daily_loss = 0.0;
            self.open_positions.clear();
            self.last_reset = today;
            tracing::info!(%today, "daily risk ledger reset");
        }
    }

    fn open_position_count(&self) -> i64 {
        self.open_positions.values().sum()
    }
}

/// Stateful gate every decision passes before execution.
///
/// The whole ledger sits behind one mutex so day rollover, checks, and
/// recording cannot interleave.
pub struct RiskGate {
    limits: RiskConfig,
    state: Mutex<RiskState>,
}

impl RiskGate {
    #[must_use]
    pub fn new(limits: RiskConfig) -> Self {
        Self {
            limits,
            state: Mutex::new(RiskState::new(Utc::now().date_naive())),
        }
    }

    /// Validates a decision against the configured limits. Every check is a
    /// veto; any internal failure fails closed.
    pub fn can_execute(&self, decision: &Decision, portfolio_value: f64) -> bool {
        self.can_execute_on(decision, portfolio_value, Utc::now().date_naive())
    }

    /// Like [`can_execute`](Self::can_execute) with an explicit evaluation
    /// date, so day-rollover behavior is testable without a real clock.
    pub fn can_execute_on(
        &self,
        decision: &Decision,
        portfolio_value: f64,
        today: NaiveDate,
    ) -> bool {
        // A poisoned lock means a previous caller panicked mid-update; the
        // ledger can no longer be trusted, so block the trade.
        let Ok(mut state) = self.state.lock() else {
            tracing::error!(
                symbol = decision.symbol,
                "risk state lock poisoned, failing closed"
            );
            return false;
        };

        state.roll_over_if_new_day(today);

        if !self.check_daily_loss(&state, decision) {
            tracing::warn!(
                symbol = decision.symbol,
                "trade blocked: daily loss limit exceeded"
            );
            return false;
        }

        if !self.check_position_size(decision, portfolio_value) {
            tracing::warn!(
                symbol = decision.symbol,
                "trade blocked: position size exceeds limit"
            );
            return false;
        }

        if !self.check_max_open_positions(&state, decision) {
            tracing::warn!(
                symbol = decision.symbol,
                "trade blocked: maximum open positions reached"
            );
            return false;
        }

        if !Self::check_volatility(decision) {
            tracing::warn!(symbol = decision.symbol, "trade blocked: high volatility");
            return false;
        }

        tracing::debug!(symbol = decision.symbol, action = ?decision.action, "trade approved");
        true
    }

    /// Records an executed trade's P&L into the ledger. A profit reduces
    /// the recorded loss, a loss increases it. Buy increments the symbol's
    /// position counter, Sell decrements it.
    ///
    /// The Sell decrement has no floor at zero: a Sell without a prior Buy
    /// drives the counter negative, which loosens the open-position cap when
    /// counters are summed. Kept deliberately; see DESIGN.md.
    pub fn record_result(&self, decision: &Decision, profit_loss: f64) {
        let Ok(mut state) = self.state.lock() else {
            tracing::error!(
                symbol = decision.symbol,
                "risk state lock poisoned, dropping trade result"
            );
            return;
        };

        state.daily_loss -= profit_loss;

        match decision.action {
            Action::Buy => {
                *state.open_positions.entry(decision.symbol.clone()).or_insert(0) += 1;
            }
            Action::Sell => {
                *state.open_positions.entry(decision.symbol.clone()).or_insert(0) -= 1;
            }
            Action::Hold => {}
        }

        tracing::info!(
            symbol = decision.symbol,
            profit_loss,
            daily_loss = state.daily_loss,
            "trade result recorded"
        );
    }

    /// Current signed daily loss accumulator (positive means net losses).
    pub fn current_daily_loss(&self) -> f64 {
        self.state.lock().map_or(0.0, |state| state.daily_loss)
    }

    /// Sum of all open-position counters.
    pub fn open_position_count(&self) -> i64 {
        self.state
            .lock()
            .map_or(0, |state| state.open_position_count())
    }

    fn check_daily_loss(&self, state: &RiskState, decision: &Decision) -> bool {
        if decision.action == Action::Hold {
            return true;
        }
        let potential_loss = estimated_potential_loss(decision.amount);
        state.daily_loss + potential_loss <= self.limits.daily_loss_limit
    }

    fn check_position_size(&self, decision: &Decision, portfolio_value: f64) -> bool {
        if decision.action == Action::Hold {
            return true;
        }
        decision.amount <= portfolio_value * self.limits.max_position_fraction
    }

    fn check_max_open_positions(&self, state: &RiskState, decision: &Decision) -> bool {
        // Only a Buy opens exposure; Sell and Hold always pass.
        if decision.action != Action::Buy {
            return true;
        }
        state.open_position_count() < self.limits.max_open_positions
    }

    /// Reserved extension point; always passes for now.
    const fn check_volatility(_decision: &Decision) -> bool {
        true
    }
}
