use crate::history::OrderHistory;
use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tradecycle_core::config::AppConfig;
use tradecycle_core::pnl::estimated_fill_pnl;
use tradecycle_core::types::{Order, OrderStatus};
use tradecycle_core::{MarketData, Predictor};
use tradecycle_execution::ExecutionDispatcher;
use tradecycle_strategy::{DecisionEngine, RiskGate};

/// Aggregate result of one full trading cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub successful_trades: u32,
    pub blocked_trades: u32,
    pub duration_ms: u64,
    pub portfolio_value: f64,
    pub daily_loss: f64,
    pub open_positions: i64,
}

/// What happened to one symbol within a cycle.
enum SymbolOutcome {
    /// No snapshot available; symbol skipped this cycle.
    NoData,
    /// Vetoed by the risk gate.
    Blocked,
    /// Order dispatched and recorded (Executed or Pending).
    Recorded,
    /// Order produced but not filled (Failed).
    NotFilled,
}

/// Sequences the per-pair pipeline: snapshot → prediction → decision → risk
/// verdict → order → recorded P&L → updated shared state.
///
/// The only component that calls the others; symbols are processed one at a
/// time, which also serializes the risk gate's check-then-record pair. One
/// symbol's failure is logged and never aborts the cycle.
pub struct CycleOrchestrator {
    config: AppConfig,
    market_data: Arc<dyn MarketData>,
    predictor: Arc<dyn Predictor>,
    engine: DecisionEngine,
    risk: Arc<RiskGate>,
    dispatcher: Arc<ExecutionDispatcher>,
    history: Arc<OrderHistory>,
    /// `None` until the first cycle initializes it from configuration.
    portfolio_value: Mutex<Option<f64>>,
}

impl CycleOrchestrator {
    #[must_use]
    pub fn new(
        config: AppConfig,
        market_data: Arc<dyn MarketData>,
        predictor: Arc<dyn Predictor>,
        risk: Arc<RiskGate>,
        dispatcher: Arc<ExecutionDispatcher>,
    ) -> Self {
        let engine = DecisionEngine::from_config(&config.trading);
        Self {
            config,
            market_data,
            predictor,
            engine,
            risk,
            dispatcher,
            history: Arc::new(OrderHistory::new()),
            portfolio_value: Mutex::new(None),
        }
    }

    /// Runs one full trading cycle over the configured pairs.
    ///
    /// # Errors
    /// Only genuinely unexpected failures surface here; per-symbol errors
    /// are logged and skipped inside the loop.
    pub async fn run_cycle_once(&self) -> Result<CycleSummary> {
        let started = Instant::now();
        tracing::info!("========== starting trading cycle ==========");

        self.init_portfolio_if_needed().await;

        let mut successful_trades = 0u32;
        let mut blocked_trades = 0u32;

        for symbol in &self.config.trading.pairs {
            match self.process_symbol(symbol).await {
                Ok(SymbolOutcome::Recorded) => successful_trades += 1,
                Ok(SymbolOutcome::Blocked) => blocked_trades += 1,
                Ok(SymbolOutcome::NoData) => {
                    tracing::warn!(symbol, "no market data available, skipping");
                }
                Ok(SymbolOutcome::NotFilled) => {
                    tracing::error!(symbol, "order was not filled this cycle");
                }
                Err(err) => {
                    tracing::error!(symbol, error = %err, "error processing symbol in cycle");
                }
            }
        }

        let summary = CycleSummary {
            successful_trades,
            blocked_trades,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            portfolio_value: self.portfolio_value().await,
            daily_loss: self.risk.current_daily_loss(),
            open_positions: self.risk.open_position_count(),
        };

        tracing::info!(
            successful = summary.successful_trades,
            blocked = summary.blocked_trades,
            duration_ms = summary.duration_ms,
            portfolio_value = summary.portfolio_value,
            daily_loss = summary.daily_loss,
            open_positions = summary.open_positions,
            "========== trading cycle completed =========="
        );

        Ok(summary)
    }

    /// Read-only state log emitted by the secondary trigger; makes no
    /// decisions and mutates nothing.
    pub async fn status_snapshot(&self) {
        // Awaiting inside the macro would capture a non-Send field value
        // across the await point, and the scheduler spawns this future.
        let portfolio_value = self.portfolio_value().await;
        tracing::info!(
            portfolio_value,
            daily_loss = self.risk.current_daily_loss(),
            open_positions = self.risk.open_position_count(),
            executed_orders = self.dispatcher.executed_order_count(),
            "status snapshot"
        );
    }

    async fn process_symbol(&self, symbol: &str) -> Result<SymbolOutcome> {
        let Some(snapshot) = self
            .bounded(self.market_data.latest_snapshot(symbol), "snapshot fetch", symbol)
            .await?
        else {
            return Ok(SymbolOutcome::NoData);
        };

        let history = self
            .bounded(
                self.market_data
                    .history(symbol, self.config.trading.history_window),
                "history fetch",
                symbol,
            )
            .await?;

        let prediction = self.predictor.predict(symbol, &history);
        tracing::debug!(
            symbol,
            direction = ?prediction.direction,
            confidence = prediction.confidence,
            "prediction generated"
        );

        let portfolio_value = self.portfolio_value().await;
        let decision = self.engine.decide(&prediction, &snapshot, portfolio_value);
        tracing::info!(
            symbol,
            action = ?decision.action,
            amount = decision.amount,
            reason = decision.reason,
            "trading decision"
        );

        if !self.risk.can_execute(&decision, portfolio_value) {
            tracing::warn!(symbol, "trade blocked by risk gate");
            return Ok(SymbolOutcome::Blocked);
        }

        let order = self.dispatcher.execute(&decision, Some(snapshot.close)).await;
        let outcome = if matches!(order.status, OrderStatus::Executed | OrderStatus::Pending) {
            let profit_loss = estimated_fill_pnl(decision.action, decision.amount);
            self.risk.record_result(&decision, profit_loss);
            self.add_to_portfolio(profit_loss).await;
            tracing::info!(
                order_id = order.order_id,
                symbol,
                profit_loss,
                "order recorded"
            );
            SymbolOutcome::Recorded
        } else {
            tracing::error!(
                order_id = order.order_id,
                symbol,
                error = order.error_message.as_deref().unwrap_or("unknown"),
                "order execution failed"
            );
            SymbolOutcome::NotFilled
        };

        // Every dispatched decision leaves exactly one order record.
        self.history.append(order);
        Ok(outcome)
    }

    /// Bounds an external collaborator call; a timeout is that
    /// collaborator's ordinary failure, not a crash of the cycle.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T>> + Send,
        what: &str,
        symbol: &str,
    ) -> Result<T> {
        let limit = Duration::from_secs(self.config.trading.external_call_timeout_secs);
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("{what} for {symbol} timed out after {}s", limit.as_secs()),
        }
    }

    async fn init_portfolio_if_needed(&self) {
        let mut portfolio = self.portfolio_value.lock().await;
        if portfolio.is_none() {
            let initial = self.config.trading.initial_portfolio_value;
            *portfolio = Some(initial);
            tracing::info!(initial, "initialized portfolio value");
        }
    }

    async fn add_to_portfolio(&self, profit_loss: f64) {
        let mut portfolio = self.portfolio_value.lock().await;
        *portfolio = Some(portfolio.unwrap_or(self.config.trading.initial_portfolio_value) + profit_loss);
    }

    /// Current portfolio value; the configured initial value before the
    /// first cycle has run.
    pub async fn portfolio_value(&self) -> f64 {
        self.portfolio_value
            .lock()
            .await
            .unwrap_or(self.config.trading.initial_portfolio_value)
    }

    pub fn current_daily_loss(&self) -> f64 {
        self.risk.current_daily_loss()
    }

    pub fn open_position_count(&self) -> i64 {
        self.risk.open_position_count()
    }

    pub fn executed_order_count(&self) -> usize {
        self.dispatcher.executed_order_count()
    }

    /// A page of the order history, newest first.
    pub fn trading_history(&self, limit: usize, offset: usize) -> Vec<Order> {
        self.history.page(limit, offset)
    }

    /// Total number of orders ever recorded, independent of paging.
    pub fn order_count(&self) -> usize {
        self.history.len()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use tradecycle_core::config::TradingConfig;
    use tradecycle_core::types::{Direction, MarketSnapshot, Prediction};
    use tradecycle_data::MemoryMarketStore;
    use tradecycle_execution::UnconfiguredGateway;

    struct FixedPredictor {
        direction: Direction,
        confidence: f64,
    }

    impl Predictor for FixedPredictor {
        fn predict(&self, symbol: &str, _history: &[MarketSnapshot]) -> Prediction {
            Prediction {
                symbol: symbol.to_string(),
                direction: self.direction,
                confidence: self.confidence,
                target_price: 50_000.0,
            }
        }
    }

    /// Market data collaborator that fails for one symbol and serves data
    /// for the others.
    struct FlakyMarket {
        inner: MemoryMarketStore,
        failing_symbol: String,
    }

    #[async_trait]
    impl MarketData for FlakyMarket {
        async fn latest_snapshot(&self, symbol: &str) -> Result<Option<MarketSnapshot>> {
            if symbol == self.failing_symbol {
                return Err(anyhow!("connection refused"));
            }
            self.inner.latest_snapshot(symbol).await
        }

        async fn history(&self, symbol: &str, window: usize) -> Result<Vec<MarketSnapshot>> {
            self.inner.history(symbol, window).await
        }
    }

    fn bar(symbol: &str, close: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: symbol.to_string(),
            timestamp: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
            rsi: Some(45.0),
            macd: None,
            bollinger_upper: None,
            bollinger_lower: None,
        }
    }

    fn config(pairs: &[&str]) -> AppConfig {
        AppConfig {
            trading: TradingConfig {
                pairs: pairs.iter().map(|s| (*s).to_string()).collect(),
                ..TradingConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn orchestrator(
        config: AppConfig,
        market: Arc<dyn MarketData>,
        predictor: Arc<dyn Predictor>,
    ) -> CycleOrchestrator {
        let risk = Arc::new(RiskGate::new(config.risk.clone()));
        let dispatcher = Arc::new(ExecutionDispatcher::new(
            true,
            Arc::new(UnconfiguredGateway),
        ));
        CycleOrchestrator::new(config, market, predictor, risk, dispatcher)
    }

    fn seeded_store(pairs: &[&str]) -> Arc<MemoryMarketStore> {
        let store = Arc::new(MemoryMarketStore::new());
        for symbol in pairs {
            store.ingest(bar(symbol, 49_000.0));
            store.ingest(bar(symbol, 49_500.0));
        }
        store
    }

    #[tokio::test]
    async fn confident_up_prediction_executes_and_updates_all_state() {
        let store = seeded_store(&["BTC_USDT"]);
        let orch = orchestrator(
            config(&["BTC_USDT"]),
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.75,
            }),
        );

        let summary = orch.run_cycle_once().await.unwrap();
        assert_eq!(summary.successful_trades, 1);
        assert_eq!(summary.blocked_trades, 0);

        // 2% of 10_000 bought, 0.5% estimated profit.
        assert!((summary.portfolio_value - 10_001.0).abs() < 1e-9);
        assert!((summary.daily_loss + 1.0).abs() < 1e-9);
        assert_eq!(summary.open_positions, 1);
        assert_eq!(orch.executed_order_count(), 1);

        let history = orch.trading_history(10, 0);
        assert_eq!(history.len(), 1);
        assert_eq!(orch.order_count(), 1);
        assert!(history[0].order_id.starts_with("SIM-"));
        assert_eq!(history[0].status, OrderStatus::Executed);
        assert!((history[0].execution_price - 49_500.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn low_confidence_holds_and_still_logs_a_skipped_order() {
        let store = seeded_store(&["BTC_USDT"]);
        let orch = orchestrator(
            config(&["BTC_USDT"]),
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.55,
            }),
        );

        let summary = orch.run_cycle_once().await.unwrap();
        // A skipped (Pending) order still counts as a processed trade with
        // zero P&L.
        assert_eq!(summary.successful_trades, 1);
        assert!((summary.portfolio_value - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(summary.open_positions, 0);

        let history = orch.trading_history(10, 0);
        assert_eq!(history.len(), 1);
        assert!(history[0].order_id.starts_with("SKIPPED-"));
        assert_eq!(history[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn risk_veto_increments_blocked_and_leaves_no_order() {
        let store = seeded_store(&["BTC_USDT"]);
        let mut config = config(&["BTC_USDT"]);
        // 2% sizing against a 1% cap: every trade is vetoed.
        config.risk.max_position_fraction = 0.01;
        let orch = orchestrator(
            config,
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.75,
            }),
        );

        let summary = orch.run_cycle_once().await.unwrap();
        assert_eq!(summary.blocked_trades, 1);
        assert_eq!(summary.successful_trades, 0);
        assert!(orch.trading_history(10, 0).is_empty());
        assert!((summary.portfolio_value - 10_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn one_failing_symbol_does_not_abort_the_cycle() {
        let inner = MemoryMarketStore::new();
        inner.ingest(bar("ETH_USDT", 3_000.0));
        inner.ingest(bar("ETH_USDT", 3_100.0));
        let market = Arc::new(FlakyMarket {
            inner,
            failing_symbol: "BTC_USDT".to_string(),
        });

        let orch = orchestrator(
            config(&["BTC_USDT", "ETH_USDT"]),
            market,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.75,
            }),
        );

        let summary = orch.run_cycle_once().await.unwrap();
        assert_eq!(summary.successful_trades, 1);
        let history = orch.trading_history(10, 0);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].symbol, "ETH_USDT");
    }

    #[tokio::test]
    async fn symbol_without_data_is_skipped_quietly() {
        let store = seeded_store(&["ETH_USDT"]);
        let orch = orchestrator(
            config(&["BTC_USDT", "ETH_USDT"]),
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.75,
            }),
        );

        let summary = orch.run_cycle_once().await.unwrap();
        assert_eq!(summary.successful_trades, 1);
        assert_eq!(summary.blocked_trades, 0);
    }

    #[tokio::test]
    async fn sell_decisions_reduce_portfolio_by_estimated_pnl() {
        let store = seeded_store(&["BTC_USDT"]);
        let orch = orchestrator(
            config(&["BTC_USDT"]),
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Down,
                confidence: 0.75,
            }),
        );

        let summary = orch.run_cycle_once().await.unwrap();
        assert_eq!(summary.successful_trades, 1);
        assert!((summary.portfolio_value - 9_999.0).abs() < 1e-9);
        // Sell without a prior Buy drives the counter negative.
        assert_eq!(summary.open_positions, -1);
        assert!((summary.daily_loss - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn cycle_and_status_futures_run_on_spawned_tasks() {
        // The scheduler hands both futures to spawned jobs, so they must be
        // Send; spawning them here keeps that bound checked at compile time.
        let store = seeded_store(&["BTC_USDT"]);
        let orch = Arc::new(orchestrator(
            config(&["BTC_USDT"]),
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.75,
            }),
        ));

        let cycle = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run_cycle_once().await })
        };
        let summary = cycle.await.unwrap().unwrap();
        assert_eq!(summary.successful_trades, 1);

        let status = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.status_snapshot().await })
        };
        status.await.unwrap();
    }

    #[tokio::test]
    async fn portfolio_initializes_once_and_carries_across_cycles() {
        let store = seeded_store(&["BTC_USDT"]);
        let orch = orchestrator(
            config(&["BTC_USDT"]),
            store,
            Arc::new(FixedPredictor {
                direction: Direction::Up,
                confidence: 0.75,
            }),
        );

        orch.run_cycle_once().await.unwrap();
        let second = orch.run_cycle_once().await.unwrap();
        assert!((second.portfolio_value - 10_002.000_1).abs() < 1e-6);
    }
}
