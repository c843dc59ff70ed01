use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Trading-loop parameters: which pairs run, how decisions are sized, and
/// whether fills are simulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Simulated fills, no real capital or exchange call.
    #[serde(default = "default_true")]
    pub paper_trading: bool,
    #[serde(default = "default_initial_portfolio")]
    pub initial_portfolio_value: f64,
    /// Minimum prediction confidence before any directional action.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Fraction of portfolio value allocated to a single trade.
    #[serde(default = "default_trade_size_fraction")]
    pub trade_size_fraction: f64,
    /// Ordered list of pairs processed each cycle.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,
    /// Bound on each external collaborator call; a timeout is treated as the
    /// collaborator's ordinary failure, not a crash of the cycle.
    #[serde(default = "default_external_call_timeout")]
    pub external_call_timeout_secs: u64,
    /// Bars of history handed to the predictor each cycle.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            paper_trading: true,
            initial_portfolio_value: default_initial_portfolio(),
            confidence_threshold: default_confidence_threshold(),
            trade_size_fraction: default_trade_size_fraction(),
            pairs: default_pairs(),
            external_call_timeout_secs: default_external_call_timeout(),
            history_window: default_history_window(),
        }
    }
}

/// Risk-gate limits enforced before every execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Maximum cumulative estimated loss (USD) per calendar day.
    #[serde(default = "default_daily_loss_limit")]
    pub daily_loss_limit: f64,
    /// Largest single trade as a fraction of portfolio value.
    #[serde(default = "default_max_position_fraction")]
    pub max_position_fraction: f64,
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: i64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            daily_loss_limit: default_daily_loss_limit(),
            max_position_fraction: default_max_position_fraction(),
            max_open_positions: default_max_open_positions(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_true() -> bool {
    true
}

const fn default_initial_portfolio() -> f64 {
    10_000.0
}

const fn default_confidence_threshold() -> f64 {
    0.65
}

const fn default_trade_size_fraction() -> f64 {
    0.02 // 2% of portfolio per trade
}

fn default_pairs() -> Vec<String> {
    vec![
        "BTC_USDT".to_string(),
        "ETH_USDT".to_string(),
        "BNB_USDT".to_string(),
    ]
}

const fn default_external_call_timeout() -> u64 {
    30
}

const fn default_history_window() -> usize {
    24 // one day of hourly bars
}

const fn default_daily_loss_limit() -> f64 {
    500.0
}

const fn default_max_position_fraction() -> f64 {
    0.05 // 5% of portfolio
}

const fn default_max_open_positions() -> i64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert!(config.trading.paper_trading);
        assert!((config.trading.confidence_threshold - 0.65).abs() < f64::EPSILON);
        assert!((config.trading.trade_size_fraction - 0.02).abs() < f64::EPSILON);
        assert!((config.risk.daily_loss_limit - 500.0).abs() < f64::EPSILON);
        assert!((config.risk.max_position_fraction - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.risk.max_open_positions, 5);
        assert_eq!(config.trading.pairs.len(), 3);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: AppConfig = toml_from_str(
            r#"
            [risk]
            daily_loss_limit = 250.0
            "#,
        );
        assert!((config.risk.daily_loss_limit - 250.0).abs() < f64::EPSILON);
        assert_eq!(config.risk.max_open_positions, 5);
        assert!(config.trading.paper_trading);
    }

    fn toml_from_str(s: &str) -> AppConfig {
        use figment::providers::{Format, Toml};
        figment::Figment::new()
            .merge(Toml::string(s))
            .extract()
            .unwrap()
    }
}
