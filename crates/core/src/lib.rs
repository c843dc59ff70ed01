pub mod config;
pub mod config_loader;
pub mod error;
pub mod pnl;
pub mod traits;
pub mod types;

pub use config::{AppConfig, RiskConfig, ServerConfig, TradingConfig};
pub use config_loader::ConfigLoader;
pub use error::GatewayError;
pub use traits::{ExecutionGateway, MarketData, Predictor};
pub use types::{Action, Decision, Direction, MarketSnapshot, Order, OrderStatus, Prediction};
