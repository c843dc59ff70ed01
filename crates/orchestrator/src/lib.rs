pub mod cycle;
pub mod history;
pub mod scheduler;

pub use cycle::{CycleOrchestrator, CycleSummary};
pub use history::OrderHistory;
pub use scheduler::TradingScheduler;
