//! Market data storage for the trading loop.
//!
//! The exchange ingestion and time-series database live outside this
//! repository; what the cycle needs is the `MarketData` contract. This crate
//! provides an in-memory store implementing it, plus a CSV loader for
//! seeding paper-trading runs and tests.

pub mod csv_loader;
pub mod memory;

pub use csv_loader::load_candles;
pub use memory::MemoryMarketStore;
