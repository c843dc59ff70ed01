use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tradecycle_core::types::MarketSnapshot;
use tradecycle_core::MarketData;

/// In-memory snapshot store keyed by symbol, ordered oldest first.
///
/// Serves as the `MarketData` collaborator for paper runs and tests; a
/// production deployment substitutes an exchange-backed implementation.
#[derive(Default)]
pub struct MemoryMarketStore {
    snapshots: RwLock<HashMap<String, Vec<MarketSnapshot>>>,
}

impl MemoryMarketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot to its symbol's series.
    pub fn ingest(&self, snapshot: MarketSnapshot) {
        let Ok(mut map) = self.snapshots.write() else {
            tracing::error!("market store lock poisoned, dropping snapshot");
            return;
        };
        map.entry(snapshot.symbol.clone()).or_default().push(snapshot);
    }

    /// Appends a whole series (assumed ordered oldest first).
    pub fn ingest_series(&self, symbol: &str, series: Vec<MarketSnapshot>) {
        let Ok(mut map) = self.snapshots.write() else {
            tracing::error!("market store lock poisoned, dropping series");
            return;
        };
        map.entry(symbol.to_string()).or_default().extend(series);
    }
}

#[async_trait]
impl MarketData for MemoryMarketStore {
    async fn latest_snapshot(&self, symbol: &str) -> Result<Option<MarketSnapshot>> {
        let map = self
            .snapshots
            .read()
            .map_err(|_| anyhow::anyhow!("market store lock poisoned"))?;
        Ok(map.get(symbol).and_then(|series| series.last().cloned()))
    }

    async fn history(&self, symbol: &str, window: usize) -> Result<Vec<MarketSnapshot>> {
        let map = self
            .snapshots
            .read()
            .map_err(|_| anyhow::anyhow!("market store lock poisoned"))?;
        Ok(map.get(symbol).map_or_else(Vec::new, |series| {
            let start = series.len().saturating_sub(window);
            series[start..].to_vec()
        }))
    }
}
