use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use tradecycle_core::types::MarketSnapshot;

/// One CSV candle row. Indicator columns are optional so plain OHLCV
/// exports load as well as enriched ones.
#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    #[serde(default)]
    rsi: Option<f64>,
    #[serde(default)]
    macd: Option<f64>,
    #[serde(default)]
    bollinger_upper: Option<f64>,
    #[serde(default)]
    bollinger_lower: Option<f64>,
}

/// Reads candles for `symbol` from a CSV file with header
/// `timestamp,open,high,low,close,volume[,rsi,macd,bollinger_upper,bollinger_lower]`,
/// returned ordered oldest first.
///
/// # Errors
/// Returns an error if the file cannot be opened or a row fails to parse.
pub fn load_candles(path: &str, symbol: &str) -> Result<Vec<MarketSnapshot>> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file: {path}"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut snapshots = Vec::new();
    for row in reader.deserialize() {
        let row: CandleRow = row.with_context(|| format!("Malformed candle row in {path}"))?;
        snapshots.push(MarketSnapshot {
            symbol: symbol.to_string(),
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            rsi: row.rsi,
            macd: row.macd,
            bollinger_upper: row.bollinger_upper,
            bollinger_lower: row.bollinger_lower,
        });
    }

    snapshots.sort_by_key(|s| s.timestamp);
    tracing::debug!(symbol, count = snapshots.len(), path, "loaded candles from CSV");
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_plain_ohlcv_rows_sorted_by_timestamp() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
        writeln!(
            file,
            "2026-01-01T01:00:00Z,101.0,102.0,100.0,101.5,20.0"
        )
        .unwrap();
        writeln!(
            file,
            "2026-01-01T00:00:00Z,100.0,101.0,99.0,100.5,10.0"
        )
        .unwrap();

        let candles = load_candles(file.path().to_str().unwrap(), "BTC_USDT").unwrap();
        assert_eq!(candles.len(), 2);
        assert!((candles[0].close - 100.5).abs() < f64::EPSILON);
        assert!((candles[1].close - 101.5).abs() < f64::EPSILON);
        assert_eq!(candles[0].symbol, "BTC_USDT");
        assert!(candles[0].rsi.is_none());
    }

    #[test]
    fn loads_indicator_columns_when_present() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "timestamp,open,high,low,close,volume,rsi,macd,bollinger_upper,bollinger_lower"
        )
        .unwrap();
        writeln!(
            file,
            "2026-01-01T00:00:00Z,100.0,101.0,99.0,100.5,10.0,45.0,0.2,105.0,95.0"
        )
        .unwrap();

        let candles = load_candles(file.path().to_str().unwrap(), "ETH_USDT").unwrap();
        assert!((candles[0].rsi.unwrap() - 45.0).abs() < f64::EPSILON);
        assert!((candles[0].bollinger_lower.unwrap() - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_candles("no/such/file.csv", "BTC_USDT").is_err());
    }
}
