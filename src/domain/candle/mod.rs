//! Candle domain — OHLCV rows, one per timeframe period.

pub mod client;
pub mod join;

use crate::shared::Timeframe;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use join::{join_candles_with_features, CandleWithFeatures};

pub(crate) const COLLECTION: &str = "candles_raw";

/// One OHLCV row. Immutable once the engine has written it; uniquely
/// identified by `(timeframe, candle_time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub id: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    /// Period start.
    pub candle_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_row_deserializes_from_service_json() {
        let row = serde_json::json!({
            "id": "c-1",
            "symbol": "BTCUSDT",
            "timeframe": "15m",
            "open": 64000.5,
            "high": 64210.0,
            "low": 63980.25,
            "close": 64100.0,
            "volume": 123.45,
            "candle_time": "2025-03-14T15:00:00+00:00",
            "created_at": "2025-03-14T15:15:02+00:00"
        });
        let candle: Candle = serde_json::from_value(row).unwrap();
        assert_eq!(candle.timeframe, Timeframe::Min15);
        assert!(candle.is_bullish());
        assert_eq!(candle.volume.to_string(), "123.45");
    }
}
