//! Left join of candles with their detected market-structure features.
//!
//! Pure and synchronous, so it is testable without any fetch machinery; the
//! sub-client feeds it from two independently cached streams.

use crate::domain::candle::Candle;
use crate::domain::feature::MarketFeature;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One candle with its (at most one) feature row attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleWithFeatures {
    pub candle: Candle,
    /// `None` when the engine detected nothing at this candle — a valid,
    /// ordinary state, not an error.
    pub features: Option<MarketFeature>,
}

/// Attach features to candles by exact `candle_time` match.
///
/// The output has exactly the candles' length and order; features without a
/// host candle in the window are dropped (there is no row to display them
/// on). Timeframe agreement is the caller's responsibility — both streams
/// are fetched under the same view filter.
pub fn join_candles_with_features(
    candles: &[Candle],
    features: &[MarketFeature],
) -> Vec<CandleWithFeatures> {
    let by_time: HashMap<DateTime<Utc>, &MarketFeature> =
        features.iter().map(|f| (f.candle_time, f)).collect();

    candles
        .iter()
        .map(|candle| CandleWithFeatures {
            candle: candle.clone(),
            features: by_time.get(&candle.candle_time).map(|&f| f.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Timeframe;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn candle(hour: u32) -> Candle {
        let t = Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap();
        Candle {
            id: format!("c-{hour}"),
            symbol: "BTCUSDT".into(),
            timeframe: Timeframe::Hour1,
            open: Decimal::new(100, 0),
            high: Decimal::new(110, 0),
            low: Decimal::new(95, 0),
            close: Decimal::new(105, 0),
            volume: Decimal::new(42, 0),
            candle_time: t,
            created_at: t,
        }
    }

    fn feature(hour: u32) -> MarketFeature {
        let t = Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap();
        MarketFeature {
            swing_high: true,
            ..MarketFeature::empty_at("f", Timeframe::Hour1, t)
        }
    }

    #[test]
    fn test_join_preserves_candle_order_and_length() {
        // Descending candle order, a single matching feature in the middle.
        let candles = vec![candle(3), candle(2), candle(1)];
        let features = vec![feature(2)];

        let joined = join_candles_with_features(&candles, &features);

        assert_eq!(joined.len(), 3);
        let hours: Vec<u32> = joined
            .iter()
            .map(|c| {
                use chrono::Timelike;
                c.candle.candle_time.hour()
            })
            .collect();
        assert_eq!(hours, [3, 2, 1]);
        assert!(joined[0].features.is_none());
        assert!(joined[1].features.as_ref().unwrap().swing_high);
        assert!(joined[2].features.is_none());
    }

    #[test]
    fn test_unmatched_features_are_dropped() {
        let candles = vec![candle(1)];
        let features = vec![feature(7), feature(8)];

        let joined = join_candles_with_features(&candles, &features);
        assert_eq!(joined.len(), 1);
        assert!(joined[0].features.is_none());
    }

    #[test]
    fn test_empty_feature_stream_joins_cleanly() {
        let candles = vec![candle(2), candle(1)];
        let joined = join_candles_with_features(&candles, &[]);
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|c| c.features.is_none()));
    }
}
