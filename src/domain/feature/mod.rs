//! Market-structure feature domain — per-candle structural flags the engine
//! detects: swings, breaks of structure, structure shifts, price imbalances
//! (fair-value gaps, order gaps, volume imbalances), sweeps and equal
//! highs/lows.

pub mod client;

use crate::shared::Timeframe;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub(crate) const COLLECTION: &str = "market_features";

/// Feature flags detected at one candle. At most one row exists per
/// `(timeframe, candle_time)`; a candle with no row simply had nothing
/// detected. The row may reference its candle by id but is always located by
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketFeature {
    pub id: String,
    pub candle_id: Option<String>,
    pub timeframe: Timeframe,
    pub candle_time: DateTime<Utc>,
    // Imbalances
    pub fvg_up: bool,
    pub fvg_down: bool,
    pub fvg_resolved: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub fvg_gap_size: Decimal,
    pub og_up: bool,
    pub og_down: bool,
    pub og_resolved: bool,
    pub vi_up: bool,
    pub vi_down: bool,
    pub vi_resolved: bool,
    // Structure
    pub swing_high: bool,
    pub swing_low: bool,
    pub bos_up: bool,
    pub bos_down: bool,
    pub mss_up: bool,
    pub mss_down: bool,
    // Sweeps
    pub swept_high: bool,
    pub swept_low: bool,
    pub equal_highs: bool,
    pub equal_lows: bool,
    pub created_at: DateTime<Utc>,
}

impl MarketFeature {
    /// The gap is still tradeable: detected in either direction and not yet
    /// filled.
    pub fn has_active_fvg(&self) -> bool {
        (self.fvg_up || self.fvg_down) && !self.fvg_resolved
    }
}

#[cfg(test)]
impl MarketFeature {
    /// All-flags-off row at a key, for tests that flip individual flags.
    pub fn empty_at(id: &str, timeframe: Timeframe, candle_time: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            candle_id: None,
            timeframe,
            candle_time,
            fvg_up: false,
            fvg_down: false,
            fvg_resolved: false,
            fvg_gap_size: Decimal::ZERO,
            og_up: false,
            og_down: false,
            og_resolved: false,
            vi_up: false,
            vi_down: false,
            vi_resolved: false,
            swing_high: false,
            swing_low: false,
            bos_up: false,
            bos_down: false,
            mss_up: false,
            mss_down: false,
            swept_high: false,
            swept_low: false,
            equal_highs: false,
            equal_lows: false,
            created_at: candle_time,
        }
    }
}

/// Unresolved fair-value-gap totals for the active filter window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FvgSummary {
    pub up: u64,
    pub down: u64,
    pub total: u64,
}
