//! Shared newtypes used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw strings the data service stores, so they can be
//! used directly in row structs without conversion overhead.

use serde::{Deserialize, Serialize};

// ─── Timeframe ───────────────────────────────────────────────────────────────

/// Candle aggregation period the engine produces.
///
/// The set is closed — the engine writes exactly these three timeframes, so
/// an unsupported value is unrepresentable rather than a runtime failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "1H")]
    Hour1,
    #[serde(rename = "4H")]
    Hour4,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min15 => "15m",
            Self::Hour1 => "1H",
            Self::Hour4 => "4H",
        }
    }

    /// Duration of one candle in seconds.
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Min15 => 900,
            Self::Hour1 => 3600,
            Self::Hour4 => 14400,
        }
    }

    /// All timeframes the engine produces, for UI selectors.
    pub fn all() -> [Timeframe; 3] {
        [Self::Min15, Self::Hour1, Self::Hour4]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_serde() {
        let tf: Timeframe = serde_json::from_str("\"4H\"").unwrap();
        assert_eq!(tf, Timeframe::Hour4);
        assert_eq!(tf.seconds(), 14400);
        assert_eq!(serde_json::to_string(&Timeframe::Min15).unwrap(), "\"15m\"");
    }

    #[test]
    fn test_timeframe_display_matches_wire() {
        for tf in Timeframe::all() {
            assert_eq!(tf.to_string(), tf.as_str());
        }
    }
}
