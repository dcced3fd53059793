//! Trade-signal domain — the engine's generated entries/exits.

pub mod client;

use crate::shared::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const COLLECTION: &str = "trade_signals";

/// Signal classification. The engine also writes explicit `NONE` rows for
/// candles it evaluated without acting on, distinct from a missing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Entry,
    Exit,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

/// One generated signal row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub id: String,
    pub candle_time: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub signal_type: Option<SignalKind>,
    pub direction: Option<Direction>,
    /// Engine-provided metadata: `price`, `reason`, plus arbitrary keys.
    #[serde(default)]
    pub meta_json: Value,
    pub created_at: DateTime<Utc>,
}

impl TradeSignal {
    /// Actionable ⇔ a type is present and it is not the `NONE` sentinel.
    pub fn is_actionable(&self) -> bool {
        matches!(self.signal_type, Some(SignalKind::Entry) | Some(SignalKind::Exit))
    }

    /// The `price` metadata key, when the engine attached one.
    pub fn price(&self) -> Option<f64> {
        self.meta_json.get("price").and_then(Value::as_f64)
    }

    /// The `reason` metadata key, when the engine attached one.
    pub fn reason(&self) -> Option<&str> {
        self.meta_json.get("reason").and_then(Value::as_str)
    }
}

/// Count the actionable signals in an already-fetched slice.
pub fn count_actionable(signals: &[TradeSignal]) -> usize {
    signals.iter().filter(|s| s.is_actionable()).count()
}

/// Today's signal activity for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalsToday {
    /// Server-side count of every signal row since UTC midnight.
    pub total: u64,
    /// Actionable rows inside the fetched slice (see
    /// [`client::Signals::today`] for the slice bound).
    pub actionable: u64,
}
