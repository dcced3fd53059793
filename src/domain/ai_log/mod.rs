//! AI-log domain — the reasoner's natural-language commentary per candle.

pub mod client;
pub mod grouping;

use crate::domain::signal::{Direction, SignalKind};
use crate::shared::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use grouping::{group_by_day, DayGroup};

pub(crate) const COLLECTION: &str = "ai_logs";

/// One reasoning entry, tied to a candle key and optionally carrying the
/// type/direction of a correlated signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiLog {
    pub id: String,
    pub candle_time: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub signal_type: Option<SignalKind>,
    pub direction: Option<Direction>,
    pub reasoning: String,
    #[serde(default)]
    pub meta_json: Value,
    pub created_at: DateTime<Utc>,
}
