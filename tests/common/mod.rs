//! In-memory data service for integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use signalscope_sdk::error::HttpError;
use signalscope_sdk::service::{Condition, DataService, SelectQuery};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A [`DataService`] over seeded JSON rows, with per-collection call
/// counting and failure injection.
#[derive(Default)]
pub struct MockDataService {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
}

impl MockDataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(rows);
    }

    /// Number of service calls (select + count) issued for a collection.
    pub fn calls(&self, collection: &str) -> usize {
        *self.calls.lock().unwrap().get(collection).unwrap_or(&0)
    }

    pub fn set_failing(&self, collection: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(collection.to_string());
        } else {
            set.remove(collection);
        }
    }

    fn query(&self, query: &SelectQuery) -> Result<Vec<Value>, HttpError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(query.collection.to_string())
            .or_default() += 1;

        if self.failing.lock().unwrap().contains(query.collection) {
            return Err(HttpError::ServerError {
                status: 500,
                body: "injected failure".to_string(),
            });
        }

        let rows = self
            .collections
            .lock()
            .unwrap()
            .get(query.collection)
            .cloned()
            .unwrap_or_default();

        let mut matched: Vec<Value> = rows
            .into_iter()
            .filter(|row| query.conditions.iter().all(|c| matches(row, c)))
            .collect();

        if let Some(col) = query.order_desc {
            matched.sort_by(|a, b| cmp_fields(b, a, col));
        }
        Ok(matched)
    }
}

#[async_trait]
impl DataService for MockDataService {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, HttpError> {
        let mut rows = self.query(&query)?;
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn count(&self, query: SelectQuery) -> Result<u64, HttpError> {
        Ok(self.query(&query)?.len() as u64)
    }
}

fn field_str(row: &Value, col: &str) -> Option<String> {
    match row.get(col) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(v) => Some(v.to_string()),
    }
}

fn matches(row: &Value, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(col, v) => field_str(row, col).as_deref() == Some(v),
        Condition::Neq(col, v) => field_str(row, col).as_deref() != Some(v.as_str()),
        Condition::NotNull(col) => field_str(row, col).is_some(),
        Condition::In(col, vs) => {
            field_str(row, col).is_some_and(|f| vs.iter().any(|v| *v == f))
        }
        Condition::Gte(col, v) => {
            field_str(row, col).is_some_and(|f| cmp_values(&f, v) != Ordering::Less)
        }
        Condition::Lte(col, v) => {
            field_str(row, col).is_some_and(|f| cmp_values(&f, v) != Ordering::Greater)
        }
    }
}

fn cmp_values(a: &str, b: &str) -> Ordering {
    match (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn cmp_fields(a: &Value, b: &Value, col: &str) -> Ordering {
    match (field_str(a, col), field_str(b, col)) {
        (Some(x), Some(y)) => cmp_values(&x, &y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

// ── Row builders ─────────────────────────────────────────────────────────────

pub fn candle_row(id: &str, timeframe: &str, candle_time: DateTime<Utc>, close: f64) -> Value {
    serde_json::json!({
        "id": id,
        "symbol": "BTCUSDT",
        "timeframe": timeframe,
        "open": close - 50.0,
        "high": close + 100.0,
        "low": close - 120.0,
        "close": close,
        "volume": 42.5,
        "candle_time": candle_time.to_rfc3339(),
        "created_at": candle_time.to_rfc3339(),
    })
}

pub fn feature_row(id: &str, timeframe: &str, candle_time: DateTime<Utc>) -> Value {
    serde_json::json!({
        "id": id,
        "candle_id": null,
        "timeframe": timeframe,
        "candle_time": candle_time.to_rfc3339(),
        "fvg_up": true,
        "fvg_down": false,
        "fvg_resolved": false,
        "fvg_gap_size": 12.5,
        "og_up": false,
        "og_down": false,
        "og_resolved": false,
        "vi_up": false,
        "vi_down": false,
        "vi_resolved": false,
        "swing_high": true,
        "swing_low": false,
        "bos_up": false,
        "bos_down": false,
        "mss_up": false,
        "mss_down": false,
        "swept_high": false,
        "swept_low": false,
        "equal_highs": false,
        "equal_lows": false,
        "created_at": candle_time.to_rfc3339(),
    })
}

pub fn signal_row(
    id: &str,
    timeframe: &str,
    candle_time: DateTime<Utc>,
    signal_type: Option<&str>,
    direction: Option<&str>,
) -> Value {
    serde_json::json!({
        "id": id,
        "candle_time": candle_time.to_rfc3339(),
        "timeframe": timeframe,
        "signal_type": signal_type,
        "direction": direction,
        "meta_json": {"price": 64000.0, "reason": "test"},
        "created_at": candle_time.to_rfc3339(),
    })
}

pub fn ai_log_row(id: &str, timeframe: &str, candle_time: DateTime<Utc>) -> Value {
    serde_json::json!({
        "id": id,
        "candle_time": candle_time.to_rfc3339(),
        "timeframe": timeframe,
        "signal_type": null,
        "direction": null,
        "reasoning": "no displacement, standing aside",
        "meta_json": {},
        "created_at": candle_time.to_rfc3339(),
    })
}

pub fn event_row(id: &str, event_type: &str, created_at: DateTime<Utc>) -> Value {
    serde_json::json!({
        "id": id,
        "event_type": event_type,
        "message": "engine heartbeat",
        "details": {},
        "created_at": created_at.to_rfc3339(),
    })
}
