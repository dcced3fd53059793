//! Day partition for the reasoning history view.
//!
//! Pure and synchronous — it reshapes an already-fetched list and never
//! issues its own request.

use crate::domain::ai_log::AiLog;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One UTC calendar day of reasoning entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub logs: Vec<AiLog>,
}

/// Partition logs by the UTC calendar day of `candle_time`.
///
/// Groups come out newest-day-first; within each group the input order is
/// preserved, so a descending input stays descending throughout.
pub fn group_by_day(logs: Vec<AiLog>) -> Vec<DayGroup> {
    let mut groups: BTreeMap<NaiveDate, Vec<AiLog>> = BTreeMap::new();
    for log in logs {
        groups.entry(log.candle_time.date_naive()).or_default().push(log);
    }
    groups
        .into_iter()
        .rev()
        .map(|(date, logs)| DayGroup { date, logs })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Timeframe;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn log(day: u32, hour: u32) -> AiLog {
        let t = Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap();
        AiLog {
            id: format!("l-{day}-{hour}"),
            candle_time: t,
            timeframe: Timeframe::Hour1,
            signal_type: None,
            direction: None,
            reasoning: "structure intact, no entry".into(),
            meta_json: Value::Null,
            created_at: t,
        }
    }

    #[test]
    fn test_two_days_make_two_descending_groups() {
        // Descending input across a day boundary.
        let logs = vec![log(14, 9), log(14, 5), log(13, 22), log(13, 8)];

        let groups = group_by_day(logs);

        assert_eq!(groups.len(), 2);
        assert!(groups[0].date > groups[1].date);
        assert_eq!(groups[0].logs.len(), 2);
        assert_eq!(groups[1].logs.len(), 2);
        for group in &groups {
            assert!(group.logs.windows(2).all(|w| w[0].candle_time >= w[1].candle_time));
        }
    }

    #[test]
    fn test_empty_input_groups_to_nothing() {
        assert!(group_by_day(Vec::new()).is_empty());
    }
}
