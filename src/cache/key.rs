//! Cache keys — ordered tuples of query-identifying components.

use crate::filters::ViewFilter;
use crate::shared::Timeframe;

/// Identity of a cached query: an ordered tuple of rendered components,
/// starting with the stream id. Two keys are the same entry iff every
/// component matches, so any parameter that changes the result set must be
/// pushed into the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    parts: Vec<String>,
}

impl QueryKey {
    pub fn stream(id: &str) -> Self {
        Self {
            parts: vec![id.to_string()],
        }
    }

    /// Append one component. Timestamps go through [`QueryKey::scoped`] so
    /// they are rendered consistently.
    pub fn push(mut self, part: impl std::fmt::Display) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Key scoped by the full view filter: `(id, timeframe, from, to)`.
    pub fn scoped(id: &str, filter: &ViewFilter) -> Self {
        Self::stream(id)
            .push(filter.timeframe.as_str())
            .push(filter.range.from.to_rfc3339())
            .push(filter.range.to.to_rfc3339())
    }

    /// Key scoped by timeframe only (date-range-independent queries).
    pub fn timeframe_scoped(id: &str, timeframe: Timeframe) -> Self {
        Self::stream(id).push(timeframe.as_str())
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, ViewFilter};
    use chrono::{TimeZone, Utc};

    fn filter(tf: Timeframe) -> ViewFilter {
        ViewFilter {
            timeframe: tf,
            range: DateRange::new(
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap(),
            ),
        }
    }

    #[test]
    fn test_distinct_filters_make_distinct_keys() {
        let a = QueryKey::scoped("candles", &filter(Timeframe::Min15));
        let b = QueryKey::scoped("candles", &filter(Timeframe::Hour1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_extra_params_distinguish_keys() {
        let base = QueryKey::scoped("candles", &filter(Timeframe::Min15));
        assert_ne!(base.clone().push(100), base.push(50));
    }

    #[test]
    fn test_identical_components_are_one_key() {
        let a = QueryKey::scoped("signals", &filter(Timeframe::Hour4)).push(50);
        let b = QueryKey::scoped("signals", &filter(Timeframe::Hour4)).push(50);
        assert_eq!(a, b);
    }
}
