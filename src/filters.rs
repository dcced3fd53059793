//! Shared view-filter state — timeframe + date range.
//!
//! Every query in the SDK is parameterized by the active [`ViewFilter`]. The
//! filter lives in a [`FilterProvider`] owned by the application; queries hold
//! a weak [`FilterHandle`] and re-derive their cache keys from `current()` on
//! every call, so a filter change makes all dependent queries recompute.
//!
//! Mutations are synchronous: `current()` observes a `set_*` call immediately.
//! Reading through a handle whose provider has been dropped fails with
//! [`FilterError::NotInitialized`](crate::error::FilterError) — never a
//! silently defaulted filter.

use crate::error::{FilterError, SdkError};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use futures_util::Stream;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Inclusive UTC time range. `from` and `to` both bound their queries with
/// `>=` / `<=` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// The trailing window ending at `now`.
    pub fn last_hours(now: DateTime<Utc>, hours: i64) -> Self {
        Self {
            from: now - ChronoDuration::hours(hours),
            to: now,
        }
    }
}

/// Quick-range presets offered by the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    /// Start of the current UTC day through now.
    Today,
    Last24h,
    Last7d,
    Last30d,
}

impl QuickRange {
    /// Resolve the preset against a supplied instant. Pure, so callers and
    /// tests get deterministic bounds; `to` is always `now`.
    pub fn bounds(self, now: DateTime<Utc>) -> DateRange {
        let from = match self {
            Self::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            Self::Last24h => now - ChronoDuration::hours(24),
            Self::Last7d => now - ChronoDuration::days(7),
            Self::Last30d => now - ChronoDuration::days(30),
        };
        DateRange { from, to: now }
    }
}

/// The active view filter: one timeframe + one inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    pub timeframe: crate::shared::Timeframe,
    pub range: DateRange,
}

impl ViewFilter {
    /// The dashboard's initial view: 15m candles over the last 48 hours.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            timeframe: crate::shared::Timeframe::Min15,
            range: DateRange::last_hours(now, 48),
        }
    }
}

/// Owner of the shared filter state. The application keeps this alive for as
/// long as the dashboard is mounted; dropping it invalidates every handle.
pub struct FilterProvider {
    shared: Arc<watch::Sender<ViewFilter>>,
}

impl FilterProvider {
    pub fn new() -> Self {
        Self::with_filter(ViewFilter::initial(Utc::now()))
    }

    pub fn with_filter(filter: ViewFilter) -> Self {
        Self {
            shared: Arc::new(watch::Sender::new(filter)),
        }
    }

    /// A weak consumer handle. Handles stay cheap to clone and observe every
    /// mutation; they fail loudly once the provider is gone.
    pub fn handle(&self) -> FilterHandle {
        FilterHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn current(&self) -> ViewFilter {
        self.shared.borrow().clone()
    }

    pub fn set_timeframe(&self, timeframe: crate::shared::Timeframe) {
        self.shared.send_modify(|f| f.timeframe = timeframe);
    }

    pub fn set_date_range(&self, range: DateRange) {
        self.shared.send_modify(|f| f.range = range);
    }

    /// Apply a quick-range preset, resolving it against the current instant.
    pub fn set_quick_range(&self, preset: QuickRange) {
        self.set_date_range(preset.bounds(Utc::now()));
    }
}

impl Default for FilterProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle onto a [`FilterProvider`].
#[derive(Clone)]
pub struct FilterHandle {
    shared: Weak<watch::Sender<ViewFilter>>,
}

impl FilterHandle {
    /// Snapshot of the active filter.
    pub fn current(&self) -> Result<ViewFilter, SdkError> {
        let shared = self.shared.upgrade().ok_or(FilterError::NotInitialized)?;
        let filter = shared.borrow().clone();
        Ok(filter)
    }

    /// Stream of filter values, one per mutation. Ends when the provider is
    /// dropped. Consumers use this to re-issue their queries (and thereby
    /// recompute cache keys) after a change.
    pub fn changes(&self) -> Result<impl Stream<Item = ViewFilter> + Send + 'static, SdkError> {
        let shared = self.shared.upgrade().ok_or(FilterError::NotInitialized)?;
        let mut rx = shared.subscribe();
        // Hold only the receiver; the provider owning the sender decides the
        // stream's lifetime.
        drop(shared);
        Ok(async_stream::stream! {
            while rx.changed().await.is_ok() {
                let filter = rx.borrow_and_update().clone();
                yield filter;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::shared::Timeframe;
    use chrono::TimeZone;
    use futures_util::StreamExt;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    #[test]
    fn test_quick_range_7d_exact() {
        let now = fixed_now();
        let range = QuickRange::Last7d.bounds(now);
        assert_eq!(range.from, now - ChronoDuration::days(7));
        assert_eq!(range.to, now);
    }

    #[test]
    fn test_quick_range_today_starts_at_midnight_utc() {
        let now = fixed_now();
        let range = QuickRange::Today.bounds(now);
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(range.to, now);
    }

    #[test]
    fn test_mutations_visible_immediately() {
        let provider = FilterProvider::new();
        let handle = provider.handle();
        provider.set_timeframe(Timeframe::Hour4);
        assert_eq!(handle.current().unwrap().timeframe, Timeframe::Hour4);

        let range = QuickRange::Last24h.bounds(fixed_now());
        provider.set_date_range(range);
        assert_eq!(handle.current().unwrap().range, range);
    }

    #[test]
    fn test_dropped_provider_fails_loudly() {
        let provider = FilterProvider::new();
        let handle = provider.handle();
        drop(provider);
        match handle.current() {
            Err(SdkError::Filter(FilterError::NotInitialized)) => {}
            other => panic!("expected NotInitialized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_changes_stream_yields_each_mutation() {
        let provider = FilterProvider::new();
        let handle = provider.handle();
        let mut changes = Box::pin(handle.changes().unwrap());

        provider.set_timeframe(Timeframe::Hour1);
        let seen = changes.next().await.unwrap();
        assert_eq!(seen.timeframe, Timeframe::Hour1);

        drop(provider);
        assert!(changes.next().await.is_none());
    }
}
