//! Signals sub-client — window listing, latest valid signal, today's totals.

use crate::cache::{FetchFuture, QueryKey, QuerySnapshot};
use crate::client::SignalscopeClient;
use crate::domain::signal::{count_actionable, SignalsToday, TradeSignal, COLLECTION};
use crate::error::SdkError;
use crate::service::{rows_into, SelectQuery};
use chrono::{NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;

const LATEST_POLL: Duration = Duration::from_secs(30);
const TODAY_POLL: Duration = Duration::from_secs(60);

/// Page cap on the slice backing the actionable sub-count. A single day
/// exceeding this many rows for one timeframe undercounts `actionable`
/// relative to the server-side `total`.
const TODAY_SLICE_LIMIT: u32 = 1000;

/// Sub-client for trade-signal queries.
pub struct Signals<'a> {
    pub(crate) client: &'a SignalscopeClient,
}

impl Signals<'_> {
    /// Signals inside the active filter window, most recent first.
    pub async fn list(&self, limit: u32) -> Result<QuerySnapshot<Vec<TradeSignal>>, SdkError> {
        let filter = self.client.filters.current()?;
        let key = QueryKey::scoped("signals", &filter).push(limit);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch(&key, move || -> FetchFuture<Vec<TradeSignal>> {
                let service = Arc::clone(&service);
                let filter = filter.clone();
                Box::pin(async move {
                    let rows = service
                        .select(
                            SelectQuery::new(COLLECTION)
                                .eq("timeframe", filter.timeframe.as_str())
                                .time_range("candle_time", &filter.range)
                                .order_desc("candle_time")
                                .limit(limit),
                        )
                        .await?;
                    rows_into(rows)
                })
            })
            .await;
        Ok(snap)
    }

    /// Most recent signal whose type is present and not `NONE`, kept live on
    /// a 30 s poll.
    pub async fn latest_valid(&self) -> Result<QuerySnapshot<Option<TradeSignal>>, SdkError> {
        let filter = self.client.filters.current()?;
        let timeframe = filter.timeframe;
        let key = QueryKey::timeframe_scoped("latest-valid-signal", timeframe);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch_polled(
                "latest-valid-signal",
                &key,
                LATEST_POLL,
                move || -> FetchFuture<Option<TradeSignal>> {
                    let service = Arc::clone(&service);
                    Box::pin(async move {
                        let row = service
                            .maybe_single(
                                SelectQuery::new(COLLECTION)
                                    .eq("timeframe", timeframe.as_str())
                                    .not_null("signal_type")
                                    .neq("signal_type", "NONE")
                                    .order_desc("candle_time"),
                            )
                            .await?;
                        row.map(serde_json::from_value).transpose().map_err(SdkError::from)
                    })
                },
            )
            .await;
        Ok(snap)
    }

    /// Signal totals since UTC midnight for the active timeframe.
    ///
    /// `total` is a server-side count; `actionable` filters a fetched slice
    /// client-side, since the count mode cannot express the combined
    /// type-present-and-not-NONE predicate.
    pub async fn today(&self) -> Result<QuerySnapshot<SignalsToday>, SdkError> {
        let filter = self.client.filters.current()?;
        let timeframe = filter.timeframe;
        let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let key =
            QueryKey::timeframe_scoped("signals-today", timeframe).push(day_start.to_rfc3339());

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch_polled(
                "signals-today",
                &key,
                TODAY_POLL,
                move || -> FetchFuture<SignalsToday> {
                    let service = Arc::clone(&service);
                    Box::pin(async move {
                        let base = SelectQuery::new(COLLECTION)
                            .eq("timeframe", timeframe.as_str())
                            .since("candle_time", day_start);

                        let total = service.count(base.clone()).await?;
                        let rows = service.select(base.limit(TODAY_SLICE_LIMIT)).await?;
                        let signals: Vec<TradeSignal> = rows_into(rows)?;
                        Ok(SignalsToday {
                            total,
                            actionable: count_actionable(&signals) as u64,
                        })
                    })
                },
            )
            .await;
        Ok(snap)
    }
}
