//! AI-logs sub-client — window listing, recent ticker, 24 h volume.

use crate::cache::{FetchFuture, QueryKey, QuerySnapshot};
use crate::client::SignalscopeClient;
use crate::domain::ai_log::{AiLog, COLLECTION};
use crate::error::SdkError;
use crate::service::{rows_into, SelectQuery};
use chrono::{Duration as ChronoDuration, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;

const RECENT_POLL: Duration = Duration::from_secs(30);
const TODAY_COUNT_POLL: Duration = Duration::from_secs(60);

/// Sub-client for AI reasoning-log queries.
pub struct AiLogs<'a> {
    pub(crate) client: &'a SignalscopeClient,
}

impl AiLogs<'_> {
    /// Logs inside the active filter window, most recent first.
    pub async fn list(&self, limit: u32) -> Result<QuerySnapshot<Vec<AiLog>>, SdkError> {
        let filter = self.client.filters.current()?;
        let key = QueryKey::scoped("ai-logs", &filter).push(limit);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch(&key, move || -> FetchFuture<Vec<AiLog>> {
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

    /// Latest N logs for the timeframe regardless of the date range — the
    /// dashboard's live ticker, refreshed every 30 s.
    pub async fn recent(&self, limit: u32) -> Result<QuerySnapshot<Vec<AiLog>>, SdkError> {
        let filter = self.client.filters.current()?;
        let timeframe = filter.timeframe;
        let key = QueryKey::timeframe_scoped("recent-ai-logs", timeframe).push(limit);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch_polled(
                "recent-ai-logs",
                &key,
                RECENT_POLL,
                move || -> FetchFuture<Vec<AiLog>> {
                    let service = Arc::clone(&service);
                    Box::pin(async move {
                        let rows = service
                            .select(
                                SelectQuery::new(COLLECTION)
                                    .eq("timeframe", timeframe.as_str())
                                    .order_desc("candle_time")
                                    .limit(limit),
                            )
                            .await?;
                        rows_into(rows)
                    })
                },
            )
            .await;
        Ok(snap)
    }

    /// Count of logs in the trailing 24 hours for the active timeframe.
    ///
    /// The window start is truncated to the minute so repeated reads inside
    /// a minute share one cache entry instead of minting a key per call.
    pub async fn today_count(&self) -> Result<QuerySnapshot<u64>, SdkError> {
        let filter = self.client.filters.current()?;
        let timeframe = filter.timeframe;
        let since = Utc::now() - ChronoDuration::hours(24);
        let since = since
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(since);
        let key =
            QueryKey::timeframe_scoped("ai-logs-today", timeframe).push(since.to_rfc3339());

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch_polled(
                "ai-logs-today",
                &key,
                TODAY_COUNT_POLL,
                move || -> FetchFuture<u64> {
                    let service = Arc::clone(&service);
                    Box::pin(async move {
                        let count = service
                            .count(
                                SelectQuery::new(COLLECTION)
                                    .eq("timeframe", timeframe.as_str())
                                    .since("candle_time", since),
                            )
                            .await?;
                        Ok(count)
                    })
                },
            )
            .await;
        Ok(snap)
    }
}
