//! Candles sub-client — list, latest, and the joined per-candle view.

use crate::cache::{FetchFuture, QueryKey, QuerySnapshot};
use crate::client::SignalscopeClient;
use crate::domain::candle::{join_candles_with_features, Candle, CandleWithFeatures, COLLECTION};
use crate::error::SdkError;
use crate::service::{rows_into, SelectQuery};
use std::sync::Arc;
use std::time::Duration;

const LATEST_POLL: Duration = Duration::from_secs(30);

/// Sub-client for candle queries.
pub struct Candles<'a> {
    pub(crate) client: &'a SignalscopeClient,
}

impl Candles<'_> {
    /// Candles inside the active filter window, most recent first.
    pub async fn list(&self, limit: u32) -> Result<QuerySnapshot<Vec<Candle>>, SdkError> {
        let filter = self.client.filters.current()?;
        let key = QueryKey::scoped("candles", &filter).push(limit);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch(&key, move || -> FetchFuture<Vec<Candle>> {
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

    /// Candles joined with their feature rows.
    ///
    /// The two streams are cached independently; the join runs per read. A
    /// failed (or still-loading) feature stream degrades to candles with no
    /// features attached — only a failed candle stream fails the view.
    pub async fn with_features(
        &self,
        limit: u32,
    ) -> Result<QuerySnapshot<Vec<CandleWithFeatures>>, SdkError> {
        let candles = self.list(limit).await?;
        let Some(candle_rows) = &candles.data else {
            return Ok(QuerySnapshot {
                data: None,
                error: candles.error,
                is_loading: candles.is_loading,
            });
        };

        let features = self.client.features().list().await?;
        if let Some(error) = &features.error {
            tracing::warn!(%error, "feature stream unavailable, serving candles without features");
        }
        let feature_rows = features.data.as_deref().map(Vec::as_slice).unwrap_or(&[]);

        Ok(QuerySnapshot::ready(Arc::new(join_candles_with_features(
            candle_rows,
            feature_rows,
        ))))
    }

    /// Most recent candle for the active timeframe, kept live on a 30 s poll.
    pub async fn latest(&self) -> Result<QuerySnapshot<Option<Candle>>, SdkError> {
        let filter = self.client.filters.current()?;
        let timeframe = filter.timeframe;
        let key = QueryKey::timeframe_scoped("latest-candle", timeframe);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch_polled(
                "latest-candle",
                &key,
                LATEST_POLL,
                move || -> FetchFuture<Option<Candle>> {
                    let service = Arc::clone(&service);
                    Box::pin(async move {
                        let row = service
                            .maybe_single(
                                SelectQuery::new(COLLECTION)
                                    .eq("timeframe", timeframe.as_str())
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
}
