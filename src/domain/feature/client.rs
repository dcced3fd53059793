//! Features sub-client — per-window rows, FVG totals, single-candle lookup.

use crate::cache::{FetchFuture, QueryKey, QuerySnapshot};
use crate::client::SignalscopeClient;
use crate::domain::feature::{FvgSummary, MarketFeature, COLLECTION};
use crate::error::SdkError;
use crate::service::{rows_into, SelectQuery};
use crate::shared::Timeframe;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

const ACTIVE_FVGS_POLL: Duration = Duration::from_secs(60);

/// Sub-client for market-feature queries.
pub struct Features<'a> {
    pub(crate) client: &'a SignalscopeClient,
}

impl Features<'_> {
    /// All feature rows inside the active filter window. Unordered — the
    /// join attaches them to candles by timestamp, so ordering is the candle
    /// stream's concern.
    pub async fn list(&self) -> Result<QuerySnapshot<Vec<MarketFeature>>, SdkError> {
        let filter = self.client.filters.current()?;
        let key = QueryKey::scoped("features", &filter);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch(&key, move || -> FetchFuture<Vec<MarketFeature>> {
                let service = Arc::clone(&service);
                let filter = filter.clone();
                Box::pin(async move {
                    let rows = service
                        .select(
                            SelectQuery::new(COLLECTION)
                                .eq("timeframe", filter.timeframe.as_str())
                                .time_range("candle_time", &filter.range),
                        )
                        .await?;
                    rows_into(rows)
                })
            })
            .await;
        Ok(snap)
    }

    /// Unresolved fair-value-gap counts for the window, one count-only query
    /// per direction, refreshed every minute.
    pub async fn active_fvgs(&self) -> Result<QuerySnapshot<FvgSummary>, SdkError> {
        let filter = self.client.filters.current()?;
        let key = QueryKey::scoped("active-fvgs", &filter);

        let service = Arc::clone(&self.client.service);
        let snap = self
            .client
            .cache
            .fetch_polled(
                "active-fvgs",
                &key,
                ACTIVE_FVGS_POLL,
                move || -> FetchFuture<FvgSummary> {
                    let service = Arc::clone(&service);
                    let filter = filter.clone();
                    Box::pin(async move {
                        let base = SelectQuery::new(COLLECTION)
                            .eq("timeframe", filter.timeframe.as_str())
                            .eq_bool("fvg_resolved", false)
                            .time_range("candle_time", &filter.range);

                        let up = service.count(base.clone().eq_bool("fvg_up", true)).await?;
                        let down = service.count(base.eq_bool("fvg_down", true)).await?;
                        Ok(FvgSummary {
                            up,
                            down,
                            total: up + down,
                        })
                    })
                },
            )
            .await;
        Ok(snap)
    }

    /// The feature row for one specific candle key, if the engine wrote one.
    pub async fn by_candle(
        &self,
        timeframe: Timeframe,
        candle_time: DateTime<Utc>,
    ) -> QuerySnapshot<Option<MarketFeature>> {
        let key = QueryKey::timeframe_scoped("features-by-candle", timeframe)
            .push(candle_time.to_rfc3339());

        let service = Arc::clone(&self.client.service);
        self.client
            .cache
            .fetch(&key, move || -> FetchFuture<Option<MarketFeature>> {
                let service = Arc::clone(&service);
                Box::pin(async move {
                    let row = service
                        .maybe_single(
                            SelectQuery::new(COLLECTION)
                                .eq("timeframe", timeframe.as_str())
                                .eq("candle_time", candle_time.to_rfc3339()),
                        )
                        .await?;
                    row.map(serde_json::from_value).transpose().map_err(SdkError::from)
                })
            })
            .await
    }
}
