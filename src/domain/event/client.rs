//! Events sub-client — filtered listing and the live latest-event badge.

use crate::cache::{FetchFuture, QueryKey, QuerySnapshot};
use crate::client::SignalscopeClient;
use crate::domain::event::{EventType, SystemEvent, COLLECTION};
use crate::error::SdkError;
use crate::service::{rows_into, SelectQuery};
use std::sync::Arc;
use std::time::Duration;

const LATEST_POLL: Duration = Duration::from_secs(10);

/// Sub-client for system-event queries.
pub struct Events<'a> {
    pub(crate) client: &'a SignalscopeClient,
}

impl Events<'_> {
    /// Events inside the active date range, most recent first, optionally
    /// restricted to a set of severities. Events ignore the timeframe — the
    /// range applies to `created_at`.
    pub async fn list(
        &self,
        limit: u32,
        event_types: &[EventType],
    ) -> Result<QuerySnapshot<Vec<SystemEvent>>, SdkError> {
        let filter = self.client.filters.current()?;
        let types: Vec<String> = event_types.iter().map(|t| t.as_str().to_string()).collect();
        let key = QueryKey::stream("system-events")
            .push(filter.range.from.to_rfc3339())
            .push(filter.range.to.to_rfc3339())
            .push(limit)
            .push(types.join(","));

        let service = Arc::clone(&self.client.service);
        let range = filter.range;
        let snap = self
            .client
            .cache
            .fetch(&key, move || -> FetchFuture<Vec<SystemEvent>> {
                let service = Arc::clone(&service);
                let types = types.clone();
                Box::pin(async move {
                    let mut query = SelectQuery::new(COLLECTION)
                        .time_range("created_at", &range)
                        .order_desc("created_at")
                        .limit(limit);
                    if !types.is_empty() {
                        query = query.in_any("event_type", types);
                    }
                    let rows = service.select(query).await?;
                    rows_into(rows)
                })
            })
            .await;
        Ok(snap)
    }

    /// Most recent event of any severity, refreshed every 10 s — the
    /// dashboard's health badge.
    pub async fn latest(&self) -> QuerySnapshot<Option<SystemEvent>> {
        let key = QueryKey::stream("latest-event");

        let service = Arc::clone(&self.client.service);
        self.client
            .cache
            .fetch_polled(
                "latest-event",
                &key,
                LATEST_POLL,
                move || -> FetchFuture<Option<SystemEvent>> {
                    let service = Arc::clone(&service);
                    Box::pin(async move {
                        let row = service
                            .maybe_single(
                                SelectQuery::new(COLLECTION).order_desc("created_at"),
                            )
                            .await?;
                        row.map(serde_json::from_value).transpose().map_err(SdkError::from)
                    })
                },
            )
            .await
    }
}
