//! REST implementation of the data-service boundary.
//!
//! The hosted data service speaks a PostgREST-style dialect: one collection
//! per URL path segment, filters as `column=op.value` query parameters,
//! `order`/`limit` parameters, and a `Prefer: count=exact` header for
//! count-only reads (the total comes back in `Content-Range`).

use crate::error::HttpError;
use crate::service::retry::RetryConfig;
use crate::service::{Condition, DataService, SelectQuery};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// [`DataService`] over the engine's REST API.
pub struct RestDataService {
    base_url: String,
    client: Client,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl RestDataService {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            api_key: None,
            retry: RetryConfig::default(),
        })
    }

    /// Attach the service role key sent as `apikey` + bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn url_for(&self, query: &SelectQuery) -> String {
        let qs = query_string(query);
        if qs.is_empty() {
            format!("{}/{}", self.base_url, query.collection)
        } else {
            format!("{}/{}?{}", self.base_url, query.collection, qs)
        }
    }

    fn headers(&self, count_only: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            if let Ok(value) = HeaderValue::from_str(key) {
                headers.insert("apikey", value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {key}")) {
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
        }
        if count_only {
            headers.insert("Prefer", HeaderValue::from_static("count=exact"));
        }
        headers
    }

    async fn request_with_retry(
        &self,
        method: Method,
        url: &str,
        count_only: bool,
    ) -> Result<reqwest::Response, HttpError> {
        let mut last_error = None;

        for attempt in 0..=self.retry.max_retries {
            match self.do_request(method.clone(), url, count_only).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            self.retry.retryable_statuses.contains(status)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                futures_timer::Delay::new(Duration::from_millis(*ms)).await;
                            }
                            true
                        }
                        HttpError::Timeout => true,
                        HttpError::Reqwest(re) => re.is_connect() || re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < self.retry.max_retries {
                        let delay = self.retry.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = self.retry.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: self.retry.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request(
        &self,
        method: Method,
        url: &str,
        count_only: bool,
    ) -> Result<reqwest::Response, HttpError> {
        let resp = self
            .client
            .request(method, url)
            .headers(self.headers(count_only))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout
                } else {
                    HttpError::Reqwest(e)
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let status_code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => HttpError::Unauthorized,
            StatusCode::NOT_FOUND => HttpError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => HttpError::RateLimited { retry_after_ms: None },
            s if s.is_client_error() => HttpError::QueryRejected(body),
            _ => HttpError::ServerError {
                status: status_code,
                body,
            },
        })
    }
}

#[async_trait]
impl DataService for RestDataService {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, HttpError> {
        let url = self.url_for(&query);
        let resp = self.request_with_retry(Method::GET, &url, false).await?;
        let rows = resp.json::<Vec<Value>>().await?;
        Ok(rows)
    }

    async fn count(&self, query: SelectQuery) -> Result<u64, HttpError> {
        let url = self.url_for(&query);
        let resp = self.request_with_retry(Method::HEAD, &url, true).await?;
        let range = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| HttpError::InvalidResponse("missing Content-Range".to_string()))?;
        parse_content_range_total(range)
    }
}

/// Render a query as the service's filter dialect.
fn query_string(query: &SelectQuery) -> String {
    let mut parts = Vec::with_capacity(query.conditions.len() + 2);
    for condition in &query.conditions {
        match condition {
            Condition::Eq(col, v) => parts.push(format!("{col}=eq.{}", urlencoding::encode(v))),
            Condition::Neq(col, v) => parts.push(format!("{col}=neq.{}", urlencoding::encode(v))),
            Condition::NotNull(col) => parts.push(format!("{col}=not.is.null")),
            Condition::In(col, vs) => {
                let encoded: Vec<_> = vs.iter().map(|v| urlencoding::encode(v).into_owned()).collect();
                parts.push(format!("{col}=in.({})", encoded.join(",")));
            }
            Condition::Gte(col, v) => parts.push(format!("{col}=gte.{}", urlencoding::encode(v))),
            Condition::Lte(col, v) => parts.push(format!("{col}=lte.{}", urlencoding::encode(v))),
        }
    }
    if let Some(col) = query.order_desc {
        parts.push(format!("order={col}.desc"));
    }
    if let Some(limit) = query.limit {
        parts.push(format!("limit={limit}"));
    }
    parts.join("&")
}

/// `Content-Range: 0-24/3573` (or `*/0` for an empty set) — the total sits
/// after the slash.
fn parse_content_range_total(range: &str) -> Result<u64, HttpError> {
    range
        .rsplit('/')
        .next()
        .and_then(|total| total.parse::<u64>().ok())
        .ok_or_else(|| HttpError::InvalidResponse(format!("unparseable Content-Range: {range}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_query_string_renders_filters_order_and_limit() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let q = SelectQuery::new("candles_raw")
            .eq("timeframe", "15m")
            .since("candle_time", from)
            .order_desc("candle_time")
            .limit(100);

        assert_eq!(
            query_string(&q),
            "timeframe=eq.15m&candle_time=gte.2025-01-01T00%3A00%3A00%2B00%3A00&order=candle_time.desc&limit=100"
        );
    }

    #[test]
    fn test_query_string_negation_and_in() {
        let q = SelectQuery::new("trade_signals")
            .not_null("signal_type")
            .neq("signal_type", "NONE")
            .in_any("event_type", vec!["info".into(), "error".into()]);

        assert_eq!(
            query_string(&q),
            "signal_type=not.is.null&signal_type=neq.NONE&event_type=in.(info,error)"
        );
    }

    #[test]
    fn test_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573").unwrap(), 3573);
        assert_eq!(parse_content_range_total("*/0").unwrap(), 0);
        assert!(parse_content_range_total("garbage").is_err());
    }
}
