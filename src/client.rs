//! High-level client — `SignalscopeClient` with nested sub-client accessors.
//!
//! Each stream has its own sub-client in `domain/<name>/client.rs`. This
//! module keeps the builder, the shared query cache, the filter handle, and
//! the accessor methods.

use crate::cache::{CacheConfig, QueryCache};
use crate::domain::ai_log::client::AiLogs;
use crate::domain::candle::client::Candles;
use crate::domain::event::client::Events;
use crate::domain::feature::client::Features;
use crate::domain::signal::client::Signals;
use crate::error::SdkError;
use crate::filters::{FilterHandle, FilterProvider};
use crate::service::{DataService, RestDataService};

use std::sync::Arc;
use std::time::Duration;

/// The primary entry point for the Signalscope SDK.
///
/// Provides nested sub-client accessors for each stream: `client.candles()`,
/// `client.signals()`, etc. Every query re-reads the active view filter, so
/// a filter change makes the next round of calls hit fresh cache keys.
pub struct SignalscopeClient {
    pub(crate) service: Arc<dyn DataService>,
    pub(crate) cache: QueryCache,
    pub(crate) filters: FilterHandle,
    /// Present when the client owns its own default provider (no external
    /// handle was injected).
    owned_filters: Option<FilterProvider>,
}

impl SignalscopeClient {
    pub fn builder() -> SignalscopeClientBuilder {
        SignalscopeClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn candles(&self) -> Candles<'_> {
        Candles { client: self }
    }

    pub fn features(&self) -> Features<'_> {
        Features { client: self }
    }

    pub fn signals(&self) -> Signals<'_> {
        Signals { client: self }
    }

    pub fn ai_logs(&self) -> AiLogs<'_> {
        AiLogs { client: self }
    }

    pub fn events(&self) -> Events<'_> {
        Events { client: self }
    }

    // ── Filter state ─────────────────────────────────────────────────────

    /// Handle onto the shared view filter.
    pub fn filters(&self) -> FilterHandle {
        self.filters.clone()
    }

    /// The client-owned filter provider, for mutating the view when no
    /// external provider was injected.
    pub fn filter_provider(&self) -> Option<&FilterProvider> {
        self.owned_filters.as_ref()
    }

    /// Drop every cached entry and stop all pollers.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct SignalscopeClientBuilder {
    base_url: String,
    api_key: Option<String>,
    freshness: Duration,
    service: Option<Arc<dyn DataService>>,
    filters: Option<FilterHandle>,
}

impl Default for SignalscopeClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            api_key: None,
            freshness: CacheConfig::default().freshness,
            service: None,
            filters: None,
        }
    }
}

impl SignalscopeClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Freshness window for cached entries.
    pub fn freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Inject a data service directly (in-memory implementations in tests).
    pub fn service(mut self, service: Arc<dyn DataService>) -> Self {
        self.service = Some(service);
        self
    }

    /// Share an application-owned filter provider instead of letting the
    /// client create its own.
    pub fn filter_handle(mut self, handle: FilterHandle) -> Self {
        self.filters = Some(handle);
        self
    }

    pub fn build(self) -> Result<SignalscopeClient, SdkError> {
        let service: Arc<dyn DataService> = match self.service {
            Some(service) => service,
            None => {
                let mut rest = RestDataService::new(&self.base_url)?;
                if let Some(key) = self.api_key {
                    rest = rest.with_api_key(key);
                }
                Arc::new(rest)
            }
        };

        let (filters, owned_filters) = match self.filters {
            Some(handle) => (handle, None),
            None => {
                let provider = FilterProvider::new();
                (provider.handle(), Some(provider))
            }
        };

        Ok(SignalscopeClient {
            service,
            cache: QueryCache::new(CacheConfig {
                freshness: self.freshness,
            }),
            filters,
            owned_filters,
        })
    }
}
