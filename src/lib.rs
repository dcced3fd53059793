//! # Signalscope SDK
//!
//! Rust client SDK for the Signalscope trading-signal dashboard: a read-only
//! data-synchronization layer over the engine's queryable data service. The
//! engine computes candles, market-structure features, trade signals and AI
//! reasoning elsewhere; this crate turns the user's view filter (timeframe +
//! date range) into coherent, cached, correctly-joined live feeds.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — shared newtypes, domain slices (candles, features, signals,
//!    AI logs, events), error taxonomy
//! 2. **Filter state** — injected provider/handle pair parameterizing every
//!    query
//! 3. **Data service** — boundary trait + REST implementation with retry
//! 4. **Query cache** — keyed coalescing, staleness windows, pollers
//! 5. **High-Level Client** — `SignalscopeClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use signalscope_sdk::prelude::*;
//!
//! let client = SignalscopeClient::builder()
//!     .base_url("https://data.signalscope.dev")
//!     .build()?;
//!
//! let candles = client.candles().with_features(100).await?;
//! let today = client.signals().today().await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes used across all domains.
pub mod shared;

/// Domain modules (vertical slices): row types, pure transforms, sub-clients.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: Filter state ────────────────────────────────────────────────────

/// Shared view-filter state: provider, handle, quick ranges.
pub mod filters;

// ── Layer 3: Data service ────────────────────────────────────────────────────

/// Data-service boundary trait + REST implementation.
pub mod service;

// ── Layer 4: Query cache ─────────────────────────────────────────────────────

/// Query cache engine: coalescing, staleness, polling.
pub mod cache;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `SignalscopeClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::Timeframe;

    // Filter state
    pub use crate::filters::{DateRange, FilterHandle, FilterProvider, QuickRange, ViewFilter};

    // Domain types
    pub use crate::domain::ai_log::{group_by_day, AiLog, DayGroup};
    pub use crate::domain::candle::{
        join_candles_with_features, Candle, CandleWithFeatures,
    };
    pub use crate::domain::event::{EventType, SystemEvent};
    pub use crate::domain::feature::{FvgSummary, MarketFeature};
    pub use crate::domain::signal::{
        count_actionable, Direction, SignalKind, SignalsToday, TradeSignal,
    };

    // Errors
    pub use crate::error::{FilterError, HttpError, SdkError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // Data service
    pub use crate::service::{Condition, DataService, RestDataService, SelectQuery};
    pub use crate::service::retry::RetryConfig;

    // Cache
    pub use crate::cache::{CacheConfig, QueryCache, QueryKey, QuerySnapshot};

    // High-level client + sub-clients
    pub use crate::client::{SignalscopeClient, SignalscopeClientBuilder};
    pub use crate::domain::ai_log::client::AiLogs;
    pub use crate::domain::candle::client::Candles;
    pub use crate::domain::event::client::Events;
    pub use crate::domain::feature::client::Features;
    pub use crate::domain::signal::client::Signals;
}
