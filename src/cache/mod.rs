//! Query cache engine — keyed, coalesced, staleness-managed fetches.
//!
//! Every dashboard query goes through one [`QueryCache`]. A query is
//! identified by its [`QueryKey`] (stream id + filter components + extra
//! params); the engine guarantees:
//!
//! - at most one in-flight fetch per key — concurrent identical requests
//!   coalesce onto the same underlying call;
//! - immediate stale reads — an existing entry is served while a background
//!   revalidation runs;
//! - a freshness window (default 30 s) after each settle, inside which reads
//!   are served from cache without touching the network;
//! - optional fixed-interval polling per logical stream, replacing the
//!   poller whenever its key changes;
//! - in-flight responses for an invalidated key generation are discarded on
//!   arrival, never committed over newer state.
//!
//! The cache map is owned exclusively by the engine. Consumers only receive
//! [`QuerySnapshot`] values: `{data, error, is_loading}`.

mod key;
mod snapshot;
mod store;

pub use key::QueryKey;
pub use snapshot::QuerySnapshot;
pub use store::{CacheConfig, QueryCache};

/// Boxed fetch future, the return type of fetcher closures handed to
/// [`QueryCache::fetch`] (closures cannot name unboxed `async` types).
pub type FetchFuture<T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<T, crate::error::SdkError>> + Send>>;
