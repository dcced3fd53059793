//! The cache store: slots, coalescing, revalidation, pollers.

use crate::cache::key::QueryKey;
use crate::cache::snapshot::QuerySnapshot;
use crate::error::SdkError;
use async_lock::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a settled entry (success or failure) is served without
    /// triggering a new fetch.
    pub freshness: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(30),
        }
    }
}

type Payload = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct SlotState {
    value: Option<Payload>,
    error: Option<Arc<SdkError>>,
    /// Last successful commit.
    value_at: Option<Instant>,
    /// Last failed commit.
    error_at: Option<Instant>,
    /// Bumped by `invalidate`; in-flight responses for an older generation
    /// are discarded on arrival instead of committed.
    generation: u64,
    fetching: bool,
}

struct Slot {
    state: RwLock<SlotState>,
    done: Notify,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: RwLock::new(SlotState::default()),
            done: Notify::new(),
        }
    }
}

struct PollEntry {
    key: QueryKey,
    handle: JoinHandle<()>,
}

struct CacheInner {
    slots: RwLock<HashMap<QueryKey, Arc<Slot>>>,
    /// One poller per logical stream id. Re-registering under a changed key
    /// replaces the task, so an abandoned key stops being polled.
    pollers: Mutex<HashMap<&'static str, PollEntry>>,
    config: CacheConfig,
}

impl CacheInner {
    async fn slot(&self, key: &QueryKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().await.get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key.clone()).or_insert_with(|| Arc::new(Slot::new())))
    }
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        if let Some(mut pollers) = self.pollers.try_lock() {
            for (_, entry) in pollers.drain() {
                entry.handle.abort();
            }
        }
    }
}

/// The query cache. Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

enum Decision {
    Serve,
    Wait,
    Fetch(u64),
    Revalidate(u64),
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: RwLock::new(HashMap::new()),
                pollers: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Read the entry for `key`, fetching through `fetcher` when the entry is
    /// missing or its freshness window has elapsed.
    ///
    /// A missing entry awaits the (coalesced) fetch; a stale entry is
    /// returned immediately while one background revalidation runs.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> QuerySnapshot<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, SdkError>> + Send + 'static,
    {
        let freshness = self.inner.config.freshness;
        let slot = self.inner.slot(key).await;

        loop {
            let decision = {
                let mut s = slot.state.write().await;
                if is_fresh(&s, freshness) {
                    Decision::Serve
                } else if s.fetching {
                    if s.value.is_some() || s.error.is_some() {
                        Decision::Serve
                    } else {
                        Decision::Wait
                    }
                } else {
                    s.fetching = true;
                    if s.value.is_some() {
                        Decision::Revalidate(s.generation)
                    } else {
                        Decision::Fetch(s.generation)
                    }
                }
            };

            match decision {
                Decision::Serve => {
                    let s = slot.state.read().await;
                    return snapshot_of(&s, freshness, key);
                }
                Decision::Wait => {
                    let notified = slot.done.notified();
                    tokio::pin!(notified);
                    notified.as_mut().enable();
                    // The fetch may have settled between dropping the state
                    // lock and registering the waiter.
                    if slot.state.read().await.fetching {
                        notified.await;
                    }
                }
                Decision::Fetch(generation) => {
                    run_fetch(&slot, key, generation, &fetcher).await;
                }
                Decision::Revalidate(generation) => {
                    let snap = {
                        let s = slot.state.read().await;
                        snapshot_of(&s, freshness, key)
                    };
                    let slot = Arc::clone(&slot);
                    let key = key.clone();
                    let fetcher = fetcher.clone();
                    tokio::spawn(async move {
                        run_fetch(&slot, &key, generation, &fetcher).await;
                    });
                    return snap;
                }
            }
        }
    }

    /// Like [`QueryCache::fetch`], additionally keeping a fixed-interval
    /// poller alive for the logical stream `id`. The poller refetches `key`
    /// every `every` regardless of staleness; registering the same `id` with
    /// a different key (filter change) replaces the old poller.
    pub async fn fetch_polled<T, F, Fut>(
        &self,
        id: &'static str,
        key: &QueryKey,
        every: Duration,
        fetcher: F,
    ) -> QuerySnapshot<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, SdkError>> + Send + 'static,
    {
        self.ensure_poller(id, key, every, fetcher.clone()).await;
        self.fetch(key, fetcher).await
    }

    async fn ensure_poller<T, F, Fut>(
        &self,
        id: &'static str,
        key: &QueryKey,
        every: Duration,
        fetcher: F,
    ) where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, SdkError>> + Send + 'static,
    {
        let mut pollers = self.inner.pollers.lock().await;
        if let Some(entry) = pollers.get(id) {
            if entry.key == *key {
                return;
            }
            tracing::debug!(poll = id, old = %entry.key, new = %key, "replacing poller");
            entry.handle.abort();
        }

        let weak = Arc::downgrade(&self.inner);
        let poll_key = key.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The registering call performs the first fetch itself.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let slot = inner.slot(&poll_key).await;
                let generation = {
                    let mut s = slot.state.write().await;
                    if s.fetching {
                        continue;
                    }
                    s.fetching = true;
                    s.generation
                };
                run_fetch(&slot, &poll_key, generation, &fetcher).await;
            }
        });

        pollers.insert(id, PollEntry { key: key.clone(), handle });
    }

    /// Mark the entry stale and discard any in-flight response for it. The
    /// cached value is kept for stale reads until a new fetch settles.
    pub async fn invalidate(&self, key: &QueryKey) {
        let slot = { self.inner.slots.read().await.get(key).cloned() };
        if let Some(slot) = slot {
            let mut s = slot.state.write().await;
            s.generation = s.generation.wrapping_add(1);
            s.value_at = None;
            s.error = None;
            s.error_at = None;
        }
    }

    /// Drop every entry and stop all pollers.
    pub async fn clear(&self) {
        self.inner.slots.write().await.clear();
        let mut pollers = self.inner.pollers.lock().await;
        for (_, entry) in pollers.drain() {
            entry.handle.abort();
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

fn is_fresh(state: &SlotState, freshness: Duration) -> bool {
    let last = match (state.value_at, state.error_at) {
        (Some(v), Some(e)) => Some(v.max(e)),
        (v, e) => v.or(e),
    };
    last.map(|t| t.elapsed() < freshness).unwrap_or(false)
}

/// Project the slot into the consumer-facing shape.
///
/// A cached value wins while it is inside the freshness window, or while no
/// newer failure exists (stale reads). Once the value has expired *and* a
/// newer failure is recorded, the failure surfaces instead.
fn snapshot_of<T: Send + Sync + 'static>(
    state: &SlotState,
    freshness: Duration,
    key: &QueryKey,
) -> QuerySnapshot<T> {
    let value_fresh = state
        .value_at
        .map(|t| t.elapsed() < freshness)
        .unwrap_or(false);
    let error_newer = match (state.error_at, state.value_at) {
        (Some(e), Some(v)) => e > v,
        (Some(_), None) => true,
        _ => false,
    };

    if let Some(value) = &state.value {
        if value_fresh || !error_newer {
            return match Arc::clone(value).downcast::<T>() {
                Ok(data) => QuerySnapshot::ready(data),
                Err(_) => {
                    tracing::error!(%key, "cache payload type mismatch");
                    QuerySnapshot::failed(Arc::new(SdkError::Other(format!(
                        "cache payload type mismatch for key {key}"
                    ))))
                }
            };
        }
    }
    if let Some(error) = &state.error {
        return QuerySnapshot::failed(Arc::clone(error));
    }
    QuerySnapshot::loading()
}

async fn run_fetch<T, F, Fut>(slot: &Arc<Slot>, key: &QueryKey, generation: u64, fetcher: &F)
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, SdkError>>,
{
    let result = fetcher().await;
    {
        let mut s = slot.state.write().await;
        s.fetching = false;
        if s.generation != generation {
            tracing::debug!(%key, "discarding response for superseded query");
        } else {
            match result {
                Ok(value) => {
                    s.value = Some(Arc::new(value));
                    s.value_at = Some(Instant::now());
                    s.error = None;
                    s.error_at = None;
                }
                Err(error) => {
                    tracing::debug!(%key, %error, "query fetch failed");
                    s.error = Some(Arc::new(error));
                    s.error_at = Some(Instant::now());
                }
            }
        }
    }
    slot.done.notify_waiters();
}
