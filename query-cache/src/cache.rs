use crate::{QueryKey, QueryOptions, QueryState};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use moka::future::Cache;
use shared::Result;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V>>>;

#[derive(Clone, Debug)]
struct CachedQuery<V> {
    data: V,
    fetched_at: Instant,
    updated_at: DateTime<Utc>,
    invalidated: bool,
}

impl<V> CachedQuery<V> {
    fn fresh(data: V) -> Self {
        Self {
            data,
            fetched_at: Instant::now(),
            updated_at: Utc::now(),
            invalidated: false,
        }
    }

    fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated || self.fetched_at.elapsed() >= stale_time
    }
}

struct InFlight<V> {
    id: u64,
    fetch: SharedFetch<V>,
}

/// Builder for [`QueryCache`]
#[derive(Debug, Clone, Default)]
pub struct QueryCacheBuilder {
    name: Option<String>,
    max_entries: Option<u64>,
    gc_time: Option<Duration>,
    default_stale_time: Duration,
}

impl QueryCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Upper bound on cached queries.
    pub fn max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Evict queries nobody has read for this long.
    pub fn gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = Some(gc_time);
        self
    }

    /// Staleness window used when a call does not pass its own.
    pub fn default_stale_time(mut self, stale_time: Duration) -> Self {
        self.default_stale_time = stale_time;
        self
    }

    /// The gc time is raised to the default stale time when it is shorter, so
    /// an entry is never evicted while it still counts as fresh.
    pub fn build<V>(self) -> QueryCache<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        let mut builder = Cache::<QueryKey, CachedQuery<V>>::builder();

        if let Some(name) = &self.name {
            builder = builder.name(name);
        }

        if let Some(capacity) = self.max_entries {
            builder = builder.max_capacity(capacity);
        }

        if let Some(gc_time) = self.gc_time {
            if gc_time < self.default_stale_time {
                debug!(
                    ?gc_time,
                    stale_time = ?self.default_stale_time,
                    "gc time shorter than stale time, using stale time"
                );
            }
            builder = builder.time_to_idle(gc_time.max(self.default_stale_time));
        }

        QueryCache {
            entries: builder.build(),
            in_flight: Arc::new(DashMap::new()),
            observers: Arc::new(DashMap::new()),
            next_fetch_id: Arc::new(AtomicU64::new(0)),
            default_stale_time: self.default_stale_time,
        }
    }
}

/// Keyed cache of fetched results.
///
/// - a key has at most one fetch in flight; concurrent callers join it
/// - fresh entries are served without fetching
/// - stale entries are served immediately while a background fetch refreshes them
/// - invalidation marks entries stale by key prefix and detaches fetches that
///   were already running, so the next read goes to the network again
pub struct QueryCache<V> {
    entries: Cache<QueryKey, CachedQuery<V>>,
    in_flight: Arc<DashMap<QueryKey, InFlight<V>>>,
    observers: Arc<DashMap<QueryKey, watch::Sender<QueryState<V>>>>,
    next_fetch_id: Arc<AtomicU64>,
    default_stale_time: Duration,
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Unbounded cache where everything is stale as soon as it lands.
    pub fn new() -> Self {
        QueryCacheBuilder::new().build()
    }

    pub fn default_stale_time(&self) -> Duration {
        self.default_stale_time
    }

    /// Read a query through the cache.
    ///
    /// Fresh data is returned as is. Stale data is returned immediately with
    /// status `Fetching` while a refetch runs in the background. Without data
    /// the call waits for the fetch to settle.
    pub async fn query<F, Fut>(
        &self,
        key: QueryKey,
        options: &QueryOptions<V>,
        fetcher: F,
    ) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let stale_time = options.stale_time.unwrap_or(self.default_stale_time);

        if !options.enabled {
            return self.state(&key, stale_time).await;
        }

        match self.entries.get(&key).await {
            Some(entry) if !entry.is_stale(stale_time) => {
                debug!("Cache hit for {}", key);
                QueryState::success(entry.data, entry.updated_at, false)
            }
            Some(entry) => {
                debug!("Serving stale {} while revalidating", key);
                let fetch = self.start_fetch(&key, fetcher);
                let options = options.clone();
                tokio::spawn(async move {
                    let result = fetch.await;
                    options.notify(&result);
                });

                let mut state = QueryState::success(entry.data, entry.updated_at, true);
                state.begin_fetch();
                state
            }
            None => {
                let result = self.start_fetch(&key, fetcher).await;
                options.notify(&result);
                match result {
                    Ok(data) => QueryState::success(data, Utc::now(), false),
                    Err(error) => {
                        let mut state = QueryState::idle();
                        state.fail(error);
                        state
                    }
                }
            }
        }
    }

    /// Return fresh data, fetching (or joining the running fetch) otherwise.
    pub async fn fetch_query<F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Option<Duration>,
        fetcher: F,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let stale_time = stale_time.unwrap_or(self.default_stale_time);

        if let Some(entry) = self.entries.get(&key).await {
            if !entry.is_stale(stale_time) {
                debug!("Cache hit for {}", key);
                return Ok(entry.data);
            }
        }

        self.start_fetch(&key, fetcher).await
    }

    /// Current snapshot of a key without fetching.
    pub async fn state(&self, key: &QueryKey, stale_time: Duration) -> QueryState<V> {
        let mut state = match self.entries.get(key).await {
            Some(entry) => {
                let is_stale = entry.is_stale(stale_time);
                QueryState::success(entry.data, entry.updated_at, is_stale)
            }
            None => QueryState::idle(),
        };

        if self.is_fetching(key) {
            state.begin_fetch();
        }

        state
    }

    pub async fn get_query_data(&self, key: &QueryKey) -> Option<V> {
        self.entries.get(key).await.map(|entry| entry.data)
    }

    /// Store data as if it had just been fetched.
    pub async fn set_query_data(&self, key: QueryKey, data: V) {
        let entry = CachedQuery::fresh(data);
        let state = QueryState::success(entry.data.clone(), entry.updated_at, false);
        self.entries.insert(key.clone(), entry).await;
        self.publish(&key, |current| *current = state);
    }

    /// Mark every entry under `prefix` stale and detach fetches still running
    /// for those keys. Returns the number of entries marked.
    pub async fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let matching: Vec<(QueryKey, CachedQuery<V>)> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, entry)| (QueryKey::clone(&key), entry))
            .collect();

        self.in_flight.retain(|key, _| !key.starts_with(prefix));

        let count = matching.len();
        for (key, mut entry) in matching {
            entry.invalidated = true;
            self.entries.insert(key.clone(), entry).await;
            self.publish(&key, |state| state.is_stale = true);
        }

        debug!("Invalidated {} queries under {}", count, prefix);
        count
    }

    /// Observe every state change of `key`.
    pub async fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState<V>> {
        if let Some(sender) = self.observers.get(key) {
            return sender.subscribe();
        }

        let initial = self.state(key, self.default_stale_time).await;
        self.observers
            .entry(key.clone())
            .or_insert_with(|| watch::channel(initial).0)
            .subscribe()
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Drop every entry and detach every running fetch.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.in_flight.clear();
        for observer in self.observers.iter() {
            observer.send_replace(QueryState::idle());
        }
    }

    fn start_fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> SharedFetch<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        if let Some(running) = self.join_in_flight(key) {
            return running;
        }

        // Built outside the map lock; a fetcher may touch the cache.
        let request = fetcher();

        let fetch = match self.in_flight.entry(key.clone()) {
            // Another caller got in between; `request` is dropped unpolled.
            Entry::Occupied(running) => {
                debug!("Joining in-flight fetch for {}", key);
                return running.get().fetch.clone();
            }
            Entry::Vacant(slot) => {
                let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                debug!("Fetching {} (fetch #{})", key, id);

                let cache = self.clone();
                let fetch_key = key.clone();
                let fetch = async move {
                    let result = request.await;
                    cache.settle(fetch_key, id, &result).await;
                    result
                }
                .boxed()
                .shared();

                slot.insert(InFlight {
                    id,
                    fetch: fetch.clone(),
                });
                fetch
            }
        };

        self.publish(key, QueryState::begin_fetch);

        // Drive the fetch to completion even if every caller goes away.
        tokio::spawn(fetch.clone());
        fetch
    }

    fn join_in_flight(&self, key: &QueryKey) -> Option<SharedFetch<V>> {
        let running = self.in_flight.get(key)?;
        debug!("Joining in-flight fetch for {}", key);
        Some(running.fetch.clone())
    }

    async fn settle(&self, key: QueryKey, id: u64, result: &Result<V>) {
        if !self.is_current_fetch(&key, id) {
            debug!("Discarding result of detached fetch #{} for {}", id, key);
            if !self.is_fetching(&key) {
                self.publish(&key, QueryState::finish_detached);
            }
            return;
        }

        match result {
            Ok(data) => {
                let entry = CachedQuery::fresh(data.clone());
                let state = QueryState::success(data.clone(), entry.updated_at, false);
                self.entries.insert(key.clone(), entry).await;
                self.publish(&key, |current| *current = state);
            }
            Err(error) => {
                warn!("Fetch for {} failed: {}", key, error);
                self.publish(&key, |current| current.fail(error.clone()));
            }
        }

        let still_current = self
            .in_flight
            .remove_if(&key, |_, running| running.id == id)
            .is_some();

        // Invalidated between the check above and the insert.
        if !still_current && result.is_ok() {
            if let Some(mut entry) = self.entries.get(&key).await {
                entry.invalidated = true;
                self.entries.insert(key.clone(), entry).await;
                self.publish(&key, |state| state.is_stale = true);
            }
        }
    }

    fn is_current_fetch(&self, key: &QueryKey, id: u64) -> bool {
        self.in_flight
            .get(key)
            .is_some_and(|running| running.id == id)
    }

    fn publish(&self, key: &QueryKey, update: impl FnOnce(&mut QueryState<V>)) {
        self.observers
            .remove_if(key, |_, sender| sender.receiver_count() == 0);

        if let Some(sender) = self.observers.get(key) {
            sender.send_modify(update);
        }
    }
}

impl<V> Default for QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            in_flight: self.in_flight.clone(),
            observers: self.observers.clone(),
            next_fetch_id: self.next_fetch_id.clone(),
            default_stale_time: self.default_stale_time,
        }
    }
}

impl<V> Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.entries.entry_count())
            .field("in_flight", &self.in_flight.len())
            .field("default_stale_time", &self.default_stale_time)
            .finish()
    }
}
