use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default interval between background sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

/// Stand-in for an absent user id in cache keys.
pub const NULL_USER_SENTINEL: &str = "null";

/// Build the cache key for a (flag, user) pair: `"{flag_key}:{user_id}"`.
///
/// An absent user maps to `"{flag_key}:null"`. Keys stay unique as long as flag
/// keys contain no `:`, which holds for the slug-style keys the admin API issues.
pub fn build_cache_key(flag_key: &str, user_id: Option<&str>) -> String {
    format!("{}:{}", flag_key, user_id.unwrap_or(NULL_USER_SENTINEL))
}

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // An entry exactly `ttl` old is still valid.
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

type Store<V> = Arc<RwLock<HashMap<String, CacheEntry<V>>>>;

struct CleanupTask {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    fn stop(self) {
        let _ = self.shutdown_tx.try_send(());
        self.handle.abort();
    }
}

/// In-memory cache with a fixed TTL.
///
/// Expired entries are dropped lazily by [`get`](Self::get) and by a background
/// sweep running every cleanup interval. The sweep is a tokio task owned by
/// this cache; it never keeps the runtime alive and is stopped by
/// [`shutdown`](Self::shutdown) or on drop.
pub struct LocalCache<V> {
    entries: Store<V>,
    ttl: Duration,
    cleanup: Mutex<Option<CleanupTask>>,
}

impl<V: Clone + Send + Sync + 'static> LocalCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_cleanup_interval(ttl, DEFAULT_CLEANUP_INTERVAL)
    }

    /// Create a cache whose background sweep runs every `cleanup_interval`.
    ///
    /// Without a current tokio runtime, or with a zero interval, no sweep is
    /// started; expired entries are then only dropped on read or by
    /// [`purge_expired`](Self::purge_expired).
    pub fn with_cleanup_interval(ttl: Duration, cleanup_interval: Duration) -> Self {
        let entries: Store<V> = Arc::new(RwLock::new(HashMap::new()));
        let cleanup = Self::start_cleanup(Arc::clone(&entries), ttl, cleanup_interval);

        Self {
            entries,
            ttl,
            cleanup: Mutex::new(cleanup),
        }
    }

    fn start_cleanup(entries: Store<V>, ttl: Duration, interval: Duration) -> Option<CleanupTask> {
        if interval.is_zero() {
            tracing::warn!("Zero cleanup interval, cache sweep disabled");
            return None;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No tokio runtime available, cache sweep disabled");
                return None;
            }
        };

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let first_tick = Instant::now() + interval;

        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Cache sweep shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = purge(&entries, ttl);
                        if removed > 0 {
                            tracing::trace!(removed, "Cache sweep removed expired entries");
                        }
                    }
                }
            }
        });

        tracing::debug!("Cache sweep started with interval {:?}", interval);

        Some(CleanupTask {
            shutdown_tx,
            handle,
        })
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(self.ttl, now) => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock, a concurrent set may have refreshed it
        let mut entries = self.entries.write();
        if entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(self.ttl, now))
        {
            entries.remove(key);
        }

        None
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.entries.write().insert(key.into(), CacheEntry::new(value));
    }

    pub fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Run one sweep pass now. Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries, self.ttl)
    }

    /// Stop the background sweep and drop every entry.
    pub fn shutdown(&self) {
        if let Some(task) = self.cleanup.lock().take() {
            task.stop();
            tracing::debug!("Cache sweep stopped");
        }
        self.clear();
    }
}

impl<V> Drop for LocalCache<V> {
    fn drop(&mut self) {
        if let Some(task) = self.cleanup.get_mut().take() {
            task.stop();
        }
    }
}

fn purge<V>(entries: &RwLock<HashMap<String, CacheEntry<V>>>, ttl: Duration) -> usize {
    let now = Instant::now();
    let mut entries = entries.write();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(ttl, now));
    before - entries.len()
}
