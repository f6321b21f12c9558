// File: gzsurvey-core/src/rate_limit/memory.rs

use std::time::Duration;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;
use gzsurvey_common::models::WindowCount;
use gzsurvey_common::traits::CounterStore;
use crate::Error;

/// Expired keys are swept at most this often from the increment path, on top
/// of the periodic maintenance task.
const INLINE_PURGE_EVERY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    hits: u32,
    started: Instant,
    length: Duration,
}

impl Window {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }

    fn count(&self, now: Instant) -> WindowCount {
        WindowCount {
            hits: self.hits,
            resets_in: self.length.saturating_sub(now.duration_since(self.started)),
        }
    }
}

/// Process-local counters. State is lost on restart and is not shared
/// between instances.
pub struct InMemoryCounterStore {
    windows: DashMap<String, Window>,
    last_purge: Mutex<Instant>,
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
            last_purge: Mutex::new(Instant::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| !w.is_expired(now));
        *self.last_purge.lock() = now;
        before.saturating_sub(self.windows.len())
    }

    fn maybe_sweep(&self, now: Instant) {
        let due = now.duration_since(*self.last_purge.lock()) >= INLINE_PURGE_EVERY;
        if due {
            let removed = self.sweep(now);
            if removed > 0 {
                debug!("Rate limit store: swept {} expired keys inline", removed);
            }
        }
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn current(&self, key: &str) -> Result<Option<WindowCount>, Error> {
        let now = Instant::now();
        Ok(self
            .windows
            .get(key)
            .filter(|w| !w.is_expired(now))
            .map(|w| w.count(now)))
    }

    async fn increment(&self, key: &str, window: Duration) -> Result<WindowCount, Error> {
        let now = Instant::now();
        self.maybe_sweep(now);

        // The entry guard holds the shard lock, so read-modify-write is atomic per key.
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            hits: 0,
            started: now,
            length: window,
        });
        if entry.is_expired(now) {
            *entry = Window { hits: 0, started: now, length: window };
        }
        entry.hits = entry.hits.saturating_add(1);
        Ok(entry.count(now))
    }

    async fn reset(&self, key: &str) -> Result<(), Error> {
        self.windows.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, Error> {
        Ok(self.sweep(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn window_counts_up_then_resets_after_expiry() {
        let store = InMemoryCounterStore::new();
        let minute = Duration::from_secs(60);

        assert_eq!(store.increment("k", minute).await.unwrap().hits, 1);
        assert_eq!(store.increment("k", minute).await.unwrap().hits, 2);

        tokio::time::advance(Duration::from_secs(59)).await;
        let c = store.current("k").await.unwrap().unwrap();
        assert_eq!(c.hits, 2);
        assert_eq!(c.resets_in, Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.current("k").await.unwrap().is_none());
        assert_eq!(store.increment("k", minute).await.unwrap().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired_keys() {
        let store = InMemoryCounterStore::new();
        store.increment("short", Duration::from_secs(10)).await.unwrap();
        store.increment("long", Duration::from_secs(900)).await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.current("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn reset_forgets_the_key() {
        let store = InMemoryCounterStore::new();
        store.increment("k", Duration::from_secs(60)).await.unwrap();
        store.reset("k").await.unwrap();
        assert!(store.current("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
