use std::time::Duration;
use async_trait::async_trait;
use crate::error::Error;
use crate::models::WindowCount;

/// Keyed fixed-window counters.
///
/// The in-process implementation loses everything on restart; a shared store
/// can be swapped in behind this trait without touching call sites.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current count, or `None` if the key has no live window.
    async fn current(&self, key: &str) -> Result<Option<WindowCount>, Error>;

    /// Adds one hit, opening a new `window` if the old one expired.
    async fn increment(&self, key: &str, window: Duration) -> Result<WindowCount, Error>;

    async fn reset(&self, key: &str) -> Result<(), Error>;

    /// Drops expired keys; returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, Error>;
}
