//! Process-wide TTL cache shielding the pipeline from request storms.
//!
//! Values are stored as JSON snapshots so one cache instance serves every
//! catalog type. Expiry is checked lazily on read; there is no background
//! sweeper because key cardinality is bounded by the handful of catalogs
//! tracked. Concurrent callers hitting the same cold or expired key may both
//! invoke the producer — a documented relaxation (upstream calls are
//! idempotent reads), not a bug; the producer runs outside the lock.

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// Time source, injectable so tests can control expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry {
    value: serde_json::Value,
    expires_at: DateTime<Utc>,
}

/// Keyed store with per-entry expiry
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Return the cached value for `key` if fresh, otherwise run `producer`,
    /// store its result for `ttl`, and return it.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if self.clock.now() < entry.expires_at {
                    // A snapshot that no longer decodes is treated as a miss
                    if let Ok(value) = serde_json::from_value(entry.value.clone()) {
                        debug!(key, "cache hit");
                        return Ok(value);
                    }
                }
            }
        }

        debug!(key, "cache miss");
        let value = producer().await?;
        let snapshot = serde_json::to_value(&value)?;

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: snapshot,
                expires_at: self.clock.now() + ttl,
            },
        );

        Ok(value)
    }

    /// Drop a specific key
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop every key starting with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) {
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(prefix));
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}
