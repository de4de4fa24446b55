use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Catalog,
    Content(Uuid),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Catalog => write!(f, "catalog"),
            CacheKey::Content(id) => write!(f, "content:{}", id),
        }
    }
}

/// A stored value with its expiry deadline
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-process TTL cache for catalog reads
///
/// Key to (value, expiry) map with no size bound: entries leave the map when a
/// `get` finds them expired or when the periodic sweep removes them. Values are
/// stored as JSON so callers can cache any serializable type.
#[derive(Clone)]
pub struct TtlCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    default_ttl: Duration,
}

/// Handle for gracefully shutting down the cache sweeper
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SweeperHandle {
    /// Stops the periodic sweep task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache sweeper shutdown signal sent");
    }
}

impl TtlCache {
    /// Creates a cache and spawns its background sweep task
    ///
    /// The sweep task removes expired entries every `sweep_interval` so that
    /// keys nobody reads again do not accumulate.
    pub fn new(default_ttl: Duration, sweep_interval: Duration) -> (Self, SweeperHandle) {
        let cache = Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        };

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        tokio::spawn(Self::sweeper_task(
            cache.entries.clone(),
            sweep_interval,
            shutdown_rx,
        ));

        let handle = SweeperHandle { shutdown_tx };

        (cache, handle)
    }

    /// Background task that periodically removes expired entries
    async fn sweeper_task(
        entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
        sweep_interval: Duration,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!(interval_ms = sweep_interval.as_millis() as u64, "Cache sweeper started");
        let mut interval = tokio::time::interval(sweep_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Instant::now();
                    let mut map = entries.write().await;
                    let before = map.len();
                    map.retain(|_, entry| !entry.is_expired(now));
                    let swept = before - map.len();
                    if swept > 0 {
                        tracing::debug!(swept, remaining = map.len(), "Swept expired cache entries");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache sweeper task stopped");
                    break;
                }
            }
        }
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a miss. An expired entry counts as a miss and is
    /// evicted on the spot.
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let key = format!("{}", key);
        let now = Instant::now();

        {
            let map = self.entries.read().await;
            match map.get(&key) {
                Some(entry) if !entry.is_expired(now) => {
                    let data = serde_json::from_str(&entry.value).map_err(|e| {
                        AppError::Internal(format!("Cache deserialization error: {}", e))
                    })?;
                    return Ok(Some(data));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: evict under the write lock, re-checking in case a fresh
        // value was stored since the read lock was released.
        let mut map = self.entries.write().await;
        if map.get(&key).is_some_and(|entry| entry.is_expired(now)) {
            map.remove(&key);
        }
        Ok(None)
    }

    /// Stores a value with the given TTL, or the default when `None`
    pub async fn set<T: serde::Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let entry = CacheEntry {
            value: json,
            expires_at: Instant::now() + ttl.unwrap_or(self.default_ttl),
        };

        let mut map = self.entries.write().await;
        map.insert(format!("{}", key), entry);
        Ok(())
    }

    /// Number of entries currently stored, expired stragglers included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
