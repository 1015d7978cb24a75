//! Render cache with in-flight coalescing.
//!
//! Lookup order for a board code:
//!
//! 1. Memory tier (recently served renders)
//! 2. Durable store (`<hash>.webp`)
//! 3. In-flight registry: join a render already running for the same key
//! 4. Start a new render
//!
//! The registry check, store re-check and insert happen under one async lock.
//! The render itself runs in a spawned task that persists the result, warms
//! the memory tier and only then removes its registry entry. A caller that
//! finds neither a registry entry nor a file under the lock therefore knows
//! no render for that key is active or already finished.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use board_common::{BoardError, BoardResult};

use crate::key::CacheKey;
use crate::memory_cache::{MemoryCache, MemoryCacheSnapshot};
use crate::store::RenderStore;

/// Default upper bound on a single render.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns board codes into encoded images.
#[async_trait]
pub trait RenderPipeline: Send + Sync {
    /// Render a board code to WebP bytes.
    async fn render(&self, code: &str) -> BoardResult<Bytes>;

    /// Compact base64 placeholder for an encoded board.
    async fn thumbnail(&self, webp: &[u8]) -> BoardResult<String>;
}

type SharedRender = Shared<BoxFuture<'static, BoardResult<Bytes>>>;

/// Result of the offline (prerender) path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineRender {
    pub hash: String,
    pub thumbnail: String,
}

/// Cache counters. All fields are atomic for lock-free reads from metrics endpoints.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub requests: AtomicU64,
    pub memory_hits: AtomicU64,
    pub disk_hits: AtomicU64,
    pub coalesced_waiters: AtomicU64,
    pub renders_started: AtomicU64,
    pub renders_completed: AtomicU64,
    pub renders_failed: AtomicU64,
    pub offline_requests: AtomicU64,
}

/// Serializable view of the cache, served by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    pub requests: u64,
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub coalesced_waiters: u64,
    pub renders_started: u64,
    pub renders_completed: u64,
    pub renders_failed: u64,
    pub offline_requests: u64,
    pub in_flight: usize,
    pub memory: MemoryCacheSnapshot,
}

/// Content-addressed render cache.
pub struct RenderCache {
    pipeline: Arc<dyn RenderPipeline>,
    store: Arc<RenderStore>,
    memory: Arc<MemoryCache>,
    in_flight: Arc<Mutex<HashMap<CacheKey, SharedRender>>>,
    stats: Arc<CacheStats>,
    render_timeout: Duration,
}

impl RenderCache {
    /// Create a cache with no memory tier and the default render timeout.
    pub fn new(pipeline: Arc<dyn RenderPipeline>, store: RenderStore) -> Self {
        Self {
            pipeline,
            store: Arc::new(store),
            memory: Arc::new(MemoryCache::new(0)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(CacheStats::default()),
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    pub fn with_memory_cache(mut self, memory: MemoryCache) -> Self {
        self.memory = Arc::new(memory);
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn store(&self) -> &RenderStore {
        &self.store
    }

    /// Encoded board for `code`, rendering it at most once per key.
    #[instrument(skip(self, code), fields(hash))]
    pub async fn resolve(&self, code: &str) -> BoardResult<Bytes> {
        let key = CacheKey::from_code(code);
        tracing::Span::current().record("hash", key.as_str());
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(bytes) = self.lookup_completed(&key).await? {
            return Ok(bytes);
        }

        let render = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(existing) => {
                    self.stats.coalesced_waiters.fetch_add(1, Ordering::Relaxed);
                    debug!("Joining in-flight render");
                    existing.clone()
                }
                None => {
                    // The render may have completed since the lookup above.
                    if let Some(bytes) = self.store.get(&key).await? {
                        self.stats.disk_hits.fetch_add(1, Ordering::Relaxed);
                        return Ok(bytes);
                    }
                    let render = self.spawn_render(key.clone(), code.to_string());
                    in_flight.insert(key, render.clone());
                    render
                }
            }
        };

        render.await
    }

    /// Render (or reuse) a board and return its hash plus thumbnail.
    ///
    /// A board that is already stored is read back rather than re-rendered.
    #[instrument(skip(self, code))]
    pub async fn resolve_offline(&self, code: &str) -> BoardResult<OfflineRender> {
        self.stats.offline_requests.fetch_add(1, Ordering::Relaxed);
        let key = CacheKey::from_code(code);
        let bytes = self.resolve(code).await?;
        let thumbnail = self.pipeline.thumbnail(&bytes).await?;
        Ok(OfflineRender {
            hash: key.to_string(),
            thumbnail,
        })
    }

    /// Stored bytes for a previously rendered board.
    ///
    /// Malformed hashes are `InvalidParameter`; unknown ones are `Ok(None)`.
    pub async fn preview(&self, hash: &str) -> BoardResult<Option<Bytes>> {
        let key = CacheKey::parse(hash)?;
        self.lookup_completed(&key).await
    }

    /// Number of renders currently running.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    pub async fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            requests: self.stats.requests.load(Ordering::Relaxed),
            memory_hits: self.stats.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.stats.disk_hits.load(Ordering::Relaxed),
            coalesced_waiters: self.stats.coalesced_waiters.load(Ordering::Relaxed),
            renders_started: self.stats.renders_started.load(Ordering::Relaxed),
            renders_completed: self.stats.renders_completed.load(Ordering::Relaxed),
            renders_failed: self.stats.renders_failed.load(Ordering::Relaxed),
            offline_requests: self.stats.offline_requests.load(Ordering::Relaxed),
            in_flight: self.in_flight_count().await,
            memory: self.memory.snapshot(),
        }
    }

    async fn lookup_completed(&self, key: &CacheKey) -> BoardResult<Option<Bytes>> {
        if let Some(bytes) = self.memory.get(key).await {
            self.stats.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(bytes));
        }

        match self.store.get(key).await? {
            Some(bytes) => {
                self.stats.disk_hits.fetch_add(1, Ordering::Relaxed);
                self.memory.insert(key.clone(), bytes.clone()).await;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Start a render task for `key`. Must be called with the registry locked,
    /// and the returned handle inserted before the lock is released.
    fn spawn_render(&self, key: CacheKey, code: String) -> SharedRender {
        let pipeline = Arc::clone(&self.pipeline);
        let store = Arc::clone(&self.store);
        let memory = Arc::clone(&self.memory);
        let in_flight = Arc::clone(&self.in_flight);
        let stats = Arc::clone(&self.stats);
        let timeout = self.render_timeout;

        stats.renders_started.fetch_add(1, Ordering::Relaxed);
        debug!(hash = %key, "Starting render");

        let task = tokio::spawn(async move {
            let start = Instant::now();

            let result = match run_render(pipeline.as_ref(), &code, timeout).await {
                Ok(bytes) => store.put(&key, &bytes).await.map(|_| bytes),
                Err(e) => Err(e),
            };
            if let Ok(bytes) = &result {
                memory.insert(key.clone(), bytes.clone()).await;
            }
            in_flight.lock().await.remove(&key);

            match &result {
                Ok(bytes) => {
                    stats.renders_completed.fetch_add(1, Ordering::Relaxed);
                    info!(
                        hash = %key,
                        bytes = bytes.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Render completed"
                    );
                }
                Err(e) => {
                    stats.renders_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(hash = %key, error = %e, "Render failed");
                }
            }
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(BoardError::Internal(format!("render task aborted: {}", e))),
            }
        }
        .boxed()
        .shared()
    }
}

/// Run one render with the timeout applied and panics converted to errors.
async fn run_render(
    pipeline: &dyn RenderPipeline,
    code: &str,
    timeout: Duration,
) -> BoardResult<Bytes> {
    let render = AssertUnwindSafe(pipeline.render(code)).catch_unwind();
    match tokio::time::timeout(timeout, render).await {
        Err(_) => Err(BoardError::Timeout),
        Ok(Err(panic)) => Err(BoardError::Render(format!(
            "render panicked: {}",
            panic_message(panic.as_ref())
        ))),
        Ok(Ok(result)) => result,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
