//! In-memory LRU tier for rendered boards.
//!
//! Sits in front of the durable store so hot boards are served without a
//! disk read. Entries are never authoritative: anything evicted here is still
//! on disk.
//!
//! ## Memory-Based Eviction
//!
//! The cache is bounded by bytes, not entries. When an insert would exceed
//! the limit, ~5% of the limit (by memory) is evicted in LRU order in a single
//! batch.

use bytes::Bytes;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::info;

use crate::key::CacheKey;

/// LruCache needs an entry limit; eviction is driven by bytes instead.
const LRU_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1_000_000) {
    Some(n) => n,
    None => panic!("capacity must be non-zero"),
};

/// Byte-bounded LRU cache keyed by [`CacheKey`].
pub struct MemoryCache {
    cache: Mutex<LruCache<CacheKey, Bytes>>,
    max_bytes: u64,
    stats: MemoryCacheStats,
}

/// Counters for the memory tier.
#[derive(Debug, Default)]
pub struct MemoryCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub eviction_runs: AtomicU64,
    pub size_bytes: AtomicU64,
    pub entry_count: AtomicU64,
}

/// Point-in-time copy of [`MemoryCacheStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemoryCacheSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub eviction_runs: u64,
    pub size_bytes: u64,
    pub entry_count: u64,
    pub max_bytes: u64,
}

impl MemoryCacheSnapshot {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl MemoryCache {
    /// Create a cache holding at most `max_size_mb` megabytes of render output.
    /// A limit of zero disables the tier.
    pub fn new(max_size_mb: usize) -> Self {
        Self::with_max_bytes((max_size_mb as u64) * 1024 * 1024)
    }

    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(LRU_CAPACITY)),
            max_bytes,
            stats: MemoryCacheStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_bytes > 0
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        if !self.is_enabled() {
            return None;
        }

        let mut cache = self.cache.lock().await;
        match cache.get(key) {
            Some(data) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(data.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert a render. Entries larger than the whole limit are not cached.
    pub async fn insert(&self, key: CacheKey, data: Bytes) {
        let size = data.len() as u64;
        if !self.is_enabled() || size > self.max_bytes {
            return;
        }

        let mut cache = self.cache.lock().await;

        if let Some(existing) = cache.pop(&key) {
            self.stats
                .size_bytes
                .fetch_sub(existing.len() as u64, Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
        }

        if self.stats.size_bytes.load(Ordering::Relaxed) + size > self.max_bytes {
            self.evict_batch_locked(&mut cache, size);
        }

        cache.put(key, data);
        self.stats.size_bytes.fetch_add(size, Ordering::Relaxed);
        self.stats.entry_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Evict at least ~5% of the limit, and at least enough to fit `incoming`.
    fn evict_batch_locked(&self, cache: &mut LruCache<CacheKey, Bytes>, incoming: u64) {
        let current = self.stats.size_bytes.load(Ordering::Relaxed);
        let needed = (current + incoming).saturating_sub(self.max_bytes);
        let target_free = needed.max(self.max_bytes / 20);

        let mut bytes_freed = 0u64;
        let mut entries_evicted = 0u64;
        while bytes_freed < target_free {
            match cache.pop_lru() {
                Some((_, evicted)) => {
                    bytes_freed += evicted.len() as u64;
                    entries_evicted += 1;
                }
                None => break,
            }
        }

        self.stats
            .size_bytes
            .fetch_sub(bytes_freed, Ordering::Relaxed);
        self.stats
            .entry_count
            .fetch_sub(entries_evicted, Ordering::Relaxed);
        self.stats
            .evictions
            .fetch_add(entries_evicted, Ordering::Relaxed);
        self.stats.eviction_runs.fetch_add(1, Ordering::Relaxed);

        info!(
            entries_evicted = entries_evicted,
            bytes_freed_mb = format!("{:.2}", bytes_freed as f64 / (1024.0 * 1024.0)),
            max_size_mb = format!("{:.2}", self.max_bytes as f64 / (1024.0 * 1024.0)),
            "Memory cache batch eviction completed"
        );
    }

    pub fn snapshot(&self) -> MemoryCacheSnapshot {
        MemoryCacheSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            eviction_runs: self.stats.eviction_runs.load(Ordering::Relaxed),
            size_bytes: self.stats.size_bytes.load(Ordering::Relaxed),
            entry_count: self.stats.entry_count.load(Ordering::Relaxed),
            max_bytes: self.max_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.stats.entry_count.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
