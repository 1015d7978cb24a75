//! Content-addressed cache for rendered strategy boards.
//!
//! Provides:
//! - Durable `<hash>.webp` storage on the local filesystem
//! - An in-memory LRU tier for recently served boards
//! - In-flight coalescing, so concurrent identical requests share one render

pub mod cache;
pub mod key;
pub mod memory_cache;
pub mod store;

pub use cache::{
    CacheStats, CacheStatsSnapshot, OfflineRender, RenderCache, RenderPipeline,
    DEFAULT_RENDER_TIMEOUT,
};
pub use key::CacheKey;
pub use memory_cache::{MemoryCache, MemoryCacheSnapshot, MemoryCacheStats};
pub use store::RenderStore;
