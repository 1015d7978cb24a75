//! Application metrics collection and reporting.

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use render_cache::CacheStatsSnapshot;

/// Metrics collector for the board API.
#[derive(Debug)]
pub struct MetricsCollector {
    /// Request counts
    pub board_requests: AtomicU64,
    pub preview_requests: AtomicU64,
    pub prerender_requests: AtomicU64,
    pub conversion_requests: AtomicU64,

    /// Render stats
    pub renders_total: AtomicU64,
    pub render_errors: AtomicU64,
    pub decode_fallbacks: AtomicU64,

    /// Timing stats (stored as microseconds for atomic ops)
    render_times: RwLock<TimingStats>,

    /// Start time for uptime calculation
    start_time: Instant,
}

#[derive(Debug, Default)]
struct TimingStats {
    count: u64,
    total_us: u64,
    min_us: u64,
    max_us: u64,
    last_us: u64,
}

impl TimingStats {
    fn record(&mut self, duration_us: u64) {
        self.count += 1;
        self.total_us += duration_us;
        self.last_us = duration_us;
        if self.min_us == 0 || duration_us < self.min_us {
            self.min_us = duration_us;
        }
        if duration_us > self.max_us {
            self.max_us = duration_us;
        }
    }

    fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.total_us as f64 / self.count as f64) / 1000.0
        }
    }

    fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot {
            count: self.count,
            avg_ms: self.avg_ms(),
            min_ms: self.min_us as f64 / 1000.0,
            max_ms: self.max_us as f64 / 1000.0,
            last_ms: self.last_us as f64 / 1000.0,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            board_requests: AtomicU64::new(0),
            preview_requests: AtomicU64::new(0),
            prerender_requests: AtomicU64::new(0),
            conversion_requests: AtomicU64::new(0),
            renders_total: AtomicU64::new(0),
            render_errors: AtomicU64::new(0),
            decode_fallbacks: AtomicU64::new(0),
            render_times: RwLock::new(TimingStats::default()),
            start_time: Instant::now(),
        }
    }

    /// Record a board image request
    pub fn record_board_request(&self) {
        self.board_requests.fetch_add(1, Ordering::Relaxed);
        counter!("board_requests_total", "endpoint" => "board").increment(1);
    }

    pub fn record_preview_request(&self) {
        self.preview_requests.fetch_add(1, Ordering::Relaxed);
        counter!("board_requests_total", "endpoint" => "preview").increment(1);
    }

    pub fn record_prerender_request(&self) {
        self.prerender_requests.fetch_add(1, Ordering::Relaxed);
        counter!("board_requests_total", "endpoint" => "prerender").increment(1);
    }

    pub fn record_conversion_request(&self, direction: &'static str) {
        self.conversion_requests.fetch_add(1, Ordering::Relaxed);
        counter!("board_requests_total", "endpoint" => direction).increment(1);
    }

    /// A code that failed to decode and was rendered as the default board
    pub fn record_decode_fallback(&self) {
        self.decode_fallbacks.fetch_add(1, Ordering::Relaxed);
        counter!("board_decode_fallbacks_total").increment(1);
    }

    /// Record a render operation
    pub async fn record_render(&self, duration: Duration, success: bool) {
        self.renders_total.fetch_add(1, Ordering::Relaxed);
        counter!("board_renders_total").increment(1);
        if !success {
            self.render_errors.fetch_add(1, Ordering::Relaxed);
            counter!("board_render_errors_total").increment(1);
        }
        histogram!("board_render_duration_seconds").record(duration.as_secs_f64());

        let mut times = self.render_times.write().await;
        times.record(duration.as_micros() as u64);
    }

    /// Publish render cache counters as gauges
    pub fn record_cache_stats(&self, stats: &CacheStatsSnapshot) {
        gauge!("board_cache_requests").set(stats.requests as f64);
        gauge!("board_cache_memory_hits").set(stats.memory_hits as f64);
        gauge!("board_cache_disk_hits").set(stats.disk_hits as f64);
        gauge!("board_cache_coalesced_waiters").set(stats.coalesced_waiters as f64);
        gauge!("board_cache_in_flight").set(stats.in_flight as f64);
        gauge!("board_cache_memory_bytes").set(stats.memory.size_bytes as f64);
        gauge!("board_cache_memory_hit_rate_percent").set(stats.memory.hit_rate());
    }

    /// Get current metrics snapshot
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let render_times = self.render_times.read().await;
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            board_requests: self.board_requests.load(Ordering::Relaxed),
            preview_requests: self.preview_requests.load(Ordering::Relaxed),
            prerender_requests: self.prerender_requests.load(Ordering::Relaxed),
            conversion_requests: self.conversion_requests.load(Ordering::Relaxed),
            renders_total: self.renders_total.load(Ordering::Relaxed),
            render_errors: self.render_errors.load(Ordering::Relaxed),
            decode_fallbacks: self.decode_fallbacks.load(Ordering::Relaxed),
            render: render_times.snapshot(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimingSnapshot {
    pub count: u64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub last_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub board_requests: u64,
    pub preview_requests: u64,
    pub prerender_requests: u64,
    pub conversion_requests: u64,
    pub renders_total: u64,
    pub render_errors: u64,
    pub decode_fallbacks: u64,
    pub render: TimingSnapshot,
}
