//! Render service configuration.
//!
//! Shared by the HTTP server and the prerender tool, so both read the same
//! cache directory and produce byte-identical boards.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use board_renderer::DEFAULT_WEBP_QUALITY;

/// Options controlling how boards are rendered and cached.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    /// Directory holding rendered `<hash>.webp` files
    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Directory holding backgrounds, object images and fonts
    #[arg(long, env = "ASSET_DIR", default_value = "assets")]
    pub asset_dir: PathBuf,

    /// Lossy WebP quality (0-100)
    #[arg(long, env = "WEBP_QUALITY", default_value_t = DEFAULT_WEBP_QUALITY)]
    pub webp_quality: f32,

    /// Upper bound on a single render, in seconds
    #[arg(long, env = "RENDER_TIMEOUT_SECS", default_value_t = 30)]
    pub render_timeout_secs: u64,

    /// In-memory cache of recently served boards, in megabytes (0 disables)
    #[arg(long, env = "MEMORY_CACHE_MB", default_value_t = 64)]
    pub memory_cache_mb: usize,
}

impl RenderConfig {
    /// Configuration rooted at explicit directories, with default tuning.
    pub fn new(cache_dir: impl Into<PathBuf>, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            asset_dir: asset_dir.into(),
            webp_quality: DEFAULT_WEBP_QUALITY,
            render_timeout_secs: 30,
            memory_cache_mb: 64,
        }
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        render: RenderConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.render.webp_quality, 80.0);
        assert_eq!(cli.render.render_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--cache-dir",
            "/tmp/boards",
            "--render-timeout-secs",
            "0",
            "--memory-cache-mb",
            "0",
        ]);
        assert_eq!(cli.render.cache_dir, PathBuf::from("/tmp/boards"));
        assert_eq!(cli.render.render_timeout(), Duration::from_secs(1));
        assert_eq!(cli.render.memory_cache_mb, 0);
    }
}
