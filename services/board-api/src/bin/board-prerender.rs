//! Offline board prerenderer.
//!
//! Renders board codes into the shared cache directory and prints one JSON
//! line per code with its hash and thumbnail. Codes come from the command
//! line, or from stdin (one per line) when none are given.

use anyhow::{bail, Result};
use clap::Parser;
use std::io::BufRead;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use board_api::{AppState, RenderConfig};

#[derive(Parser, Debug)]
#[command(name = "board-prerender")]
#[command(about = "Render board codes into the cache and print their thumbnails")]
struct Args {
    /// Board codes to render (read from stdin when omitted)
    codes: Vec<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    render: RenderConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    // stdout carries the results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let codes = if args.codes.is_empty() {
        let lines = std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()?;
        clean_codes(lines)
    } else {
        clean_codes(args.codes)
    };

    let state = AppState::new(&args.render)?;
    let mut failures = 0usize;

    for code in &codes {
        let code = state.code_or_default(Some(code.as_str()));
        match state.cache.resolve_offline(code).await {
            Ok(result) => {
                let line = serde_json::json!({
                    "code": code,
                    "hash": result.hash,
                    "thumbnail": result.thumbnail,
                });
                println!("{}", line);
            }
            Err(e) => {
                error!(code = %code, error = %e, "Prerender failed");
                failures += 1;
            }
        }
    }

    info!(total = codes.len(), failures, "Prerender finished");
    if failures > 0 {
        bail!("{} of {} codes failed to render", failures, codes.len());
    }
    Ok(())
}

/// Trim surrounding whitespace and drop blank entries, matching how the HTTP
/// endpoints read codes.
fn clean_codes(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}
