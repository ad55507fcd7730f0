//! Trimkit - headless trimming session
//!
//! Usage: `trimkit [MEDIA_FILE] [--config PATH]`
//!
//! Without a media file a synthetic one-minute asset is used.

mod config;
mod script;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use trimkit_core::MediaSource;
use trimkit_media::MediaAsset;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Trimkit starting...");

    let mut media_path = None;
    let mut config_path = AppConfig::default_path();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = Some(PathBuf::from(args.next().context("--config needs a path")?));
        } else {
            media_path = Some(PathBuf::from(arg));
        }
    }

    let config = match &config_path {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };

    trimkit_media::init();

    let source: Arc<dyn MediaSource> = match media_path {
        Some(path) => Arc::new(
            MediaAsset::open(&path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Arc::new(script::demo_asset(60.0)?),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let report = script::run(runtime.handle().clone(), &config, source, Duration::from_millis(500))?;

    info!(
        range_start = report.range.0,
        range_end = report.range.1,
        trimmed = report.trimmed_duration,
        seeks_issued = report.seeks.issued,
        seeks_superseded = report.seeks.superseded,
        "Trim complete"
    );
    Ok(())
}
