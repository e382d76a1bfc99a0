use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use crate::dashboard::{DashboardController, LogEvents};
use crate::insight::{GeminiClient, InsightService};
use crate::media::{EncodedImage, HealthScan, StillImageSource};
use crate::settings::{SettingsStore, SETTINGS_FILE_NAME};

/// Runs the plant dashboard in the terminal, narrating every tick.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "florasoul", version, about)]
pub struct HeadlessOptions {
    /// Stop after this many simulator ticks (default: run until Ctrl-C)
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Leaf photo to scan and attach to the first insight request
    #[arg(long, value_name = "IMAGE")]
    pub scan: Option<PathBuf>,

    /// Send one message to Flora before the dashboard starts
    #[arg(long, value_name = "TEXT")]
    pub say: Option<String>,

    /// Settings file (default: ./florasoul.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub async fn run(options: HeadlessOptions) -> Result<()> {
    let config_path = options
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
    let settings = SettingsStore::new(config_path)?;
    let insight = settings.insight();
    let client = GeminiClient::new(&insight).context("Failed to build insight client")?;
    if !client.has_api_key() {
        warn!("No insight API key configured; set GEMINI_API_KEY for real answers");
    }
    let dashboard = DashboardController::new(InsightService::new(client, insight.timeout()), LogEvents);

    let image = options.scan.as_deref().and_then(scan_still_image);
    dashboard.request_insight(image).await;

    if let Some(thought) = options.say.as_deref() {
        if let Err(err) = dashboard.companion_reply(thought).await {
            warn!("Skipped message: {err}");
        }
    }

    dashboard.start().await?;
    let outcome = wait_for_ticks(&dashboard, options.ticks).await;
    dashboard.stop().await?;
    outcome
}

/// Blocks until `ticks` more frames arrive, or Ctrl-C.
async fn wait_for_ticks(
    dashboard: &DashboardController<GeminiClient, LogEvents>,
    ticks: Option<u64>,
) -> Result<()> {
    let mut frames = dashboard.subscribe();
    let target = ticks.map(|n| frames.borrow().tick + n);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if let Some(target) = target {
            if frames.borrow_and_update().tick >= target {
                return Ok(());
            }
        }
        tokio::select! {
            changed = frames.changed() => {
                changed.context("sensing stopped unexpectedly")?;
            }
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

/// Open, capture, analyze. Any media failure is reported and the insight
/// goes out without a photo.
fn scan_still_image(path: &Path) -> Option<EncodedImage> {
    let mut scan = HealthScan::new(Arc::new(StillImageSource::new(path)));
    match scan.open().and_then(|()| scan.capture()) {
        Ok(_) => {
            info!("Captured leaf photo from {}", path.display());
            scan.analyze()
        }
        Err(err) => {
            warn!("{} ({err})", err.notice());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let options = HeadlessOptions::try_parse_from([
            "florasoul",
            "--ticks",
            "3",
            "--scan",
            "leaf.jpg",
            "--say",
            "hello Flora",
            "--config",
            "/tmp/florasoul.json",
        ])
        .unwrap();
        assert_eq!(options.ticks, Some(3));
        assert_eq!(options.scan, Some(PathBuf::from("leaf.jpg")));
        assert_eq!(options.say.as_deref(), Some("hello Flora"));
        assert_eq!(options.config, Some(PathBuf::from("/tmp/florasoul.json")));
    }

    #[test]
    fn no_flags_runs_forever() {
        let options = HeadlessOptions::try_parse_from(["florasoul"]).unwrap();
        assert!(options.ticks.is_none());
        assert!(options.scan.is_none());
    }

    #[test]
    fn rejects_non_numeric_ticks() {
        assert!(HeadlessOptions::try_parse_from(["florasoul", "--ticks", "soon"]).is_err());
    }

    #[test]
    fn missing_scan_image_yields_no_photo() {
        assert!(scan_still_image(Path::new("/definitely/not/here.png")).is_none());
    }

    #[test]
    fn scan_reads_a_real_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([30, 160, 60]))
            .save(&path)
            .unwrap();
        let image = scan_still_image(&path).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
    }
}
