use log::info;

use super::state::{DashboardSnapshot, InsightState};

pub const READINGS_CHANGED: &str = "readings-changed";
pub const INSIGHT_CHANGED: &str = "insight-changed";

/// Where dashboard updates go: the webview in the desktop shell, the log in
/// the headless one.
pub trait DashboardEvents: Send + Sync + 'static {
    fn readings_changed(&self, snapshot: &DashboardSnapshot);
    fn insight_changed(&self, insight: &InsightState);
}

/// Headless sink that narrates every update at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEvents;

impl DashboardEvents for LogEvents {
    fn readings_changed(&self, snapshot: &DashboardSnapshot) {
        let r = &snapshot.readings;
        info!(
            "[tick {}] {} {} air={:.1}/100 gas={:.1}ppm soil={:.1}% vibration={:.1}/10 temp={:.1}°C humidity={:.0}% | {}",
            snapshot.tick,
            snapshot.profile.emoji,
            snapshot.mood,
            r.air_quality,
            r.harmful_gas,
            r.soil_moisture,
            r.vibration,
            r.temperature,
            r.humidity,
            snapshot.profile.message
        );
    }

    fn insight_changed(&self, insight: &InsightState) {
        if insight.is_refreshing {
            info!("Flora is thinking...");
        } else {
            info!("Flora says: {}", insight.text);
        }
    }
}

#[cfg(feature = "desktop")]
impl DashboardEvents for tauri::AppHandle {
    fn readings_changed(&self, snapshot: &DashboardSnapshot) {
        use tauri::Emitter;
        if let Err(err) = self.emit(READINGS_CHANGED, snapshot) {
            log::warn!("Failed to emit {}: {}", READINGS_CHANGED, err);
        }
    }

    fn insight_changed(&self, insight: &InsightState) {
        use tauri::Emitter;
        if let Err(err) = self.emit(INSIGHT_CHANGED, insight) {
            log::warn!("Failed to emit {}: {}", INSIGHT_CHANGED, err);
        }
    }
}
