use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::models::SensorFrame;

use super::simulator::{advance, DriftSource};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

// Import the logging macros (exported at crate root)
use crate::{log_debug, log_info};

/// Fixed simulation cadence.
pub const SIMULATION_PERIOD: Duration = Duration::from_secs(5);

/// Owns the reading set for the lifetime of the loop. Each tick builds the
/// next frame in full and swaps it into the channel, so readers never see a
/// half-updated set.
pub async fn sensing_loop(
    initial: SensorFrame,
    mut drift: Box<dyn DriftSource>,
    period: Duration,
    publisher: watch::Sender<SensorFrame>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; readings only move after a full period.
    ticker.tick().await;

    let mut current = initial;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let readings = advance(&current.readings, drift.as_mut(), Utc::now());
                let next = SensorFrame::new(readings, current.tick + 1);

                if next.mood != current.mood {
                    log_info!("mood changed {} -> {} at tick {}", current.mood, next.mood, next.tick);
                }
                log_debug!(
                    "tick {}: air={:.1} gas={:.1} soil={:.2} vibration={:.1} mood={}",
                    next.tick,
                    next.readings.air_quality,
                    next.readings.harmful_gas,
                    next.readings.soil_moisture,
                    next.readings.vibration,
                    next.mood
                );

                publisher.send_replace(next.clone());
                current = next;
            }
            _ = cancel_token.cancelled() => {
                log_info!("sensing loop shutting down after {} ticks", current.tick);
                break;
            }
        }
    }
}
