use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::models::ReadingSet;

/// Width of the trend chart. Older points fall off the front.
pub const MAX_CHART_POINTS: usize = 12;

/// The first seeded point is labelled 8:00, then one per hour.
const SEED_START_HOUR: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: String,
    pub aqi: u32,
    pub moisture: u32,
}

impl ChartPoint {
    pub fn from_readings(readings: &ReadingSet) -> Self {
        Self {
            time: readings.timestamp.format("%H:%M").to_string(),
            aqi: readings.air_quality.round().max(0.0) as u32,
            moisture: readings.soil_moisture.round().max(0.0) as u32,
        }
    }
}

/// Rolling air-quality and soil-moisture trend shared between the relay
/// task and whoever builds snapshots.
#[derive(Clone)]
pub struct ChartHistory {
    inner: Arc<Mutex<HistoryState>>,
}

struct HistoryState {
    points: VecDeque<ChartPoint>,
    recorded: u64,
}

impl ChartHistory {
    pub fn empty() -> Self {
        Self::from_points(Vec::new())
    }

    /// Twelve hourly points of plausible backdrop data, so the chart has
    /// something to draw before the first tick lands.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let points = (0..MAX_CHART_POINTS)
            .map(|i| ChartPoint {
                time: format!("{}:00", i + SEED_START_HOUR),
                aqi: rng.gen_range(20..60),
                moisture: rng.gen_range(50..80),
            })
            .collect();
        Self::from_points(points)
    }

    fn from_points(points: Vec<ChartPoint>) -> Self {
        let mut points: VecDeque<ChartPoint> = points.into();
        while points.len() > MAX_CHART_POINTS {
            points.pop_front();
        }
        Self {
            inner: Arc::new(Mutex::new(HistoryState {
                points,
                recorded: 0,
            })),
        }
    }

    pub async fn record(&self, readings: &ReadingSet) {
        let mut state = self.inner.lock().await;
        state.recorded += 1;
        state.points.push_back(ChartPoint::from_readings(readings));
        if state.points.len() > MAX_CHART_POINTS {
            state.points.pop_front();
        }
    }

    pub async fn points(&self) -> Vec<ChartPoint> {
        self.inner.lock().await.points.iter().cloned().collect()
    }

    /// Live points recorded since creation; seeds don't count.
    pub async fn recorded(&self) -> u64 {
        self.inner.lock().await.recorded
    }
}
