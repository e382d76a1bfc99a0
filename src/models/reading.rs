use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mood::Mood;

/// One bundle of simulated environmental values at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSet {
    /// 0..=100, lower is cleaner.
    pub air_quality: f64,
    /// ppm, never negative.
    pub harmful_gas: f64,
    /// Percent, never negative. Only ever dries out.
    pub soil_moisture: f64,
    /// 0..=10.
    pub vibration: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percent.
    pub humidity: f64,
    pub timestamp: DateTime<Utc>,
}

impl ReadingSet {
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            air_quality: 22.0,
            harmful_gas: 12.0,
            soil_moisture: 65.0,
            vibration: 2.0,
            temperature: 24.5,
            humidity: 52.0,
            timestamp: now,
        }
    }
}

impl Default for ReadingSet {
    fn default() -> Self {
        Self::initial(Utc::now())
    }
}

/// What the sensing loop publishes each tick: the readings and the mood
/// derived from them, swapped in as a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorFrame {
    pub readings: ReadingSet,
    pub mood: Mood,
    pub tick: u64,
}

impl SensorFrame {
    pub fn new(readings: ReadingSet, tick: u64) -> Self {
        let mood = crate::mood::classify(&readings);
        Self {
            readings,
            mood,
            tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_readings_match_dashboard_defaults() {
        let now = Utc::now();
        let readings = ReadingSet::initial(now);
        assert_eq!(readings.air_quality, 22.0);
        assert_eq!(readings.harmful_gas, 12.0);
        assert_eq!(readings.soil_moisture, 65.0);
        assert_eq!(readings.vibration, 2.0);
        assert_eq!(readings.temperature, 24.5);
        assert_eq!(readings.humidity, 52.0);
        assert_eq!(readings.timestamp, now);
    }

    #[test]
    fn frame_derives_mood_from_readings() {
        let frame = SensorFrame::new(ReadingSet::initial(Utc::now()), 0);
        assert_eq!(frame.mood, Mood::Happy);
        assert_eq!(frame.tick, 0);
    }

    #[test]
    fn readings_serialize_camel_case() {
        let value = serde_json::to_value(ReadingSet::initial(Utc::now())).unwrap();
        assert!(value.get("airQuality").is_some());
        assert!(value.get("soilMoisture").is_some());
        assert!(value.get("air_quality").is_none());
    }
}
