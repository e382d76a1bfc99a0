use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::ReadingSet;

/// Soil loses this much moisture every tick, with no randomness.
pub const SOIL_DECAY_PER_TICK: f64 = 0.05;

const AIR_STEP: f64 = 2.0;
const GAS_STEP: f64 = 3.0;
const VIBRATION_STEP: f64 = 1.0;

/// Source of the random walk steps. Swapped for a scripted sequence in tests.
pub trait DriftSource: Send {
    /// Uniform sample from `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Production drift backed by a seedable RNG.
pub struct RandomDrift {
    rng: StdRng,
}

impl RandomDrift {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DriftSource for RandomDrift {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }
}

/// One simulation tick. Draws in a fixed order (air, gas, vibration) so a
/// scripted source produces exact values.
///
/// Temperature and humidity are carried over untouched. Soil moisture has a
/// floor but no ceiling and no way to go back up.
pub fn advance(
    previous: &ReadingSet,
    drift: &mut dyn DriftSource,
    now: DateTime<Utc>,
) -> ReadingSet {
    let air_quality =
        (previous.air_quality + drift.uniform(-AIR_STEP, AIR_STEP)).clamp(0.0, 100.0);
    let harmful_gas = (previous.harmful_gas + drift.uniform(-GAS_STEP, GAS_STEP)).max(0.0);
    let vibration =
        (previous.vibration + drift.uniform(-VIBRATION_STEP, VIBRATION_STEP)).clamp(0.0, 10.0);
    let soil_moisture = (previous.soil_moisture - SOIL_DECAY_PER_TICK).max(0.0);

    ReadingSet {
        air_quality,
        harmful_gas,
        soil_moisture,
        vibration,
        temperature: previous.temperature,
        humidity: previous.humidity,
        timestamp: now,
    }
}
