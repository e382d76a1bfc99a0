use crate::models::ReadingSet;

use super::Mood;

/// Thresholds for the mood rules. Every comparison is strict, so a reading
/// sitting exactly on a threshold does not trigger that rule.
#[derive(Debug, Clone)]
pub struct MoodThresholds {
    /// Harmful gas above this is frightening (ppm)
    pub gas_danger: f64,
    /// Air quality index above this makes the plant sick
    pub air_polluted: f64,
    /// Soil moisture below this means thirsty (%)
    pub soil_dry: f64,
    /// Vibration above this is stressful
    pub vibration_stress: f64,

    /// Happy needs both clean air and lush soil
    pub air_clean: f64,
    pub soil_lush: f64,
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            gas_danger: 150.0,
            air_polluted: 60.0,
            soil_dry: 30.0,
            vibration_stress: 7.0,
            air_clean: 30.0,
            soil_lush: 50.0,
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(readings: &ReadingSet) -> Mood {
    classify_with(readings, &MoodThresholds::default())
}

/// First matching rule wins, highest priority first. Several rules can hold
/// at once (toxic gas and polluted air, say); only the earliest counts.
///
/// NaN never satisfies a comparison, so garbage readings fall through to
/// `Calm` and the function stays total.
pub fn classify_with(r: &ReadingSet, t: &MoodThresholds) -> Mood {
    if r.harmful_gas > t.gas_danger {
        Mood::Scared
    } else if r.air_quality > t.air_polluted {
        Mood::Sick
    } else if r.soil_moisture < t.soil_dry {
        Mood::Thirsty
    } else if r.vibration > t.vibration_stress {
        Mood::Stressed
    } else if r.air_quality < t.air_clean && r.soil_moisture > t.soil_lush {
        Mood::Happy
    } else {
        Mood::Calm
    }
}
