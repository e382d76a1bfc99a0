use crate::models::ReadingSet;
use crate::mood::Mood;

/// Readings go in unrounded, the way the dashboard holds them.
pub fn plant_insight_prompt(readings: &ReadingSet, mood: Mood) -> String {
    format!(
        "You are an intelligent emotional support plant named Flora.\n\
         Current sensor readings:\n\
         - Air Quality: {air}/100\n\
         - Harmful Gas: {gas} ppm\n\
         - Soil Moisture: {soil}%\n\
         - Vibration: {vibration}/10\n\
         - Temperature: {temperature}°C\n\
         - Humidity: {humidity}%\n\
         - Emotion: {mood}\n\
         \n\
         Speak ONLY in English. Give specific environmental advice in 2 sentences.\n\
         End with 2-3 positive emojis.",
        air = readings.air_quality,
        gas = readings.harmful_gas,
        soil = readings.soil_moisture,
        vibration = readings.vibration,
        temperature = readings.temperature,
        humidity = readings.humidity,
        mood = mood,
    )
}

pub fn companion_prompt(thought: &str) -> String {
    format!(
        "You are Flora, an emotional support plant companion. User said: \"{}\"\n\
         \n\
         Respond with 1-2 supportive sentences. Be compassionate and brief. End with 1-2 relevant emojis.\n\
         Respond ONLY in English.",
        thought.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn insight_prompt_lists_every_reading() {
        let mut readings = ReadingSet::initial(Utc::now());
        readings.harmful_gas = 201.25;
        let prompt = plant_insight_prompt(&readings, Mood::Scared);

        assert!(prompt.contains("Air Quality: 22/100"));
        assert!(prompt.contains("Harmful Gas: 201.25 ppm"));
        assert!(prompt.contains("Soil Moisture: 65%"));
        assert!(prompt.contains("Vibration: 2/10"));
        assert!(prompt.contains("Temperature: 24.5°C"));
        assert!(prompt.contains("Humidity: 52%"));
        assert!(prompt.contains("Emotion: SCARED"));
        assert!(prompt.contains("2 sentences"));
    }

    #[test]
    fn drifted_readings_are_not_rounded() {
        let mut readings = ReadingSet::initial(Utc::now());
        readings.soil_moisture = 64.9;
        readings.air_quality = 23.456;
        let prompt = plant_insight_prompt(&readings, Mood::Calm);
        assert!(prompt.contains("Soil Moisture: 64.9%"));
        assert!(prompt.contains("Air Quality: 23.456/100"));
    }

    #[test]
    fn companion_prompt_quotes_trimmed_thought() {
        let prompt = companion_prompt("  rough day at work \n");
        assert!(prompt.contains("User said: \"rough day at work\""));
    }
}
