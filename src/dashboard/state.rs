use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::history::ChartPoint;
use crate::insight::{InsightOutcome, InsightSource, INITIAL_INSIGHT};
use crate::models::{ReadingSet, SensorFrame};
use crate::mood::{avatar_url, present, sentiment_flair, Mood, MoodProfile};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsightState {
    pub text: String,
    pub is_refreshing: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub source: InsightSource,
}

impl Default for InsightState {
    fn default() -> Self {
        Self {
            text: INITIAL_INSIGHT.to_string(),
            is_refreshing: false,
            updated_at: None,
            source: InsightSource::Initial,
        }
    }
}

impl InsightState {
    pub fn settle(&mut self, outcome: InsightOutcome, now: DateTime<Utc>) {
        self.text = outcome.text;
        self.source = outcome.source;
        self.updated_at = Some(now);
        self.is_refreshing = false;
    }
}

/// Everything the dashboard draws, in one serializable value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub readings: ReadingSet,
    pub mood: Mood,
    pub profile: MoodProfile,
    pub flair: &'static str,
    pub avatar: &'static str,
    pub tick: u64,
    pub history: Vec<ChartPoint>,
    pub insight: InsightState,
}

impl DashboardSnapshot {
    pub fn new(frame: SensorFrame, history: Vec<ChartPoint>, insight: InsightState) -> Self {
        let mood = frame.mood;
        Self {
            readings: frame.readings,
            mood,
            profile: present(mood),
            flair: sentiment_flair(mood),
            avatar: avatar_url(mood),
            tick: frame.tick,
            history,
            insight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_insight_is_tuning_in() {
        let state = InsightState::default();
        assert_eq!(state.text, "Tuning into your frequencies...");
        assert!(!state.is_refreshing);
        assert_eq!(state.source, InsightSource::Initial);
    }

    #[test]
    fn snapshot_derives_presentation_from_mood() {
        let mut readings = ReadingSet::initial(Utc::now());
        readings.soil_moisture = 12.0;
        let snapshot = DashboardSnapshot::new(
            SensorFrame::new(readings, 4),
            Vec::new(),
            InsightState::default(),
        );
        assert_eq!(snapshot.mood, Mood::Thirsty);
        assert_eq!(snapshot.profile.emoji, "😢");
        assert_eq!(snapshot.flair, sentiment_flair(Mood::Thirsty));
        assert_eq!(snapshot.avatar, avatar_url(Mood::Thirsty));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["mood"], "THIRSTY");
        assert_eq!(json["tick"], 4);
        assert_eq!(json["insight"]["isRefreshing"], false);
        assert_eq!(json["readings"]["soilMoisture"], 12.0);
    }
}
