pub mod classifier;
pub mod presentation;

pub use classifier::{classify, classify_with, MoodThresholds};
pub use presentation::{avatar_url, present, sentiment_flair, MoodProfile};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The plant's current emotional state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    Happy,
    Thirsty,
    Sick,
    Scared,
    Stressed,
    Calm,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Thirsty,
        Mood::Sick,
        Mood::Scared,
        Mood::Stressed,
        Mood::Calm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "HAPPY",
            Mood::Thirsty => "THIRSTY",
            Mood::Sick => "SICK",
            Mood::Scared => "SCARED",
            Mood::Stressed => "STRESSED",
            Mood::Calm => "CALM",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_matches_display() {
        for mood in Mood::ALL {
            let json = serde_json::to_string(&mood).unwrap();
            assert_eq!(json, format!("\"{}\"", mood));
            let back: Mood = serde_json::from_str(&json).unwrap();
            assert_eq!(back, mood);
        }
    }
}
