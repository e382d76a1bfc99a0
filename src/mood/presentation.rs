use serde::Serialize;

use super::Mood;

/// Display attributes for a mood. Color and background are style tokens the
/// frontend applies verbatim.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoodProfile {
    pub mood: Mood,
    pub message: &'static str,
    pub color: &'static str,
    pub emoji: &'static str,
    pub background: &'static str,
}

pub fn present(mood: Mood) -> MoodProfile {
    let (message, color, emoji, background) = match mood {
        Mood::Happy => (
            "I feel clean and fresh!",
            "bg-emerald-100 text-emerald-700",
            "😊",
            "bg-gradient-to-br from-emerald-50 via-teal-50 to-green-50",
        ),
        Mood::Thirsty => (
            "A little drink would be lovely.",
            "bg-amber-100 text-amber-700",
            "😢",
            "bg-gradient-to-br from-amber-50 via-yellow-50 to-orange-50",
        ),
        Mood::Sick => (
            "The air is not good today...",
            "bg-purple-100 text-purple-700",
            "😷",
            "bg-gradient-to-br from-purple-50 via-slate-50 to-gray-100",
        ),
        Mood::Scared => (
            "Detecting harmful gases!",
            "bg-rose-100 text-rose-700",
            "🚨",
            "bg-gradient-to-br from-rose-50 via-red-50 to-pink-50",
        ),
        Mood::Stressed => (
            "Too much movement here.",
            "bg-orange-100 text-orange-700",
            "🌪️",
            "bg-gradient-to-br from-orange-50 via-red-50 to-yellow-50",
        ),
        Mood::Calm => (
            "Everything is peaceful.",
            "bg-sky-100 text-sky-700",
            "😌",
            "bg-gradient-to-br from-sky-50 via-blue-50 to-indigo-50",
        ),
    };

    MoodProfile {
        mood,
        message,
        color,
        emoji,
        background,
    }
}

/// Emoji trail appended after the insight text.
pub fn sentiment_flair(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => "✨🌟🌻",
        Mood::Thirsty => "💧🌱🙏",
        Mood::Sick => "☀️🛡️🌿",
        Mood::Scared => "🛡️💖🌱",
        Mood::Stressed => "🌊🌬️✨",
        Mood::Calm => "🧘‍♂️🍃☁️",
    }
}

const AVATAR_DROOPING: &str = "https://cdn-icons-png.flaticon.com/512/3062/3062145.png";
const AVATAR_ALERT: &str = "https://cdn-icons-png.flaticon.com/512/2833/2833333.png";
const AVATAR_WILTED: &str = "https://cdn-icons-png.flaticon.com/512/3062/3062140.png";
const AVATAR_SPROUT: &str = "https://cdn-icons-png.flaticon.com/512/3062/3062123.png";

/// Plant avatar image. Only the distressed moods get their own artwork.
pub fn avatar_url(mood: Mood) -> &'static str {
    match mood {
        Mood::Thirsty => AVATAR_DROOPING,
        Mood::Scared => AVATAR_ALERT,
        Mood::Sick => AVATAR_WILTED,
        Mood::Happy | Mood::Stressed | Mood::Calm => AVATAR_SPROUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_mood_has_a_distinct_profile() {
        let mut messages = HashSet::new();
        for mood in Mood::ALL {
            let profile = present(mood);
            assert_eq!(profile.mood, mood);
            assert!(!profile.emoji.is_empty());
            assert!(profile.background.starts_with("bg-gradient"));
            assert!(messages.insert(profile.message), "duplicate message for {mood}");
        }
    }

    #[test]
    fn scared_profile() {
        let profile = present(Mood::Scared);
        assert_eq!(profile.message, "Detecting harmful gases!");
        assert_eq!(profile.emoji, "🚨");
        assert_eq!(profile.color, "bg-rose-100 text-rose-700");
    }

    #[test]
    fn calm_moods_share_the_sprout() {
        assert_eq!(avatar_url(Mood::Happy), avatar_url(Mood::Calm));
        assert_eq!(avatar_url(Mood::Stressed), avatar_url(Mood::Calm));
        assert_ne!(avatar_url(Mood::Sick), avatar_url(Mood::Calm));
        assert_eq!(sentiment_flair(Mood::Thirsty), "💧🌱🙏");
    }
}
