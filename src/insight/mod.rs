pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::media::EncodedImage;
use crate::models::{ReadingSet, SensorFrame};
use crate::mood::Mood;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Shown before the first insight arrives.
pub const INITIAL_INSIGHT: &str = "Tuning into your frequencies...";
/// The provider failed outright.
pub const INSIGHT_FAILURE_FALLBACK: &str = "I'm here for you. 💖🌱";
/// The provider answered with nothing usable.
pub const INSIGHT_EMPTY_FALLBACK: &str = "I'm doing okay! 🌿✨";
pub const COMPANION_EMPTY_FALLBACK: &str = "I'm here for you. 💖";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompanionError {
    #[error("there is nothing to respond to")]
    EmptyThought,
}

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage(EncodedImage),
}

/// The external text-generation service. Implementations may fail in any way
/// they like; callers turn failures into fallback text.
pub trait InsightProvider: Send + Sync + 'static {
    fn generate(
        &self,
        parts: Vec<ContentPart>,
    ) -> impl Future<Output = Result<String, InsightError>> + Send;
}

/// Inputs captured by value when the request is issued. Ticks that land
/// while the request is in flight do not change what gets sent.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRequest {
    pub id: Uuid,
    pub readings: ReadingSet,
    pub mood: Mood,
    pub image: Option<EncodedImage>,
}

impl InsightRequest {
    pub fn new(readings: ReadingSet, mood: Mood, image: Option<EncodedImage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            readings,
            mood,
            image,
        }
    }

    pub fn from_frame(frame: &SensorFrame, image: Option<EncodedImage>) -> Self {
        Self::new(frame.readings.clone(), frame.mood, image)
    }

    pub fn parts(&self) -> Vec<ContentPart> {
        let mut parts = vec![ContentPart::Text(prompt::plant_insight_prompt(
            &self.readings,
            self.mood,
        ))];
        if let Some(image) = &self.image {
            parts.push(ContentPart::InlineImage(image.clone()));
        }
        parts
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InsightSource {
    Initial,
    Generated,
    Fallback,
}

/// Display-ready text. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightOutcome {
    pub text: String,
    pub source: InsightSource,
}

impl InsightOutcome {
    fn resolve(result: Result<String, InsightError>, empty: &str, context: &str) -> Self {
        match result {
            Ok(text) if !text.trim().is_empty() => Self {
                text: text.trim().to_string(),
                source: InsightSource::Generated,
            },
            Ok(_) => Self {
                text: empty.to_string(),
                source: InsightSource::Fallback,
            },
            Err(err) => {
                log_error!("{context} failed: {err}");
                Self {
                    text: INSIGHT_FAILURE_FALLBACK.to_string(),
                    source: InsightSource::Fallback,
                }
            }
        }
    }
}

/// Wraps a provider with the timeout and fallback policy.
pub struct InsightService<P> {
    provider: P,
    timeout: Duration,
}

impl<P: InsightProvider> InsightService<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn plant_insight(&self, request: &InsightRequest) -> InsightOutcome {
        log_info!(
            "requesting insight {} (mood={}, image={})",
            request.id,
            request.mood,
            request.image.is_some()
        );
        let result = self.call(request.parts()).await;
        InsightOutcome::resolve(result, INSIGHT_EMPTY_FALLBACK, "plant insight")
    }

    /// Blank thoughts are refused before anything is sent.
    pub async fn companion_reply(&self, thought: &str) -> Result<InsightOutcome, CompanionError> {
        if thought.trim().is_empty() {
            return Err(CompanionError::EmptyThought);
        }
        let parts = vec![ContentPart::Text(prompt::companion_prompt(thought))];
        let result = self.call(parts).await;
        Ok(InsightOutcome::resolve(
            result,
            COMPANION_EMPTY_FALLBACK,
            "companion reply",
        ))
    }

    async fn call(&self, parts: Vec<ContentPart>) -> Result<String, InsightError> {
        match tokio::time::timeout(self.timeout, self.provider.generate(parts)).await {
            Ok(result) => result,
            Err(_) => Err(InsightError::Timeout(self.timeout)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedProvider};
    use super::*;
    use chrono::Utc;

    fn service(script: Vec<Scripted>) -> InsightService<ScriptedProvider> {
        InsightService::new(ScriptedProvider::new(script), Duration::from_secs(20))
    }

    fn request(image: Option<EncodedImage>) -> InsightRequest {
        InsightRequest::new(ReadingSet::initial(Utc::now()), Mood::Happy, image)
    }

    #[tokio::test]
    async fn generated_text_is_trimmed() {
        let svc = service(vec![Scripted::Reply("  Water me a little. 🌿 \n")]);
        let outcome = svc.plant_insight(&request(None)).await;
        assert_eq!(outcome.text, "Water me a little. 🌿");
        assert_eq!(outcome.source, InsightSource::Generated);
    }

    #[tokio::test]
    async fn failure_becomes_fallback_text() {
        let svc = service(vec![Scripted::Fail]);
        let outcome = svc.plant_insight(&request(None)).await;
        assert_eq!(outcome.text, INSIGHT_FAILURE_FALLBACK);
        assert_eq!(outcome.source, InsightSource::Fallback);
    }

    #[tokio::test]
    async fn empty_text_uses_the_empty_fallback() {
        let svc = service(vec![Scripted::Reply("   ")]);
        let outcome = svc.plant_insight(&request(None)).await;
        assert_eq!(outcome.text, INSIGHT_EMPTY_FALLBACK);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out_to_fallback() {
        let svc = service(vec![Scripted::Hang]);
        let outcome = svc.plant_insight(&request(None)).await;
        assert_eq!(outcome.text, INSIGHT_FAILURE_FALLBACK);
    }

    #[tokio::test]
    async fn image_rides_along_as_second_part() {
        let svc = service(vec![Scripted::Reply("Leaves look glossy.")]);
        let image = EncodedImage::from_jpeg_bytes(b"\xff\xd8\xff\xd9");
        svc.plant_insight(&request(Some(image.clone()))).await;

        let seen = svc.provider().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(&seen[0][0], ContentPart::Text(t) if t.contains("Emotion: HAPPY")));
        assert_eq!(seen[0][1], ContentPart::InlineImage(image));
    }

    #[tokio::test]
    async fn blank_thought_sends_nothing() {
        let svc = service(vec![Scripted::Reply("unused")]);
        assert_eq!(
            svc.companion_reply(" \t\n").await,
            Err(CompanionError::EmptyThought)
        );
        assert_eq!(svc.provider().calls(), 0);
    }

    #[tokio::test]
    async fn companion_fallbacks() {
        let svc = service(vec![Scripted::Reply(""), Scripted::Fail]);
        let empty = svc.companion_reply("I feel lonely").await.unwrap();
        assert_eq!(empty.text, COMPANION_EMPTY_FALLBACK);
        let failed = svc.companion_reply("I feel lonely").await.unwrap();
        assert_eq!(failed.text, INSIGHT_FAILURE_FALLBACK);
    }

    #[test]
    fn request_captures_frame_by_value() {
        let frame = SensorFrame::new(ReadingSet::initial(Utc::now()), 3);
        let request = InsightRequest::from_frame(&frame, None);
        assert_eq!(request.readings, frame.readings);
        assert_eq!(request.mood, frame.mood);
        assert_eq!(request.parts().len(), 1);
    }
}
