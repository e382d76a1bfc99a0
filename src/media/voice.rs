use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{
    split_data_url, CaptureSession, EncodedImage, MediaError, MediaKind, MediaSource, MediaStream,
};

/// The recorder is cut off after this long.
pub const MAX_MEMO_LENGTH: Duration = Duration::from_secs(10);
pub const VOICE_MEMO_FAILURE: &str = "Could not process voice memo.";
/// What Flora is told about a memo until there is speech-to-text.
pub const VOICE_MEMO_PROMPT: &str = "[Voice memo transcription would go here]";

/// Base64 audio as a recorder hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub mime_type: String,
    pub data: String,
    pub duration: Duration,
}

impl AudioClip {
    pub fn from_bytes(mime_type: &str, bytes: &[u8], duration: Duration) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
            duration,
        }
    }

    /// Accepts MediaRecorder output read through `FileReader.readAsDataURL`,
    /// e.g. `data:audio/webm;codecs=opus;base64,GkXf...`.
    pub fn from_data_url(url: &str, duration: Duration) -> Result<Self, MediaError> {
        let (mime_type, payload) = split_data_url(url, "audio/")?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
            duration,
        })
    }

    pub fn decoded_len(&self) -> usize {
        STANDARD.decode(&self.data).map(|b| b.len()).unwrap_or(0)
    }
}

/// Notice for a memo that never reached Flora. Permission problems get the
/// microphone notice, anything else the generic one.
pub fn voice_memo_notice(err: &MediaError) -> &'static str {
    match err {
        MediaError::Denied { kind } | MediaError::Unavailable { kind, .. } => kind.denied_notice(),
        MediaError::Capture(_) | MediaError::Malformed(_) => VOICE_MEMO_FAILURE,
    }
}

/// One press of the record button: open the microphone, record up to
/// `max_length`, hand the clip back. The microphone is released before
/// `record` returns, whichever way it returns.
pub struct VoiceMemo {
    source: Arc<dyn MediaSource>,
    max_length: Duration,
}

impl VoiceMemo {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            max_length: MAX_MEMO_LENGTH,
        }
    }

    pub fn max_length(&self) -> Duration {
        self.max_length
    }

    /// Blocks for as long as the recording takes.
    pub fn record(&self) -> Result<AudioClip, MediaError> {
        let mut session = CaptureSession::open(self.source.as_ref(), MediaKind::Microphone)?;
        let mut clip = session.record_audio(self.max_length)?;
        session.close();
        clip.duration = clip.duration.min(self.max_length);
        Ok(clip)
    }
}

/// Microphone whose recording already happened elsewhere (the webview's
/// MediaRecorder). Acquiring it hands the finished clip to the session.
pub struct RecordedAudioSource {
    clip: AudioClip,
}

impl RecordedAudioSource {
    pub fn new(clip: AudioClip) -> Self {
        Self { clip }
    }
}

impl MediaSource for RecordedAudioSource {
    fn acquire(&self, kind: MediaKind) -> Result<Box<dyn MediaStream>, MediaError> {
        match kind {
            MediaKind::Microphone => Ok(Box::new(RecordedAudioStream {
                clip: Some(self.clip.clone()),
            })),
            MediaKind::Camera => Err(MediaError::Unavailable {
                kind,
                reason: "recorded audio has no video".into(),
            }),
        }
    }
}

struct RecordedAudioStream {
    clip: Option<AudioClip>,
}

impl MediaStream for RecordedAudioStream {
    fn kind(&self) -> MediaKind {
        MediaKind::Microphone
    }

    fn capture_frame(&mut self) -> Result<EncodedImage, MediaError> {
        Err(MediaError::Capture("microphone has no frames".into()))
    }

    fn record_audio(&mut self, max_length: Duration) -> Result<AudioClip, MediaError> {
        let mut clip = self
            .clip
            .take()
            .ok_or_else(|| MediaError::Capture("recording already handed over".into()))?;
        clip.duration = clip.duration.min(max_length);
        Ok(clip)
    }

    fn release(&mut self) {
        self.clip = None;
    }
}
