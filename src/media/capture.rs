use log::{debug, warn};

use std::time::Duration;

use super::{AudioClip, EncodedImage, MediaError, MediaKind};

/// An acquired camera or microphone. `release` stops every track; it must be
/// safe to call more than once.
pub trait MediaStream: Send {
    fn kind(&self) -> MediaKind;
    fn capture_frame(&mut self) -> Result<EncodedImage, MediaError>;

    /// Records until `max_length` has elapsed. Streams without an audio track
    /// refuse.
    fn record_audio(&mut self, max_length: Duration) -> Result<AudioClip, MediaError> {
        let _ = max_length;
        Err(MediaError::Capture(format!(
            "{:?} stream has no audio track",
            self.kind()
        )))
    }

    fn release(&mut self);
}

/// Something that can hand out media streams (the webview, a still image, a
/// test double).
pub trait MediaSource: Send + Sync {
    fn acquire(&self, kind: MediaKind) -> Result<Box<dyn MediaStream>, MediaError>;
}

/// Holds a stream for as long as the capture UI is open. Dropping the session
/// releases the stream on every path out, early returns and `?` included.
pub struct CaptureSession {
    stream: Option<Box<dyn MediaStream>>,
}

impl CaptureSession {
    pub fn open(source: &dyn MediaSource, kind: MediaKind) -> Result<Self, MediaError> {
        let stream = source.acquire(kind).map_err(|err| {
            warn!("Failed to acquire {kind:?}: {err}");
            err
        })?;
        debug!("Acquired {kind:?} stream");
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn capture_frame(&mut self) -> Result<EncodedImage, MediaError> {
        match self.stream.as_mut() {
            Some(stream) => stream.capture_frame(),
            None => Err(MediaError::Capture("capture session already closed".into())),
        }
    }

    pub fn record_audio(&mut self, max_length: Duration) -> Result<AudioClip, MediaError> {
        match self.stream.as_mut() {
            Some(stream) => stream.record_audio(max_length),
            None => Err(MediaError::Capture("capture session already closed".into())),
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!("Releasing {:?} stream", stream.kind());
            stream.release();
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}
