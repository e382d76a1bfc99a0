use std::sync::Arc;

use serde::Serialize;

use super::{CaptureSession, EncodedImage, MediaError, MediaKind, MediaSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ScanState {
    Closed,
    Previewing,
    Captured { image: EncodedImage },
}

/// The leaf-vitals scan: open the camera, take a photo, retake or analyze.
/// The camera is held only between `open` and `analyze`/`close`.
pub struct HealthScan {
    source: Arc<dyn MediaSource>,
    session: Option<CaptureSession>,
    state: ScanState,
}

impl HealthScan {
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self {
            source,
            session: None,
            state: ScanState::Closed,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Starts previewing. If the camera can't be had the scan stays closed
    /// and the error carries the notice to show.
    pub fn open(&mut self) -> Result<(), MediaError> {
        self.close();
        match CaptureSession::open(self.source.as_ref(), MediaKind::Camera) {
            Ok(session) => {
                self.session = Some(session);
                self.state = ScanState::Previewing;
                Ok(())
            }
            Err(err) => {
                self.state = ScanState::Closed;
                Err(err)
            }
        }
    }

    pub fn capture(&mut self) -> Result<EncodedImage, MediaError> {
        if self.state != ScanState::Previewing {
            return Err(MediaError::Capture("camera is not previewing".into()));
        }
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| MediaError::Capture("camera is not open".into()))?;
        let image = session.capture_frame()?;
        self.state = ScanState::Captured {
            image: image.clone(),
        };
        Ok(image)
    }

    /// Drops the photo and goes back to the live preview.
    pub fn retake(&mut self) {
        if matches!(self.state, ScanState::Captured { .. }) {
            self.state = ScanState::Previewing;
        }
    }

    /// Hands over the captured photo and closes the camera. `None` when there
    /// is nothing captured, in which case the scan is left as it was.
    pub fn analyze(&mut self) -> Option<EncodedImage> {
        match std::mem::replace(&mut self.state, ScanState::Closed) {
            ScanState::Captured { image } => {
                self.release();
                Some(image)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn close(&mut self) {
        self.release();
        self.state = ScanState::Closed;
    }

    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}
