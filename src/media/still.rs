use std::path::PathBuf;

use super::{EncodedImage, MediaError, MediaKind, MediaSource, MediaStream};

/// Headless stand-in for a camera: every frame is the same photo read from
/// disk. Microphones are never available.
pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MediaSource for StillImageSource {
    fn acquire(&self, kind: MediaKind) -> Result<Box<dyn MediaStream>, MediaError> {
        match kind {
            MediaKind::Camera if self.path.is_file() => Ok(Box::new(StillImageStream {
                path: self.path.clone(),
                released: false,
            })),
            MediaKind::Camera => Err(MediaError::Unavailable {
                kind,
                reason: format!("no image at {}", self.path.display()),
            }),
            MediaKind::Microphone => Err(MediaError::Unavailable {
                kind,
                reason: "still image source has no audio".into(),
            }),
        }
    }
}

struct StillImageStream {
    path: PathBuf,
    released: bool,
}

impl MediaStream for StillImageStream {
    fn kind(&self) -> MediaKind {
        MediaKind::Camera
    }

    fn capture_frame(&mut self) -> Result<EncodedImage, MediaError> {
        if self.released {
            return Err(MediaError::Capture("stream already released".into()));
        }
        EncodedImage::from_image_file(&self.path)
    }

    fn release(&mut self) {
        self.released = true;
    }
}
