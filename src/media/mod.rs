pub mod capture;
pub mod scan;
pub mod still;
pub mod voice;

pub use capture::{CaptureSession, MediaSource, MediaStream};
pub use scan::{HealthScan, ScanState};
pub use still::StillImageSource;
pub use voice::{AudioClip, RecordedAudioSource, VoiceMemo};

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Camera,
    Microphone,
}

impl MediaKind {
    /// Short notice shown when the device can't be opened.
    pub fn denied_notice(&self) -> &'static str {
        match self {
            MediaKind::Camera => "I can't see right now. Please check your camera permissions.",
            MediaKind::Microphone => {
                "I can't hear you! Please check your microphone permissions."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{kind:?} access denied")]
    Denied { kind: MediaKind },
    #[error("{kind:?} unavailable: {reason}")]
    Unavailable { kind: MediaKind, reason: String },
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("malformed image data: {0}")]
    Malformed(String),
}

impl MediaError {
    pub fn notice(&self) -> &'static str {
        match self {
            MediaError::Denied { kind } | MediaError::Unavailable { kind, .. } => {
                kind.denied_notice()
            }
            MediaError::Capture(_) | MediaError::Malformed(_) => {
                MediaKind::Camera.denied_notice()
            }
        }
    }
}

/// A base64 image ready to inline into an insight request. `data` never
/// carries a `data:` URL prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl EncodedImage {
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self {
            mime_type: JPEG_MIME.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Accepts what a canvas `toDataURL` produces,
    /// e.g. `data:image/jpeg;base64,/9j/4AAQ...`.
    pub fn from_data_url(url: &str) -> Result<Self, MediaError> {
        let (mime_type, payload) = split_data_url(url, "image/")?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        })
    }

    /// Decodes any format the `image` crate understands and re-encodes as
    /// JPEG. JPEG has no alpha channel, so the pixels are flattened to RGB.
    pub fn from_image_file(path: &Path) -> Result<Self, MediaError> {
        let img = image::open(path).map_err(|err| MediaError::Unavailable {
            kind: MediaKind::Camera,
            reason: format!("{}: {err}", path.display()),
        })?;

        let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
        let mut buf = Cursor::new(Vec::new());
        rgb.write_to(&mut buf, ImageFormat::Jpeg)
            .map_err(|err| MediaError::Capture(err.to_string()))?;

        Ok(Self::from_jpeg_bytes(buf.get_ref()))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decoded_len(&self) -> usize {
        STANDARD.decode(&self.data).map(|b| b.len()).unwrap_or(0)
    }
}

/// Splits `data:<mime>[;params];base64,<payload>` and checks that the
/// payload decodes. Parameters such as `codecs=opus` are dropped.
pub(crate) fn split_data_url<'a>(
    url: &'a str,
    media_prefix: &str,
) -> Result<(&'a str, &'a str), MediaError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::Malformed("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::Malformed("missing payload separator".into()))?;
    let header = header
        .strip_suffix(";base64")
        .ok_or_else(|| MediaError::Malformed("payload is not base64".into()))?;
    let mime_type = header.split(';').next().unwrap_or_default();

    if !mime_type.starts_with(media_prefix) {
        return Err(MediaError::Malformed(format!(
            "unsupported media type '{mime_type}'"
        )));
    }
    if payload.is_empty() {
        return Err(MediaError::Malformed("empty payload".into()));
    }
    STANDARD
        .decode(payload)
        .map_err(|err| MediaError::Malformed(err.to_string()))?;

    Ok((mime_type, payload))
}
