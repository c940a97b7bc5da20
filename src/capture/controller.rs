use std::sync::Arc;

use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::{debug, info, warn};

use super::{CaptureConstraints, CaptureSession, StillFrame, VideoSource};
use crate::error::AppError;

pub const CAMERA_FALLBACK_MESSAGE: &str = "Unable to access camera. Please check permissions.";

/// Owns the live camera. At most one `CaptureSession` exists at a time and it
/// is released on `stop`, on `capture`, and when the controller is dropped.
pub struct MediaCaptureController {
    source: Arc<dyn VideoSource>,
    constraints: CaptureConstraints,
    jpeg_quality: u8,
    session: Option<CaptureSession>,
    last_error: Option<String>,
}

impl MediaCaptureController {
    pub fn new(source: Arc<dyn VideoSource>, constraints: CaptureConstraints, jpeg_quality: u8) -> Self {
        Self {
            source,
            constraints,
            jpeg_quality,
            session: None,
            last_error: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Message from the last failed `start`, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Acquires the device. A session that is already live is released first,
    /// so calling this while streaming acts as a reset.
    pub async fn start(&mut self) -> Result<(), AppError> {
        self.stop();

        info!("Requesting camera from {}", self.source.name());
        match self.source.acquire(&self.constraints).await {
            Ok(stream) => {
                self.session = Some(CaptureSession::new(stream));
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let message = match e {
                    AppError::DeviceUnavailable(message) if !message.trim().is_empty() => message,
                    AppError::DeviceUnavailable(_) => CAMERA_FALLBACK_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                warn!("Camera unavailable: {}", message);
                self.last_error = Some(message.clone());
                Err(AppError::DeviceUnavailable(message))
            }
        }
    }

    /// Idempotent. Releases every track of the current session, if any.
    pub fn stop(&mut self) {
        match self.session.take() {
            Some(session) => session.release(),
            None => debug!("Camera stop requested with no active session"),
        }
    }

    /// Takes one still and ends the live session.
    pub fn capture(&mut self) -> Result<StillFrame, AppError> {
        let mut session = self.session.take().ok_or_else(|| {
            AppError::DeviceUnavailable("no active camera session".to_string())
        })?;

        let frame = session.grab();
        session.release();

        let frame = frame?;
        let still = encode_still(&frame, self.jpeg_quality)?;
        info!(
            "Captured {}x{} still ({} bytes)",
            still.width,
            still.height,
            still.jpeg.len()
        );
        Ok(still)
    }
}

impl Drop for MediaCaptureController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn encode_still(frame: &RgbImage, quality: u8) -> Result<StillFrame, AppError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(frame)
        .map_err(|e| AppError::DeviceUnavailable(format!("failed to encode still: {}", e)))?;
    Ok(StillFrame {
        jpeg,
        width: frame.width(),
        height: frame.height(),
        captured_at: Utc::now(),
    })
}
