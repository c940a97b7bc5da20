use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::config::CaptureSettings;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

/// What a capture session asks the device for. Resolution is a preference,
/// the device may hand back something else.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingMode,
    pub audio: bool,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing: FacingMode::User,
            audio: false,
        }
    }
}

impl From<&CaptureSettings> for CaptureConstraints {
    fn from(settings: &CaptureSettings) -> Self {
        Self {
            ideal_width: settings.ideal_width,
            ideal_height: settings.ideal_height,
            facing: settings.facing,
            audio: false,
        }
    }
}

/// Platform adapter that hands out live video streams.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fails with `AppError::DeviceUnavailable` when there is no device, it is
    /// in use, or permission was denied.
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn VideoStream>, AppError>;
    fn name(&self) -> &'static str;
}

/// A live stream made of one or more media tracks.
pub trait VideoStream: Send {
    fn dimensions(&self) -> (u32, u32);
    fn grab(&mut self) -> Result<RgbImage, AppError>;
    /// Stops every underlying track. Must tolerate repeated calls.
    fn stop_tracks(&mut self);
    fn live_tracks(&self) -> usize;
}

/// A single still taken from a live stream, already JPEG encoded.
#[derive(Debug, Clone)]
pub struct StillFrame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Utc>,
}

impl StillFrame {
    pub const MIME_TYPE: &'static str = "image/jpeg";
}
