use chrono::{DateTime, Utc};
use image::RgbImage;
use tracing::{debug, info};
use uuid::Uuid;

use super::VideoStream;
use crate::error::AppError;

/// An acquired camera stream. Tracks are stopped when the session is released
/// or dropped, whichever comes first.
pub struct CaptureSession {
    id: Uuid,
    stream: Box<dyn VideoStream>,
    started_at: DateTime<Utc>,
    released: bool,
}

impl CaptureSession {
    pub(crate) fn new(stream: Box<dyn VideoStream>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            stream,
            started_at: Utc::now(),
            released: false,
        };
        let (width, height) = session.stream.dimensions();
        info!(
            "Capture session {} started at {}x{} with {} live track(s)",
            session.id,
            width,
            height,
            session.stream.live_tracks()
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.stream.dimensions()
    }

    pub(crate) fn grab(&mut self) -> Result<RgbImage, AppError> {
        debug!("Grabbing still from capture session {}", self.id);
        self.stream.grab()
    }

    pub fn release(mut self) {
        self.release_tracks();
    }

    fn release_tracks(&mut self) {
        if self.released {
            return;
        }
        self.stream.stop_tracks();
        self.released = true;
        info!("Capture session {} released", self.id);
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_tracks();
    }
}
