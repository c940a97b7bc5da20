use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use tracing::{debug, warn};

use super::{CaptureConstraints, VideoSource, VideoStream};
use crate::error::AppError;

/// Headless camera that renders a gradient test pattern. It can be told to
/// refuse access, and it counts live tracks so leaks are observable.
#[derive(Debug, Default)]
pub struct SyntheticCamera {
    denial: Option<String>,
    live_tracks: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose every acquisition fails with `message`.
    pub fn denying(message: impl Into<String>) -> Self {
        Self {
            denial: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoSource for SyntheticCamera {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn VideoStream>, AppError> {
        // Device negotiation is a suspension point on real hardware.
        tokio::task::yield_now().await;

        if let Some(message) = &self.denial {
            warn!("Synthetic camera refused access: {}", message);
            return Err(AppError::DeviceUnavailable(message.clone()));
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.live_tracks.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Synthetic camera opened {}x{} facing {:?}",
            constraints.ideal_width, constraints.ideal_height, constraints.facing
        );

        Ok(Box::new(SyntheticStream {
            width: constraints.ideal_width,
            height: constraints.ideal_height,
            frames: 0,
            stopped: false,
            live_tracks: self.live_tracks.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "SyntheticCamera"
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    frames: u32,
    stopped: bool,
    live_tracks: Arc<AtomicUsize>,
}

impl VideoStream for SyntheticStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab(&mut self) -> Result<RgbImage, AppError> {
        if self.stopped {
            return Err(AppError::DeviceUnavailable(
                "video track has ended".to_string(),
            ));
        }
        self.frames += 1;
        let shift = (self.frames * 16) as u8 as u32;
        let (width, height) = (self.width.max(1), self.height.max(1));
        Ok(RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 255 / width + shift) % 256) as u8,
                ((y * 255 / height) % 256) as u8,
                128,
            ])
        }))
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn live_tracks(&self) -> usize {
        usize::from(!self.stopped)
    }
}
