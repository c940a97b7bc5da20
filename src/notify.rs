use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppError;

pub const ANALYSIS_FAILED_DESCRIPTION: &str =
    "There was an error analyzing your hair. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: Variant::Destructive,
            ..Self::new(title, description)
        }
    }

    pub fn photo_captured() -> Self {
        Self::new("Photo captured!", "Your photo has been captured successfully.")
    }

    pub fn photo_uploaded() -> Self {
        Self::new("Photo uploaded!", "Your photo has been uploaded successfully.")
    }

    pub fn analysis_complete() -> Self {
        Self::new("Analysis complete!", "Your hair analysis results are ready.")
    }
}

impl From<&AppError> for Notification {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::DeviceUnavailable(message) => {
                Notification::destructive("Camera unavailable", message.clone())
            }
            AppError::PayloadTooLarge { limit, .. } => Notification::destructive(
                "File too large",
                format!("Please upload an image under {}.", human_limit(*limit)),
            ),
            AppError::UnsupportedFormat(_) => Notification::destructive(
                "Unsupported format",
                "Please upload a JPG or PNG image.",
            ),
            AppError::Decode(_) => Notification::destructive(
                "Unreadable image",
                "The selected file could not be read as an image.",
            ),
            AppError::RequestInFlight => Notification::destructive(
                "Analysis in progress",
                "Please wait for the current analysis to finish.",
            ),
            AppError::ReportAlreadyAvailable => Notification::destructive(
                "Analysis already complete",
                "Upload or capture a new photo to analyze again.",
            ),
            AppError::NoPendingImage => Notification::destructive(
                "No photo selected",
                "Upload or capture a photo before starting the analysis.",
            ),
            AppError::AnalysisFailed(_) => {
                Notification::destructive("Analysis failed", ANALYSIS_FAILED_DESCRIPTION)
            }
            other => Notification::destructive("Something went wrong", other.to_string()),
        }
    }
}

// Rounded up, so the stated limit is never below the real one.
fn human_limit(limit: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if limit >= MIB {
        format!("{}MB", limit.div_ceil(MIB))
    } else {
        format!("{}KB", limit.div_ceil(KIB))
    }
}

/// Fire-and-forget consumer of user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            Variant::Default => info!("{}: {}", notification.title, notification.description),
            Variant::Destructive => warn!("{}: {}", notification.title, notification.description),
        }
    }
}

/// Keeps every notification in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries().into_iter().map(|n| n.title).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries().pop()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}
