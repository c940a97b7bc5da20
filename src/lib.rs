pub mod acquisition;
pub mod analysis;
pub mod capture;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod presentation;
pub mod workflow;

pub use error::AppError;

pub use acquisition::ImageAcquisition;
pub use analysis::{AnalysisReport, HairAnalyzer, SimulatedAnalyzer};
pub use capture::{MediaCaptureController, SyntheticCamera, VideoSource};
pub use common::{ImagePayload, Provenance};
pub use config::Settings;
pub use notify::{Notification, NotificationSink};
pub use presentation::{present, DisplayModel};
pub use workflow::{Completion, Phase, WorkflowController, WorkflowControllerBuilder};
