use std::sync::Arc;

use tracing::info;

use super::WorkflowController;
use crate::acquisition::ImageAcquisition;
use crate::analysis::{AnalysisOrchestrator, HairAnalyzer, SimulatedAnalyzer};
use crate::capture::{CaptureConstraints, MediaCaptureController, VideoSource};
use crate::config::Settings;
use crate::error::AppError;
use crate::notify::{NotificationSink, TracingSink};

pub struct WorkflowControllerBuilder {
    settings: Settings,
    video_source: Option<Arc<dyn VideoSource>>,
    analyzer: Option<Arc<dyn HairAnalyzer>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl WorkflowControllerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            video_source: None,
            analyzer: None,
            sink: None,
        }
    }

    // Required: the platform camera adapter.
    pub fn video_source(mut self, source: Arc<dyn VideoSource>) -> Self {
        self.video_source = Some(source);
        self
    }

    // Defaults to the simulated analyzer using the configured latency.
    pub fn analyzer(mut self, analyzer: Arc<dyn HairAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    // Defaults to logging notifications through tracing.
    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<WorkflowController, AppError> {
        self.settings.validate()?;
        let video_source = self
            .video_source
            .ok_or(AppError::InvalidConfig("video source not set".to_string()))?;

        let settings = self.settings;
        let analyzer = self.analyzer.unwrap_or_else(|| {
            Arc::new(SimulatedAnalyzer::new(settings.analysis.simulated_latency()))
        });
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let camera = MediaCaptureController::new(
            video_source.clone(),
            CaptureConstraints::from(&settings.capture),
            settings.capture.jpeg_quality,
        );
        let acquisition = ImageAcquisition::new(&settings.upload);
        let orchestrator = AnalysisOrchestrator::new(analyzer, settings.analysis.timeout());

        info!(
            "Workflow ready (camera: {}, analyzer: {})",
            video_source.name(),
            orchestrator.analyzer_name()
        );
        Ok(WorkflowController::new(camera, acquisition, orchestrator, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticCamera;

    #[test]
    fn build_requires_a_video_source() {
        let result = WorkflowControllerBuilder::new(Settings::default()).build();
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn build_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.analysis.timeout_ms = 0;
        let result = WorkflowControllerBuilder::new(settings)
            .video_source(Arc::new(SyntheticCamera::new()))
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn built_workflow_starts_empty() {
        let workflow = WorkflowControllerBuilder::new(Settings::default())
            .video_source(Arc::new(SyntheticCamera::new()))
            .build()
            .unwrap();
        assert_eq!(workflow.phase().await, crate::workflow::Phase::Empty);
        assert!(!workflow.is_streaming().await);
    }
}
