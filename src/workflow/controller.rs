use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Phase, WorkflowState};
use crate::acquisition::ImageAcquisition;
use crate::analysis::{AnalysisOrchestrator, AnalysisReport, Settlement};
use crate::capture::MediaCaptureController;
use crate::common::ImagePayload;
use crate::error::AppError;
use crate::notify::{Notification, NotificationSink};
use crate::presentation::{present, DisplayModel};

/// How a finished `submit` was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied(AnalysisReport),
    /// A newer image was accepted while the analysis ran.
    Discarded,
}

/// Top-level session: camera, acquisition and analysis composed around one
/// `WorkflowState`. Cheap to clone; clones share the same session.
///
/// Every failure is turned into a notification here before being returned.
/// After `dispose`, late completions are dropped and further operations fail
/// with `AppError::Disposed`.
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<WorkflowState>,
    camera: Mutex<MediaCaptureController>,
    acquisition: ImageAcquisition,
    orchestrator: AnalysisOrchestrator,
    sink: Arc<dyn NotificationSink>,
    shutdown: CancellationToken,
}

impl WorkflowController {
    pub(crate) fn new(
        camera: MediaCaptureController,
        acquisition: ImageAcquisition,
        orchestrator: AnalysisOrchestrator,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(WorkflowState::new()),
                camera: Mutex::new(camera),
                acquisition,
                orchestrator,
                sink,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.state.lock().await.clone()
    }

    pub async fn phase(&self) -> Phase {
        self.inner.state.lock().await.phase()
    }

    pub async fn display_model(&self) -> Option<DisplayModel> {
        self.inner.state.lock().await.report().map(present)
    }

    pub async fn is_streaming(&self) -> bool {
        self.inner.camera.lock().await.is_streaming()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    pub async fn start_camera(&self) -> Result<(), AppError> {
        self.ensure_live()?;
        let mut camera = self.inner.camera.lock().await;
        let result = camera.start().await;

        // Disposed while the device was being negotiated.
        if self.is_disposed() {
            camera.stop();
            return Err(AppError::Disposed);
        }
        result.map_err(|e| self.surface(e))
    }

    pub async fn stop_camera(&self) {
        self.inner.camera.lock().await.stop();
    }

    pub async fn capture_photo(&self) -> Result<Phase, AppError> {
        self.ensure_live()?;
        let still = self
            .inner
            .camera
            .lock()
            .await
            .capture()
            .map_err(|e| self.surface(e))?;
        let payload = ImageAcquisition::from_capture(still);
        self.accept(payload, Notification::photo_captured()).await
    }

    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<Phase, AppError> {
        self.ensure_live()?;
        let payload = self
            .inner
            .acquisition
            .from_upload(bytes, mime_type, size_bytes)
            .await
            .map_err(|e| self.surface(e))?;
        self.accept(payload, Notification::photo_uploaded()).await
    }

    /// Runs one analysis of the pending image. Resolves once the routine has
    /// finished. Fails with `AppError::RequestInFlight` while any routine is
    /// still running, including one started for a replaced image, and with
    /// `AppError::ReportAlreadyAvailable` once the image has a report.
    pub async fn submit(&self) -> Result<Completion, AppError> {
        self.ensure_live()?;
        let pending = {
            let mut state = self.inner.state.lock().await;
            state
                .begin_analysis(&self.inner.orchestrator)
                .map_err(|e| self.surface(e))?
        };

        let target = pending.target();
        let outcome = pending.wait().await;

        let settlement = {
            let mut state = self.inner.state.lock().await;
            if self.is_disposed() {
                debug!("Dropping analysis of {} for disposed workflow", target);
                return Err(AppError::Disposed);
            }
            state.complete_analysis(outcome)
        };

        match settlement {
            Settlement::Succeeded(report) => {
                self.inner.sink.notify(Notification::analysis_complete());
                Ok(Completion::Applied(report))
            }
            Settlement::Failed(e) => Err(self.surface(e)),
            Settlement::Stale => {
                debug!("Analysis of {} superseded by a newer image", target);
                Ok(Completion::Discarded)
            }
        }
    }

    /// Tears the session down: releases the camera and makes any in-flight
    /// completion a no-op. Safe to call more than once.
    pub async fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.shutdown.cancel();
        self.inner.camera.lock().await.stop();
        info!("Workflow disposed");
    }

    async fn accept(&self, payload: ImagePayload, notification: Notification) -> Result<Phase, AppError> {
        let mut state = self.inner.state.lock().await;
        if self.is_disposed() {
            debug!("Dropping payload {} for disposed workflow", payload.id());
            return Err(AppError::Disposed);
        }
        let phase = state.accept_image(payload);
        self.inner.sink.notify(notification);
        Ok(phase)
    }

    fn ensure_live(&self) -> Result<(), AppError> {
        if self.is_disposed() {
            Err(AppError::Disposed)
        } else {
            Ok(())
        }
    }

    fn surface(&self, error: AppError) -> AppError {
        if !matches!(error, AppError::Disposed) {
            self.inner.sink.notify(Notification::from(&error));
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::sample_report;
    use crate::analysis::HairAnalyzer;
    use crate::capture::{CaptureConstraints, SyntheticCamera};
    use crate::config::Settings;
    use crate::notify::{RecordingSink, Variant, ANALYSIS_FAILED_DESCRIPTION};
    use crate::workflow::WorkflowControllerBuilder;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Scripted {
        fail: bool,
    }

    #[async_trait]
    impl HairAnalyzer for Scripted {
        async fn analyze(&self, _image_data: &str) -> Result<AnalysisReport, AppError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if self.fail {
                Err(AppError::AnalysisFailed("backend unreachable".to_string()))
            } else {
                Ok(sample_report())
            }
        }

        fn name(&self) -> &'static str {
            "Scripted"
        }
    }

    struct Fixture {
        workflow: WorkflowController,
        camera: Arc<SyntheticCamera>,
        sink: Arc<RecordingSink>,
    }

    fn fixture(camera: SyntheticCamera, fail: bool) -> Fixture {
        let mut settings = Settings::default();
        settings.capture.ideal_width = 32;
        settings.capture.ideal_height = 24;
        let camera = Arc::new(camera);
        let sink = Arc::new(RecordingSink::new());
        let workflow = WorkflowControllerBuilder::new(settings)
            .video_source(camera.clone())
            .analyzer(Arc::new(Scripted { fail }))
            .notification_sink(sink.clone())
            .build()
            .unwrap();
        Fixture {
            workflow,
            camera,
            sink,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn capture_then_analyze_produces_report() {
        let f = fixture(SyntheticCamera::new(), false);

        f.workflow.start_camera().await.unwrap();
        assert!(f.workflow.is_streaming().await);
        assert_eq!(f.workflow.capture_photo().await.unwrap(), Phase::ImageReady);
        assert!(!f.workflow.is_streaming().await);
        assert_eq!(f.camera.live_tracks(), 0);

        let completion = f.workflow.submit().await.unwrap();
        assert_eq!(completion, Completion::Applied(sample_report()));
        assert_eq!(f.workflow.phase().await, Phase::ReportReady);
        assert!(f.workflow.display_model().await.is_some());
        assert_eq!(
            f.sink.titles(),
            vec!["Photo captured!", "Analysis complete!"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_analysis_keeps_image_for_retry() {
        let f = fixture(SyntheticCamera::new(), true);
        f.workflow.start_camera().await.unwrap();
        f.workflow.capture_photo().await.unwrap();

        let err = f.workflow.submit().await.unwrap_err();
        assert!(matches!(err, AppError::AnalysisFailed(_)));
        assert_eq!(f.workflow.phase().await, Phase::ImageReady);
        assert!(f.workflow.state().await.can_submit());

        let last = f.sink.last().unwrap();
        assert_eq!(last.title, "Analysis failed");
        assert_eq!(last.description, ANALYSIS_FAILED_DESCRIPTION);
        assert_eq!(last.variant, Variant::Destructive);

        // manual retry is allowed
        assert!(f.workflow.submit().await.is_err());
    }

    #[tokio::test]
    async fn submit_without_image_notifies_and_stays_empty() {
        let f = fixture(SyntheticCamera::new(), false);
        assert!(matches!(
            f.workflow.submit().await,
            Err(AppError::NoPendingImage)
        ));
        assert_eq!(f.workflow.phase().await, Phase::Empty);
        assert_eq!(f.sink.titles(), vec!["No photo selected"]);
    }

    #[tokio::test]
    async fn capture_without_camera_is_device_unavailable() {
        let f = fixture(SyntheticCamera::new(), false);
        assert!(matches!(
            f.workflow.capture_photo().await,
            Err(AppError::DeviceUnavailable(_))
        ));
        assert_eq!(f.workflow.phase().await, Phase::Empty);
    }

    #[tokio::test]
    async fn dispose_releases_camera_and_blocks_further_use() {
        let f = fixture(SyntheticCamera::new(), false);
        f.workflow.start_camera().await.unwrap();
        assert_eq!(f.camera.live_tracks(), 1);

        f.workflow.dispose().await;
        f.workflow.dispose().await;
        assert_eq!(f.camera.live_tracks(), 0);
        assert!(f.workflow.is_disposed());
        assert!(matches!(
            f.workflow.start_camera().await,
            Err(AppError::Disposed)
        ));
        assert!(f.sink.entries().is_empty());
    }

    #[tokio::test]
    async fn dropping_last_handle_releases_camera() {
        let camera = Arc::new(SyntheticCamera::new());
        {
            let workflow = WorkflowControllerBuilder::new(Settings::default())
                .video_source(camera.clone())
                .build()
                .unwrap();
            let clone = workflow.clone();
            clone.start_camera().await.unwrap();
            assert_eq!(camera.live_tracks(), 1);
        }
        assert_eq!(camera.live_tracks(), 0);
    }

    #[test]
    fn constraints_follow_capture_settings() {
        let settings = Settings::default();
        let constraints = CaptureConstraints::from(&settings.capture);
        assert_eq!((constraints.ideal_width, constraints.ideal_height), (1280, 720));
        assert!(!constraints.audio);
    }
}
