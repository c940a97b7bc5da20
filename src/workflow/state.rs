use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::{
    AnalysisOrchestrator, AnalysisOutcome, AnalysisReport, AnalysisRequest, PendingAnalysis,
    Settlement,
};
use crate::common::ImagePayload;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Empty,
    ImageReady,
    Analyzing,
    ReportReady,
}

/// Single source of truth for a session. A report is only ever held while
/// the request succeeded for the current pending image.
///
/// `in_flight` tracks the analysis routine itself, independently of
/// `request`: replacing the image resets the request but the routine keeps
/// running until its outcome is settled, and no other may start before that.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pending_image: Option<ImagePayload>,
    request: AnalysisRequest,
    report: Option<AnalysisReport>,
    in_flight: Option<Uuid>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.pending_image.is_none() {
            Phase::Empty
        } else if self.request.is_running() {
            Phase::Analyzing
        } else if self.report.is_some() {
            Phase::ReportReady
        } else {
            Phase::ImageReady
        }
    }

    pub fn pending_image(&self) -> Option<&ImagePayload> {
        self.pending_image.as_ref()
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// True while an analysis routine has been started and not yet settled,
    /// even if the image it targets has since been replaced.
    pub fn is_analyzing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the analyze action should be offered.
    pub fn can_submit(&self) -> bool {
        self.pending_image.is_some() && self.report.is_none() && !self.is_analyzing()
    }

    /// Valid from every phase. Drops any report and forgets the current
    /// request, so an analysis still in flight will settle as stale. That
    /// analysis still blocks new submits until it settles.
    pub fn accept_image(&mut self, payload: ImagePayload) -> Phase {
        let previous = self.phase();
        info!(
            "Accepted {:?} payload {} ({:?} -> ImageReady)",
            payload.provenance(),
            payload.id(),
            previous
        );
        self.pending_image = Some(payload);
        self.report = None;
        self.request = AnalysisRequest::idle();
        self.phase()
    }

    pub fn begin_analysis(
        &mut self,
        orchestrator: &AnalysisOrchestrator,
    ) -> Result<PendingAnalysis, AppError> {
        let payload = self.pending_image.as_ref().ok_or(AppError::NoPendingImage)?;
        if self.report.is_some() {
            return Err(AppError::ReportAlreadyAvailable);
        }
        if let Some(running) = self.in_flight {
            warn!("Analysis of {} has not settled yet", running);
            return Err(AppError::RequestInFlight);
        }
        let pending = orchestrator.submit(&mut self.request, payload)?;
        self.in_flight = Some(pending.target());
        debug!("Workflow is now {:?}", self.phase());
        Ok(pending)
    }

    /// Settles `outcome` and frees the analysis slot, stale or not.
    pub fn complete_analysis(&mut self, outcome: AnalysisOutcome) -> Settlement {
        if self.in_flight == Some(outcome.target) {
            self.in_flight = None;
        }
        let settlement = AnalysisOrchestrator::settle(&mut self.request, outcome);
        if let Settlement::Succeeded(report) = &settlement {
            self.report = Some(report.clone());
        }
        debug!("Workflow is now {:?}", self.phase());
        settlement
    }
}
