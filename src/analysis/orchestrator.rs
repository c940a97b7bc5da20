use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;
use tower::timeout::error::Elapsed;
use tower::timeout::Timeout;
use tower::{BoxError, ServiceBuilder, ServiceExt};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{AnalysisReport, AnalysisRequest, AnalyzerService, HairAnalyzer};
use crate::common::ImagePayload;
use crate::error::AppError;

/// Drives the external analysis routine and owns the running-request guard.
///
/// `submit` is synchronous: it flips the request to running and hands back a
/// `PendingAnalysis`. Awaiting that is the only suspension point, and the
/// caller feeds the outcome back through `settle`. A started analysis is never
/// cancelled.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    service: Timeout<AnalyzerService>,
    analyzer_name: &'static str,
    timeout: Duration,
}

pub struct PendingAnalysis {
    target: Uuid,
    future: BoxFuture<'static, AnalysisOutcome>,
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub target: Uuid,
    pub result: Result<AnalysisReport, AppError>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum Settlement {
    Succeeded(AnalysisReport),
    Failed(AppError),
    /// The request moved on (new image or reset) before this outcome arrived.
    Stale,
}

impl AnalysisOrchestrator {
    pub fn new(analyzer: Arc<dyn HairAnalyzer>, timeout: Duration) -> Self {
        let service = AnalyzerService::new(analyzer);
        let analyzer_name = service.analyzer_name();
        Self {
            service: ServiceBuilder::new().timeout(timeout).service(service),
            analyzer_name,
            timeout,
        }
    }

    pub fn analyzer_name(&self) -> &'static str {
        self.analyzer_name
    }

    #[instrument(skip(self, request, payload), fields(payload = %payload.id(), analyzer = self.analyzer_name))]
    pub fn submit(
        &self,
        request: &mut AnalysisRequest,
        payload: &ImagePayload,
    ) -> Result<PendingAnalysis, AppError> {
        if let Err(e) = request.begin(payload.id()) {
            warn!("Rejected analysis submit: {}", e);
            return Err(e);
        }
        info!("Analysis started");

        let target = payload.id();
        let service = self.service.clone();
        let payload = payload.clone();
        let timeout = self.timeout;

        let future = Box::pin(async move {
            let started = Instant::now();
            let result = match service.oneshot(payload).await {
                Ok(report) => report.validate().map(|_| report),
                Err(e) => Err(into_analysis_failure(e, timeout)),
            };
            let elapsed = started.elapsed();
            match &result {
                Ok(_) => info!("Analysis of {} finished in {}ms", target, elapsed.as_millis()),
                Err(e) => error!(
                    "Analysis of {} failed after {}ms: {}",
                    target,
                    elapsed.as_millis(),
                    e
                ),
            }
            AnalysisOutcome {
                target,
                result,
                elapsed,
            }
        });

        Ok(PendingAnalysis { target, future })
    }

    /// Applies an outcome to the request it belongs to.
    pub fn settle(request: &mut AnalysisRequest, outcome: AnalysisOutcome) -> Settlement {
        match outcome.result {
            Ok(report) => {
                if request.succeed(outcome.target) {
                    Settlement::Succeeded(report)
                } else {
                    Settlement::Stale
                }
            }
            Err(e) => {
                if request.fail(outcome.target, e.to_string()) {
                    Settlement::Failed(e)
                } else {
                    Settlement::Stale
                }
            }
        }
    }
}

impl PendingAnalysis {
    pub fn target(&self) -> Uuid {
        self.target
    }

    pub async fn wait(self) -> AnalysisOutcome {
        self.future.await
    }
}

impl fmt::Debug for PendingAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAnalysis")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// Every routine failure becomes AnalysisFailed; the reason is for logs only.
fn into_analysis_failure(error: BoxError, timeout: Duration) -> AppError {
    if error.is::<Elapsed>() {
        return AppError::AnalysisFailed(format!("no result within {}ms", timeout.as_millis()));
    }
    match error.downcast::<AppError>() {
        Ok(app_error) => match *app_error {
            AppError::AnalysisFailed(reason) => AppError::AnalysisFailed(reason),
            other => AppError::AnalysisFailed(other.to_string()),
        },
        Err(other) => AppError::AnalysisFailed(other.to_string()),
    }
}
