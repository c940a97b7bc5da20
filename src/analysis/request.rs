use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Lifecycle of one analysis, identified by the payload it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    target: Option<Uuid>,
    status: RequestStatus,
    failure: Option<String>,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self::idle()
    }
}

impl AnalysisRequest {
    pub fn idle() -> Self {
        Self {
            target: None,
            status: RequestStatus::Idle,
            failure: None,
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn target(&self) -> Option<Uuid> {
        self.target
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.status == RequestStatus::Running
    }

    /// Moves to `Running`. Rejected while another run is in flight; a finished
    /// request may be restarted.
    pub fn begin(&mut self, target: Uuid) -> Result<(), AppError> {
        if self.is_running() {
            return Err(AppError::RequestInFlight);
        }
        self.target = Some(target);
        self.status = RequestStatus::Running;
        self.failure = None;
        Ok(())
    }

    /// Returns false, leaving the request untouched, when `target` is not the
    /// running request.
    pub fn succeed(&mut self, target: Uuid) -> bool {
        if !self.is_running_for(target) {
            return false;
        }
        self.status = RequestStatus::Succeeded;
        true
    }

    pub fn fail(&mut self, target: Uuid, reason: impl Into<String>) -> bool {
        if !self.is_running_for(target) {
            return false;
        }
        self.status = RequestStatus::Failed;
        self.failure = Some(reason.into());
        true
    }

    fn is_running_for(&self, target: Uuid) -> bool {
        self.is_running() && self.target == Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_while_running_is_rejected_without_side_effects() {
        let first = Uuid::new_v4();
        let mut request = AnalysisRequest::idle();
        request.begin(first).unwrap();

        let snapshot = request.clone();
        assert!(matches!(
            request.begin(Uuid::new_v4()),
            Err(AppError::RequestInFlight)
        ));
        assert_eq!(request, snapshot);
        assert_eq!(request.target(), Some(first));
    }

    #[test]
    fn completion_for_other_target_is_ignored() {
        let target = Uuid::new_v4();
        let mut request = AnalysisRequest::idle();
        request.begin(target).unwrap();

        assert!(!request.succeed(Uuid::new_v4()));
        assert!(!request.fail(Uuid::new_v4(), "nope"));
        assert!(request.is_running());

        assert!(request.fail(target, "backend down"));
        assert_eq!(request.status(), RequestStatus::Failed);
        assert_eq!(request.failure(), Some("backend down"));
    }

    #[test]
    fn failed_request_can_be_retried() {
        let target = Uuid::new_v4();
        let mut request = AnalysisRequest::idle();
        request.begin(target).unwrap();
        request.fail(target, "timeout");

        request.begin(target).unwrap();
        assert!(request.is_running());
        assert_eq!(request.failure(), None);
        assert!(request.succeed(target));
        assert_eq!(request.status(), RequestStatus::Succeeded);
    }
}
