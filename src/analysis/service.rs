use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;

use super::{AnalysisReport, HairAnalyzer};
use crate::common::ImagePayload;
use crate::error::AppError;

/// Exposes a `HairAnalyzer` as a tower `Service` so it can be wrapped in
/// middleware such as timeouts.
#[derive(Clone)]
pub struct AnalyzerService {
    inner: Arc<dyn HairAnalyzer>,
}

impl AnalyzerService {
    pub fn new(inner: Arc<dyn HairAnalyzer>) -> Self {
        Self { inner }
    }

    pub fn analyzer_name(&self) -> &'static str {
        self.inner.name()
    }
}

impl Service<ImagePayload> for AnalyzerService {
    type Response = AnalysisReport;
    type Error = AppError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, payload: ImagePayload) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move { inner.analyze(payload.data_uri()).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::report::sample_report;
    use crate::common::Provenance;
    use async_trait::async_trait;
    use tower::ServiceExt;

    struct EchoLength;

    #[async_trait]
    impl HairAnalyzer for EchoLength {
        async fn analyze(&self, image_data: &str) -> Result<AnalysisReport, AppError> {
            let mut report = sample_report();
            report.concerns.truncate(image_data.len() % 3);
            Ok(report)
        }

        fn name(&self) -> &'static str {
            "EchoLength"
        }
    }

    #[tokio::test]
    async fn test_analyzer_service() {
        let service = AnalyzerService::new(Arc::new(EchoLength));
        assert_eq!(service.analyzer_name(), "EchoLength");

        let payload = ImagePayload::from_bytes("image/png", &[1, 2, 3], Provenance::Upload);
        let expected_len = payload.data_uri().len() % 3;
        let report = service.oneshot(payload).await.unwrap();
        assert_eq!(report.concerns.len(), expected_len.min(2));
    }
}
