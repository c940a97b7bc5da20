use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("An analysis request is already running")]
    RequestInFlight,
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("Image could not be decoded: {0}")]
    Decode(String),
    #[error("A report is already available for this image")]
    ReportAlreadyAvailable,
    #[error("No image is pending analysis")]
    NoPendingImage,
    #[error("The workflow has been disposed")]
    Disposed,
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Errors the user can recover from by acting again in the same session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::DeviceUnavailable(_)
                | AppError::PayloadTooLarge { .. }
                | AppError::UnsupportedFormat(_)
                | AppError::RequestInFlight
                | AppError::AnalysisFailed(_)
                | AppError::Decode(_)
                | AppError::NoPendingImage
                | AppError::ReportAlreadyAvailable
        )
    }
}
