use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::Level;

use crate::capture::FacingMode;
use crate::error::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "hair-lens";
pub const ENV_PREFIX: &str = "HAIR_LENS";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub upload: UploadSettings,
    pub capture: CaptureSettings,
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub max_bytes: u64,
    pub accepted_mime_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingMode,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub simulated_latency_ms: u64,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            accepted_mime_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing: FacingMode::User,
            jpeg_quality: 92,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 2000,
            timeout_ms: 30_000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AnalysisSettings {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LoggingSettings {
    pub fn max_level(&self) -> Result<Level, AppError> {
        Level::from_str(self.level.trim())
            .map_err(|_| AppError::InvalidConfig(format!("unknown log level '{}'", self.level)))
    }
}

impl Settings {
    /// Layers defaults, an optional config file and `HAIR_LENS_*` environment
    /// variables. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.accepted_mime_types")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), AppError> {
        if self.upload.max_bytes == 0 {
            return Err(AppError::InvalidConfig(
                "upload.max_bytes must be greater than 0".to_string(),
            ));
        }

        if self.upload.accepted_mime_types.is_empty() {
            return Err(AppError::InvalidConfig(
                "at least one upload MIME type must be accepted".to_string(),
            ));
        }

        if self.capture.ideal_width == 0 || self.capture.ideal_height == 0 {
            return Err(AppError::InvalidConfig(
                "capture dimensions must be greater than 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(AppError::InvalidConfig(
                "capture.jpeg_quality must be between 1 and 100".to_string(),
            ));
        }

        if self.analysis.timeout_ms == 0 {
            return Err(AppError::InvalidConfig(
                "analysis.timeout_ms must be greater than 0".to_string(),
            ));
        }

        self.logging.max_level()?;
        Ok(())
    }

    // Overrides the simulated analysis latency, mostly useful for tests and demos.
    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.analysis.simulated_latency_ms =
            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
