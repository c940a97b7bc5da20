use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use super::report::{
    AnalysisReport, Concern, HairType, Porosity, ProteinBalance, ScalpCondition, Texture,
    Thickness, DAMAGE_RANGE, DENSITY_RANGE, HEALTH_SCORE_RANGE, MOISTURE_LEVEL_RANGE,
};
use crate::error::AppError;

/// The external analysis routine: takes a data-URI encoded image and resolves
/// to a report. Implementations may fail; callers see only a generic reason.
#[async_trait]
pub trait HairAnalyzer: Send + Sync {
    async fn analyze(&self, image_data: &str) -> Result<AnalysisReport, AppError>;
    fn name(&self) -> &'static str;
}

/// Stand-in for a real backend: waits a fixed latency and returns uniformly
/// random values within the documented ranges.
#[derive(Debug, Clone)]
pub struct SimulatedAnalyzer {
    latency: Duration,
}

impl SimulatedAnalyzer {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> AnalysisReport {
        let concern_count = rng.random_range(1..=3);
        AnalysisReport {
            hair_type: HairType::ALL[rng.random_range(0..HairType::ALL.len())],
            texture: Texture::ALL[rng.random_range(0..Texture::ALL.len())],
            density: rng.random_range(DENSITY_RANGE),
            thickness: Thickness::ALL[rng.random_range(0..Thickness::ALL.len())],
            porosity: Porosity::ALL[rng.random_range(0..Porosity::ALL.len())],
            scalp_condition: ScalpCondition::ALL[rng.random_range(0..ScalpCondition::ALL.len())],
            damage: rng.random_range(DAMAGE_RANGE),
            health_score: rng.random_range(HEALTH_SCORE_RANGE),
            moisture_level: rng.random_range(MOISTURE_LEVEL_RANGE),
            protein_balance: ProteinBalance::ALL[rng.random_range(0..ProteinBalance::ALL.len())],
            concerns: Concern::ALL[..concern_count].to_vec(),
        }
    }
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[async_trait]
impl HairAnalyzer for SimulatedAnalyzer {
    async fn analyze(&self, image_data: &str) -> Result<AnalysisReport, AppError> {
        debug!(
            "Simulating analysis of {} byte image over {:?}",
            image_data.len(),
            self.latency
        );
        tokio::time::sleep(self.latency).await;
        let report = Self::sample(&mut rand::rng());
        Ok(report)
    }

    fn name(&self) -> &'static str {
        "SimulatedAnalyzer"
    }
}
