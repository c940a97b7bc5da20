pub mod analyzer;
pub mod orchestrator;
pub mod report;
pub mod request;
pub mod service;

pub use analyzer::{HairAnalyzer, SimulatedAnalyzer};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome, PendingAnalysis, Settlement};
pub use report::{
    AnalysisReport, Concern, HairType, Porosity, ProteinBalance, ScalpCondition, Texture,
    Thickness,
};
pub use request::{AnalysisRequest, RequestStatus};
pub use service::AnalyzerService;
