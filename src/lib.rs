pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod metrics;
pub mod noise;
pub mod operator;
pub mod pipeline;
pub mod reconstruction;
pub mod signals;
pub mod spectral;

pub use cache::DecompositionCache;
pub use config::ExperimentConfig;
pub use diagnostics::{l_curve, picard_analysis, LCurve, PicardAnalysis};
pub use metrics::{evaluate, EvaluationReport};
pub use operator::{ForwardOperator, OperatorBuilder, OperatorLoader, OperatorSpec, OperatorWriter};
pub use pipeline::{
    log_space, ExperimentSummary, ExperimentWorkflow, PreparedOperator, SweepCandidate,
    SweepConfig, SweepController, SweepOutcome,
};
pub use reconstruction::{
    MethodParameter, ReconstructionEngine, ReconstructionMethod, ReconstructionResult,
};
pub use spectral::{condition_number, SpectralDecomposer, SpectralDecomposition};
