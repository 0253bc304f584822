pub mod prepare;
pub mod sweep;
pub mod workflow;

pub use prepare::PreparedOperator;
pub use sweep::{log_space, SweepCandidate, SweepConfig, SweepController, SweepOutcome};
pub use workflow::{ExperimentSummary, ExperimentWorkflow};
