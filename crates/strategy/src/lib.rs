pub mod indicators;
pub mod news;
pub mod prompt;
pub mod repair;
pub mod retry;
pub mod services;

pub use repair::RepairError;
pub use retry::RetryPolicy;
pub use services::pipeline::{AnalysisPipeline, Analyst, FailureReason, PipelineOutcome};
