//! # fiteval
//!
//! Heuristic evaluation engine for multi-stage fitness assistants.
//!
//! Scores a pipeline's final response for readability, completeness,
//! relevance, and actionability; scores the pipeline's own behavior for
//! stage coordination, workflow efficiency, and tool usage; normalizes
//! timing and memory readings; and aggregates everything into bounded
//! [0, 1] scores. A batch harness runs a standardized query dataset through
//! a candidate and a baseline pipeline and emits the comparison as JSON and
//! markdown reports derived from the same data.
//!
//! The engine is pure and synchronous: every evaluation is a deterministic
//! function of its input record, and all timings arrive pre-measured from
//! the caller.

pub mod comparison;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod harness;
pub mod report;
pub mod session;
pub mod stage;
pub mod utilities;

pub use comparison::{PercentDelta, SystemComparison, Verdict};
pub use config::EvaluationConfig;
pub use dataset::{TestCase, TestDataset};
pub use error::EvalError;
pub use evaluation::{
    EvaluationInput, EvaluationResult, EvaluationSummary, MemorySnapshot, StageOutput,
    SystemEvaluator,
};
pub use harness::{EvaluationHarness, Pipeline, PipelineRun, RecordedPipeline};
pub use report::BatchReport;
pub use session::SessionLog;
pub use stage::Stage;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
