//! Input records consumed by the evaluation engine.
//!
//! The engine never talks to the pipeline it scores. Everything it needs
//! (the final response, per-stage output records, measured timings, and a
//! read-only memory snapshot) arrives in one [`EvaluationInput`] assembled
//! by the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::stage::Stage;

/// One output record produced by a pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// The text payload the stage emitted.
    pub text: String,
    /// Optional label for the step within the stage that produced this.
    #[serde(default)]
    pub step: Option<String>,
    /// When the record was written.
    pub timestamp: DateTime<Utc>,
}

impl StageOutput {
    /// Create a record with the given payload and timestamp.
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            step: None,
            timestamp,
        }
    }

    /// Attach a step label.
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }
}

/// Read-only view of the pipeline's memory state.
///
/// The evaluator only reads counts and sizes from memory; it never holds a
/// handle that could mutate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Number of records currently stored.
    pub items: usize,
    /// Estimated total payload size in bytes.
    pub estimated_bytes: usize,
}

impl MemorySnapshot {
    /// Create a snapshot from an item count and size estimate.
    pub fn new(items: usize, estimated_bytes: usize) -> Self {
        Self {
            items,
            estimated_bytes,
        }
    }
}

/// Everything the engine needs to score one pipeline response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInput {
    /// Original user text.
    pub query: String,
    /// Final synthesized text to be scored.
    pub response: String,
    /// Ordered output records per stage.
    #[serde(default)]
    pub stage_outputs: BTreeMap<Stage, Vec<StageOutput>>,
    /// Measured elapsed seconds per stage.
    #[serde(default)]
    pub stage_times: BTreeMap<Stage, f64>,
    /// Measured elapsed seconds for the whole pipeline.
    pub total_time: f64,
    /// Memory state at the end of the run.
    #[serde(default)]
    pub memory: MemorySnapshot,
}

impl EvaluationInput {
    /// Build an input carrying only a query and response.
    ///
    /// Stage data and memory default to empty; useful for scoring
    /// single-stage (baseline) responses where no coordination metadata
    /// exists.
    pub fn bare(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            stage_outputs: BTreeMap::new(),
            stage_times: BTreeMap::new(),
            total_time: 0.0,
            memory: MemorySnapshot::default(),
        }
    }

    /// Check the record for structural validity.
    ///
    /// An empty response is a valid (zero-scoring) input; an empty query is
    /// not, and neither are negative or non-finite timings. The engine
    /// refuses to guess substitute values.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.query.trim().is_empty() {
            return Err(EvalError::invalid_input("query must not be empty"));
        }
        if !self.total_time.is_finite() || self.total_time < 0.0 {
            return Err(EvalError::invalid_input(format!(
                "total_time must be a non-negative finite number, got {}",
                self.total_time
            )));
        }
        for (stage, time) in &self.stage_times {
            if !time.is_finite() || *time < 0.0 {
                return Err(EvalError::invalid_input(format!(
                    "stage_times[{}] must be a non-negative finite number, got {}",
                    stage, time
                )));
            }
        }
        Ok(())
    }

    /// Concatenated text of all records for one stage.
    pub fn stage_text(&self, stage: Stage) -> String {
        match self.stage_outputs.get(&stage) {
            Some(outputs) => outputs
                .iter()
                .map(|o| o.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            None => String::new(),
        }
    }

    /// Whether a stage produced at least one output record.
    pub fn stage_participated(&self, stage: Stage) -> bool {
        self.stage_outputs
            .get(&stage)
            .is_some_and(|outputs| !outputs.is_empty())
    }
}
