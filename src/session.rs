//! Per-query session log.
//!
//! The write side of the pipeline's shared state that the evaluator's inputs
//! are assembled from: stage output records with timestamps, the current
//! query, and a coarse status. The evaluator itself only ever sees the
//! read-only [`MemorySnapshot`] this log exposes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluation::input::{EvaluationInput, MemorySnapshot, StageOutput};
use crate::stage::Stage;

/// Coarse progress of the query currently being processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Planning,
    Researching,
    Writing,
    Completed,
}

/// Accumulates stage outputs for one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLog {
    /// The query currently being processed.
    pub query: Option<String>,
    /// Where the pipeline currently is.
    pub status: SessionStatus,
    outputs: BTreeMap<Stage, Vec<StageOutput>>,
}

impl SessionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new query, clearing previous state.
    pub fn start_query(&mut self, query: impl Into<String>) {
        self.clear();
        self.query = Some(query.into());
        self.status = SessionStatus::Planning;
    }

    /// Update the coarse status.
    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    /// Record an output for a stage.
    pub fn record(&mut self, stage: Stage, text: impl Into<String>, timestamp: DateTime<Utc>) {
        self.outputs
            .entry(stage)
            .or_default()
            .push(StageOutput::new(text, timestamp));
    }

    /// Record an output carrying a step label.
    pub fn record_step(
        &mut self,
        stage: Stage,
        text: impl Into<String>,
        step: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        self.outputs
            .entry(stage)
            .or_default()
            .push(StageOutput::new(text, timestamp).with_step(step));
    }

    /// All recorded outputs per stage.
    pub fn outputs(&self) -> &BTreeMap<Stage, Vec<StageOutput>> {
        &self.outputs
    }

    /// Read-only view of the log's size: record count plus an estimate of
    /// the stored payload bytes.
    pub fn snapshot(&self) -> MemorySnapshot {
        let items = self.outputs.values().map(Vec::len).sum();
        let mut estimated_bytes: usize =
            self.query.as_ref().map(String::len).unwrap_or(0);
        estimated_bytes += self
            .outputs
            .values()
            .flatten()
            .map(|record| record.text.len())
            .sum::<usize>();
        MemorySnapshot::new(items, estimated_bytes)
    }

    /// Assemble an [`EvaluationInput`] from the recorded state plus the
    /// caller's measured timings and final response.
    pub fn to_input(
        &self,
        response: impl Into<String>,
        stage_times: BTreeMap<Stage, f64>,
        total_time: f64,
    ) -> EvaluationInput {
        EvaluationInput {
            query: self.query.clone().unwrap_or_default(),
            response: response.into(),
            stage_outputs: self.outputs.clone(),
            stage_times,
            total_time,
            memory: self.snapshot(),
        }
    }

    /// Reset to the idle state.
    pub fn clear(&mut self) {
        self.query = None;
        self.status = SessionStatus::Idle;
        self.outputs.clear();
    }
}
