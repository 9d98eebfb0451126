//! Evaluation results and batch summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// The complete scored assessment of one pipeline response.
///
/// Created once by the evaluator and never mutated afterwards; every score
/// field is clamped to [0, 1] at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The query that was answered.
    pub query: String,
    /// Excerpt of the scored response (truncated per configuration).
    pub response: String,
    /// When the evaluation ran.
    pub timestamp: DateTime<Utc>,

    /// Word count of the full response.
    pub response_length: usize,

    // Response quality.
    pub readability: f64,
    pub completeness: f64,
    pub relevance: f64,
    pub actionability: f64,

    // Stage coordination.
    pub coordination: f64,
    pub workflow_efficiency: f64,
    pub tool_usage_effectiveness: f64,

    // Performance.
    /// Measured total pipeline time in seconds, passed through unchanged.
    pub total_response_time: f64,
    /// Measured per-stage times, copied through from the input.
    pub stage_times: BTreeMap<Stage, f64>,
    /// Normalized response-time score.
    pub response_time_score: f64,
    /// Memory-utilization score.
    pub memory_usage_score: f64,

    // Aggregates.
    pub overall_quality_score: f64,
    pub system_efficiency_score: f64,
    pub final_score: f64,
}

/// Mean of every metric across a batch of evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Number of evaluations folded into the summary.
    pub total_evaluations: usize,
    pub avg_final_score: f64,
    pub avg_quality_score: f64,
    pub avg_efficiency_score: f64,
    pub avg_response_time: f64,
    pub avg_response_length: f64,
    pub avg_readability: f64,
    pub avg_completeness: f64,
    pub avg_relevance: f64,
    pub avg_actionability: f64,
    pub avg_coordination: f64,
    pub avg_workflow_efficiency: f64,
    pub avg_tool_usage: f64,
    pub avg_memory_usage: f64,
}

impl EvaluationSummary {
    /// Summarize a batch of results, or `None` for an empty batch.
    pub fn from_results(results: &[EvaluationResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let mean = |f: &dyn Fn(&EvaluationResult) -> f64| -> f64 {
            results.iter().map(|r| f(r)).sum::<f64>() / results.len() as f64
        };
        Some(Self {
            total_evaluations: results.len(),
            avg_final_score: mean(&|r| r.final_score),
            avg_quality_score: mean(&|r| r.overall_quality_score),
            avg_efficiency_score: mean(&|r| r.system_efficiency_score),
            avg_response_time: mean(&|r| r.total_response_time),
            avg_response_length: mean(&|r| r.response_length as f64),
            avg_readability: mean(&|r| r.readability),
            avg_completeness: mean(&|r| r.completeness),
            avg_relevance: mean(&|r| r.relevance),
            avg_actionability: mean(&|r| r.actionability),
            avg_coordination: mean(&|r| r.coordination),
            avg_workflow_efficiency: mean(&|r| r.workflow_efficiency),
            avg_tool_usage: mean(&|r| r.tool_usage_effectiveness),
            avg_memory_usage: mean(&|r| r.memory_usage_score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(final_score: f64, time: f64) -> EvaluationResult {
        EvaluationResult {
            query: "q".to_string(),
            response: "r".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            response_length: 10,
            readability: 0.5,
            completeness: 0.5,
            relevance: 0.5,
            actionability: 0.5,
            coordination: 0.5,
            workflow_efficiency: 0.5,
            tool_usage_effectiveness: 0.5,
            total_response_time: time,
            stage_times: BTreeMap::new(),
            response_time_score: 1.0,
            memory_usage_score: 0.5,
            overall_quality_score: 0.5,
            system_efficiency_score: 0.5,
            final_score,
        }
    }

    #[test]
    fn test_empty_batch_has_no_summary() {
        assert!(EvaluationSummary::from_results(&[]).is_none());
    }

    #[test]
    fn test_summary_averages() {
        let summary =
            EvaluationSummary::from_results(&[result(0.4, 2.0), result(0.8, 4.0)]).unwrap();
        assert_eq!(summary.total_evaluations, 2);
        assert!((summary.avg_final_score - 0.6).abs() < 1e-12);
        assert!((summary.avg_response_time - 3.0).abs() < 1e-12);
        assert!((summary.avg_response_length - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_result_serializes_round_trip() {
        let original = result(0.75, 5.0);
        let json = serde_json::to_string(&original).unwrap();
        let back: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.final_score, original.final_score);
        assert_eq!(back.timestamp, original.timestamp);
    }
}
