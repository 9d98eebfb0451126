//! The evaluation engine.
//!
//! A pure, synchronous scoring pass over the outputs of an external
//! multi-stage text-generation pipeline. Each call consumes one
//! [`EvaluationInput`] and produces one immutable [`EvaluationResult`]; there
//! is no shared mutable state between calls beyond the history the
//! [`SystemEvaluator`] keeps for batch summaries.

pub mod coordination;
pub mod input;
pub mod performance;
pub mod quality;
pub mod result;
pub mod text;

use chrono::{DateTime, Utc};

use crate::config::EvaluationConfig;
use crate::error::EvalError;
use crate::evaluation::coordination::CoordinationEvaluator;
use crate::evaluation::performance::PerformanceEvaluator;
use crate::evaluation::quality::ResponseQualityEvaluator;
use crate::evaluation::text::weighted_mean;

pub use input::{EvaluationInput, MemorySnapshot, StageOutput};
pub use result::{EvaluationResult, EvaluationSummary};

/// Coordinates the three evaluator components and aggregates their scores.
///
/// Holds the read-only configuration and an in-memory history of produced
/// results for summary reporting. Scoring itself is a pure function of the
/// input and the timestamp; see [`SystemEvaluator::evaluate_at`].
#[derive(Debug, Clone, Default)]
pub struct SystemEvaluator {
    config: EvaluationConfig,
    history: Vec<EvaluationResult>,
}

impl SystemEvaluator {
    /// Create an evaluator with the given configuration.
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// All results produced so far, in evaluation order.
    pub fn history(&self) -> &[EvaluationResult] {
        &self.history
    }

    /// Drop the accumulated history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Evaluate one pipeline response, stamping the current time, and record
    /// the result in the history.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidInput`] for structurally invalid input;
    /// low-quality input scores low, it does not fail.
    pub fn evaluate(&mut self, input: &EvaluationInput) -> Result<EvaluationResult, EvalError> {
        let result = self.evaluate_at(input, Utc::now())?;
        self.history.push(result.clone());
        Ok(result)
    }

    /// Evaluate one pipeline response with a caller-supplied timestamp.
    ///
    /// This is the deterministic core: identical input and timestamp yield a
    /// bit-identical result. The history is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidInput`] for structurally invalid input.
    pub fn evaluate_at(
        &self,
        input: &EvaluationInput,
        timestamp: DateTime<Utc>,
    ) -> Result<EvaluationResult, EvalError> {
        input.validate()?;

        let quality = ResponseQualityEvaluator::new(&self.config.quality);
        let coordination = CoordinationEvaluator::new(&self.config.coordination);
        let performance = PerformanceEvaluator::new(&self.config.performance);

        let readability = quality.readability(&input.response);
        let completeness = quality.completeness(&input.response, &input.query);
        let relevance = quality.relevance(&input.response, &input.query);
        let actionability = quality.actionability(&input.response);

        let coordination_score = coordination.coordination(input);
        let workflow_efficiency = coordination.workflow_efficiency(input);
        let tool_usage = coordination.tool_usage(input, &input.response);

        let response_time_score = performance.response_time_score(input.total_time);
        let memory_usage_score = performance.memory_usage_score(&input.memory);

        let quality_weights = &self.config.quality.weights;
        let overall_quality_score = weighted_mean(&[
            (readability, quality_weights.readability),
            (completeness, quality_weights.completeness),
            (relevance, quality_weights.relevance),
            (actionability, quality_weights.actionability),
        ]);

        let efficiency_weights = &self.config.scoring.efficiency_weights;
        let system_efficiency_score = weighted_mean(&[
            (coordination_score, efficiency_weights.coordination),
            (workflow_efficiency, efficiency_weights.workflow),
            (tool_usage, efficiency_weights.tool_usage),
            (memory_usage_score, efficiency_weights.memory),
            (response_time_score, efficiency_weights.response_time),
        ]);

        let final_score = weighted_mean(&[
            (overall_quality_score, self.config.scoring.quality_weight),
            (system_efficiency_score, self.config.scoring.efficiency_weight),
        ]);

        log::debug!(
            "evaluated query ({} words): quality {:.3}, efficiency {:.3}, final {:.3}",
            quality.response_length(&input.response),
            overall_quality_score,
            system_efficiency_score,
            final_score,
        );

        Ok(EvaluationResult {
            query: input.query.clone(),
            response: excerpt(&input.response, self.config.scoring.response_excerpt_chars),
            timestamp,
            response_length: quality.response_length(&input.response),
            readability,
            completeness,
            relevance,
            actionability,
            coordination: coordination_score,
            workflow_efficiency,
            tool_usage_effectiveness: tool_usage,
            total_response_time: input.total_time,
            stage_times: input.stage_times.clone(),
            response_time_score,
            memory_usage_score,
            overall_quality_score,
            system_efficiency_score,
            final_score,
        })
    }

    /// Summary statistics over the accumulated history, or `None` when no
    /// evaluations have run.
    pub fn summary(&self) -> Option<EvaluationSummary> {
        EvaluationSummary::from_results(&self.history)
    }
}

/// Truncate text to a character budget, marking the cut with an ellipsis.
fn excerpt(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
