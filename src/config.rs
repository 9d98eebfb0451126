//! Evaluation configuration.
//!
//! Every weight, threshold, budget, and keyword list used by the scoring
//! functions lives here. The defaults reproduce the engine's standard
//! behavior; callers that need different trade-offs load overrides from a
//! TOML file or construct a config in code. Configuration is read-only for
//! the lifetime of an evaluator; nothing in the engine mutates it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::stage::Stage;

/// Top-level configuration for the evaluation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Response-quality scoring knobs.
    pub quality: QualityConfig,
    /// Stage-coordination scoring knobs.
    pub coordination: CoordinationConfig,
    /// Timing and memory scoring knobs.
    pub performance: PerformanceConfig,
    /// Aggregate weighting.
    pub scoring: ScoringConfig,
}

impl EvaluationConfig {
    /// Parse a configuration from a TOML string.
    ///
    /// Missing sections and keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Config`] if the TOML is malformed or a weight
    /// fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self, EvalError> {
        let config: EvaluationConfig = toml::from_str(raw).map_err(|e| EvalError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Io`] if the file cannot be read and
    /// [`EvalError::Config`] if its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Check that weights are finite and non-negative and that at least one
    /// weight in each aggregate is positive.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Config`] describing the first offending value.
    pub fn validate(&self) -> Result<(), EvalError> {
        let named = [
            ("quality.weights.readability", self.quality.weights.readability),
            ("quality.weights.completeness", self.quality.weights.completeness),
            ("quality.weights.relevance", self.quality.weights.relevance),
            ("quality.weights.actionability", self.quality.weights.actionability),
            ("scoring.efficiency_weights.coordination", self.scoring.efficiency_weights.coordination),
            ("scoring.efficiency_weights.workflow", self.scoring.efficiency_weights.workflow),
            ("scoring.efficiency_weights.tool_usage", self.scoring.efficiency_weights.tool_usage),
            ("scoring.efficiency_weights.memory", self.scoring.efficiency_weights.memory),
            ("scoring.efficiency_weights.response_time", self.scoring.efficiency_weights.response_time),
            ("scoring.quality_weight", self.scoring.quality_weight),
            ("scoring.efficiency_weight", self.scoring.efficiency_weight),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(EvalError::Config {
                    message: format!("weight '{}' must be finite and non-negative, got {}", name, value),
                });
            }
        }
        if self.quality.weights.total() <= 0.0 {
            return Err(EvalError::Config {
                message: "quality weights must not all be zero".to_string(),
            });
        }
        if self.scoring.quality_weight + self.scoring.efficiency_weight <= 0.0 {
            return Err(EvalError::Config {
                message: "final-score weights must not all be zero".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Weights for the four response-quality sub-scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub readability: f64,
    pub completeness: f64,
    pub relevance: f64,
    pub actionability: f64,
}

impl QualityWeights {
    /// Sum of all four weights.
    pub fn total(&self) -> f64 {
        self.readability + self.completeness + self.relevance + self.actionability
    }
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            readability: 0.25,
            completeness: 0.25,
            relevance: 0.25,
            actionability: 0.25,
        }
    }
}

/// Knobs for the response-quality evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Weights for combining the four sub-scores into the quality aggregate.
    pub weights: QualityWeights,

    /// Lower edge of the ideal words-per-sentence band.
    pub readability_band_low: f64,
    /// Upper edge of the ideal words-per-sentence band.
    pub readability_band_high: f64,
    /// Divisor for the linear decay outside the band.
    pub readability_falloff: f64,

    /// Weight of query-term coverage inside the completeness score.
    pub coverage_weight: f64,
    /// Weight of domain-keyword coverage inside the completeness score.
    pub domain_weight: f64,
    /// Weight of structural markers inside the completeness score.
    pub structure_weight: f64,
    /// Domain keywords that count toward full domain coverage.
    pub domain_keyword_target: usize,

    /// Weight of query-term overlap inside the relevance score.
    pub relevance_overlap_weight: f64,
    /// Weight of domain vocabulary inside the relevance score.
    pub relevance_domain_weight: f64,
    /// Weight of the on-topic check inside the relevance score.
    pub relevance_context_weight: f64,
    /// Domain keywords that count toward full relevance coverage.
    pub relevance_domain_target: usize,

    /// Weight of action verbs inside the actionability score.
    pub action_word_weight: f64,
    /// Weight of numeric prescriptions inside the actionability score.
    pub instruction_weight: f64,
    /// Weight of step markers inside the actionability score.
    pub step_marker_weight: f64,
    /// Distinct action verbs that count as fully actionable.
    pub action_word_target: usize,
    /// Matched prescription patterns that count as fully prescriptive.
    pub instruction_target: usize,
    /// Step markers that count as fully structured.
    pub step_marker_target: usize,

    /// Vocabulary that marks a response as belonging to the training domain.
    pub domain_keywords: Vec<String>,
    /// Imperative verbs that signal executable guidance.
    pub action_words: Vec<String>,
    /// Words excluded when collecting significant query terms.
    pub stopwords: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            weights: QualityWeights::default(),
            readability_band_low: 15.0,
            readability_band_high: 20.0,
            readability_falloff: 17.5,
            coverage_weight: 0.4,
            domain_weight: 0.3,
            structure_weight: 0.3,
            domain_keyword_target: 5,
            relevance_overlap_weight: 0.4,
            relevance_domain_weight: 0.4,
            relevance_context_weight: 0.2,
            relevance_domain_target: 3,
            action_word_weight: 0.4,
            instruction_weight: 0.4,
            step_marker_weight: 0.2,
            action_word_target: 5,
            instruction_target: 3,
            step_marker_target: 4,
            domain_keywords: default_domain_keywords(),
            action_words: default_action_words(),
            stopwords: default_stopwords(),
        }
    }
}

fn default_domain_keywords() -> Vec<String> {
    [
        "exercise", "workout", "fitness", "strength", "cardio", "nutrition",
        "diet", "protein", "calories", "muscle", "training", "recovery",
        "sets", "reps", "intensity", "form", "technique", "safety",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_action_words() -> Vec<String> {
    [
        "start", "begin", "perform", "do", "try", "practice", "follow",
        "avoid", "include", "focus", "aim", "target", "maintain", "increase",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_stopwords() -> Vec<String> {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for",
        "from", "has", "have", "how", "i", "in", "is", "it", "its", "me",
        "my", "of", "on", "or", "should", "that", "the", "this", "to",
        "want", "wants", "what", "which", "who", "will", "with", "you",
        "your",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ---------------------------------------------------------------------------
// Coordination
// ---------------------------------------------------------------------------

/// Knobs for the stage-coordination evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Stages that are expected to produce at least one output.
    pub expected_stages: Vec<Stage>,
    /// Weight of the participation component inside the coordination score.
    pub participation_weight: f64,
    /// Weight of the information-flow component inside the coordination score.
    pub info_flow_weight: f64,

    /// Per-stage elapsed-time budgets, in seconds.
    pub stage_budgets: BTreeMap<Stage, f64>,
    /// Budget applied to stages without an explicit entry.
    pub default_stage_budget: f64,
    /// Weight of the within-budget component inside workflow efficiency.
    pub budget_weight: f64,
    /// Weight of the time-balance component inside workflow efficiency.
    pub balance_weight: f64,

    /// Markers that identify a tool invocation inside research output.
    pub tool_markers: Vec<String>,
    /// Distinct tools that count as full tool diversity.
    pub expected_tool_count: usize,
    /// Weight of tool diversity inside tool-usage effectiveness.
    pub tool_diversity_weight: f64,
    /// Weight of downstream reuse inside tool-usage effectiveness.
    pub tool_reuse_weight: f64,
    /// Shared significant words required to count as downstream reuse.
    pub tool_reuse_min_shared_terms: usize,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        let mut stage_budgets = BTreeMap::new();
        stage_budgets.insert(Stage::Planner, 3.0);
        stage_budgets.insert(Stage::Research, 5.0);
        stage_budgets.insert(Stage::Writer, 4.0);
        Self {
            expected_stages: Stage::ALL.to_vec(),
            participation_weight: 0.6,
            info_flow_weight: 0.4,
            stage_budgets,
            default_stage_budget: 5.0,
            budget_weight: 0.7,
            balance_weight: 0.3,
            tool_markers: vec![
                "CALCULATOR TOOL USED".to_string(),
                "WEB SEARCH TOOL USED".to_string(),
                "FITNESS RESEARCH TOOL USED".to_string(),
            ],
            expected_tool_count: 3,
            tool_diversity_weight: 0.7,
            tool_reuse_weight: 0.3,
            tool_reuse_min_shared_terms: 3,
        }
    }
}

impl CoordinationConfig {
    /// The time budget for a stage, falling back to the default.
    pub fn budget_for(&self, stage: Stage) -> f64 {
        self.stage_budgets
            .get(&stage)
            .copied()
            .unwrap_or(self.default_stage_budget)
    }
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

/// Knobs for the performance evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Total time at or below which the response-time score is 1.0.
    pub excellent_time: f64,
    /// Total time at which the response-time score has decayed to 0.7.
    pub target_time: f64,
    /// Memory item count at which utilization reads as 1.0.
    pub memory_item_capacity: usize,
    /// Memory byte size at which utilization reads as 1.0. Zero disables the
    /// byte-based reading and only the item count is considered.
    pub memory_byte_capacity: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            excellent_time: 8.0,
            target_time: 12.0,
            memory_item_capacity: 64,
            memory_byte_capacity: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate scoring
// ---------------------------------------------------------------------------

/// Weights for the five efficiency components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyWeights {
    pub coordination: f64,
    pub workflow: f64,
    pub tool_usage: f64,
    pub memory: f64,
    /// Weight of the normalized response-time score. Set to 0 for a strict
    /// four-component efficiency aggregate.
    pub response_time: f64,
}

impl Default for EfficiencyWeights {
    fn default() -> Self {
        Self {
            coordination: 0.2,
            workflow: 0.2,
            tool_usage: 0.2,
            memory: 0.2,
            response_time: 0.2,
        }
    }
}

/// Final aggregation weights and result shaping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weights for combining efficiency components.
    pub efficiency_weights: EfficiencyWeights,
    /// Weight of the quality aggregate inside the final score.
    pub quality_weight: f64,
    /// Weight of the efficiency aggregate inside the final score.
    pub efficiency_weight: f64,
    /// Responses stored in results are truncated to this many characters.
    pub response_excerpt_chars: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            efficiency_weights: EfficiencyWeights::default(),
            quality_weight: 0.6,
            efficiency_weight: 0.4,
            response_excerpt_chars: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        EvaluationConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EvaluationConfig::from_toml_str(
            r#"
            [performance]
            target_time = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.performance.target_time, 20.0);
        assert_eq!(config.performance.excellent_time, 8.0);
        assert_eq!(config.quality.weights.readability, 0.25);
    }

    #[test]
    fn test_stage_budget_override() {
        let config = EvaluationConfig::from_toml_str(
            r#"
            [coordination.stage_budgets]
            research = 9.0
            "#,
        )
        .unwrap();
        assert_eq!(config.coordination.budget_for(Stage::Research), 9.0);
        // An overriding table replaces the map wholesale, so other stages
        // fall back to the default budget.
        assert_eq!(config.coordination.budget_for(Stage::Planner), 5.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = EvaluationConfig::from_toml_str(
            r#"
            [quality.weights]
            readability = -1.0
            "#,
        );
        assert!(matches!(result, Err(EvalError::Config { .. })));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(EvaluationConfig::from_toml_str("not toml ][").is_err());
    }
}
