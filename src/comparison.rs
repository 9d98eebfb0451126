//! Candidate-versus-baseline comparison.
//!
//! Compares a multi-stage candidate pipeline against a single-stage
//! baseline over the same query set: mean response time, mean response
//! length, success rate, percentage deltas, a verdict per axis, and a
//! recommendation derived from the comparison shape.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::harness::PipelineRun;

/// A percentage delta that survives a zero-valued baseline.
///
/// `(candidate - baseline) / baseline * 100` when the baseline is nonzero;
/// [`PercentDelta::Undefined`] otherwise: never a division by zero, never
/// an infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentDelta {
    /// A defined delta, in percent.
    Percent(f64),
    /// The baseline was zero; no meaningful delta exists.
    Undefined,
}

impl PercentDelta {
    /// Compute the delta between a candidate and a baseline value.
    pub fn between(candidate: f64, baseline: f64) -> Self {
        if baseline == 0.0 {
            PercentDelta::Undefined
        } else {
            PercentDelta::Percent((candidate - baseline) / baseline * 100.0)
        }
    }

    /// The numeric delta, or a fallback for the undefined case.
    pub fn value_or(&self, fallback: f64) -> f64 {
        match self {
            PercentDelta::Percent(value) => *value,
            PercentDelta::Undefined => fallback,
        }
    }
}

impl fmt::Display for PercentDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentDelta::Percent(value) => write!(f, "{:+.1}%", value),
            PercentDelta::Undefined => write!(f, "undefined"),
        }
    }
}

impl Serialize for PercentDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PercentDelta::Percent(value) => serializer.serialize_f64(*value),
            PercentDelta::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

impl<'de> Deserialize<'de> for PercentDelta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Number(number) => number
                .as_f64()
                .map(PercentDelta::Percent)
                .ok_or_else(|| de::Error::custom("delta out of f64 range")),
            serde_json::Value::String(s) if s == "undefined" => Ok(PercentDelta::Undefined),
            other => Err(de::Error::custom(format!(
                "expected number or \"undefined\", got {}",
                other
            ))),
        }
    }
}

/// Three-way outcome of a single comparison axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Better,
    Similar,
    Worse,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Better => write!(f, "better"),
            Verdict::Similar => write!(f, "similar"),
            Verdict::Worse => write!(f, "worse"),
        }
    }
}

/// Aggregate metrics for one system over a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// Mean total response time in seconds.
    pub avg_response_time: f64,
    /// Mean response length in words.
    pub avg_response_length: f64,
    /// Fraction of runs that succeeded.
    pub success_rate: f64,
    /// Number of runs folded in.
    pub total_queries: usize,
}

impl SystemMetrics {
    fn from_runs(runs: &[PipelineRun]) -> Self {
        let count = runs.len() as f64;
        Self {
            avg_response_time: runs.iter().map(|r| r.total_time).sum::<f64>() / count,
            avg_response_length: runs
                .iter()
                .map(|r| r.response.split_whitespace().count() as f64)
                .sum::<f64>()
                / count,
            success_rate: runs.iter().filter(|r| r.success).count() as f64 / count,
            total_queries: runs.len(),
        }
    }
}

/// Percentage deltas per comparison axis, candidate relative to baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonDeltas {
    /// Positive means the candidate is slower.
    pub response_time_change_percent: PercentDelta,
    /// Positive means the candidate writes longer responses.
    pub response_length_change_percent: PercentDelta,
    /// Positive means the candidate succeeds more often.
    pub success_rate_change_percent: PercentDelta,
}

/// Verdicts per comparison axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonVerdicts {
    pub time_performance: Verdict,
    pub content_quality: Verdict,
    pub reliability: Verdict,
}

/// Full comparison between a candidate and a baseline system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemComparison {
    pub candidate: SystemMetrics,
    pub baseline: SystemMetrics,
    pub deltas: ComparisonDeltas,
    pub verdicts: ComparisonVerdicts,
    /// Qualitative advantages of the multi-stage approach.
    pub benefits: Vec<String>,
    /// Qualitative costs of the multi-stage approach.
    pub drawbacks: Vec<String>,
    /// Recommendation derived from the deltas.
    pub recommendation: String,
}

impl SystemComparison {
    /// Compare candidate runs against baseline runs over the same queries.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidInput`] when either set is empty or the
    /// sets differ in length.
    pub fn compare(
        candidate_runs: &[PipelineRun],
        baseline_runs: &[PipelineRun],
    ) -> Result<Self, EvalError> {
        if candidate_runs.is_empty() || baseline_runs.is_empty() {
            return Err(EvalError::invalid_input(
                "comparison requires at least one run on each side",
            ));
        }
        if candidate_runs.len() != baseline_runs.len() {
            return Err(EvalError::invalid_input(format!(
                "comparison requires equally sized run sets, got {} vs {}",
                candidate_runs.len(),
                baseline_runs.len()
            )));
        }

        let candidate = SystemMetrics::from_runs(candidate_runs);
        let baseline = SystemMetrics::from_runs(baseline_runs);

        let deltas = ComparisonDeltas {
            response_time_change_percent: PercentDelta::between(
                candidate.avg_response_time,
                baseline.avg_response_time,
            ),
            response_length_change_percent: PercentDelta::between(
                candidate.avg_response_length,
                baseline.avg_response_length,
            ),
            success_rate_change_percent: PercentDelta::between(
                candidate.success_rate,
                baseline.success_rate,
            ),
        };

        let time_delta = deltas.response_time_change_percent.value_or(0.0);
        let length_delta = deltas.response_length_change_percent.value_or(0.0);
        let success_delta = deltas.success_rate_change_percent.value_or(0.0);

        let verdicts = ComparisonVerdicts {
            // Negative time delta means the candidate is faster.
            time_performance: if time_delta < 0.0 {
                Verdict::Better
            } else if time_delta > 5.0 {
                Verdict::Worse
            } else {
                Verdict::Similar
            },
            content_quality: if length_delta > 10.0 {
                Verdict::Better
            } else if length_delta < -10.0 {
                Verdict::Worse
            } else {
                Verdict::Similar
            },
            reliability: if success_delta > 5.0 {
                Verdict::Better
            } else if success_delta < -5.0 {
                Verdict::Worse
            } else {
                Verdict::Similar
            },
        };

        let recommendation = recommend(time_delta, length_delta, success_delta);

        Ok(Self {
            candidate,
            baseline,
            deltas,
            verdicts,
            benefits: vec![
                "Specialized stages bring dedicated expertise to each part of the answer"
                    .to_string(),
                "Coordinated workflow covers planning, research, and writing systematically"
                    .to_string(),
                "Tool usage is strategic and attributed to the research stage".to_string(),
                "Responses arrive more structured and better organized".to_string(),
            ],
            drawbacks: vec![
                "Stage coordination adds processing time over a single call".to_string(),
                "Coordination overhead consumes additional resources".to_string(),
                "More moving parts to fail and to debug".to_string(),
            ],
            recommendation,
        })
    }
}

/// Pick a recommendation from the comparison shape.
fn recommend(time_delta: f64, length_delta: f64, success_delta: f64) -> String {
    if length_delta > 15.0 && success_delta >= 0.0 {
        "Multi-stage pipeline recommended: significantly richer responses while keeping \
         reliability, despite minor overhead."
            .to_string()
    } else if success_delta > 10.0 {
        "Multi-stage pipeline recommended: markedly more reliable at producing successful \
         responses."
            .to_string()
    } else if time_delta > 20.0 && length_delta < -15.0 {
        "Baseline preferred for simple queries: faster responses with acceptable quality \
         for basic requests."
            .to_string()
    } else {
        "Multi-stage pipeline recommended: better overall coordination and a systematic \
         approach to complex fitness queries."
            .to_string()
    }
}
