//! Stage-coordination scoring.
//!
//! Assesses how well the pipeline's stages cooperated, using only the
//! metadata the caller supplies: output records and measured timings. The
//! pipeline is never re-run.

use crate::config::CoordinationConfig;
use crate::evaluation::input::EvaluationInput;
use crate::evaluation::text::{clamp01, word_set, words};
use crate::stage::Stage;

/// Scores coordination, workflow efficiency, and tool-usage effectiveness.
pub struct CoordinationEvaluator<'a> {
    config: &'a CoordinationConfig,
}

impl<'a> CoordinationEvaluator<'a> {
    /// Create an evaluator over the given configuration.
    pub fn new(config: &'a CoordinationConfig) -> Self {
        Self { config }
    }

    /// How well the stages cooperated, in [0, 1].
    ///
    /// Participation counts expected stages that produced at least one
    /// output; information flow checks that later stages textually build on
    /// earlier content. No outputs at all scores 0.
    pub fn coordination(&self, input: &EvaluationInput) -> f64 {
        if input.stage_outputs.values().all(|outputs| outputs.is_empty()) {
            return 0.0;
        }
        let expected = &self.config.expected_stages;
        let participation = if expected.is_empty() {
            0.0
        } else {
            let present = expected
                .iter()
                .filter(|stage| input.stage_participated(**stage))
                .count();
            present as f64 / expected.len() as f64
        };

        let mut info_flow: f64 = 0.0;
        // Research should pick up the plan's vocabulary.
        if input.stage_participated(Stage::Planner) && input.stage_participated(Stage::Research) {
            let planner_words = words(&input.stage_text(Stage::Planner));
            let research_terms = word_set(&input.stage_text(Stage::Research));
            if planner_words
                .iter()
                .take(10)
                .any(|word| research_terms.contains(word))
            {
                info_flow += 0.5;
            }
        }
        // The writer should carry research findings forward.
        if input.stage_participated(Stage::Research) && input.stage_participated(Stage::Writer) {
            let research_lead: std::collections::BTreeSet<String> =
                words(&input.stage_text(Stage::Research))
                    .into_iter()
                    .take(20)
                    .collect();
            let writer_terms = word_set(&input.stage_text(Stage::Writer));
            let overlap = research_lead
                .iter()
                .filter(|word| writer_terms.contains(*word))
                .count();
            if overlap > 3 {
                info_flow += 0.5;
            }
        }

        clamp01(
            participation * self.config.participation_weight
                + info_flow * self.config.info_flow_weight,
        )
    }

    /// Timing efficiency of the workflow, in [0, 1].
    ///
    /// Stages over their budget are penalized proportionally to the overrun;
    /// a balanced time distribution across stages (low variance relative to
    /// the mean) is rewarded. No timing data scores 0.
    pub fn workflow_efficiency(&self, input: &EvaluationInput) -> f64 {
        if input.stage_times.is_empty() {
            return 0.0;
        }

        let mut budget_scores = Vec::with_capacity(input.stage_times.len());
        for (stage, actual) in &input.stage_times {
            let budget = self.config.budget_for(*stage);
            let score = if budget <= 0.0 {
                0.0
            } else if *actual <= budget {
                1.0
            } else {
                (1.0 - (actual - budget) / budget).max(0.0)
            };
            budget_scores.push(score);
        }
        let budget_component =
            budget_scores.iter().sum::<f64>() / budget_scores.len() as f64;

        let times: Vec<f64> = input.stage_times.values().copied().collect();
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let balance_component = if mean <= 0.0 {
            1.0
        } else {
            let variance =
                times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / times.len() as f64;
            let cv = variance.sqrt() / mean;
            1.0 - cv.min(1.0)
        };

        clamp01(
            budget_component * self.config.budget_weight
                + balance_component * self.config.balance_weight,
        )
    }

    /// Tool-usage effectiveness of the research stage, in [0, 1].
    ///
    /// Higher when multiple distinct tool markers appear in research output
    /// and the marked findings are reflected in the final response. No
    /// research output scores 0.
    pub fn tool_usage(&self, input: &EvaluationInput, response: &str) -> f64 {
        let Some(research_outputs) = input.stage_outputs.get(&Stage::Research) else {
            return 0.0;
        };
        if research_outputs.is_empty() {
            return 0.0;
        }

        let distinct_tools = self
            .config
            .tool_markers
            .iter()
            .filter(|marker| {
                research_outputs
                    .iter()
                    .any(|output| output.text.contains(marker.as_str()))
            })
            .count();
        let diversity = if self.config.expected_tool_count == 0 {
            0.0
        } else {
            (distinct_tools as f64 / self.config.expected_tool_count as f64).min(1.0)
        };

        // Reuse: a tool-marked finding shows up in the final response.
        let response_terms = word_set(response);
        let reused = research_outputs.iter().any(|output| {
            let marked = self
                .config
                .tool_markers
                .iter()
                .any(|marker| output.text.contains(marker.as_str()));
            if !marked {
                return false;
            }
            let shared = word_set(&output.text)
                .intersection(&response_terms)
                .count();
            shared >= self.config.tool_reuse_min_shared_terms
        });
        let reuse = if reused { 1.0 } else { 0.0 };

        clamp01(
            diversity * self.config.tool_diversity_weight
                + reuse * self.config.tool_reuse_weight,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::input::{EvaluationInput, StageOutput};
    use chrono::{TimeZone, Utc};

    fn output(text: &str) -> StageOutput {
        StageOutput::new(text, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn config() -> CoordinationConfig {
        CoordinationConfig::default()
    }

    #[test]
    fn test_no_outputs_scores_zero() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let input = EvaluationInput::bare("q", "r");
        assert_eq!(eval.coordination(&input), 0.0);
    }

    #[test]
    fn test_participation_two_of_three() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let mut input = EvaluationInput::bare("q", "r");
        input
            .stage_outputs
            .insert(Stage::Planner, vec![output("plan the plan")]);
        input
            .stage_outputs
            .insert(Stage::Writer, vec![output("unrelated text entirely")]);
        // Two of three expected stages participated and no information flow
        // links fire, so the score is the participation component alone.
        let expected = (2.0 / 3.0) * cfg.participation_weight;
        let got = eval.coordination(&input);
        assert!((got - expected).abs() < 1e-12, "got {}", got);
    }

    #[test]
    fn test_information_flow_rewards_carry_over() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let mut input = EvaluationInput::bare("q", "r");
        input.stage_outputs.insert(
            Stage::Planner,
            vec![output("research squat technique and progression for beginners")],
        );
        input.stage_outputs.insert(
            Stage::Research,
            vec![output("squat technique findings: keep knees tracking over toes")],
        );
        input.stage_outputs.insert(
            Stage::Writer,
            vec![output("squat technique findings keep knees tracking well")],
        );
        let got = eval.coordination(&input);
        // Full participation plus both carry-over links.
        assert!((got - 1.0).abs() < 1e-12, "got {}", got);
    }

    #[test]
    fn test_workflow_no_timings_scores_zero() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let input = EvaluationInput::bare("q", "r");
        assert_eq!(eval.workflow_efficiency(&input), 0.0);
    }

    #[test]
    fn test_workflow_within_budget_and_balanced_is_perfect() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let mut input = EvaluationInput::bare("q", "r");
        input.stage_times.insert(Stage::Planner, 2.0);
        input.stage_times.insert(Stage::Research, 2.0);
        input.stage_times.insert(Stage::Writer, 2.0);
        let got = eval.workflow_efficiency(&input);
        assert!((got - 1.0).abs() < 1e-12, "got {}", got);
    }

    #[test]
    fn test_workflow_penalizes_overrun() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let mut on_budget = EvaluationInput::bare("q", "r");
        on_budget.stage_times.insert(Stage::Research, 4.0);
        let mut over_budget = EvaluationInput::bare("q", "r");
        over_budget.stage_times.insert(Stage::Research, 12.0);
        assert!(
            eval.workflow_efficiency(&over_budget) < eval.workflow_efficiency(&on_budget)
        );
    }

    #[test]
    fn test_tool_usage_requires_research_output() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let input = EvaluationInput::bare("q", "r");
        assert_eq!(eval.tool_usage(&input, "response"), 0.0);
    }

    #[test]
    fn test_tool_usage_rewards_diversity_and_reuse() {
        let cfg = config();
        let eval = CoordinationEvaluator::new(&cfg);
        let mut input = EvaluationInput::bare("q", "r");
        input.stage_outputs.insert(
            Stage::Research,
            vec![
                output("CALCULATOR TOOL USED: daily calories come to 2200 kcal"),
                output("WEB SEARCH TOOL USED: progressive overload drives strength gains"),
                output("FITNESS RESEARCH TOOL USED: compound lifts beat isolation for beginners"),
            ],
        );
        let response =
            "Aim for 2200 kcal daily; progressive overload drives strength over time.";
        let got = eval.tool_usage(&input, response);
        // All three tools used and their findings reused downstream.
        assert!((got - 1.0).abs() < 1e-12, "got {}", got);

        let mut single = EvaluationInput::bare("q", "r");
        single.stage_outputs.insert(
            Stage::Research,
            vec![output("CALCULATOR TOOL USED: something unrelated to the answer")],
        );
        assert!(eval.tool_usage(&single, "totally different text") < got);
    }
}
