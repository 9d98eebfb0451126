//! Markdown rendering of a [`BatchReport`].
//!
//! The template is embedded in the crate and rendered with data serialized
//! straight from the report struct, so the markdown form can never drift
//! from the JSON form.

use tera::{Context, Tera};

use crate::error::EvalError;
use crate::report::BatchReport;

const TEMPLATE_NAME: &str = "report.md";
const TEMPLATE: &str = include_str!("../../templates/report.md.tera");

/// Render the report as a markdown document.
///
/// # Errors
///
/// Returns [`EvalError::Template`] if the template fails to parse or render.
pub fn render(report: &BatchReport) -> Result<String, EvalError> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;

    let mut context = Context::from_serialize(report)?;

    // Preformatted delta and rate strings; tera tables stay free of
    // number-or-"undefined" branching.
    if let Some(comparison) = &report.comparison {
        let mut display = std::collections::BTreeMap::new();
        display.insert(
            "response_time",
            comparison.deltas.response_time_change_percent.to_string(),
        );
        display.insert(
            "response_length",
            comparison.deltas.response_length_change_percent.to_string(),
        );
        display.insert(
            "success_rate",
            comparison.deltas.success_rate_change_percent.to_string(),
        );
        display.insert(
            "candidate_success_rate",
            format!("{:.1}%", comparison.candidate.success_rate * 100.0),
        );
        display.insert(
            "baseline_success_rate",
            format!("{:.1}%", comparison.baseline.success_rate * 100.0),
        );
        context.insert("delta_display", &display);
    }

    Ok(tera.render(TEMPLATE_NAME, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::SystemComparison;
    use crate::harness::{PipelineRun, QueryOutcome};
    use crate::report::tests::sample_result;

    fn outcome() -> QueryOutcome {
        QueryOutcome {
            case_id: Some("beginner_001".to_string()),
            query: "Create a beginner workout plan".to_string(),
            success: true,
            response_time: 6.0,
            response_length: 180,
            final_score: Some(0.74),
            expected_match: None,
        }
    }

    fn runs(words: usize, time: f64) -> Vec<PipelineRun> {
        vec![PipelineRun {
            query: "q".to_string(),
            response: "word ".repeat(words).trim_end().to_string(),
            success: true,
            stage_outputs: Default::default(),
            stage_times: Default::default(),
            total_time: time,
            memory: Default::default(),
        }]
    }

    #[test]
    fn test_render_without_comparison() {
        let report =
            BatchReport::assemble(vec![sample_result(0.74)], vec![outcome()], None).unwrap();
        let markdown = report.to_markdown().unwrap();
        assert!(markdown.starts_with("# Fitness Assistant Evaluation Report"));
        assert!(markdown.contains("**Test Queries:** 1"));
        assert!(markdown.contains("Average Final Score"));
        assert!(!markdown.contains("Comparative Analysis"));
        assert!(markdown.contains("Create a beginner workout plan"));
    }

    #[test]
    fn test_render_with_comparison_and_undefined_delta() {
        // Baseline response time of zero forces an undefined delta.
        let comparison =
            SystemComparison::compare(&runs(200, 6.0), &runs(100, 0.0)).unwrap();
        let report = BatchReport::assemble(
            vec![sample_result(0.74)],
            vec![outcome()],
            Some(comparison),
        )
        .unwrap();
        let markdown = report.to_markdown().unwrap();
        assert!(markdown.contains("Comparative Analysis"));
        assert!(markdown.contains("undefined"));
        assert!(markdown.contains("**Recommendation:**"));
    }

    #[test]
    fn test_markdown_and_json_share_summary_numbers() {
        let report =
            BatchReport::assemble(vec![sample_result(0.74)], vec![outcome()], None).unwrap();
        let markdown = report.to_markdown().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let avg = json["summary"]["avg_final_score"].as_f64().unwrap();
        let rounded = (avg * 1000.0).round() / 1000.0;
        assert!(markdown.contains(&rounded.to_string()));
    }
}
