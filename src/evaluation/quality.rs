//! Response-quality scoring.
//!
//! Scores the final response text against the query, independent of how the
//! pipeline produced it. All four sub-scores are bounded to [0, 1], mutually
//! independent, and zero for an empty or whitespace-only response.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::QualityConfig;
use crate::evaluation::text::{
    clamp01, mean_sentence_length, significant_terms, word_set,
};

static PRESCRIPTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d+\s*(sets?|reps?|repetitions?|minutes?|times?)",
        r"(start|begin)\s+with",
        r"(aim|target)\s+for",
        r"\d+\s*[-–]\s*\d+\s*(minutes?|hours?|times?)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const STEP_MARKERS: [&str; 6] = ["step", "first", "second", "then", "next", "finally"];
const LIST_MARKERS: [&str; 4] = ["1.", "2.", "a)", "b)"];

/// Scores readability, completeness, relevance, and actionability.
pub struct ResponseQualityEvaluator<'a> {
    config: &'a QualityConfig,
}

impl<'a> ResponseQualityEvaluator<'a> {
    /// Create an evaluator over the given configuration.
    pub fn new(config: &'a QualityConfig) -> Self {
        Self { config }
    }

    /// Word count of the response.
    pub fn response_length(&self, response: &str) -> usize {
        response.split_whitespace().count()
    }

    /// Sentence-structure readability in [0, 1].
    ///
    /// Peaks when the mean sentence length sits inside the configured band;
    /// fragmented and run-on prose both decay linearly toward 0. A response
    /// with no sentences scores 0.
    pub fn readability(&self, response: &str) -> f64 {
        if response.trim().is_empty() {
            return 0.0;
        }
        let Some(mean) = mean_sentence_length(response) else {
            return 0.0;
        };
        let low = self.config.readability_band_low;
        let high = self.config.readability_band_high;
        if mean >= low && mean <= high {
            return 1.0;
        }
        let distance = if mean < low { low - mean } else { mean - high };
        let falloff = self.config.readability_falloff;
        if falloff <= 0.0 {
            return 0.0;
        }
        clamp01(1.0 - distance / falloff)
    }

    /// How completely the response addresses the query, in [0, 1].
    ///
    /// Weighted sum of query-term coverage, domain-keyword coverage, and
    /// structural markers.
    pub fn completeness(&self, response: &str, query: &str) -> f64 {
        if response.trim().is_empty() {
            return 0.0;
        }
        let response_lower = response.to_lowercase();
        let response_terms = word_set(response);

        // Coverage of the query's significant terms.
        let query_terms = significant_terms(query, &self.config.stopwords);
        let coverage = if query_terms.is_empty() {
            0.0
        } else {
            let hits = query_terms
                .iter()
                .filter(|term| response_terms.contains(*term))
                .count();
            hits as f64 / query_terms.len() as f64
        };

        // Domain vocabulary, capped at the configured target.
        let domain_hits = self
            .config
            .domain_keywords
            .iter()
            .filter(|keyword| response_lower.contains(keyword.as_str()))
            .count();
        let domain = if self.config.domain_keyword_target == 0 {
            0.0
        } else {
            (domain_hits as f64 / self.config.domain_keyword_target as f64).min(1.0)
        };

        // Organizational markers: emphasis, lists, multiple lines.
        let mut structure: f64 = 0.0;
        if response.contains("**") || response.contains('*') {
            structure += 0.3;
        }
        let has_list = LIST_MARKERS.iter().any(|marker| response.contains(marker))
            || response
                .lines()
                .any(|line| line.trim_start().starts_with("- "));
        if has_list {
            structure += 0.3;
        }
        if response.lines().count() > 3 {
            structure += 0.4;
        }
        let structure = structure.min(1.0);

        clamp01(
            coverage * self.config.coverage_weight
                + domain * self.config.domain_weight
                + structure * self.config.structure_weight,
        )
    }

    /// How relevant the response is to the query, in [0, 1].
    ///
    /// Same term-overlap family as completeness but biased toward
    /// query-specificity: overlap is computed over all query tokens, and an
    /// on-topic check penalizes answers that wander off the training domain.
    pub fn relevance(&self, response: &str, query: &str) -> f64 {
        if response.trim().is_empty() {
            return 0.0;
        }
        let query_lower = query.to_lowercase();
        let response_lower = response.to_lowercase();
        let query_tokens = word_set(query);
        let response_tokens = word_set(response);

        let overlap = if query_tokens.is_empty() {
            0.0
        } else {
            let hits = query_tokens
                .iter()
                .filter(|token| response_tokens.contains(*token))
                .count();
            hits as f64 / query_tokens.len() as f64
        };

        let domain_hits = self
            .config
            .domain_keywords
            .iter()
            .filter(|keyword| response_lower.contains(keyword.as_str()))
            .count();
        let domain = if self.config.relevance_domain_target == 0 {
            0.0
        } else {
            (domain_hits as f64 / self.config.relevance_domain_target as f64).min(1.0)
        };

        // On-topic check: a fitness-flavored query answered with no training
        // vocabulary at all is only half on topic.
        let mut context = 1.0;
        if query_lower.contains("fitness") || query_lower.contains("workout") {
            let on_topic = ["exercise", "workout", "fitness", "training"]
                .iter()
                .any(|word| response_lower.contains(word));
            if !on_topic {
                context = 0.5;
            }
        }

        clamp01(
            overlap * self.config.relevance_overlap_weight
                + domain * self.config.relevance_domain_weight
                + context * self.config.relevance_context_weight,
        )
    }

    /// How actionable the response is, in [0, 1].
    ///
    /// Counts imperative verbs, numeric prescriptions (sets, reps,
    /// durations, frequencies), and step markers, each bounded by its
    /// configured target.
    pub fn actionability(&self, response: &str) -> f64 {
        if response.trim().is_empty() {
            return 0.0;
        }
        let response_lower = response.to_lowercase();
        let response_tokens = word_set(response);

        let action_hits = self
            .config
            .action_words
            .iter()
            .filter(|word| response_tokens.contains(word.as_str()))
            .count();
        let action = bounded_ratio(action_hits, self.config.action_word_target);

        let prescription_hits = PRESCRIPTION_PATTERNS
            .iter()
            .filter(|pattern| pattern.is_match(&response_lower))
            .count();
        let prescription = bounded_ratio(prescription_hits, self.config.instruction_target);

        let step_hits = STEP_MARKERS
            .iter()
            .filter(|marker| response_tokens.contains(**marker))
            .count();
        let steps = bounded_ratio(step_hits, self.config.step_marker_target);

        clamp01(
            action * self.config.action_word_weight
                + prescription * self.config.instruction_weight
                + steps * self.config.step_marker_weight,
        )
    }
}

/// `min(1, count / target)`, with a zero target scoring 0.
fn bounded_ratio(count: usize, target: usize) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (count as f64 / target as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;

    fn evaluator(config: &QualityConfig) -> ResponseQualityEvaluator<'_> {
        ResponseQualityEvaluator::new(config)
    }

    #[test]
    fn test_empty_response_scores_zero_everywhere() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        for response in ["", "   ", "\n\t"] {
            assert_eq!(eval.readability(response), 0.0);
            assert_eq!(eval.completeness(response, "build muscle"), 0.0);
            assert_eq!(eval.relevance(response, "build muscle"), 0.0);
            assert_eq!(eval.actionability(response), 0.0);
        }
    }

    #[test]
    fn test_readability_peaks_inside_band() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        // 17 words in one sentence: inside the 15-20 band.
        let ideal = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen.";
        assert_eq!(eval.readability(ideal), 1.0);
        // Fragmented prose scores below the band.
        let choppy = "Go. Run. Stop. Rest. Eat.";
        assert!(eval.readability(choppy) < 1.0);
        // A long run-on sentence also decays.
        let run_on = format!("{} and more", "word ".repeat(60));
        assert!(eval.readability(&run_on) < 0.5);
    }

    #[test]
    fn test_completeness_rewards_query_terms() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        let query = "Create a beginner workout plan";
        let sparse = eval.completeness("Go jogging sometimes.", query);
        let covered = eval.completeness(
            "This beginner workout plan starts easy.\n1. Squats\n2. Push-ups\n- rest day\nKeep the plan simple.",
            query,
        );
        assert!(covered > sparse);
        assert!(covered <= 1.0);
    }

    #[test]
    fn test_completeness_monotone_under_query_terms() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        let query = "beginner strength workout plan";
        let base = "Some general advice about moving more.";
        let mut grown = base.to_string();
        let mut previous = eval.completeness(base, query);
        for term in ["beginner", "strength", "workout", "plan"] {
            grown.push(' ');
            grown.push_str(term);
            let next = eval.completeness(&grown, query);
            assert!(next >= previous, "appending '{}' decreased completeness", term);
            previous = next;
        }
    }

    #[test]
    fn test_relevance_monotone_under_query_terms() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        let query = "improve running endurance safely";
        let base = "Drink water.";
        let mut grown = base.to_string();
        let mut previous = eval.relevance(base, query);
        for term in ["running", "endurance", "safely", "improve"] {
            grown.push(' ');
            grown.push_str(term);
            let next = eval.relevance(&grown, query);
            assert!(next >= previous);
            previous = next;
        }
    }

    #[test]
    fn test_relevance_penalizes_off_topic() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        let query = "best workout split";
        let off_topic = eval.relevance("Bake the bread at high heat.", query);
        let on_topic = eval.relevance("A push pull legs workout split works well.", query);
        assert!(on_topic > off_topic);
    }

    #[test]
    fn test_actionability_detects_prescriptions() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        let vague = eval.actionability("Fitness is generally good for you.");
        let concrete = eval.actionability(
            "Start with 3 sets of 10 reps. Then aim for 20-30 minutes of cardio. \
             Next, practice the form and increase the weight.",
        );
        assert!(concrete > 0.5);
        assert!(concrete > vague);
    }

    #[test]
    fn test_scores_bounded_on_adversarial_input() {
        let config = QualityConfig::default();
        let eval = evaluator(&config);
        let adversarial = [
            "workout ".repeat(5_000),
            "sets reps sets reps sets reps".to_string(),
            "δρομέας προπόνηση άσκηση 😀 ☂".to_string(),
            ".!?.!?.!?".to_string(),
        ];
        for response in &adversarial {
            for score in [
                eval.readability(response),
                eval.completeness(response, "workout plan"),
                eval.relevance(response, "workout plan"),
                eval.actionability(response),
            ] {
                assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
            }
        }
    }
}
