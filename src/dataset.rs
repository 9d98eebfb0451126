//! Standardized query dataset for batch evaluation.
//!
//! Ten representative fitness queries with the characteristics a good answer
//! is expected to show: a word-count range, required keywords, and the
//! content elements reviewers look for. Batch runs score candidate
//! responses both with the evaluation engine and against these
//! expectations.

use serde::{Deserialize, Serialize};

use crate::evaluation::text::word_count;

/// Query difficulty, as labeled in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// One standardized query with its expected response characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Stable identifier, e.g. `beginner_001`.
    pub id: String,
    /// The query text sent to the pipeline.
    pub query: String,
    /// Topical category label.
    pub category: String,
    /// Difficulty label.
    pub complexity: Complexity,
    /// Content elements a complete answer covers.
    pub expected_elements: Vec<String>,
    /// Acceptable response length in words (inclusive).
    pub expected_length_range: (usize, usize),
    /// Phrases that must appear in the response (case-insensitive).
    pub required_keywords: Vec<String>,
}

/// How a response measured up against a test case's expectations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedMatch {
    /// The test case this was scored against.
    pub case_id: String,
    /// Whether the word count fell inside the expected range.
    pub passes_length_check: bool,
    /// Whether at least 80% of required keywords were present.
    pub includes_required_keywords: bool,
    /// Fraction of required keywords found.
    pub keyword_coverage: f64,
    /// Length score in [0, 1].
    pub length_score: f64,
    /// 0.3·length + 0.7·keywords.
    pub overall_expected_match: f64,
}

/// The built-in set of standardized queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDataset {
    cases: Vec<TestCase>,
}

impl Default for TestDataset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TestDataset {
    /// Construct a dataset from explicit cases.
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    /// The ten standard fitness queries.
    pub fn builtin() -> Self {
        let case = |id: &str,
                    query: &str,
                    category: &str,
                    complexity: Complexity,
                    elements: &[&str],
                    range: (usize, usize),
                    keywords: &[&str]| TestCase {
            id: id.to_string(),
            query: query.to_string(),
            category: category.to_string(),
            complexity,
            expected_elements: elements.iter().map(|s| s.to_string()).collect(),
            expected_length_range: range,
            required_keywords: keywords.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            cases: vec![
                case(
                    "beginner_001",
                    "Create a beginner workout plan for someone who wants to start exercising",
                    "workout_planning",
                    Complexity::Medium,
                    &["warm-up", "strength", "cardio", "cool-down", "progression"],
                    (100, 400),
                    &["beginner", "exercise", "workout", "plan"],
                ),
                case(
                    "nutrition_001",
                    "What should I eat before and after a workout for optimal performance?",
                    "nutrition",
                    Complexity::Medium,
                    &["pre-workout", "post-workout", "timing", "nutrients"],
                    (80, 300),
                    &["nutrition", "protein", "carbs", "timing"],
                ),
                case(
                    "strength_001",
                    "What are the best exercises for building upper body strength?",
                    "exercise_selection",
                    Complexity::Low,
                    &["exercises", "muscle_groups", "sets_reps", "form"],
                    (60, 250),
                    &["upper body", "strength", "exercises"],
                ),
                case(
                    "cardio_001",
                    "Design a 30-minute HIIT workout routine for fat loss",
                    "workout_planning",
                    Complexity::High,
                    &["hiit", "intervals", "exercises", "timing", "fat_loss"],
                    (120, 400),
                    &["HIIT", "30 minute", "intervals", "fat loss"],
                ),
                case(
                    "endurance_001",
                    "How can I improve my running endurance safely?",
                    "performance_improvement",
                    Complexity::Medium,
                    &["progression", "safety", "training_plan", "techniques"],
                    (80, 300),
                    &["running", "endurance", "safely", "improve"],
                ),
                case(
                    "home_001",
                    "Create a home workout routine with no equipment needed",
                    "workout_planning",
                    Complexity::Medium,
                    &["bodyweight", "home", "routine", "no_equipment"],
                    (100, 350),
                    &["home workout", "no equipment", "bodyweight"],
                ),
                case(
                    "recovery_001",
                    "What are the best recovery strategies after intense workouts?",
                    "recovery",
                    Complexity::Medium,
                    &["rest", "nutrition", "sleep", "active_recovery"],
                    (80, 300),
                    &["recovery", "rest", "intense workout"],
                ),
                case(
                    "weight_loss_001",
                    "Design a comprehensive fitness plan for weight loss including diet and exercise",
                    "comprehensive_planning",
                    Complexity::High,
                    &["diet", "exercise", "plan", "weight_loss", "comprehensive"],
                    (150, 500),
                    &["weight loss", "diet", "exercise", "fitness plan"],
                ),
                case(
                    "injury_001",
                    "What exercises are safe for someone with knee problems?",
                    "special_populations",
                    Complexity::High,
                    &["safety", "modifications", "knee_friendly", "alternatives"],
                    (100, 350),
                    &["knee problems", "safe exercises", "modifications"],
                ),
                case(
                    "motivation_001",
                    "How can I stay motivated to exercise consistently?",
                    "motivation_psychology",
                    Complexity::Low,
                    &["motivation", "consistency", "strategies", "tips"],
                    (60, 250),
                    &["motivated", "consistently", "exercise"],
                ),
            ],
        }
    }

    /// All cases in order.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the dataset holds no cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Look up a case by id.
    pub fn case(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.id == id)
    }

    /// Look up the case whose query matches exactly.
    pub fn case_for_query(&self, query: &str) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.query == query)
    }

    /// Score a response against a case's expected characteristics.
    pub fn expected_match(case: &TestCase, response: &str) -> ExpectedMatch {
        let count = word_count(response);
        let (min_len, max_len) = case.expected_length_range;

        let (passes_length_check, length_score) = if count >= min_len && count <= max_len {
            (true, 1.0)
        } else if count < min_len {
            let score = if min_len == 0 {
                0.0
            } else {
                count as f64 / min_len as f64
            };
            (false, score)
        } else {
            let score = if max_len == 0 {
                0.0
            } else {
                (1.0 - (count - max_len) as f64 / max_len as f64).max(0.5)
            };
            (false, score)
        };

        let response_lower = response.to_lowercase();
        let keyword_coverage = if case.required_keywords.is_empty() {
            0.0
        } else {
            let found = case
                .required_keywords
                .iter()
                .filter(|keyword| response_lower.contains(&keyword.to_lowercase()))
                .count();
            found as f64 / case.required_keywords.len() as f64
        };

        ExpectedMatch {
            case_id: case.id.clone(),
            passes_length_check,
            includes_required_keywords: keyword_coverage >= 0.8,
            keyword_coverage,
            length_score,
            overall_expected_match: length_score * 0.3 + keyword_coverage * 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset_shape() {
        let dataset = TestDataset::builtin();
        assert_eq!(dataset.len(), 10);
        assert!(dataset.case("beginner_001").is_some());
        assert!(dataset
            .case_for_query("How can I stay motivated to exercise consistently?")
            .is_some());
        assert!(dataset.case("missing_id").is_none());
    }

    #[test]
    fn test_expected_match_in_range() {
        let dataset = TestDataset::builtin();
        let case = dataset.case("motivation_001").unwrap();
        let response = format!(
            "Stay motivated by tracking progress and training with a friend. \
             Consistently showing up matters more than any single exercise session. {}",
            "Small habits compound into lasting routines over months of effort. ".repeat(5)
        );
        let matched = TestDataset::expected_match(case, &response);
        assert!(matched.passes_length_check);
        assert!(matched.includes_required_keywords);
        assert_eq!(matched.length_score, 1.0);
        assert!((matched.overall_expected_match - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_expected_match_short_response() {
        let dataset = TestDataset::builtin();
        let case = dataset.case("beginner_001").unwrap();
        let matched = TestDataset::expected_match(case, "Just move more.");
        assert!(!matched.passes_length_check);
        assert!(matched.length_score < 0.1);
        assert!(matched.overall_expected_match < 0.5);
    }

    #[test]
    fn test_expected_match_overlong_response_floors_at_half() {
        let dataset = TestDataset::builtin();
        let case = dataset.case("motivation_001").unwrap();
        let response = "word ".repeat(5_000);
        let matched = TestDataset::expected_match(case, &response);
        assert!(!matched.passes_length_check);
        assert_eq!(matched.length_score, 0.5);
    }
}
