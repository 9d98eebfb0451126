//! Pipeline stage identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The named stages of the text-generation pipeline whose outputs are scored.
///
/// A stage is a plain identifier, not a behavior: the evaluator only ever
/// sees the records a stage produced, never the stage itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Breaks the query down and decides what needs to happen.
    Planner,
    /// Gathers information, invoking tools as needed.
    Research,
    /// Synthesizes the final user-facing response.
    Writer,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 3] = [Stage::Planner, Stage::Research, Stage::Writer];

    /// Parse a stage from its lowercase name.
    pub fn parse(name: &str) -> Option<Stage> {
        match name {
            "planner" => Some(Stage::Planner),
            "research" => Some(Stage::Research),
            "writer" => Some(Stage::Writer),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Planner => write!(f, "planner"),
            Stage::Research => write!(f, "research"),
            Stage::Writer => write!(f, "writer"),
        }
    }
}
