//! Performance scoring.
//!
//! Normalizes raw timing and memory numbers into bounded scores. The raw
//! `total_time` is passed through to the result unchanged; only its
//! normalized score participates in aggregation.

use crate::config::PerformanceConfig;
use crate::evaluation::input::MemorySnapshot;
use crate::evaluation::text::clamp01;

/// Scores total response time and memory utilization.
pub struct PerformanceEvaluator<'a> {
    config: &'a PerformanceConfig,
}

impl<'a> PerformanceEvaluator<'a> {
    /// Create an evaluator over the given configuration.
    pub fn new(config: &'a PerformanceConfig) -> Self {
        Self { config }
    }

    /// Normalized response-time score in [0, 1].
    ///
    /// 1.0 at or below the excellent threshold, linear decay to 0.7 at the
    /// target, then a steeper decay toward 0 as the overrun grows.
    pub fn response_time_score(&self, total_time: f64) -> f64 {
        let excellent = self.config.excellent_time;
        let target = self.config.target_time;
        if target <= 0.0 || excellent < 0.0 || target <= excellent {
            return 0.0;
        }
        let score = if total_time <= excellent {
            1.0
        } else if total_time <= target {
            1.0 - (total_time - excellent) / (target - excellent) * 0.3
        } else {
            0.7 - (total_time - target) / target
        };
        clamp01(score)
    }

    /// Memory-utilization score in [0, 1].
    ///
    /// A tent function peaking at full, non-overflowing utilization:
    /// near-empty memory wastes its capacity and overflow degrades linearly.
    /// When a byte capacity is configured, the larger of the item and byte
    /// utilization readings governs.
    pub fn memory_usage_score(&self, memory: &MemorySnapshot) -> f64 {
        if self.config.memory_item_capacity == 0 {
            return 0.0;
        }
        let mut utilization =
            memory.items as f64 / self.config.memory_item_capacity as f64;
        if self.config.memory_byte_capacity > 0 {
            let byte_utilization =
                memory.estimated_bytes as f64 / self.config.memory_byte_capacity as f64;
            utilization = utilization.max(byte_utilization);
        }
        let score = if utilization <= 1.0 {
            utilization
        } else {
            2.0 - utilization
        };
        clamp01(score)
    }
}
