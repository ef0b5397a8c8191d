//! Adaptive compression selection
//!
//! Maps a measured network throughput to a compression aggressiveness level
//! through an ordered threshold table: the faster the network, the less CPU
//! is worth spending on compression. Selection happens once per benchmarking
//! session and the chosen strategy is held fixed for every run in it.

use serde::{Deserialize, Serialize};

use crate::probe::ProbeOutcome;

/// One tier of the selection table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionStrategy {
    /// Lower bound (inclusive) of measured throughput for this tier, MB/s
    pub min_throughput_mbps: f64,
    /// Compression level to use for the session
    pub level: i32,
    pub rationale: String,
}

/// Ordered, immutable strategy table, evaluated from the fastest network
/// tier down to the slowest.
#[derive(Debug, Clone)]
pub struct CompressionSelector {
    strategies: Vec<CompressionStrategy>,
}

impl Default for CompressionSelector {
    fn default() -> Self {
        Self {
            strategies: vec![
                tier(100.0, 1, "very fast network (>100 MB/s): minimal compression"),
                tier(50.0, 3, "fast network (50-100 MB/s): light compression"),
                tier(10.0, 6, "medium network (10-50 MB/s): balanced compression"),
                tier(1.0, 9, "slow network (1-10 MB/s): high compression"),
                tier(0.0, 15, "very slow network (<1 MB/s): maximum compression"),
            ],
        }
    }
}

fn tier(min_throughput_mbps: f64, level: i32, rationale: &str) -> CompressionStrategy {
    CompressionStrategy {
        min_throughput_mbps,
        level,
        rationale: rationale.to_owned(),
    }
}

impl CompressionSelector {
    /// Build a selector from a custom table. Tiers are sorted by threshold,
    /// descending; an empty table falls back to the default one.
    pub fn new(mut strategies: Vec<CompressionStrategy>) -> Self {
        if strategies.is_empty() {
            return Self::default();
        }
        strategies.sort_by(|a, b| {
            b.min_throughput_mbps
                .partial_cmp(&a.min_throughput_mbps)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { strategies }
    }

    /// Select a strategy for the measured average throughput.
    ///
    /// Total: the first tier whose lower bound is satisfied wins, and
    /// anything below the lowest bound gets the last, most aggressive tier.
    pub fn select(&self, throughput_mbps: f64) -> &CompressionStrategy {
        for strategy in &self.strategies {
            if throughput_mbps >= strategy.min_throughput_mbps {
                return strategy;
            }
        }
        &self.strategies[self.strategies.len() - 1]
    }

    /// Select for a probe outcome. An unmeasured network is treated as the
    /// slowest tier, which doubles as the safe fallback strategy.
    pub fn select_for(&self, outcome: &ProbeOutcome) -> &CompressionStrategy {
        let speed = outcome.sample().map(|s| s.average_mbps()).unwrap_or(0.0);
        self.select(speed)
    }

    pub fn strategies(&self) -> &[CompressionStrategy] {
        &self.strategies
    }
}
