//! Tracing setup for the binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to
//! whoever runs it.

use std::time::Duration;

/// Installs a compact fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` if a global subscriber was already set.
#[must_use]
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

/// Wall-clock split of one chart run, printed once the PNG is on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub data: Duration,
    pub graph: Duration,
    pub save: Duration,
}

impl StageTimings {
    pub fn summary_lines(&self) -> [String; 3] {
        [
            format!("Time to gen data: {:.3} sec.", self.data.as_secs_f64()),
            format!("Time to gen graph: {:.3} sec.", self.graph.as_secs_f64()),
            format!("Time to save: {:.3} sec.", self.save.as_secs_f64()),
        ]
    }
}
