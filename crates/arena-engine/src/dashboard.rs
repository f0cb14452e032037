//! Tick callback that publishes platform snapshots to the log.
//!
//! Stands in for a dashboard feed: every `every` passes it builds the
//! per-type snapshots and logs the score tables at `info` and the full
//! snapshot JSON at `debug`.

use arena_core::PlayerGames;
use arena_core::runner::TickCallback;
use arena_core::tick::TickReport;
use tracing::{debug, info, warn};

/// Callback that logs snapshots at a fixed pass interval.
pub struct DashboardCallback {
    every: u64,
}

impl DashboardCallback {
    /// Publish every `every` passes. Zero is treated as one.
    pub const fn new(every: u64) -> Self {
        Self {
            every: if every == 0 { 1 } else { every },
        }
    }
}

impl TickCallback for DashboardCallback {
    fn on_tick(&mut self, report: &TickReport, platform: &PlayerGames) {
        debug!(
            tick = report.tick,
            bindings = report.bindings,
            games_advanced = report.games_advanced(),
            failures = report.failure_count(),
            elapsed_us = u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX),
            "Tick complete"
        );

        if report.tick.checked_rem(self.every) != Some(0) {
            return;
        }

        for (game_type, data) in platform.snapshots() {
            info!(
                tick = report.tick,
                game_type = %game_type,
                players = data.scores.len(),
                scores = ?data.scores,
                "Scoreboard"
            );
            match serde_json::to_string(&data) {
                Ok(json) => debug!(game_type = %game_type, snapshot = %json, "Snapshot"),
                Err(e) => warn!(game_type = %game_type, error = %e, "Snapshot not serializable"),
            }
        }
    }
}
