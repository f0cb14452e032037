//! Fixed-rate tick driver with operator controls.
//!
//! [`run_platform`] is the external periodic caller of
//! [`PlayerGames::tick`]. It locks the shared platform once per pass, so
//! registry changes made by other tasks always land between passes, never
//! inside one. Around the pass it adds:
//!
//! - **Bounded runs**: stop after `max_ticks` passes
//! - **Pause/resume**: operator can halt and continue ticking
//! - **Variable tick speed**: interval adjustable at runtime
//! - **Clean stop**: on operator request, after the current pass
//!
//! Unit failures reported by a pass are logged here, not inside the pass.
//!
//! [`PlayerGames::tick`]: crate::platform::PlayerGames::tick

use std::sync::Arc;

use tracing::{info, warn};

use crate::operator::{OperatorState, RunEndReason};
use crate::platform::{PlayerGames, SharedPlayerGames};
use crate::tick::TickReport;

/// Result of a driver run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last tick report, if any pass completed.
    pub final_report: Option<TickReport>,
    /// Total number of passes executed.
    pub total_ticks: u64,
}

/// Callback invoked after each pass, while the platform is still locked.
///
/// Implementations can use this to publish snapshots to dashboards. They
/// must not block.
pub trait TickCallback: Send {
    /// Called after a pass completes.
    fn on_tick(&mut self, report: &TickReport, platform: &PlayerGames);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _report: &TickReport, _platform: &PlayerGames) {}
}

/// Drive `platform` until a termination condition is met.
pub async fn run_platform(
    platform: &SharedPlayerGames,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> RunResult {
    let mut last_report: Option<TickReport> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Tick driver starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Ticking paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Ticking resumed");
        }

        // --- Check stop request (before pass) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = RunEndReason::OperatorStop;
            operator.set_end_reason(reason.clone()).await;
            return RunResult {
                end_reason: reason,
                final_report: last_report,
                total_ticks,
            };
        }

        // --- Execute pass ---
        let report = {
            let mut guard = platform.lock().await;
            let report = guard.tick();
            report.log_failures();
            callback.on_tick(&report, &guard);
            report
        };

        total_ticks = total_ticks.saturating_add(1);

        // --- Check tick limit (after pass) ---
        if operator.tick_limit_reached(total_ticks) {
            info!(
                tick = report.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            let reason = RunEndReason::MaxTicksReached;
            operator.set_end_reason(reason.clone()).await;
            return RunResult {
                end_reason: reason,
                final_report: Some(report),
                total_ticks,
            };
        }

        last_report = Some(report);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the end of a driver run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_report.as_ref().map(|r| r.tick),
        "Tick driver stopped"
    );

    if let Some(ref report) = result.final_report {
        info!(
            tick = report.tick,
            bindings = report.bindings,
            failures = report.failure_count(),
            "Final tick report"
        );
    } else {
        warn!("Tick driver stopped with no passes executed");
    }
}
