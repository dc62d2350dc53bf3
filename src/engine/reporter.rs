//! Change-gated periodic reporting
//!
//! The reporter wakes on a fixed wall-clock cadence, compares the tracker's
//! aggregates with what it last printed, and emits a line only when something
//! moved. Shutdown is signalled over a watch channel so the sleep is
//! interrupted immediately rather than running out the interval.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::engine::sink::Emitter;
use crate::metrics::EngineMetrics;
use crate::telemetry::state::{ReportView, TrackerState};

/// Line emitted while no snapshot has been seen
pub const WAITING_LINE: &str = "Background Report: Waiting for game data...";

/// Result of one reporter firing
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// No snapshot observed yet
    Waiting,
    /// Nothing changed since the last report
    Unchanged,
    /// Aggregates changed; the line to emit
    Emitted(String),
}

/// Format the consolidated report line
pub fn format_report(runtime_secs: f32, view: &ReportView) -> String {
    format!(
        "Tick Report: Runtime {:.0}s | Score: B {} - O {} | {} | Max H: {:.0} | Max S: {:.0}",
        runtime_secs,
        view.team_totals[0],
        view.team_totals[1],
        view.status,
        view.max_height,
        view.max_speed
    )
}

/// Compare current aggregates with the shadow and update it on change
pub fn evaluate(state: &mut TrackerState) -> ReportOutcome {
    if !state.has_data() {
        return ReportOutcome::Waiting;
    }

    let view = state.report_view();
    if !view.differs_from(state.last_reported()) {
        return ReportOutcome::Unchanged;
    }

    let line = format_report(state.runtime_secs(), &view);
    state.mark_reported(&view);
    ReportOutcome::Emitted(line)
}

/// Handle to the background reporter task
pub struct ReporterHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Ask the task to exit. Safe to call more than once.
    pub fn stop(&self) {
        // Receiver may already be gone if the task exited on its own
        let _ = self.shutdown.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop and wait for the task to exit
    pub async fn join(self) {
        self.stop();
        if let Err(e) = self.task.await {
            tracing::warn!("Reporter task ended abnormally: {}", e);
        }
    }
}

/// Spawn the reporter loop on the given runtime
pub fn spawn_reporter(
    runtime: &tokio::runtime::Handle,
    state: Arc<Mutex<TrackerState>>,
    emitter: Emitter,
    metrics: Arc<EngineMetrics>,
    period: Duration,
) -> ReporterHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = runtime.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        emitter.emit("Background reporting task started.");

        loop {
            tokio::select! {
                biased;
                // Err means the engine dropped the sender
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            if *shutdown_rx.borrow() {
                break;
            }

            let outcome = {
                let mut guard = state.lock();
                evaluate(&mut guard)
            };

            match outcome {
                ReportOutcome::Waiting => {
                    EngineMetrics::incr(&metrics.waiting_reports);
                    emitter.emit(WAITING_LINE);
                }
                ReportOutcome::Unchanged => {
                    EngineMetrics::incr(&metrics.reports_suppressed);
                    debug!("Report suppressed, nothing changed");
                }
                ReportOutcome::Emitted(line) => {
                    EngineMetrics::incr(&metrics.reports_emitted);
                    emitter.emit(&line);
                }
            }
        }

        emitter.emit("Background reporting task finished.");
    });

    ReporterHandle { shutdown, task }
}
