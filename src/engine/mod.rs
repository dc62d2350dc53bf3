//! Match lifecycle controller
//!
//! [`Engine`] is the host-facing surface: lifecycle calls, the per-tick entry
//! point, event hooks and the command filter. Every entry point checks the
//! lifecycle state once and returns early when the engine is stopped. None of
//! them panic or return errors to the host; faults are logged and absorbed.

pub mod hooks;
pub mod reporter;
pub mod sink;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::control::command::ControllerCommand;
use crate::control::smoothing::CommandSmoother;
use crate::metrics::EngineMetrics;
use crate::telemetry::constants::ENGINE_NAME;
use crate::telemetry::match_result::summarize;
use crate::telemetry::snapshot::Snapshot;
use crate::telemetry::state::{TrackerEvent, TrackerState};
use crate::telemetry::status::team_name;

use hooks::{fast_ball_alert, high_ball_alert, HookPredicates};
use reporter::{spawn_reporter, ReporterHandle};
use sink::{Emitter, LogSink};

/// Whether the engine is accepting calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Running,
}

struct Lifecycle {
    state: LifecycleState,
    reporter: Option<ReporterHandle>,
    initialized_at: Option<Instant>,
}

/// Telemetry engine for one host session
pub struct Engine {
    config: EngineConfig,
    state: Arc<Mutex<TrackerState>>,
    smoother: Mutex<CommandSmoother>,
    emitter: Emitter,
    metrics: Arc<EngineMetrics>,
    predicates: HookPredicates,
    lifecycle: Mutex<Lifecycle>,
}

impl Engine {
    pub fn new(config: EngineConfig, sink: Arc<dyn LogSink>) -> Self {
        let emitter = Emitter::new(sink, ENGINE_NAME);
        let engine = Self {
            state: Arc::new(Mutex::new(TrackerState::new(config.possession_distance))),
            smoother: Mutex::new(CommandSmoother::new(config.smoothing_window)),
            predicates: HookPredicates::from_config(&config),
            metrics: Arc::new(EngineMetrics::new()),
            lifecycle: Mutex::new(Lifecycle {
                state: LifecycleState::Stopped,
                reporter: None,
                initialized_at: None,
            }),
            emitter,
            config,
        };
        engine.emitter.emit("Initialized!");
        engine
    }

    pub fn name(&self) -> &'static str {
        self.emitter.name()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Running
    }

    /// Read tracker state under the lock
    pub fn with_state<R>(&self, f: impl FnOnce(&TrackerState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Start analysis and the background reporter.
    ///
    /// The reporter needs a tokio runtime; outside one the engine still runs
    /// but periodic reports are disabled.
    pub fn initialize(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state == LifecycleState::Running {
            debug!("initialize() called while already running");
            return;
        }

        self.emitter.emit("Starting analysis...");
        lifecycle.state = LifecycleState::Running;
        lifecycle.initialized_at = Some(Instant::now());
        self.reset_match_stats();

        lifecycle.reporter = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(spawn_reporter(
                &runtime,
                self.state.clone(),
                self.emitter.clone(),
                self.metrics.clone(),
                self.config.report_interval,
            )),
            Err(e) => {
                warn!("No tokio runtime available, periodic reports disabled: {}", e);
                None
            }
        };

        info!(
            "{} running: possession<{:.0}, report every {:?}, smoothing window {}",
            self.name(),
            self.config.possession_distance,
            self.config.report_interval,
            self.config.smoothing_window
        );
    }

    fn reset_match_stats(&self) {
        self.emitter.emit("Resetting match stats.");
        self.state.lock().reset_match();
    }

    /// A new match began
    pub fn on_match_start(&self) {
        if !self.is_running() {
            return;
        }
        self.emitter.emit("New match started.");
        self.reset_match_stats();
    }

    /// The host tore the match down
    pub fn on_match_destroyed(&self) {
        if !self.is_running() {
            return;
        }
        self.emitter
            .emit("Game event destroyed. Finalizing and resetting stats for next game.");
        self.reset_match_stats();
    }

    /// Per-tick entry point. Analysis only: never overrides the command.
    pub fn on_tick(&self, snapshot: &Snapshot) -> Option<ControllerCommand> {
        if !self.is_running() {
            return None;
        }

        let started = Instant::now();
        let result = self.state.lock().ingest(snapshot);

        match result {
            Ok(events) => {
                EngineMetrics::incr(&self.metrics.ticks_processed);
                for event in events {
                    self.report_event(event);
                }
            }
            Err(e) => {
                EngineMetrics::incr(&self.metrics.ticks_skipped);
                warn!("Skipping malformed tick: {}", e);
                self.emitter.emit(&format!("Error: {}", e));
            }
        }

        self.metrics.record_tick_time(started.elapsed());
        None
    }

    fn report_event(&self, event: TrackerEvent) {
        match event {
            TrackerEvent::PossessionChanged {
                entity,
                name,
                distance,
            } => {
                EngineMetrics::incr(&self.metrics.possession_changes);
                self.emitter.emit(&format!(
                    "Possession changed to: {} (Index {}) at {:.0} units.",
                    name, entity, distance
                ));
            }
            TrackerEvent::BallLoose => {
                EngineMetrics::incr(&self.metrics.possession_changes);
                self.emitter.emit("Ball is now loose.");
            }
            TrackerEvent::GoalScored(goal) => {
                EngineMetrics::incr(&self.metrics.goals_detected);
                self.emitter.emit(&format!(
                    "*** {} Score: {} → {} ***",
                    goal.description(),
                    goal.previous_score,
                    goal.new_score
                ));
            }
            TrackerEvent::LocalTeamLatched(team) => {
                debug!("Local team is {} (Team {})", team_name(team), team);
            }
            TrackerEvent::EntitySkipped(e) => {
                EngineMetrics::incr(&self.metrics.entities_skipped);
                self.emitter.emit(&format!("Error getting score: {}", e));
            }
        }
    }

    /// Evaluate the hook predicates for a snapshot and fire the hooks that hold
    pub fn dispatch_hooks(&self, snapshot: &Snapshot) {
        let hooks = self.predicates.evaluate(snapshot);
        if hooks.kickoff {
            self.on_kickoff(snapshot);
        }
        if hooks.high_ball {
            self.on_high_ball(snapshot);
        }
        if hooks.fast_ball {
            self.on_fast_ball(snapshot);
        }
        if hooks.match_ended {
            self.on_match_ended();
        }
    }

    /// Kickoff pause: possession resets silently and scores are re-baselined
    pub fn on_kickoff(&self, snapshot: &Snapshot) {
        if !self.is_running() {
            return;
        }
        let result = self.state.lock().kickoff(snapshot);
        match result {
            Ok(true) => self.emitter.emit(
                "Kickoff detected - resetting possession and ensuring scores are synced.",
            ),
            Ok(false) => {}
            Err(e) => self
                .emitter
                .emit(&format!("Error syncing scores at kickoff: {}", e)),
        }
    }

    /// High ball: logged only when close to the height record
    pub fn on_high_ball(&self, snapshot: &Snapshot) {
        if !self.is_running() {
            return;
        }
        let height = snapshot.ball.height();
        let (near, record) = {
            let state = self.state.lock();
            let extrema = state.extrema();
            (
                extrema.height_near_record(height, self.config.near_record_ratio),
                extrema.max_height(),
            )
        };
        if near {
            self.emitter.emit(&high_ball_alert(height, record));
        }
    }

    /// Fast ball: logged only when close to the speed record
    pub fn on_fast_ball(&self, snapshot: &Snapshot) {
        if !self.is_running() {
            return;
        }
        let speed = snapshot.ball.speed();
        let (near, record) = {
            let state = self.state.lock();
            let extrema = state.extrema();
            (
                extrema.speed_near_record(speed, self.config.near_record_ratio),
                extrema.max_speed(),
            )
        };
        if near {
            self.emitter.emit(&fast_ball_alert(speed, record));
        }
    }

    /// Match ended: emit the final summary once
    pub fn on_match_ended(&self) {
        if !self.is_running() {
            return;
        }
        let summary = {
            let mut state = self.state.lock();
            if !state.claim_match_end() {
                return;
            }
            summarize(&state)
        };
        for line in summary.lines() {
            self.emitter.emit(&line);
        }
    }

    /// Smooth an outgoing command.
    ///
    /// Smoothing belongs to the control path, so it runs whatever the
    /// lifecycle state is.
    pub fn filter_command(&self, command: ControllerCommand) -> ControllerCommand {
        EngineMetrics::incr(&self.metrics.commands_filtered);
        self.smoother.lock().filter(command)
    }

    /// Stop the engine and the reporter. Idempotent.
    pub fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state == LifecycleState::Stopped {
            return;
        }
        lifecycle.state = LifecycleState::Stopped;

        if let Some(reporter) = lifecycle.reporter.take() {
            reporter.stop();
        }

        self.emitter.emit("Shutting down...");
        if let Some(started) = lifecycle.initialized_at {
            self.emitter.emit(&format!(
                "Total active time: {:.1} seconds",
                started.elapsed().as_secs_f32()
            ));
        }
        info!("{} stats: {}", self.name(), self.metrics.summary());
        self.emitter.emit("Goodbye!");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(reporter) = self.lifecycle.get_mut().reporter.take() {
            reporter.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sink::MemorySink;
    use crate::telemetry::possession::Possession;
    use crate::telemetry::snapshot::{BallState, EntitySnapshot};
    use crate::telemetry::status::MatchStatus;
    use crate::util::vec3::Vec3;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn engine() -> (Engine, MemorySink) {
        let sink = MemorySink::new();
        let mut config = EngineConfig::default();
        config.possession_distance = 150.0;
        config.report_interval = Duration::from_millis(100);
        config.smoothing_window = 2;
        (Engine::new(config, Arc::new(sink.clone())), sink)
    }

    fn snapshot(a_x: f32, a_score: i32, ball: BallState) -> Snapshot {
        Snapshot::new(
            ball,
            vec![
                EntitySnapshot::new("Ace", Vec3::new(a_x, 0.0, 0.0), a_score, 0),
                EntitySnapshot::new("Rook", Vec3::new(-800.0, 0.0, 0.0), 0, 1),
            ],
            0,
        )
    }

    fn ground_ball() -> BallState {
        BallState::new(Vec3::new(0.0, 0.0, 93.0), Vec3::ZERO)
    }

    #[test]
    fn test_stopped_engine_ignores_ticks() {
        let (engine, sink) = engine();
        assert_eq!(engine.lifecycle_state(), LifecycleState::Stopped);
        engine.on_tick(&snapshot(10.0, 5, ground_ball()));
        assert!(!engine.with_state(|s| s.has_data()));
        assert_eq!(sink.count_containing("Goal"), 0);
    }

    #[test]
    fn test_tick_pipeline_events() {
        let (engine, sink) = engine();
        engine.initialize();
        assert!(engine.is_running());

        engine.on_tick(&snapshot(100.0, 0, ground_ball()));
        engine.on_tick(&snapshot(100.0, 0, ground_ball()));
        assert_eq!(sink.count_containing("Possession changed to: Ace (Index 0)"), 1);

        engine.on_tick(&snapshot(400.0, 0, ground_ball()));
        engine.on_tick(&snapshot(400.0, 0, ground_ball()));
        assert_eq!(sink.count_containing("Ball is now loose."), 1);

        engine.on_tick(&snapshot(400.0, 1, ground_ball()));
        assert_eq!(sink.count_containing("*** Goal scored by Ace! Score: 0 → 1 ***"), 1);
        assert_eq!(engine.with_state(|s| s.status()), MatchStatus::Winning);

        let metrics = engine.metrics();
        assert_eq!(metrics.ticks_processed.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.possession_changes.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.goals_detected.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_malformed_tick_skipped() {
        let (engine, sink) = engine();
        engine.initialize();
        let mut bad = snapshot(10.0, 3, ground_ball());
        bad.entity_count = 9;

        assert!(engine.on_tick(&bad).is_none());
        assert_eq!(sink.count_containing("Error: Entity index"), 1);
        assert_eq!(engine.metrics().ticks_skipped.load(Ordering::Relaxed), 1);
        assert!(engine.with_state(|s| s.goal_log().is_empty()));
    }

    #[test]
    fn test_kickoff_logged_once_per_pause() {
        let (engine, sink) = engine();
        engine.initialize();
        engine.on_tick(&snapshot(10.0, 0, ground_ball()));

        let mut kickoff = snapshot(10.0, 2, ground_ball());
        kickoff.kickoff_active = true;
        for _ in 0..3 {
            engine.dispatch_hooks(&kickoff);
        }
        assert_eq!(sink.count_containing("Kickoff detected"), 1);
        assert_eq!(engine.with_state(|s| s.possession()), Possession::Loose);
        assert_eq!(sink.count_containing("Ball is now loose."), 0);

        // Score moved during the pause but was re-baselined
        engine.on_tick(&kickoff);
        assert_eq!(sink.count_containing("Goal scored"), 0);
    }

    #[test]
    fn test_high_ball_near_record_only() {
        let (engine, sink) = engine();
        engine.initialize();
        let high = |z: f32| snapshot(900.0, 0, BallState::new(Vec3::new(0.0, 0.0, z), Vec3::ZERO));

        engine.on_tick(&high(600.0));
        engine.dispatch_hooks(&high(600.0));
        assert_eq!(sink.count_containing("High ball detected! Height: 600 (Record: 600)"), 1);

        // Still above the hook threshold but well under the record
        engine.on_tick(&high(400.0));
        engine.dispatch_hooks(&high(400.0));
        assert_eq!(sink.count_containing("High ball detected!"), 1);
    }

    #[test]
    fn test_fast_ball_alert() {
        let (engine, sink) = engine();
        engine.initialize();
        let fast = snapshot(900.0, 0, BallState::new(Vec3::new(0.0, 0.0, 93.0), Vec3::new(2500.0, 0.0, 0.0)));
        engine.on_tick(&fast);
        engine.dispatch_hooks(&fast);
        assert_eq!(sink.count_containing("Fast ball detected! Speed: 2500"), 1);
    }

    #[test]
    fn test_match_end_summary_once() {
        let (engine, sink) = engine();
        engine.initialize();
        engine.on_tick(&snapshot(900.0, 0, ground_ball()));
        engine.on_tick(&snapshot(900.0, 1, ground_ball()));

        let mut ended = snapshot(900.0, 1, ground_ball());
        ended.match_ended = true;
        for _ in 0..4 {
            engine.on_tick(&ended);
            engine.dispatch_hooks(&ended);
        }

        assert_eq!(sink.count_containing("=== MATCH SUMMARY"), 1);
        assert_eq!(sink.count_containing("Winner: Blue (Team 0)"), 1);
        assert_eq!(sink.count_containing("  - Goal scored by Ace!"), 1);
    }

    #[test]
    fn test_match_start_resets_but_keeps_smoothing() {
        let (engine, _sink) = engine();
        engine.initialize();
        engine.on_tick(&snapshot(10.0, 1, BallState::new(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO)));
        engine.filter_command(ControllerCommand {
            steer: 1.0,
            ..Default::default()
        });

        engine.on_match_start();

        engine.with_state(|s| {
            assert_eq!(s.extrema().max_height(), 0.0);
            assert!(s.goal_log().is_empty());
            assert_eq!(s.team_totals(), [0, 0]);
            assert_eq!(s.possession(), Possession::Loose);
        });

        // Window of two still holds the pre-reset sample
        let out = engine.filter_command(ControllerCommand::default());
        assert!((out.steer - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_shutdown_idempotent() {
        let (engine, sink) = engine();
        engine.initialize();
        engine.shutdown();
        engine.shutdown();

        assert_eq!(engine.lifecycle_state(), LifecycleState::Stopped);
        assert_eq!(sink.count_containing("Goodbye!"), 1);
        assert_eq!(sink.count_containing("Total active time"), 1);

        // Calls after shutdown are ignored
        engine.on_tick(&snapshot(10.0, 7, ground_ball()));
        assert!(!engine.with_state(|s| s.has_data()));
    }

    #[test]
    fn test_initialize_twice_is_noop() {
        let (engine, sink) = engine();
        engine.initialize();
        engine.initialize();
        assert_eq!(sink.count_containing("Starting analysis..."), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_reports_gated_on_change() {
        let (engine, sink) = engine();
        engine.initialize();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(sink.count_containing("Waiting for game data"), 1);

        engine.on_tick(&snapshot(900.0, 0, ground_ball()));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sink.count_containing("Tick Report"), 1);

        engine.on_tick(&snapshot(900.0, 1, ground_ball()));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(sink.count_containing("Tick Report"), 2);
        assert_eq!(sink.count_containing("WE ARE WINNING!"), 1);

        engine.shutdown();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(sink.count_containing("Background reporting task finished."), 1);
    }
}
