//! Host event predicates
//!
//! Hosts normally evaluate these conditions themselves and call the matching
//! engine hook once per tick while a condition holds. `HookPredicates` lets a
//! host without such a layer get the same behaviour from a snapshot.

use crate::config::EngineConfig;
use crate::telemetry::snapshot::Snapshot;

/// Which hook conditions hold for a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookSet {
    pub kickoff: bool,
    pub high_ball: bool,
    pub fast_ball: bool,
    pub match_ended: bool,
}

impl HookSet {
    pub fn any(&self) -> bool {
        self.kickoff || self.high_ball || self.fast_ball || self.match_ended
    }
}

/// Thresholds for the level predicates
#[derive(Debug, Clone, Copy)]
pub struct HookPredicates {
    pub high_ball_height: f32,
    pub fast_ball_speed: f32,
}

impl HookPredicates {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            high_ball_height: config.high_ball_height,
            fast_ball_speed: config.fast_ball_speed,
        }
    }

    pub fn evaluate(&self, snapshot: &Snapshot) -> HookSet {
        HookSet {
            kickoff: snapshot.kickoff_active,
            high_ball: snapshot.ball.height() > self.high_ball_height,
            fast_ball: snapshot.ball.speed() > self.fast_ball_speed,
            match_ended: snapshot.match_ended,
        }
    }
}

/// Alert line for a high ball near the height record
pub fn high_ball_alert(height: f32, record: f32) -> String {
    format!("High ball detected! Height: {:.0} (Record: {:.0})", height, record)
}

/// Alert line for a fast ball near the speed record
pub fn fast_ball_alert(speed: f32, record: f32) -> String {
    format!("Fast ball detected! Speed: {:.0} (Record: {:.0})", speed, record)
}
