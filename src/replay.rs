//! Snapshot sources for driving the engine without a live host
//!
//! `ScriptedMatch` generates a deterministic synthetic match (ball flight,
//! chasing entities, scripted goals with kickoff pauses). `load_jsonl` reads a
//! recorded match, one JSON snapshot per line.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use std::io::BufRead;
use std::path::Path;

use crate::control::command::ControllerCommand;
use crate::telemetry::snapshot::{BallState, EntitySnapshot, Snapshot, TeamId};
use crate::util::vec3::Vec3;

/// Points awarded per goal on an entity's score counter
const GOAL_POINTS: i32 = 100;
/// Length of the kickoff pause after a goal, in seconds
const KICKOFF_PAUSE: f32 = 1.5;
/// Resting ball height
const BALL_REST_Z: f32 = 93.0;

/// Replay loading errors
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid snapshot on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a JSON-lines snapshot file. Blank lines are skipped.
pub fn load_jsonl(path: &Path) -> Result<Vec<Snapshot>, ReplayError> {
    let file = std::fs::File::open(path)?;
    parse_jsonl(std::io::BufReader::new(file))
}

/// Parse JSON-lines snapshots from any reader
pub fn parse_jsonl(reader: impl BufRead) -> Result<Vec<Snapshot>, ReplayError> {
    let mut snapshots = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let snapshot = serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
            line: i + 1,
            source,
        })?;
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

/// A goal the scripted match will score
#[derive(Debug, Clone, Copy)]
pub struct ScriptedGoal {
    pub at: f32,
    pub scorer: usize,
}

/// Deterministic synthetic match generator
pub struct ScriptedMatch {
    rng: StdRng,
    dt: f32,
    duration: f32,
    time: f32,
    ball: BallState,
    entities: Vec<EntitySnapshot>,
    goals: Vec<ScriptedGoal>,
    next_goal: usize,
    kickoff_until: f32,
    finished: bool,
}

impl ScriptedMatch {
    /// Two-versus-two match of `duration` seconds at `tick_rate` Hz
    pub fn new(seed: u64, tick_rate: u32, duration: f32) -> Self {
        let roster: [(&str, TeamId, f32); 4] = [
            ("Ace", 0, -1200.0),
            ("Blaze", 0, -2400.0),
            ("Rook", 1, 1200.0),
            ("Vex", 1, 2400.0),
        ];
        let entities = roster
            .iter()
            .map(|(name, team, y)| EntitySnapshot::new(*name, Vec3::new(0.0, *y, 17.0), 0, *team))
            .collect();

        let goals = vec![
            ScriptedGoal {
                at: duration * 0.3,
                scorer: 0,
            },
            ScriptedGoal {
                at: duration * 0.55,
                scorer: 2,
            },
            ScriptedGoal {
                at: duration * 0.8,
                scorer: 1,
            },
        ];

        Self {
            rng: StdRng::seed_from_u64(seed),
            dt: 1.0 / tick_rate.max(1) as f32,
            duration,
            time: 0.0,
            ball: BallState::new(Vec3::new(0.0, 0.0, BALL_REST_Z), Vec3::ZERO),
            entities,
            goals,
            next_goal: 0,
            kickoff_until: KICKOFF_PAUSE,
            finished: false,
        }
    }

    pub fn goals(&self) -> &[ScriptedGoal] {
        &self.goals
    }

    fn reset_positions(&mut self) {
        self.ball = BallState::new(Vec3::new(0.0, 0.0, BALL_REST_Z), Vec3::ZERO);
        for (i, entity) in self.entities.iter_mut().enumerate() {
            let side = if entity.team == 0 { -1.0 } else { 1.0 };
            let depth = if i % 2 == 0 { 1200.0 } else { 2400.0 };
            entity.position = Vec3::new(0.0, side * depth, 17.0);
        }
    }

    fn step_ball(&mut self) {
        let t = self.time;
        // Lazy figure-eight with periodic lobs
        let target = Vec3::new(
            2000.0 * (t * 0.4).sin(),
            3000.0 * (t * 0.2).sin() * (t * 0.2).cos(),
            BALL_REST_Z + 900.0 * (t * 0.7).sin().max(0.0).powi(3),
        );
        let velocity = (target - self.ball.position) * (1.0 / self.dt);
        self.ball = BallState::new(target, velocity);
    }

    fn step_entities(&mut self) {
        let ball = self.ball.position.flatten();
        for entity in &mut self.entities {
            let angle = self.rng.gen_range(0.0..TAU);
            let jitter = Vec3::new(angle.cos(), angle.sin(), 0.0) * self.rng.gen_range(0.0..40.0);
            let chase = self.rng.gen_range(0.02..0.08);
            entity.position = entity.position.lerp(ball + jitter, chase);
        }
    }
}

impl Iterator for ScriptedMatch {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        if self.finished {
            return None;
        }

        let kickoff_active = self.time < self.kickoff_until;
        if kickoff_active {
            self.reset_positions();
        } else {
            self.step_ball();
            self.step_entities();
        }

        if let Some(goal) = self.goals.get(self.next_goal).copied() {
            if self.time >= goal.at {
                self.entities[goal.scorer].score += GOAL_POINTS;
                self.next_goal += 1;
                self.kickoff_until = self.time + KICKOFF_PAUSE;
            }
        }

        let match_ended = self.time >= self.duration;
        let mut snapshot = Snapshot::new(self.ball, self.entities.clone(), 0);
        snapshot.seconds_elapsed = self.time;
        snapshot.kickoff_active = kickoff_active;
        snapshot.match_ended = match_ended;

        self.finished = match_ended;
        self.time += self.dt;
        Some(snapshot)
    }
}

/// Simple drive-at-the-ball command for the local entity
pub fn chase_command(snapshot: &Snapshot) -> ControllerCommand {
    let Some(local) = snapshot.local_entity() else {
        return ControllerCommand::default();
    };
    let to_ball = snapshot.ball.position - local.position;
    let steer = to_ball.flatten().normalize().x.clamp(-1.0, 1.0);

    ControllerCommand {
        steer,
        throttle: 1.0,
        boost: to_ball.length() > 1500.0,
        jump: snapshot.ball.height() > 250.0 && to_ball.flatten().length() < 200.0,
        ..Default::default()
    }
}
