//! Tracker state and the per-tick analysis pipeline
//!
//! Everything the engine knows about the current match lives in
//! [`TrackerState`]. The tick path mutates it; the background reporter only
//! reads it (and writes the report shadow) under the same lock.

use smallvec::SmallVec;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::telemetry::extrema::ExtremaTracker;
use crate::telemetry::goals::{GoalDetector, GoalEvent};
use crate::telemetry::possession::{Possession, PossessionChange, PossessionDetector};
use crate::telemetry::snapshot::{EntityIndex, Snapshot, SnapshotError, TeamId};
use crate::telemetry::status::{classify, MatchStatus};

/// Events produced while processing a tick
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    PossessionChanged {
        entity: EntityIndex,
        name: String,
        distance: f32,
    },
    BallLoose,
    GoalScored(GoalEvent),
    /// Local team taken from the local entity for this match
    LocalTeamLatched(TeamId),
    /// An entity had bad data and was left out of the team totals
    EntitySkipped(SnapshotError),
}

/// Event batch for one tick (usually empty or a single event)
pub type TickEvents = SmallVec<[TrackerEvent; 4]>;

/// Aggregates as of the last emitted report
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportShadow {
    pub team_totals: [i32; 2],
    pub max_height: f32,
    pub max_speed: f32,
    /// `None` until the first report; never equal to a live status
    pub status: Option<MatchStatus>,
}

/// Aggregates compared by the change-gated reporter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportView {
    pub team_totals: [i32; 2],
    pub max_height: f32,
    pub max_speed: f32,
    pub status: MatchStatus,
}

impl ReportView {
    /// Field-wise comparison against the shadow
    pub fn differs_from(&self, shadow: &ReportShadow) -> bool {
        self.team_totals != shadow.team_totals
            || self.max_height != shadow.max_height
            || self.max_speed != shadow.max_speed
            || shadow.status != Some(self.status)
    }
}

/// Match-scoped tracking state
#[derive(Debug, Clone)]
pub struct TrackerState {
    extrema: ExtremaTracker,
    possession: PossessionDetector,
    goals: GoalDetector,
    goal_log: Vec<GoalEvent>,
    team_totals: [i32; 2],
    local_team: Option<TeamId>,
    local_team_latched: bool,
    last_reported: ReportShadow,
    match_id: Uuid,
    match_started_at: Instant,
    last_match_time: f32,
    snapshots_observed: u64,
    kickoff_latched: bool,
    match_end_reported: bool,
}

impl TrackerState {
    pub fn new(possession_threshold: f32) -> Self {
        Self {
            extrema: ExtremaTracker::new(),
            possession: PossessionDetector::new(possession_threshold),
            goals: GoalDetector::new(),
            goal_log: Vec::new(),
            team_totals: [0, 0],
            local_team: None,
            local_team_latched: false,
            last_reported: ReportShadow::default(),
            match_id: Uuid::new_v4(),
            match_started_at: Instant::now(),
            last_match_time: 0.0,
            snapshots_observed: 0,
            kickoff_latched: false,
            match_end_reported: false,
        }
    }

    /// Run the full tick pipeline: extrema, possession, goals, team totals.
    ///
    /// The snapshot is validated before anything is touched, so a rejected
    /// tick leaves the state exactly as it was.
    pub fn ingest(&mut self, snapshot: &Snapshot) -> Result<TickEvents, SnapshotError> {
        snapshot.validate()?;

        let mut events = TickEvents::new();
        let entities = snapshot.live_entities();

        if !self.local_team_latched {
            if let Some(local) = snapshot.local_entity() {
                if local.team_slot().is_ok() {
                    self.local_team = Some(local.team);
                    self.local_team_latched = true;
                    events.push(TrackerEvent::LocalTeamLatched(local.team));
                }
            }
        }

        self.extrema.observe(&snapshot.ball);

        match self
            .possession
            .update(snapshot.ball.position, entities, snapshot.seconds_elapsed)
        {
            Some(PossessionChange::Gained {
                entity,
                name,
                distance,
            }) => events.push(TrackerEvent::PossessionChanged {
                entity,
                name,
                distance,
            }),
            Some(PossessionChange::Lost) => events.push(TrackerEvent::BallLoose),
            None => {}
        }

        for goal in self.goals.detect(entities, snapshot.seconds_elapsed) {
            self.goal_log.push(goal.clone());
            events.push(TrackerEvent::GoalScored(goal));
        }

        // Full recompute every tick; a faulty entity only drops out of the sum
        let mut totals = [0i32; 2];
        for entity in entities {
            match entity.team_slot() {
                Ok(slot) => totals[slot] = totals[slot].saturating_add(entity.score),
                Err(e) => events.push(TrackerEvent::EntitySkipped(e)),
            }
        }
        self.team_totals = totals;

        if !snapshot.kickoff_active {
            self.kickoff_latched = false;
        }
        if !snapshot.match_ended {
            self.match_end_reported = false;
        }

        self.last_match_time = snapshot.seconds_elapsed;
        self.snapshots_observed += 1;

        Ok(events)
    }

    /// Kickoff handling: drop possession silently and re-baseline scores.
    ///
    /// Returns true on the first call of a kickoff pause.
    pub fn kickoff(&mut self, snapshot: &Snapshot) -> Result<bool, SnapshotError> {
        snapshot.validate()?;

        self.possession.force_loose();
        self.goals.resync(snapshot.live_entities());

        let first = !self.kickoff_latched;
        self.kickoff_latched = true;
        Ok(first)
    }

    /// Claim the match-end summary. Returns true only once per match end.
    pub fn claim_match_end(&mut self) -> bool {
        let first = !self.match_end_reported;
        self.match_end_reported = true;
        first
    }

    /// Reset match-scoped state for a new match.
    ///
    /// The local team value carries over; it is re-latched from the next
    /// valid observation.
    pub fn reset_match(&mut self) {
        self.extrema.reset();
        self.possession.force_loose();
        self.goals.clear();
        self.goal_log.clear();
        self.team_totals = [0, 0];
        self.last_reported = ReportShadow::default();
        self.local_team_latched = false;
        self.match_id = Uuid::new_v4();
        self.match_started_at = Instant::now();
        self.last_match_time = 0.0;
        self.kickoff_latched = false;
        self.match_end_reported = false;
        debug!("Tracker reset for match {}", self.match_id);
    }

    pub fn status(&self) -> MatchStatus {
        classify(self.team_totals, self.local_team)
    }

    /// Current aggregates as seen by the reporter
    pub fn report_view(&self) -> ReportView {
        ReportView {
            team_totals: self.team_totals,
            max_height: self.extrema.max_height(),
            max_speed: self.extrema.max_speed(),
            status: self.status(),
        }
    }

    pub fn last_reported(&self) -> &ReportShadow {
        &self.last_reported
    }

    pub fn mark_reported(&mut self, view: &ReportView) {
        self.last_reported = ReportShadow {
            team_totals: view.team_totals,
            max_height: view.max_height,
            max_speed: view.max_speed,
            status: Some(view.status),
        };
    }

    pub fn extrema(&self) -> &ExtremaTracker {
        &self.extrema
    }

    pub fn possession(&self) -> Possession {
        self.possession.state()
    }

    pub fn goal_log(&self) -> &[GoalEvent] {
        &self.goal_log
    }

    pub fn last_known_score(&self, entity: EntityIndex) -> i32 {
        self.goals.last_known(entity)
    }

    pub fn team_totals(&self) -> [i32; 2] {
        self.team_totals
    }

    pub fn local_team(&self) -> Option<TeamId> {
        self.local_team
    }

    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    /// Wall-clock time since the current match (or the engine) started
    pub fn runtime_secs(&self) -> f32 {
        self.match_started_at.elapsed().as_secs_f32()
    }

    /// Elapsed match time of the last accepted snapshot
    pub fn last_match_time(&self) -> f32 {
        self.last_match_time
    }

    pub fn has_data(&self) -> bool {
        self.snapshots_observed > 0
    }

    pub fn snapshots_observed(&self) -> u64 {
        self.snapshots_observed
    }
}
