//! Goal detection by watching per-entity score deltas
//!
//! Scores are keyed by the entity's index in the snapshot rather than its
//! display name, so two entities sharing a name never clobber each other.

use hashbrown::HashMap;

use crate::telemetry::snapshot::{EntityIndex, EntitySnapshot, TeamId};

/// A detected score change
#[derive(Debug, Clone, PartialEq)]
pub struct GoalEvent {
    pub entity: EntityIndex,
    pub scorer: String,
    pub team: TeamId,
    pub previous_score: i32,
    pub new_score: i32,
    /// Elapsed match time when the change was observed
    pub match_time: f32,
}

impl GoalEvent {
    /// Short description stored in the match goal log
    pub fn description(&self) -> String {
        format!("Goal scored by {}!", self.scorer)
    }
}

/// Score-delta watcher
#[derive(Debug, Clone, Default)]
pub struct GoalDetector {
    last_known_score: HashMap<EntityIndex, i32>,
}

impl GoalDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed score for an entity (0 if never seen)
    pub fn last_known(&self, entity: EntityIndex) -> i32 {
        self.last_known_score.get(&entity).copied().unwrap_or(0)
    }

    /// Compare every entity's score with the last observation.
    ///
    /// Any difference counts, including decreases. An unseen entity has a
    /// baseline of 0, so a first observation with a nonzero score fires once.
    pub fn detect(&mut self, entities: &[EntitySnapshot], match_time: f32) -> Vec<GoalEvent> {
        let mut goals = Vec::new();

        for (index, entity) in entities.iter().enumerate() {
            let previous = self.last_known(index);
            if entity.score != previous {
                goals.push(GoalEvent {
                    entity: index,
                    scorer: entity.display_name().to_string(),
                    team: entity.team,
                    previous_score: previous,
                    new_score: entity.score,
                    match_time,
                });
                self.last_known_score.insert(index, entity.score);
            }
        }

        goals
    }

    /// Re-baseline every entity to its current score without firing events
    pub fn resync(&mut self, entities: &[EntitySnapshot]) {
        for (index, entity) in entities.iter().enumerate() {
            self.last_known_score.insert(index, entity.score);
        }
    }

    pub fn clear(&mut self) {
        self.last_known_score.clear();
    }

    /// Number of entities observed so far
    pub fn tracked(&self) -> usize {
        self.last_known_score.len()
    }
}
