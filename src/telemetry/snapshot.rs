//! Per-tick world snapshot handed over by the host runtime
//!
//! Snapshots are read-only to the tracker. Structural validation happens once
//! at the tick boundary so the pipeline never sees a half-valid packet.

use serde::{Deserialize, Serialize};

use crate::telemetry::constants::host::TEAM_COUNT;
use crate::util::vec3::Vec3;

/// Index of an entity within the snapshot's entity list
pub type EntityIndex = usize;

/// Team identifier (0 = blue, 1 = orange)
pub type TeamId = u8;

/// Ball kinematics for one tick
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BallState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl BallState {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.position.z
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        crate::util::vec3::magnitude(self.velocity)
    }
}

/// One entity (car) as seen in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    /// Display name as provided by the host (may carry trailing NULs)
    pub name: String,
    pub position: Vec3,
    /// Cumulative score counter for this entity
    pub score: i32,
    pub team: TeamId,
}

impl EntitySnapshot {
    pub fn new(name: impl Into<String>, position: Vec3, score: i32, team: TeamId) -> Self {
        Self {
            name: name.into(),
            position,
            score,
            team,
        }
    }

    /// Name with trailing NUL padding removed
    pub fn display_name(&self) -> &str {
        self.name.trim_end_matches('\0')
    }

    /// Team index usable for the two-element totals array
    pub fn team_slot(&self) -> Result<usize, SnapshotError> {
        let slot = self.team as usize;
        if slot < TEAM_COUNT {
            Ok(slot)
        } else {
            Err(SnapshotError::InvalidTeam {
                name: self.display_name().to_string(),
                team: self.team,
            })
        }
    }
}

/// Full world state for one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub ball: BallState,
    pub entities: Vec<EntitySnapshot>,
    /// Number of entities the host claims are live. Hosts backed by a fixed
    /// array send a count alongside the array; it must not exceed the list.
    pub entity_count: usize,
    /// Index of the locally controlled entity
    pub local_index: EntityIndex,
    /// Elapsed match time in seconds
    pub seconds_elapsed: f32,
    pub kickoff_active: bool,
    pub match_ended: bool,
}

impl Snapshot {
    /// Build a snapshot whose declared count matches the entity list
    pub fn new(ball: BallState, entities: Vec<EntitySnapshot>, local_index: EntityIndex) -> Self {
        let entity_count = entities.len();
        Self {
            ball,
            entities,
            entity_count,
            local_index,
            seconds_elapsed: 0.0,
            kickoff_active: false,
            match_ended: false,
        }
    }

    /// Check structural consistency before any tracker state is touched
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.entity_count > self.entities.len() {
            return Err(SnapshotError::EntityIndexOutOfBounds {
                index: self.entities.len(),
                count: self.entity_count,
            });
        }
        Ok(())
    }

    /// Live entities (the first `entity_count` of the list)
    pub fn live_entities(&self) -> &[EntitySnapshot] {
        &self.entities[..self.entity_count.min(self.entities.len())]
    }

    /// Locally controlled entity, if the local index is valid this tick
    pub fn local_entity(&self) -> Option<&EntitySnapshot> {
        self.live_entities().get(self.local_index)
    }
}

/// Decode a host-provided UTF-16 name, dropping invalid units and NUL padding
pub fn decode_utf16_name(raw: &[u16]) -> String {
    let decoded: String = char::decode_utf16(raw.iter().copied())
        .filter_map(Result::ok)
        .collect();
    decoded.trim_end_matches('\0').to_string()
}

/// Snapshot validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("Entity index {index} out of bounds (declared count {count})")]
    EntityIndexOutOfBounds { index: usize, count: usize },
    #[error("Entity {name} has invalid team id {team}")]
    InvalidTeam { name: String, team: TeamId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, team: TeamId) -> EntitySnapshot {
        EntitySnapshot::new(name, Vec3::ZERO, 0, team)
    }

    #[test]
    fn test_validate_ok() {
        let snapshot = Snapshot::new(BallState::default(), vec![entity("A", 0)], 0);
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.live_entities().len(), 1);
    }

    #[test]
    fn test_validate_count_beyond_list() {
        let mut snapshot = Snapshot::new(BallState::default(), vec![entity("A", 0)], 0);
        snapshot.entity_count = 3;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::EntityIndexOutOfBounds { index: 1, count: 3 })
        );
    }

    #[test]
    fn test_live_entities_respects_count() {
        let mut snapshot =
            Snapshot::new(BallState::default(), vec![entity("A", 0), entity("B", 1)], 1);
        snapshot.entity_count = 1;
        assert_eq!(snapshot.live_entities().len(), 1);
        // Local index points past the live entities
        assert!(snapshot.local_entity().is_none());
    }

    #[test]
    fn test_team_slot() {
        assert_eq!(entity("A", 1).team_slot(), Ok(1));
        assert!(matches!(
            entity("A", 4).team_slot(),
            Err(SnapshotError::InvalidTeam { team: 4, .. })
        ));
    }

    #[test]
    fn test_display_name_trims_nul() {
        let e = entity("Striker\0\0", 0);
        assert_eq!(e.display_name(), "Striker");
    }

    #[test]
    fn test_decode_utf16_name() {
        let raw: Vec<u16> = "Keeper\0\0".encode_utf16().collect();
        assert_eq!(decode_utf16_name(&raw), "Keeper");

        // Lone surrogate is dropped rather than failing the whole name
        let raw = [0x0041, 0xD800, 0x0042];
        assert_eq!(decode_utf16_name(&raw), "AB");
    }

    #[test]
    fn test_ball_speed() {
        let ball = BallState::new(Vec3::new(0.0, 0.0, 93.0), Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(ball.height(), 93.0);
        assert!((ball.speed() - 5.0).abs() < 1e-5);
    }
}
