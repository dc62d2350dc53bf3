//! Hysteretic possession detection
//!
//! The detector is an explicit two-state machine (`Loose` / `Held`). Events are
//! only produced on transitions, so a stable holder or a ball that stays loose
//! generates nothing no matter how many ticks pass.

use crate::telemetry::snapshot::{EntityIndex, EntitySnapshot};
use crate::util::vec3::{distance, Vec3};

/// Who has the ball
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Possession {
    #[default]
    Loose,
    Held {
        entity: EntityIndex,
        /// Elapsed match time when this holder took over
        since: f32,
    },
}

impl Possession {
    pub fn holder(&self) -> Option<EntityIndex> {
        match self {
            Possession::Held { entity, .. } => Some(*entity),
            Possession::Loose => None,
        }
    }
}

/// Transition produced by one detector update
#[derive(Debug, Clone, PartialEq)]
pub enum PossessionChange {
    Gained {
        entity: EntityIndex,
        name: String,
        distance: f32,
    },
    Lost,
}

/// Closest entity to the ball and its distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Closest {
    pub entity: EntityIndex,
    pub distance: f32,
}

/// Find the entity nearest the ball. Ties keep the earliest entity.
///
/// NaN distances never compare closer, so an entity with a broken position is
/// skipped rather than shadowing the others.
pub fn closest_entity(ball: Vec3, entities: &[EntitySnapshot]) -> Option<Closest> {
    let mut best: Option<Closest> = None;
    let mut best_distance = f32::INFINITY;
    for (index, entity) in entities.iter().enumerate() {
        let d = distance(entity.position, ball);
        if d < best_distance {
            best_distance = d;
            best = Some(Closest {
                entity: index,
                distance: d,
            });
        }
    }
    best
}

/// Possession state machine with a single distance threshold
#[derive(Debug, Clone)]
pub struct PossessionDetector {
    threshold: f32,
    state: Possession,
}

impl PossessionDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            state: Possession::Loose,
        }
    }

    pub fn state(&self) -> Possession {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Run one tick of the state machine
    pub fn update(
        &mut self,
        ball: Vec3,
        entities: &[EntitySnapshot],
        seconds_elapsed: f32,
    ) -> Option<PossessionChange> {
        let closest = closest_entity(ball, entities);
        let in_range = closest.filter(|c| c.distance < self.threshold);

        match (in_range, self.state) {
            (Some(c), state) if state.holder() != Some(c.entity) => {
                self.state = Possession::Held {
                    entity: c.entity,
                    since: seconds_elapsed,
                };
                Some(PossessionChange::Gained {
                    entity: c.entity,
                    name: entities[c.entity].display_name().to_string(),
                    distance: c.distance,
                })
            }
            (Some(_), _) => None,
            (None, Possession::Held { .. }) => {
                self.state = Possession::Loose;
                Some(PossessionChange::Lost)
            }
            (None, Possession::Loose) => None,
        }
    }

    /// Drop possession without reporting a loss (kickoff, match reset)
    pub fn force_loose(&mut self) {
        self.state = Possession::Loose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 150.0;

    fn entity_at(name: &str, x: f32) -> EntitySnapshot {
        EntitySnapshot::new(name, Vec3::new(x, 0.0, 0.0), 0, 0)
    }

    #[test]
    fn test_initially_loose() {
        let detector = PossessionDetector::new(THRESHOLD);
        assert_eq!(detector.state(), Possession::Loose);
    }

    #[test]
    fn test_gain_fires_once_while_stable() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        let entities = vec![entity_at("A", 100.0), entity_at("B", 900.0)];

        let change = detector.update(Vec3::ZERO, &entities, 3.5);
        assert_eq!(
            change,
            Some(PossessionChange::Gained {
                entity: 0,
                name: "A".to_string(),
                distance: 100.0
            })
        );
        assert_eq!(detector.state(), Possession::Held { entity: 0, since: 3.5 });

        for _ in 0..10 {
            assert!(detector.update(Vec3::ZERO, &entities, 4.0).is_none());
        }
        // Timestamp is only written on a holder change
        assert_eq!(detector.state(), Possession::Held { entity: 0, since: 3.5 });
    }

    #[test]
    fn test_loss_fires_once() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        detector.update(Vec3::ZERO, &[entity_at("A", 100.0), entity_at("B", 400.0)], 0.0);

        // A drifts to 200; B is closer than before but still outside the threshold
        let entities = vec![entity_at("A", 200.0), entity_at("B", 180.0)];
        assert_eq!(
            detector.update(Vec3::ZERO, &entities, 1.0),
            Some(PossessionChange::Lost)
        );
        assert_eq!(detector.state(), Possession::Loose);

        for _ in 0..5 {
            assert!(detector.update(Vec3::ZERO, &entities, 2.0).is_none());
        }
        assert_eq!(detector.state(), Possession::Loose);
    }

    #[test]
    fn test_direct_handover() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        detector.update(Vec3::ZERO, &[entity_at("A", 50.0), entity_at("B", 120.0)], 0.0);

        let change = detector.update(Vec3::ZERO, &[entity_at("A", 130.0), entity_at("B", 40.0)], 1.0);
        assert!(matches!(change, Some(PossessionChange::Gained { entity: 1, .. })));
        assert_eq!(detector.state().holder(), Some(1));
    }

    #[test]
    fn test_exact_threshold_is_out_of_range() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        assert!(detector.update(Vec3::ZERO, &[entity_at("A", 150.0)], 0.0).is_none());
        assert_eq!(detector.state(), Possession::Loose);
    }

    #[test]
    fn test_tie_prefers_first_entity() {
        let entities = vec![entity_at("A", -80.0), entity_at("B", 80.0)];
        let closest = closest_entity(Vec3::ZERO, &entities);
        assert_eq!(closest.map(|c| c.entity), Some(0));
    }

    #[test]
    fn test_nan_entity_does_not_shadow_others() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        let entities = vec![
            EntitySnapshot::new("Broken", Vec3::new(f32::NAN, 0.0, 0.0), 0, 0),
            entity_at("Near", 10.0),
        ];

        let closest = closest_entity(Vec3::ZERO, &entities);
        assert_eq!(closest.map(|c| c.entity), Some(1));

        let change = detector.update(Vec3::ZERO, &entities, 0.0);
        assert!(matches!(change, Some(PossessionChange::Gained { entity: 1, .. })));
        assert_eq!(detector.state().holder(), Some(1));
    }

    #[test]
    fn test_only_nan_entities_is_none() {
        let entities = vec![EntitySnapshot::new("Broken", Vec3::new(f32::NAN, 0.0, 0.0), 0, 0)];
        assert!(closest_entity(Vec3::ZERO, &entities).is_none());
    }

    #[test]
    fn test_no_entities() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        assert!(closest_entity(Vec3::ZERO, &[]).is_none());
        assert!(detector.update(Vec3::ZERO, &[], 0.0).is_none());
    }

    #[test]
    fn test_force_loose_is_silent() {
        let mut detector = PossessionDetector::new(THRESHOLD);
        detector.update(Vec3::ZERO, &[entity_at("A", 10.0)], 0.0);
        detector.force_loose();
        assert_eq!(detector.state(), Possession::Loose);
        // Regaining after a forced reset is a fresh gain
        assert!(detector.update(Vec3::ZERO, &[entity_at("A", 10.0)], 1.0).is_some());
    }
}
