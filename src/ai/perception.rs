//! Enemy perception
//!
//! A trigger sphere around each enemy watches for the player. On the tick
//! the player enters the sphere, a single ray is cast toward them; the
//! player counts as spotted only when the first thing the ray hits is the
//! player's own collider.

use glam::Vec3;

use crate::core::AiTuning;
use crate::physics::{ColliderHandle, ColliderTag};

/// First collider a sight ray runs into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub tag: ColliderTag,
    pub distance: f32,
}

/// Ray queries used by perception.
pub trait LineOfSight {
    /// First tagged collider along `direction` within `max_distance`,
    /// skipping `ignore`.
    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<RayHit>;
}

/// Edge-triggered sight volume attached to an enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySight {
    /// Radius of the trigger sphere
    pub trigger_radius: f32,
    /// Maximum length of the confirmation ray
    pub max_range: f32,
    player_inside: bool,
}

impl EnemySight {
    #[must_use]
    pub fn new(trigger_radius: f32, max_range: f32) -> Self {
        Self {
            trigger_radius,
            max_range,
            player_inside: false,
        }
    }

    #[must_use]
    pub fn from_tuning(ai: &AiTuning) -> Self {
        Self::new(ai.sight_radius, ai.sight_range)
    }

    /// Whether the player was inside the trigger at the last check
    #[must_use]
    pub fn player_inside(&self) -> bool {
        self.player_inside
    }

    /// Update the trigger with this tick's positions.
    ///
    /// Returns the distance to the player when they entered the volume this
    /// tick and the confirmation ray reached them unobstructed.
    pub fn sense(
        &mut self,
        eye: Vec3,
        own_collider: Option<ColliderHandle>,
        player_eye: Vec3,
        los: &impl LineOfSight,
    ) -> Option<f32> {
        let offset = player_eye - eye;
        let inside = offset.length() <= self.trigger_radius;
        let entered = inside && !self.player_inside;
        self.player_inside = inside;

        if !entered {
            return None;
        }

        let hit = los.first_hit(eye, offset, self.max_range, own_collider)?;
        match hit.tag {
            ColliderTag::Player => Some(hit.distance),
            tag => {
                log::trace!("Sight ray blocked by {tag:?} at {:.1}", hit.distance);
                None
            }
        }
    }
}

impl Default for EnemySight {
    fn default() -> Self {
        Self::from_tuning(&AiTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Scripted ray results for one call site.
    struct StubSight {
        hit: Option<RayHit>,
        casts: Cell<u32>,
    }

    impl StubSight {
        fn hitting(tag: ColliderTag, distance: f32) -> Self {
            Self {
                hit: Some(RayHit { tag, distance }),
                casts: Cell::new(0),
            }
        }
    }

    impl LineOfSight for StubSight {
        fn first_hit(
            &self,
            _origin: Vec3,
            _direction: Vec3,
            max_distance: f32,
            _ignore: Option<ColliderHandle>,
        ) -> Option<RayHit> {
            self.casts.set(self.casts.get() + 1);
            self.hit.filter(|hit| hit.distance <= max_distance)
        }
    }

    #[test]
    fn test_clear_sight_spots_player() {
        let mut sight = EnemySight::default();
        let los = StubSight::hitting(ColliderTag::Player, 9.5);

        let spotted = sight.sense(Vec3::ZERO, None, Vec3::new(0.0, 0.0, -10.0), &los);
        assert_eq!(spotted, Some(9.5));
        assert!(sight.player_inside());
    }

    #[test]
    fn test_occluded_player_not_spotted() {
        let mut sight = EnemySight::default();
        let los = StubSight::hitting(ColliderTag::Environment, 4.0);

        assert_eq!(sight.sense(Vec3::ZERO, None, Vec3::new(0.0, 0.0, -10.0), &los), None);
    }

    #[test]
    fn test_outside_trigger_casts_nothing() {
        let mut sight = EnemySight::default();
        let los = StubSight::hitting(ColliderTag::Player, 15.0);

        assert_eq!(sight.sense(Vec3::ZERO, None, Vec3::new(0.0, 0.0, -15.0), &los), None);
        assert_eq!(los.casts.get(), 0);
    }

    #[test]
    fn test_edge_triggered_until_exit() {
        let mut sight = EnemySight::default();
        let los = StubSight::hitting(ColliderTag::Player, 5.0);
        let near = Vec3::new(0.0, 0.0, -5.0);
        let far = Vec3::new(0.0, 0.0, -20.0);

        assert!(sight.sense(Vec3::ZERO, None, near, &los).is_some());
        // Staying inside does not fire again
        assert!(sight.sense(Vec3::ZERO, None, near, &los).is_none());
        assert_eq!(los.casts.get(), 1);

        // Leaving re-arms the trigger
        assert!(sight.sense(Vec3::ZERO, None, far, &los).is_none());
        assert!(!sight.player_inside());
        assert!(sight.sense(Vec3::ZERO, None, near, &los).is_some());
        assert_eq!(los.casts.get(), 2);
    }

    #[test]
    fn test_occluded_entry_waits_for_next_entry() {
        let mut sight = EnemySight::default();
        let blocked = StubSight::hitting(ColliderTag::Environment, 3.0);
        let clear = StubSight::hitting(ColliderTag::Player, 5.0);
        let near = Vec3::new(0.0, 0.0, -5.0);

        assert!(sight.sense(Vec3::ZERO, None, near, &blocked).is_none());
        // Still inside: the wall disappearing does not retrigger
        assert!(sight.sense(Vec3::ZERO, None, near, &clear).is_none());
    }

    #[test]
    fn test_from_tuning() {
        let ai = AiTuning {
            sight_radius: 6.0,
            sight_range: 30.0,
            ..AiTuning::default()
        };
        let sight = EnemySight::from_tuning(&ai);
        assert_eq!(sight.trigger_radius, 6.0);
        assert_eq!(sight.max_range, 30.0);
    }
}
