//! Enemy component: attack choice helpers and the death sequence

use glam::{Quat, Vec3};
use hecs::Entity;

use super::unit::{AttackKind, Unit};
use crate::ai::steering;
use crate::core::Services;
use crate::ecs::Transform;

/// Scale factor a fading enemy shrinks to.
pub const DEATH_SCALE: f32 = 0.1;

/// Tint a fading enemy darkens to.
pub const DEATH_TINT: Vec3 = Vec3::splat(0.2);

/// Tint distance at which the fade counts as finished.
const TINT_EPSILON: f32 = 0.01;

/// Presentation state of an enemy body.
///
/// Hosts read `tint` and the entity's transform scale to draw the death fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    /// Scale at spawn time
    pub base_scale: Vec3,
    /// Tint at spawn time
    pub base_tint: Vec3,
    /// Current tint
    pub tint: Vec3,
    /// Degrees turned during the last AI tick
    pub rotation_stepped: f32,
}

impl Enemy {
    #[must_use]
    pub fn new(base_scale: Vec3) -> Self {
        Self {
            base_scale,
            base_tint: Vec3::ONE,
            tint: Vec3::ONE,
            rotation_stepped: 0.0,
        }
    }

    /// Damped yaw toward `target`.
    #[inline]
    pub fn rotate_towards(transform: &mut Transform, target: Vec3, damping: f32) {
        steering::rotate_towards(transform, target, damping);
    }

    /// Record how far the body turned between two ticks.
    pub fn track_rotation(&mut self, before: Quat, after: Quat) {
        self.rotation_stepped = before.angle_between(after).to_degrees();
    }

    /// Attack with the ranged prototype when the unit has one, melee otherwise.
    pub fn attack(
        unit: &mut Unit,
        entity: Entity,
        transform: &Transform,
        services: &mut Services,
    ) -> bool {
        let kind = if unit.ranged_attack.is_some() {
            AttackKind::Ranged
        } else {
            AttackKind::Melee
        };
        unit.attack(kind, entity, transform, services)
    }

    /// Attack with whichever of the unit's prototypes is named `name`.
    ///
    /// Names that match neither prototype do nothing.
    pub fn demon_attack(
        unit: &mut Unit,
        name: &str,
        entity: Entity,
        transform: &Transform,
        services: &mut Services,
    ) -> bool {
        let kind = if unit.melee_attack.as_deref() == Some(name) {
            AttackKind::Melee
        } else if unit.ranged_attack.as_deref() == Some(name) {
            AttackKind::Ranged
        } else {
            log::debug!("Unit {entity:?} has no attack named {name}");
            return false;
        };
        unit.attack(kind, entity, transform, services)
    }

    /// Advance the death sequence by one tick.
    ///
    /// Living units are left alone. Fading archetypes shrink and darken with
    /// the countdown and finish as soon as the tint reaches its terminal
    /// value; the rest simply wait out their death time. Returns `true` once
    /// the body should be destroyed.
    pub fn die(&mut self, delta_time: f32, unit: &mut Unit, transform: &mut Transform) -> bool {
        if !unit.is_dead() {
            return false;
        }

        let expired = unit.tick_death(delta_time);
        if !unit.unit_type().fades_on_death() {
            return expired;
        }

        let progress = unit.death_progress();
        transform.scale = self.base_scale.lerp(self.base_scale * DEATH_SCALE, progress);
        self.tint = self.base_tint.lerp(DEATH_TINT, progress);

        expired || self.tint.distance(DEATH_TINT) < TINT_EPSILON
    }
}

impl Default for Enemy {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::UnitType;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    fn demon() -> Unit {
        Unit::new(UnitType::Demon, 200)
            .with_attacks(Some("Fireball".to_string()), Some("Punch".to_string()))
    }

    #[test]
    fn test_attack_prefers_ranged() {
        let mut unit = demon();
        let mut services = Services::new();

        assert!(Enemy::attack(&mut unit, test_entity(), &Transform::default(), &mut services));
        let spawns: Vec<_> = services.take_spawns().collect();
        assert_eq!(spawns[0].prototype, "Fireball");
    }

    #[test]
    fn test_demon_attack_by_name() {
        let entity = test_entity();
        let mut services = Services::new();

        let mut unit = demon();
        assert!(Enemy::demon_attack(&mut unit, "Punch", entity, &Transform::default(), &mut services));
        let mut unit = demon();
        assert!(Enemy::demon_attack(&mut unit, "Fireball", entity, &Transform::default(), &mut services));

        let names: Vec<_> = services.take_spawns().map(|s| s.prototype).collect();
        assert_eq!(names, vec!["Punch".to_string(), "Fireball".to_string()]);
    }

    #[test]
    fn test_demon_attack_unknown_name() {
        let mut unit = demon();
        let mut services = Services::new();

        assert!(!Enemy::demon_attack(
            &mut unit,
            "Snowball",
            test_entity(),
            &Transform::default(),
            &mut services
        ));
        assert!(!unit.has_attacked());
    }

    #[test]
    fn test_track_rotation() {
        let mut enemy = Enemy::default();
        enemy.track_rotation(Quat::IDENTITY, Quat::from_rotation_y(30f32.to_radians()));
        assert!((enemy.rotation_stepped - 30.0).abs() < 1e-2);

        enemy.track_rotation(Quat::IDENTITY, Quat::IDENTITY);
        assert!(enemy.rotation_stepped.abs() < 1e-2);
    }

    #[test]
    fn test_living_enemy_does_not_die() {
        let mut enemy = Enemy::default();
        let mut unit = Unit::new(UnitType::Snowman, 30);
        let mut transform = Transform::default();

        assert!(!enemy.die(10.0, &mut unit, &mut transform));
        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(enemy.tint, Vec3::ONE);
    }

    #[test]
    fn test_snowman_fades_out() {
        let mut enemy = Enemy::default();
        let mut unit = Unit::new(UnitType::Snowman, 30).with_death_time(2.0);
        let mut transform = Transform::default();
        unit.take_damage(30);

        assert!(!enemy.die(1.0, &mut unit, &mut transform));
        assert!((transform.scale.x - 0.55).abs() < 1e-4);
        assert!((enemy.tint.x - 0.6).abs() < 1e-4);

        // The tint reaches its terminal value at the end of the countdown
        assert!(enemy.die(1.0, &mut unit, &mut transform));
        assert!((transform.scale - Vec3::splat(DEATH_SCALE)).length() < 1e-4);
    }

    #[test]
    fn test_demon_waits_out_death_time() {
        let mut enemy = Enemy::default();
        let mut unit = Unit::new(UnitType::Demon, 10).with_death_time(1.0);
        let mut transform = Transform::default();
        unit.take_damage(10);

        assert!(!enemy.die(0.5, &mut unit, &mut transform));
        assert!(!enemy.die(0.5, &mut unit, &mut transform));
        assert!(enemy.die(0.25, &mut unit, &mut transform));
        // No fade for the demon
        assert_eq!(transform.scale, Vec3::ONE);
        assert_eq!(enemy.tint, Vec3::ONE);
    }
}
