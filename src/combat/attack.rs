//! Spawned melee strikes and ranged projectiles

use serde::{Deserialize, Serialize};

use super::unit::{AttackKind, Unit, UnitType};
use crate::ecs::Transform;

/// Data template an attack entity is spawned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackPrototype {
    /// Lookup name, referenced from archetype tuning
    pub name: String,
    /// Melee strike or ranged projectile
    pub kind: AttackKind,
    /// Damage applied on hit
    pub damage: i32,
    /// Units per second along the spawn facing (ranged only)
    pub projectile_speed: f32,
    /// Seconds before the attack expires
    pub active_time: f32,
    /// Hit sphere radius
    pub radius: f32,
    /// Distance in front of the instigator where the attack appears
    pub spawn_offset: f32,
}

impl AttackPrototype {
    /// Instantiate the prototype for an instigator of the given type.
    ///
    /// Returns the attack component and its spawn transform.
    #[must_use]
    pub fn instantiate(&self, origin_type: UnitType, instigator: &Transform) -> (Attack, Transform) {
        let forward = instigator.planar_forward();
        let transform = Transform::from_position_rotation(
            instigator.position + forward * self.spawn_offset,
            instigator.rotation,
        );

        let attack = Attack {
            name: self.name.clone(),
            kind: self.kind,
            damage: self.damage,
            origin_type,
            projectile_speed: match self.kind {
                AttackKind::Ranged => self.projectile_speed,
                AttackKind::Melee => 0.0,
            },
            active_time: self.active_time,
            elapsed: 0.0,
            radius: self.radius,
            has_collided: false,
            is_active: true,
        };
        (attack, transform)
    }
}

/// Live attack entity.
#[derive(Debug, Clone)]
pub struct Attack {
    pub name: String,
    pub kind: AttackKind,
    pub damage: i32,
    /// Archetype of the unit that spawned it
    pub origin_type: UnitType,
    pub projectile_speed: f32,
    pub active_time: f32,
    pub elapsed: f32,
    pub radius: f32,
    pub has_collided: bool,
    pub is_active: bool,
}

impl Attack {
    /// Advance the attack: move projectiles, burn the active-time budget.
    pub fn tick(&mut self, delta_time: f32, transform: &mut Transform) {
        if !self.is_active {
            return;
        }

        if self.kind == AttackKind::Ranged {
            let step = transform.planar_forward() * self.projectile_speed * delta_time;
            transform.translate(step);
        }

        self.elapsed += delta_time;
        if self.elapsed > self.active_time {
            self.is_active = false;
        }
    }

    /// Whether this attack can still damage `unit`.
    ///
    /// Same-type overlaps are ignored so units never hurt their own kind.
    #[must_use]
    pub fn can_hit(&self, unit: &Unit) -> bool {
        self.is_active
            && !self.has_collided
            && !unit.is_dead()
            && unit.unit_type() != self.origin_type
    }

    /// Resolve an overlap with `unit`.
    ///
    /// Returns the health the unit actually lost, or `None` when the overlap
    /// is ignored. Melee strikes land once; projectiles are spent by their
    /// first hit.
    pub fn resolve_hit(&mut self, unit: &mut Unit) -> Option<i32> {
        if !self.can_hit(unit) {
            return None;
        }

        let before = unit.health();
        unit.take_damage(self.damage);
        self.has_collided = true;
        if self.kind == AttackKind::Ranged {
            self.is_active = false;
        }
        Some(before - unit.health())
    }

    /// Sphere overlap test between this attack and a unit body.
    #[must_use]
    pub fn overlaps(&self, position: glam::Vec3, unit_position: glam::Vec3, unit_radius: f32) -> bool {
        position.distance(unit_position) <= self.radius + unit_radius
    }
}
