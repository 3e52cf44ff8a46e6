//! Base combat entity: health, cooldown and death countdown

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::core::{Services, SpawnRequest};
use crate::ecs::Transform;

/// Archetype tag carried by every unit and copied onto its attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Unit,
    Player,
    Snowman,
    WaterMonster,
    Demon,
}

impl UnitType {
    /// Whether this archetype plays the shrink/fade death sequence
    #[must_use]
    pub fn fades_on_death(self) -> bool {
        matches!(self, Self::Snowman | Self::WaterMonster)
    }

    /// Whether this archetype is driven by the enemy state machine
    #[must_use]
    pub fn is_enemy(self) -> bool {
        matches!(self, Self::Snowman | Self::WaterMonster | Self::Demon)
    }
}

/// Which of a unit's two attack prototypes to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Melee,
    Ranged,
}

/// Health, attack cooldown and death countdown for a combat entity.
#[derive(Debug, Clone)]
pub struct Unit {
    unit_type: UnitType,
    max_health: i32,
    health: i32,
    /// Prototype spawned for ranged attacks
    pub ranged_attack: Option<String>,
    /// Prototype spawned for melee attacks
    pub melee_attack: Option<String>,
    /// Seconds between attacks
    pub attack_interval: f32,
    current_attack_interval: f32,
    attacked: bool,
    dead: bool,
    /// Seconds a dead unit lingers before it is destroyed
    pub death_time: f32,
    current_death_time: f32,
    /// Overlap radius used for attack hits
    pub radius: f32,
}

impl Unit {
    /// Create a unit at full health.
    #[must_use]
    pub fn new(unit_type: UnitType, max_health: i32) -> Self {
        let max_health = max_health.max(0);
        Self {
            unit_type,
            max_health,
            health: max_health,
            ranged_attack: None,
            melee_attack: None,
            attack_interval: 1.0,
            current_attack_interval: 0.0,
            attacked: false,
            dead: max_health == 0,
            death_time: 1.0,
            current_death_time: 0.0,
            radius: 0.5,
        }
    }

    /// Set the attack cooldown.
    #[must_use]
    pub fn with_attack_interval(mut self, seconds: f32) -> Self {
        self.attack_interval = seconds.max(0.0);
        self
    }

    /// Set how long the body lingers after death.
    #[must_use]
    pub fn with_death_time(mut self, seconds: f32) -> Self {
        self.death_time = seconds.max(0.0);
        self
    }

    /// Set the overlap radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    /// Set the ranged and melee prototypes.
    #[must_use]
    pub fn with_attacks(mut self, ranged: Option<String>, melee: Option<String>) -> Self {
        self.ranged_attack = ranged;
        self.melee_attack = melee;
        self
    }

    #[must_use]
    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[must_use]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether the attack cooldown is running
    #[must_use]
    pub fn has_attacked(&self) -> bool {
        self.attacked
    }

    /// Apply damage, clamping at zero.
    ///
    /// Returns `true` only for the blow that kills the unit.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.dead || amount <= 0 {
            return false;
        }

        self.health = (self.health - amount).clamp(0, self.max_health);
        if self.health == 0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Restore health, clamping at the maximum. The dead stay dead.
    pub fn heal(&mut self, amount: i32) {
        if self.dead || amount <= 0 {
            return;
        }
        self.health = self.health.saturating_add(amount).clamp(0, self.max_health);
    }

    /// Advance the attack cooldown.
    pub fn tick_cooldown(&mut self, delta_time: f32) {
        if !self.attacked {
            return;
        }

        self.current_attack_interval += delta_time;
        if self.current_attack_interval >= self.attack_interval {
            self.attacked = false;
            self.current_attack_interval = 0.0;
        }
    }

    /// Request an attack of the given kind.
    ///
    /// No-op while the cooldown runs or when the unit carries no prototype
    /// of that kind. On success a spawn request is queued and the cooldown
    /// starts.
    pub fn attack(
        &mut self,
        kind: AttackKind,
        instigator: Entity,
        transform: &Transform,
        services: &mut Services,
    ) -> bool {
        if self.attacked || self.dead {
            return false;
        }

        let prototype = match kind {
            AttackKind::Ranged => self.ranged_attack.as_ref(),
            AttackKind::Melee => self.melee_attack.as_ref(),
        };
        let Some(prototype) = prototype else {
            return false;
        };

        services.request_spawn(SpawnRequest {
            prototype: prototype.clone(),
            origin_type: self.unit_type,
            instigator,
            transform: *transform,
        });
        self.attacked = true;
        self.current_attack_interval = 0.0;
        true
    }

    /// Advance the death countdown.
    ///
    /// Returns `true` once a dead unit has lingered longer than `death_time`.
    pub fn tick_death(&mut self, delta_time: f32) -> bool {
        if !self.dead {
            return false;
        }
        self.current_death_time += delta_time;
        self.current_death_time > self.death_time
    }

    /// Fraction of the death countdown elapsed, in `[0, 1]`.
    #[must_use]
    pub fn death_progress(&self) -> f32 {
        if self.death_time <= 0.0 {
            return if self.dead { 1.0 } else { 0.0 };
        }
        (self.current_death_time / self.death_time).clamp(0.0, 1.0)
    }
}
