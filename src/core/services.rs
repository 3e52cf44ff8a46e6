//! Cross-cutting services shared by the gameplay subsystems
//!
//! One `Services` value lives as long as the simulation and is handed by
//! `&mut` to whatever needs to emit events, request spawns or bump the
//! combat counters.

use std::collections::BTreeMap;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use crate::combat::UnitType;
use crate::ecs::Transform;

/// Request to spawn an attack entity from a named prototype.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    /// Prototype name, resolved against the config's attack list
    pub prototype: String,
    /// Archetype of the instigator, copied onto the attack
    pub origin_type: UnitType,
    /// Entity that requested the attack
    pub instigator: Entity,
    /// Instigator transform at the moment of the request
    pub transform: Transform,
}

/// Process-wide combat counters, read by the host's HUD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Enemies defeated, per archetype
    pub kills: BTreeMap<String, u32>,
    /// Total damage the player has taken
    pub damage_taken: i64,
    /// Total damage dealt to enemies
    pub damage_dealt: i64,
    /// Attack entities spawned
    pub attacks_spawned: u32,
}

impl CombatStats {
    /// Record a defeated unit.
    pub fn record_kill(&mut self, unit_type: UnitType) {
        *self.kills.entry(format!("{unit_type:?}")).or_insert(0) += 1;
    }

    /// Kills recorded for one archetype.
    #[must_use]
    pub fn kills_of(&self, unit_type: UnitType) -> u32 {
        self.kills
            .get(&format!("{unit_type:?}"))
            .copied()
            .unwrap_or(0)
    }

    /// Total kills across all archetypes.
    #[must_use]
    pub fn total_kills(&self) -> u32 {
        self.kills.values().sum()
    }
}

/// Services passed explicitly into ticks instead of living in globals.
#[derive(Debug, Default)]
pub struct Services {
    /// Frame-consistent event queue
    pub events: EventQueue,
    /// Combat counters
    pub stats: CombatStats,
    /// Attack spawns requested this tick
    spawns: Vec<SpawnRequest>,
}

impl Services {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an attack spawn for the end of the AI pass.
    pub fn request_spawn(&mut self, request: SpawnRequest) {
        self.spawns.push(request);
    }

    /// Number of spawn requests not yet taken.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawns.len()
    }

    /// Take every queued spawn request.
    pub fn take_spawns(&mut self) -> impl Iterator<Item = SpawnRequest> + '_ {
        self.spawns.drain(..)
    }

    /// Shorthand for pushing an event.
    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_counters() {
        let mut stats = CombatStats::default();
        stats.record_kill(UnitType::Snowman);
        stats.record_kill(UnitType::Snowman);
        stats.record_kill(UnitType::Demon);

        assert_eq!(stats.kills_of(UnitType::Snowman), 2);
        assert_eq!(stats.kills_of(UnitType::Demon), 1);
        assert_eq!(stats.kills_of(UnitType::WaterMonster), 0);
        assert_eq!(stats.total_kills(), 3);
    }

    #[test]
    fn test_stats_json_snapshot() {
        let mut stats = CombatStats::default();
        stats.record_kill(UnitType::WaterMonster);
        stats.damage_taken = 12;

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("WaterMonster"));

        let loaded: CombatStats = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, stats);
    }

    #[test]
    fn test_take_spawns_empties_queue() {
        let mut world = hecs::World::new();
        let instigator = world.spawn(());
        let mut services = Services::new();

        services.request_spawn(SpawnRequest {
            prototype: "Fireball".to_string(),
            origin_type: UnitType::Demon,
            instigator,
            transform: Transform::default(),
        });
        assert_eq!(services.pending_spawns(), 1);

        let taken: Vec<_> = services.take_spawns().collect();
        assert_eq!(taken.len(), 1);
        assert_eq!(services.pending_spawns(), 0);
    }
}
