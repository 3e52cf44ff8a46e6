//! Per-enemy controller and the waypoint registry

use glam::Vec3;
use hecs::Entity;
use rustc_hash::FxHashMap;

use super::fsm::{AiContext, PlayerStatus, StateController, StateEvent, StateKey};
use super::states::EnemyState;
use crate::combat::Unit;
use crate::core::{AiTuning, ArchetypeTuning, GameplayError, Services};
use crate::ecs::{StuckPrevention, Transform};

/// Frame-wide inputs shared by every enemy tick.
#[derive(Debug, Clone, Copy)]
pub struct AiFrame<'a> {
    pub delta_time: f32,
    pub player: PlayerStatus,
    pub ai: &'a AiTuning,
}

/// State machine plus patrol route for one enemy.
#[derive(Debug)]
pub struct EnemyController {
    fsm: StateController,
    patrol_points: Vec<Vec3>,
}

impl EnemyController {
    /// Register Patrol, Attack, Engaged and Dying, then start patrolling.
    #[must_use]
    pub fn new(patrol_points: Vec<Vec3>) -> Self {
        let mut fsm = StateController::new();
        for key in [
            StateKey::Patrol,
            StateKey::Attack,
            StateKey::Engaged,
            StateKey::Dying,
        ] {
            fsm.register(EnemyState::for_key(key));
        }
        fsm.change_state(StateKey::Patrol);

        Self { fsm, patrol_points }
    }

    /// Run the current state for one tick.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        entity: Entity,
        transform: &mut Transform,
        unit: &mut Unit,
        stuck: &mut StuckPrevention,
        tuning: &ArchetypeTuning,
        frame: &AiFrame<'_>,
        services: &mut Services,
    ) {
        let mut ctx = AiContext {
            delta_time: frame.delta_time,
            entity,
            transform,
            unit,
            stuck,
            tuning,
            ai: frame.ai,
            player: frame.player,
            waypoints: &self.patrol_points,
            services,
        };
        self.fsm.tick(&mut ctx);
    }

    /// Feed an external event through the transition table.
    pub fn raise(&mut self, event: StateEvent) -> Option<StateKey> {
        self.fsm.raise(event)
    }

    /// Force a state by key.
    pub fn change_state(&mut self, key: StateKey) -> bool {
        self.fsm.change_state(key)
    }

    #[must_use]
    pub fn current_key(&self) -> Option<StateKey> {
        self.fsm.current_key()
    }

    #[must_use]
    pub fn state_machine(&self) -> &StateController {
        &self.fsm
    }
}

/// Named patrol points placed in the level.
#[derive(Debug, Clone, Default)]
pub struct WaypointRegistry {
    points: FxHashMap<String, Vec3>,
}

impl WaypointRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or move a waypoint.
    pub fn insert(&mut self, name: impl Into<String>, position: Vec3) {
        self.points.insert(name.into(), position);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.points.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Resolve a route by name, failing on the first unknown waypoint.
    pub fn resolve(&self, names: &[&str]) -> Result<Vec<Vec3>, GameplayError> {
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| {
                    GameplayError::MissingDependency(format!("waypoint '{name}'"))
                })
            })
            .collect()
    }
}
