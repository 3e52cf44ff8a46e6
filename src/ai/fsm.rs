//! Finite State Machine for enemy behavior
//!
//! Each enemy owns a [`StateController`] holding one instance of every
//! behavioral state, registered once at setup in a fixed order. Exactly one
//! state (or none) is current; the controller ticks it with an explicit
//! [`AiContext`] and resolves whatever [`StateEvent`] it raises through a
//! closed transition table.
//!
//! # Design Principles
//!
//! - **Closed set**: states are enum variants, keys are an enum, so a typo is
//!   a compile error rather than a silent no-op
//! - **Explicit context**: the enemy's transform, unit and the player snapshot
//!   arrive with every tick; states cache no back-references
//! - **Abandon in place**: there are no enter/exit hooks, a transition simply
//!   stops ticking the old state
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = StateController::new();
//! fsm.register(EnemyState::Patrol(PatrolState::default()));
//! fsm.register(EnemyState::Attack(AttackState::default()));
//! fsm.change_state(StateKey::Patrol);
//!
//! fsm.tick(&mut ctx);             // Patrol::update runs
//! fsm.raise(StateEvent::PlayerSpotted); // now attacking
//! ```

use std::fmt;

use glam::Vec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::states::EnemyState;
use crate::combat::Unit;
use crate::core::{AiTuning, ArchetypeTuning, GameEvent, Services};
use crate::ecs::{StuckPrevention, Transform};

// ============================================================================
// Keys, Events and the Transition Table
// ============================================================================

/// Identifies one behavioral state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKey {
    Patrol,
    Attack,
    Engaged,
    Dying,
}

impl StateKey {
    /// State name for logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Patrol => "Patrol",
            Self::Attack => "Attack",
            Self::Engaged => "Engaged",
            Self::Dying => "Dying",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that happened to an enemy which may change its behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    /// Perception confirmed line of sight to the player
    PlayerSpotted,
    /// The player died or moved past the disengage distance
    TargetLost,
    /// The player stepped out of face-off range
    TargetEscaped,
    /// The enemy's health reached zero
    Died,
}

/// Transition table: `state × event → state`.
///
/// `None` means the event does not move the machine out of `from`.
#[must_use]
pub fn next_state(from: StateKey, event: StateEvent) -> Option<StateKey> {
    use StateEvent as E;
    use StateKey as S;

    match (from, event) {
        (S::Patrol | S::Engaged, E::PlayerSpotted) => Some(S::Attack),
        (S::Attack, E::TargetLost) => Some(S::Patrol),
        (S::Engaged, E::TargetEscaped) => Some(S::Attack),
        (S::Patrol | S::Attack | S::Engaged, E::Died) => Some(S::Dying),
        _ => None,
    }
}

// ============================================================================
// Context and State Trait
// ============================================================================

/// What the enemy knows about the player this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStatus {
    pub position: Vec3,
    /// The player is dead or in its death sequence
    pub dying: bool,
    pub health: i32,
}

impl PlayerStatus {
    /// A healthy player standing at `position`.
    #[must_use]
    pub fn alive_at(position: Vec3) -> Self {
        Self {
            position,
            dying: false,
            health: 100,
        }
    }
}

/// Everything a state may read or change during one tick.
pub struct AiContext<'a> {
    /// Elapsed seconds for this frame
    pub delta_time: f32,
    /// The enemy being driven
    pub entity: Entity,
    pub transform: &'a mut Transform,
    pub unit: &'a mut Unit,
    pub stuck: &'a mut StuckPrevention,
    /// Archetype thresholds
    pub tuning: &'a ArchetypeTuning,
    /// Archetype-independent thresholds
    pub ai: &'a AiTuning,
    pub player: PlayerStatus,
    /// Patrol route owned by the enemy's controller
    pub waypoints: &'a [Vec3],
    pub services: &'a mut Services,
}

/// Decision returned from [`State::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the current state.
    None,
    /// Feed an event to the transition table.
    Raise(StateEvent),
}

/// One behavioral phase of an enemy.
pub trait State: fmt::Debug {
    /// Key this state is registered under.
    fn key(&self) -> StateKey;

    /// Called each tick while this state is current.
    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition;
}

// ============================================================================
// State Controller
// ============================================================================

/// Owns the registered states and tracks which one is current.
#[derive(Default)]
pub struct StateController {
    /// Registered states, in insertion order
    states: SmallVec<[EnemyState; 4]>,
    /// Index of the current state in `states`
    current: Option<usize>,
}

impl StateController {
    /// Create a controller with no states and no current state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a state. States are registered once and never removed.
    pub fn register(&mut self, state: EnemyState) {
        self.states.push(state);
    }

    /// Make the first registered state with `key` current.
    ///
    /// Unknown keys leave the current state untouched. Returns whether a
    /// state was selected.
    pub fn change_state(&mut self, key: StateKey) -> bool {
        match self.states.iter().position(|state| state.key() == key) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => {
                log::debug!("Ignoring transition to unregistered state {key}");
                false
            }
        }
    }

    /// Feed an external event through the transition table.
    ///
    /// Returns the new state key when the machine moved.
    pub fn raise(&mut self, event: StateEvent) -> Option<StateKey> {
        let from = self.current_key()?;
        let to = next_state(from, event)?;
        self.change_state(to).then_some(to)
    }

    /// Tick the current state, applying any transition it raises.
    pub fn tick(&mut self, ctx: &mut AiContext<'_>) {
        let Some(index) = self.current else {
            return;
        };

        let state = &mut self.states[index];
        let from = state.key();
        if let Transition::Raise(event) = state.update(ctx)
            && let Some(to) = self.raise(event)
        {
            log::debug!("Enemy {:?}: {from} -> {to} on {event:?}", ctx.entity);
            ctx.services.emit(GameEvent::StateChanged {
                enemy: ctx.entity,
                from: Some(from),
                to,
            });
        }
    }

    /// Key of the current state.
    #[must_use]
    pub fn current_key(&self) -> Option<StateKey> {
        self.current.map(|index| self.states[index].key())
    }

    /// Check if the controller is in the state with the given key.
    #[must_use]
    pub fn is_in_state(&self, key: StateKey) -> bool {
        self.current_key() == Some(key)
    }

    /// First registered state with `key`.
    #[must_use]
    pub fn state(&self, key: StateKey) -> Option<&EnemyState> {
        self.states.iter().find(|state| state.key() == key)
    }

    /// Keys of the registered states, in insertion order.
    pub fn registered(&self) -> impl Iterator<Item = StateKey> + '_ {
        self.states.iter().map(State::key)
    }
}

impl fmt::Debug for StateController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateController")
            .field("states", &self.registered().collect::<Vec<_>>())
            .field("current", &self.current_key())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
