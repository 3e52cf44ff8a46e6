//! Enemy AI module
//!
//! Finite state machine, the four enemy behavior states, perception and
//! ground-plane steering helpers.

mod controller;
mod fsm;
mod perception;
mod states;
pub mod steering;

#[cfg(test)]
mod testing;

pub use controller::{AiFrame, EnemyController, WaypointRegistry};
pub use fsm::{
    AiContext, PlayerStatus, State, StateController, StateEvent, StateKey, Transition, next_state,
};
pub use perception::{EnemySight, LineOfSight, RayHit};
pub use states::{AttackState, DyingState, EnemyState, EngagedState, PatrolState};
