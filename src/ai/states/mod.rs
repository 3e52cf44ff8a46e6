//! Concrete enemy behavior states

mod attack;
mod dying;
mod engaged;
mod patrol;

pub use attack::AttackState;
pub use dying::DyingState;
pub use engaged::EngagedState;
pub use patrol::PatrolState;

use super::fsm::{AiContext, State, StateKey, Transition};

/// Closed set of enemy states, as stored by the controller.
#[derive(Debug)]
pub enum EnemyState {
    Patrol(PatrolState),
    Attack(AttackState),
    Engaged(EngagedState),
    Dying(DyingState),
}

impl EnemyState {
    /// Fresh instance of the state registered under `key`.
    #[must_use]
    pub fn for_key(key: StateKey) -> Self {
        match key {
            StateKey::Patrol => Self::Patrol(PatrolState::default()),
            StateKey::Attack => Self::Attack(AttackState::default()),
            StateKey::Engaged => Self::Engaged(EngagedState::default()),
            StateKey::Dying => Self::Dying(DyingState::default()),
        }
    }
}

impl State for EnemyState {
    fn key(&self) -> StateKey {
        match self {
            Self::Patrol(state) => state.key(),
            Self::Attack(state) => state.key(),
            Self::Engaged(state) => state.key(),
            Self::Dying(state) => state.key(),
        }
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        match self {
            Self::Patrol(state) => state.update(ctx),
            Self::Attack(state) => state.update(ctx),
            Self::Engaged(state) => state.update(ctx),
            Self::Dying(state) => state.update(ctx),
        }
    }
}
