//! Engaged: face off with a player at arm's length

use crate::ai::fsm::{AiContext, State, StateEvent, StateKey, Transition};
use crate::ai::steering::planar_distance;
use crate::combat::Enemy;

/// Keeps facing a player standing within the engage distance.
///
/// No event leads here: the host enters this state by key through
/// `EnemyController::change_state(StateKey::Engaged)`.
#[derive(Debug, Default)]
pub struct EngagedState;

impl State for EngagedState {
    fn key(&self) -> StateKey {
        StateKey::Engaged
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        let target = ctx.player.position;
        Enemy::rotate_towards(ctx.transform, target, ctx.tuning.rotation_damping);

        let distance = planar_distance(ctx.transform.position, target);
        if distance > ctx.ai.engage_distance {
            return Transition::Raise(StateEvent::TargetEscaped);
        }

        log::trace!("Enemy {:?} engaged at {distance:.2}", ctx.entity);
        Transition::None
    }
}
