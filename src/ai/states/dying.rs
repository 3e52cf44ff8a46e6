//! Dying: terminal state

use crate::ai::fsm::{AiContext, State, StateKey, Transition};
use crate::ai::steering::face;

/// Turns to face the player once, then does nothing until despawn.
///
/// The death animation itself is driven by the simulation through
/// [`Enemy::die`](crate::combat::Enemy::die).
#[derive(Debug, Default)]
pub struct DyingState {
    /// Set after the final facing has been applied
    pub latched: bool,
}

impl State for DyingState {
    fn key(&self) -> StateKey {
        StateKey::Dying
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        if !self.latched {
            face(ctx.transform, ctx.player.position);
            self.latched = true;
            log::debug!("Enemy {:?} is dying", ctx.entity);
        }
        Transition::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::steering::facing_angle;
    use crate::ai::testing::Rig;
    use glam::Vec3;

    #[test]
    fn test_faces_player_on_first_tick() {
        let mut rig = Rig::snowman();
        rig.player.position = Vec3::new(0.0, 0.0, 10.0);
        let mut state = DyingState::default();

        assert_eq!(rig.run(|ctx| state.update(ctx)), Transition::None);
        assert!(state.latched);
        assert!(facing_angle(&rig.transform, rig.player.position) < 1e-2);
    }

    #[test]
    fn test_later_ticks_do_nothing() {
        let mut rig = Rig::snowman();
        let mut state = DyingState::default();
        rig.run(|ctx| state.update(ctx));
        let rotation = rig.transform.rotation;

        // Player moves behind; the corpse keeps its last facing
        rig.player.position = Vec3::new(0.0, 0.0, 10.0);
        for _ in 0..5 {
            assert_eq!(rig.run(|ctx| state.update(ctx)), Transition::None);
        }
        assert_eq!(rig.transform.rotation, rotation);
        assert_eq!(rig.transform.position, Vec3::ZERO);
    }
}
