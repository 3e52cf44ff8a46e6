//! Patrol: walk a closed loop of waypoints

use crate::ai::fsm::{AiContext, State, StateKey, Transition};
use crate::ai::steering::{planar_distance, step_towards};
use crate::combat::Enemy;

/// Cycles the enemy through its patrol route.
///
/// Routes shorter than two waypoints leave the enemy standing idle. The
/// waypoint index survives leaving and re-entering the state.
#[derive(Debug, Default)]
pub struct PatrolState {
    /// Index of the waypoint being walked to
    pub current: usize,
}

impl State for PatrolState {
    fn key(&self) -> StateKey {
        StateKey::Patrol
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        ctx.stuck.resume();

        let route = ctx.waypoints;
        if route.len() < 2 {
            return Transition::None;
        }
        if self.current >= route.len() {
            self.current = 0;
        }

        let target = route[self.current];
        let distance = planar_distance(ctx.transform.position, target);
        if distance <= ctx.ai.arrival_distance {
            self.current = (self.current + 1) % route.len();
            log::trace!("Enemy {:?} heading to waypoint {}", ctx.entity, self.current);
            return Transition::None;
        }

        Enemy::rotate_towards(ctx.transform, target, ctx.tuning.rotation_damping);
        step_towards(ctx.transform, target, ctx.tuning.speed * ctx.delta_time);
        Transition::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::Rig;
    use glam::Vec3;

    #[test]
    fn test_idle_with_short_route() {
        let mut rig = Rig::snowman();
        rig.waypoints = vec![Vec3::new(0.0, 0.0, -10.0)];
        let mut patrol = PatrolState::default();

        for _ in 0..10 {
            assert_eq!(rig.run(|ctx| patrol.update(ctx)), Transition::None);
        }
        assert_eq!(rig.transform.position, Vec3::ZERO);
        assert_eq!(patrol.current, 0);
    }

    #[test]
    fn test_idle_with_empty_route() {
        let mut rig = Rig::snowman();
        rig.waypoints.clear();
        let mut patrol = PatrolState::default();

        rig.run(|ctx| patrol.update(ctx));
        assert_eq!(rig.transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_patrol_cycles_without_skipping() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, -10.0);
        let c = Vec3::new(10.0, 0.0, -10.0);

        let mut rig = Rig::snowman();
        rig.waypoints = vec![a, b, c];
        rig.tuning.speed = 10.0;
        rig.tuning.rotation_damping = 1.0;
        rig.delta_time = 0.25;
        let mut patrol = PatrolState::default();

        let mut reached = Vec::new();
        let mut last_distance = f32::MAX;
        for _ in 0..60 {
            let before = patrol.current;
            rig.run(|ctx| patrol.update(ctx));

            if patrol.current != before {
                // Advancing only happens from exactly on top of the waypoint
                let waypoint = rig.waypoints[before];
                assert!(
                    (rig.transform.position - waypoint).length() < 1e-3,
                    "advanced from {:?} away from waypoint {waypoint:?}",
                    rig.transform.position
                );
                assert_eq!(patrol.current, (before + 1) % 3);
                reached.push(before);
                last_distance = f32::MAX;
            } else {
                let distance = planar_distance(rig.transform.position, rig.waypoints[patrol.current]);
                assert!(distance < last_distance, "patrol must close in monotonically");
                last_distance = distance;
            }
        }

        assert!(reached.len() >= 5);
        assert_eq!(&reached[..5], &[0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_final_step_snaps_onto_waypoint() {
        let mut rig = Rig::snowman();
        rig.waypoints = vec![Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0)];
        rig.tuning.speed = 3.0;
        rig.delta_time = 1.0;
        let mut patrol = PatrolState::default();

        rig.run(|ctx| patrol.update(ctx));
        assert!((rig.transform.position.z + 3.0).abs() < 1e-4);

        // 2.0 left but the step is 3.0: land exactly on the waypoint
        rig.run(|ctx| patrol.update(ctx));
        assert_eq!(rig.transform.position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(patrol.current, 0);
    }

    #[test]
    fn test_patrol_resumes_stuck_prevention() {
        let mut rig = Rig::snowman();
        rig.stuck.suspend();
        let mut patrol = PatrolState::default();

        rig.run(|ctx| patrol.update(ctx));
        assert!(rig.stuck.enabled);
    }

    #[test]
    fn test_patrol_never_transitions() {
        let mut rig = Rig::snowman();
        rig.player.position = Vec3::new(0.0, 0.0, -1.0);
        let mut patrol = PatrolState::default();

        for _ in 0..20 {
            assert_eq!(rig.run(|ctx| patrol.update(ctx)), Transition::None);
        }
    }
}
