//! Ground-plane steering helpers
//!
//! Enemies live on a common ground plane: every distance and angle here
//! ignores the vertical axis, and every rotation is a pure yaw.

use glam::{Quat, Vec3};

use crate::ecs::Transform;

/// Drop the vertical component.
#[inline]
#[must_use]
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Euclidean distance ignoring height.
#[inline]
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(b - a).length()
}

/// Yaw rotation whose forward (-Z) points from `from` toward `to`.
///
/// `None` when the points coincide on the ground plane.
#[must_use]
pub fn look_rotation(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = planar(to - from).normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y((-direction.x).atan2(-direction.z)))
}

/// Angle in degrees between the transform's facing and the direction to
/// `target`, both flattened onto the ground plane.
#[must_use]
pub fn facing_angle(transform: &Transform, target: Vec3) -> f32 {
    let to_target = planar(target - transform.position);
    if to_target.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    transform
        .planar_forward()
        .angle_between(to_target)
        .to_degrees()
}

/// Turn a fixed fraction of the way toward `target`.
///
/// Each call closes `damping` of the remaining angle, so repeated ticks
/// approach the target heading exponentially rather than at a fixed rate.
pub fn rotate_towards(transform: &mut Transform, target: Vec3, damping: f32) {
    if let Some(goal) = look_rotation(transform.position, target) {
        transform.rotation = transform
            .rotation
            .slerp(goal, damping.clamp(0.0, 1.0))
            .normalize();
    }
}

/// Snap the facing onto `target` in one go.
pub fn face(transform: &mut Transform, target: Vec3) {
    if let Some(goal) = look_rotation(transform.position, target) {
        transform.rotation = goal;
    }
}

/// Walk `step` units along the planar facing.
///
/// When less than `step` remains to `target`, land exactly on it (keeping
/// the current height) instead of overshooting. Returns whether it snapped.
pub fn step_towards(transform: &mut Transform, target: Vec3, step: f32) -> bool {
    let remaining = planar_distance(transform.position, target);
    if remaining < step {
        transform.position = Vec3::new(target.x, transform.position.y, target.z);
        return true;
    }

    let delta = transform.planar_forward() * step;
    transform.translate(delta);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 100.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_look_rotation_faces_target() {
        for target in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(2.0, 5.0, -1.0)] {
            let rotation = look_rotation(Vec3::ZERO, target).unwrap();
            let forward = rotation * Vec3::NEG_Z;
            let expected = planar(target).normalize();
            assert!((forward - expected).length() < 1e-5, "target {target:?}");
        }
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(look_rotation(Vec3::ONE, Vec3::new(1.0, 9.0, 1.0)).is_none());
    }

    #[test]
    fn test_facing_angle() {
        let transform = Transform::default();
        assert!(facing_angle(&transform, Vec3::new(0.0, 0.0, -10.0)).abs() < 1e-3);
        assert!((facing_angle(&transform, Vec3::new(10.0, 0.0, 0.0)) - 90.0).abs() < 1e-3);
        assert!((facing_angle(&transform, Vec3::new(0.0, 3.0, 10.0)) - 180.0).abs() < 1e-2);
    }

    #[test]
    fn test_rotate_towards_is_exponential() {
        let mut transform = Transform::default();
        let target = Vec3::new(10.0, 0.0, 0.0);

        rotate_towards(&mut transform, target, 0.5);
        let first = facing_angle(&transform, target);
        assert!((first - 45.0).abs() < 1e-2);

        rotate_towards(&mut transform, target, 0.5);
        let second = facing_angle(&transform, target);
        assert!((second - 22.5).abs() < 1e-2);
    }

    #[test]
    fn test_rotate_towards_full_damping_snaps() {
        let mut transform = Transform::default();
        rotate_towards(&mut transform, Vec3::new(-4.0, 0.0, 4.0), 1.0);
        assert!(facing_angle(&transform, Vec3::new(-4.0, 0.0, 4.0)) < 1e-2);
    }

    #[test]
    fn test_step_towards_moves_along_facing() {
        let mut transform = Transform::default();
        let snapped = step_towards(&mut transform, Vec3::new(0.0, 0.0, -10.0), 2.0);

        assert!(!snapped);
        assert!((transform.position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_step_towards_snaps_instead_of_overshooting() {
        let mut transform = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        let snapped = step_towards(&mut transform, Vec3::new(0.0, 0.0, -1.5), 2.0);

        assert!(snapped);
        assert_eq!(transform.position, Vec3::new(0.0, 1.0, -1.5));
    }
}
