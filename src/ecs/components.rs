//! Common ECS components

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform component for position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Forward direction flattened onto the ground plane.
    ///
    /// Falls back to -Z when the transform is pitched straight up or down.
    pub fn planar_forward(&self) -> Vec3 {
        let forward = self.forward();
        let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        if flat == Vec3::ZERO { Vec3::NEG_Z } else { flat }
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Toggle for the host's stuck-prevention movement correction.
///
/// Pursuit switches it off and marks it for re-enabling; patrol turns it
/// back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StuckPrevention {
    /// Whether the correction currently runs
    pub enabled: bool,
    /// Whether patrol should switch it back on
    pub reenable: bool,
}

impl StuckPrevention {
    /// Suspend the correction until patrol resumes.
    pub fn suspend(&mut self) {
        self.enabled = false;
        self.reenable = true;
    }

    /// Turn the correction back on if it was suspended.
    pub fn resume(&mut self) {
        if !self.enabled && self.reenable {
            self.enabled = true;
            self.reenable = false;
        }
    }
}

impl Default for StuckPrevention {
    fn default() -> Self {
        Self {
            enabled: true,
            reenable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_forward_is_negative_z() {
        let transform = Transform::default();
        assert!((transform.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((transform.planar_forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_planar_forward_drops_pitch() {
        let rotation = Quat::from_rotation_x(0.5);
        let transform = Transform::from_position_rotation(Vec3::ZERO, rotation);

        let flat = transform.planar_forward();
        assert!(flat.y.abs() < 1e-6);
        assert!((flat.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stuck_prevention_round_trip() {
        let mut stuck = StuckPrevention::default();

        // Resuming an enabled correction changes nothing
        stuck.resume();
        assert_eq!(stuck, StuckPrevention::default());

        stuck.suspend();
        assert!(!stuck.enabled);
        assert!(stuck.reenable);

        stuck.resume();
        assert!(stuck.enabled);
        assert!(!stuck.reenable);
    }

    #[test]
    fn test_resume_respects_missing_flag() {
        let mut stuck = StuckPrevention {
            enabled: false,
            reenable: false,
        };
        stuck.resume();
        assert!(!stuck.enabled);
    }
}
