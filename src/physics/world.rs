//! Physics world using rapier3d
//!
//! Units get kinematic capsules that follow their transforms; obstacles are
//! fixed boxes. Every collider carries a [`ColliderTag`] in its user data so
//! line-of-sight rays can tell the player apart from walls.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::ai::{LineOfSight, RayHit};

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// What a collider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderTag {
    Player,
    Enemy,
    Environment,
}

impl ColliderTag {
    fn to_bits(self) -> u128 {
        match self {
            Self::Player => 1,
            Self::Enemy => 2,
            Self::Environment => 3,
        }
    }

    fn from_bits(bits: u128) -> Option<Self> {
        match bits {
            1 => Some(Self::Player),
            2 => Some(Self::Enemy),
            3 => Some(Self::Environment),
            _ => None,
        }
    }
}

/// Height of a unit's capsule center above its feet
pub const UNIT_EYE_HEIGHT: f32 = 1.0;

/// Half height of the cylindrical part of a unit capsule
const UNIT_HALF_HEIGHT: f32 = 0.5;

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(
        Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(rotation),
    )
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
}

impl Physics {
    /// Create a new physics world with default gravity
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
        }
    }

    /// Step the physics simulation and refresh the query pipeline
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Create a kinematic body with a unit capsule, driven by the unit's transform
    pub fn add_unit(
        &mut self,
        position: Vec3,
        radius: f32,
        tag: ColliderTag,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::kinematic_position_based()
            .position(isometry(position, Quat::IDENTITY))
            .build();
        let body = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::capsule_y(UNIT_HALF_HEIGHT, radius.max(0.05))
            .translation(vector![0.0, UNIT_EYE_HEIGHT, 0.0])
            .user_data(tag.to_bits())
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, body, &mut self.rigid_body_set);

        (RigidBodyHandle(body), ColliderHandle(collider))
    }

    /// Create a fixed box obstacle centered at `position`
    pub fn add_obstacle(
        &mut self,
        position: Vec3,
        rotation: Quat,
        half_extents: Vec3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::fixed()
            .position(isometry(position, rotation))
            .build();
        let body = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .user_data(ColliderTag::Environment.to_bits())
            .build();
        let collider =
            self.collider_set
                .insert_with_parent(collider, body, &mut self.rigid_body_set);

        (RigidBodyHandle(body), ColliderHandle(collider))
    }

    /// Get the position of a rigid body
    pub fn get_position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let pos = rb.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Set the target pose of a kinematic body for the next step
    pub fn set_kinematic_pose(&mut self, body: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_next_kinematic_position(isometry(position, rotation));
        }
    }

    /// Tag stored on a collider
    pub fn tag(&self, collider: ColliderHandle) -> Option<ColliderTag> {
        self.collider_set
            .get(collider.0)
            .and_then(|c| ColliderTag::from_bits(c.user_data))
    }

    /// Cast a ray and return the first hit, optionally skipping one collider
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let mut filter = QueryFilter::default();
        if let Some(ignore) = ignore {
            filter = filter.exclude_collider(ignore.0);
        }

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, distance)| {
                let point = ray.point_at(distance);
                RaycastHit {
                    collider: ColliderHandle(handle),
                    point: Vec3::new(point.x, point.y, point.z),
                    distance,
                }
            })
    }

    /// Remove a rigid body and its colliders
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.rigid_body_set.remove(
            body.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Number of live rigid bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl LineOfSight for Physics {
    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<RayHit> {
        let hit = self.raycast(origin, direction, max_distance, ignore)?;
        let tag = self.tag(hit.collider)?;
        Some(RayHit {
            tag,
            distance: hit.distance,
        })
    }
}

/// Result of a raycast
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// The point of intersection
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bits() {
        for tag in [ColliderTag::Player, ColliderTag::Enemy, ColliderTag::Environment] {
            assert_eq!(ColliderTag::from_bits(tag.to_bits()), Some(tag));
        }
        assert_eq!(ColliderTag::from_bits(0), None);
    }

    #[test]
    fn test_raycast_hits_tagged_unit() {
        let mut physics = Physics::new();
        let (_, player) = physics.add_unit(Vec3::new(0.0, 0.0, -10.0), 0.5, ColliderTag::Player);
        physics.step(1.0 / 60.0);

        let origin = Vec3::new(0.0, UNIT_EYE_HEIGHT, 0.0);
        let hit = physics.raycast(origin, Vec3::NEG_Z, 24.0, None).unwrap();
        assert_eq!(hit.collider, player);
        assert!((hit.distance - 9.5).abs() < 1e-3);

        let seen = physics.first_hit(origin, Vec3::NEG_Z, 24.0, None).unwrap();
        assert_eq!(seen.tag, ColliderTag::Player);
    }

    #[test]
    fn test_raycast_ignores_own_collider() {
        let mut physics = Physics::new();
        let (_, own) = physics.add_unit(Vec3::ZERO, 0.5, ColliderTag::Enemy);
        physics.add_unit(Vec3::new(0.0, 0.0, -5.0), 0.5, ColliderTag::Player);
        physics.step(1.0 / 60.0);

        let origin = Vec3::new(0.0, UNIT_EYE_HEIGHT, 0.0);
        let hit = physics.first_hit(origin, Vec3::NEG_Z, 24.0, Some(own)).unwrap();
        assert_eq!(hit.tag, ColliderTag::Player);
    }

    #[test]
    fn test_obstacle_blocks_ray() {
        let mut physics = Physics::new();
        physics.add_unit(Vec3::new(0.0, 0.0, -10.0), 0.5, ColliderTag::Player);
        physics.add_obstacle(
            Vec3::new(0.0, 1.0, -5.0),
            Quat::IDENTITY,
            Vec3::new(3.0, 2.0, 0.25),
        );
        physics.step(1.0 / 60.0);

        let hit = physics
            .first_hit(Vec3::new(0.0, UNIT_EYE_HEIGHT, 0.0), Vec3::NEG_Z, 24.0, None)
            .unwrap();
        assert_eq!(hit.tag, ColliderTag::Environment);
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let mut physics = Physics::new();
        physics.add_unit(Vec3::new(0.0, 0.0, -30.0), 0.5, ColliderTag::Player);
        physics.step(1.0 / 60.0);

        let origin = Vec3::new(0.0, UNIT_EYE_HEIGHT, 0.0);
        assert!(physics.first_hit(origin, Vec3::NEG_Z, 24.0, None).is_none());
    }

    #[test]
    fn test_kinematic_pose_applied_on_step() {
        let mut physics = Physics::new();
        let (body, _) = physics.add_unit(Vec3::ZERO, 0.5, ColliderTag::Enemy);

        physics.set_kinematic_pose(body, Vec3::new(2.0, 0.0, -3.0), Quat::IDENTITY);
        physics.step(1.0 / 60.0);

        let position = physics.get_position(body).unwrap();
        assert!((position - Vec3::new(2.0, 0.0, -3.0)).length() < 1e-4);
    }

    #[test]
    fn test_remove_body() {
        let mut physics = Physics::new();
        let (body, _) = physics.add_unit(Vec3::ZERO, 0.5, ColliderTag::Enemy);
        assert_eq!(physics.body_count(), 1);

        physics.remove_body(body);
        assert_eq!(physics.body_count(), 0);
        assert!(physics.get_position(body).is_none());
    }
}
