//! Physics module
//!
//! Built on top of rapier3d

mod world;

pub use world::{
    ColliderHandle, ColliderTag, Physics, RaycastHit, RigidBodyHandle, UNIT_EYE_HEIGHT,
};
