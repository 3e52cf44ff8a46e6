//! Enemy AI and combat gameplay core
//!
//! This crate provides:
//! - Units with health, attack cooldowns and death countdowns
//! - An enemy state machine (patrol, attack, engaged, dying)
//! - Trigger-and-raycast perception on top of rapier3d
//! - Data-driven archetype tuning loaded from RON or JSON
//! - A headless simulation host built on a hecs world

pub mod ai;
pub mod combat;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{EnemyController, PlayerStatus, StateEvent, StateKey};
    pub use crate::combat::{Attack, AttackKind, AttackPrototype, Enemy, Unit, UnitType};
    pub use crate::core::{CombatStats, GameEvent, GameplayConfig, GameplayError, Simulation};
    pub use crate::ecs::{Name, Transform, World};
    pub use crate::physics::{ColliderHandle, ColliderTag, Physics, RigidBodyHandle};
    pub use glam::{Quat, Vec3};
}
