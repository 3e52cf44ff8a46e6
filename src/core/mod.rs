//! Core gameplay module
//!
//! Contains the Simulation host, configuration, events and shared services

mod config;
mod error;
mod events;
mod services;
mod simulation;

pub use config::{
    AiTuning, ArchetypeTable, ArchetypeTuning, AttackSelection, GameplayConfig, StrikeRule,
};
pub use error::GameplayError;
pub use events::{EventQueue, GameEvent};
pub use services::{CombatStats, Services, SpawnRequest};
pub use simulation::{
    Instigator, PLAYER_MAX_HEALTH, PLAYER_RADIUS, PhysicsBody, Simulation,
};
