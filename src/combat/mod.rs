//! Combat module
//!
//! Units with health and cooldowns, enemy bodies, and the attack entities
//! they spawn.

mod attack;
mod enemy;
mod unit;

pub use attack::{Attack, AttackPrototype};
pub use enemy::{DEATH_SCALE, DEATH_TINT, Enemy};
pub use unit::{AttackKind, Unit, UnitType};
