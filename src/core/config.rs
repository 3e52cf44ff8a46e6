//! Gameplay tuning data
//!
//! Every distance, angle and timing the enemy AI uses lives here as data, so
//! designers can tune archetypes without touching the state machine. Configs
//! load from RON (the shipped format) or JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::GameplayError;
use crate::combat::{AttackKind, AttackPrototype, Unit, UnitType};

/// Archetype-independent AI thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTuning {
    /// Planar distance at which a patrol waypoint counts as reached
    pub arrival_distance: f32,
    /// Distance beyond which an engaged enemy resumes attacking
    pub engage_distance: f32,
    /// Maximum line-of-sight range for perception rays
    pub sight_range: f32,
    /// Radius of the perception trigger volume
    pub sight_radius: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            arrival_distance: 1.0,
            engage_distance: 2.0,
            sight_range: 24.0,
            sight_radius: 12.0,
        }
    }
}

/// How an archetype picks between its ranged and melee rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackSelection {
    /// Ranged when the unit carries a ranged prototype, melee otherwise
    PreferRanged,
    /// Melee inside the melee strike distance, ranged beyond it
    ByDistance,
}

/// Approach and strike thresholds for one attack kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeRule {
    /// Move toward the player while farther than this
    pub approach_distance: f32,
    /// Strike only closer than this
    pub strike_distance: f32,
    /// Strike only while facing within this many degrees
    pub strike_angle: f32,
}

impl StrikeRule {
    /// Both strike conditions must hold at once.
    #[must_use]
    pub fn allows_strike(&self, distance: f32, angle: f32) -> bool {
        distance < self.strike_distance && angle < self.strike_angle
    }
}

/// Per-archetype combat and movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeTuning {
    pub max_health: i32,
    /// Movement speed in units per second
    pub speed: f32,
    pub attack_interval: f32,
    pub death_time: f32,
    /// Body radius for attack overlaps and the physics collider
    pub radius: f32,
    /// Fraction of the remaining turn applied per tick, in `[0, 1]`
    pub rotation_damping: f32,
    /// Attacking enemies give up beyond this distance
    pub disengage_distance: f32,
    pub selection: AttackSelection,
    /// Keep walking forward regardless of the approach threshold
    pub always_advance: bool,
    pub ranged: Option<StrikeRule>,
    pub melee: Option<StrikeRule>,
    /// Prototype name for ranged attacks
    pub ranged_attack: Option<String>,
    /// Prototype name for melee attacks
    pub melee_attack: Option<String>,
}

impl ArchetypeTuning {
    /// Build a full-health unit from this tuning.
    #[must_use]
    pub fn build_unit(&self, unit_type: UnitType) -> Unit {
        Unit::new(unit_type, self.max_health)
            .with_attack_interval(self.attack_interval)
            .with_death_time(self.death_time)
            .with_radius(self.radius)
            .with_attacks(self.ranged_attack.clone(), self.melee_attack.clone())
    }
}

/// Tuning for every enemy archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeTable {
    pub snowman: ArchetypeTuning,
    pub water_monster: ArchetypeTuning,
    pub demon: ArchetypeTuning,
}

impl ArchetypeTable {
    /// Tuning for an enemy archetype; `None` for non-enemy types.
    #[must_use]
    pub fn get(&self, unit_type: UnitType) -> Option<&ArchetypeTuning> {
        match unit_type {
            UnitType::Snowman => Some(&self.snowman),
            UnitType::WaterMonster => Some(&self.water_monster),
            UnitType::Demon => Some(&self.demon),
            UnitType::Unit | UnitType::Player => None,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &ArchetypeTuning> {
        [&self.snowman, &self.water_monster, &self.demon].into_iter()
    }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        let melee_fallback = StrikeRule {
            approach_distance: 5.0,
            strike_distance: 5.0,
            strike_angle: 15.0,
        };

        Self {
            snowman: ArchetypeTuning {
                max_health: 30,
                speed: 3.0,
                attack_interval: 1.5,
                death_time: 2.0,
                radius: 0.6,
                rotation_damping: 0.1,
                disengage_distance: 20.0,
                selection: AttackSelection::PreferRanged,
                always_advance: false,
                ranged: Some(StrikeRule {
                    approach_distance: 15.0,
                    strike_distance: 15.0,
                    strike_angle: 10.0,
                }),
                melee: Some(melee_fallback),
                ranged_attack: Some("Snowball".to_string()),
                melee_attack: Some("Slam".to_string()),
            },
            water_monster: ArchetypeTuning {
                max_health: 40,
                speed: 2.5,
                attack_interval: 2.0,
                death_time: 2.0,
                radius: 0.8,
                rotation_damping: 0.1,
                disengage_distance: 20.0,
                selection: AttackSelection::PreferRanged,
                always_advance: false,
                ranged: Some(StrikeRule {
                    approach_distance: 8.0,
                    strike_distance: 8.0,
                    strike_angle: 25.0,
                }),
                melee: Some(melee_fallback),
                ranged_attack: Some("WaterJet".to_string()),
                melee_attack: Some("Splash".to_string()),
            },
            demon: ArchetypeTuning {
                max_health: 200,
                speed: 4.0,
                attack_interval: 1.0,
                death_time: 3.0,
                radius: 1.2,
                rotation_damping: 0.05,
                disengage_distance: 60.0,
                selection: AttackSelection::ByDistance,
                always_advance: true,
                ranged: Some(StrikeRule {
                    approach_distance: 50.0,
                    strike_distance: 60.0,
                    strike_angle: 15.0,
                }),
                melee: Some(StrikeRule {
                    approach_distance: 50.0,
                    strike_distance: 25.0,
                    strike_angle: 20.0,
                }),
                ranged_attack: Some("Fireball".to_string()),
                melee_attack: Some("Punch".to_string()),
            },
        }
    }
}

/// Complete gameplay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayConfig {
    pub ai: AiTuning,
    pub archetypes: ArchetypeTable,
    /// Attack prototypes, looked up by name
    pub attacks: Vec<AttackPrototype>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        let prototype = |name: &str, kind, damage, projectile_speed, active_time, radius, spawn_offset| {
            AttackPrototype {
                name: name.to_string(),
                kind,
                damage,
                projectile_speed,
                active_time,
                radius,
                spawn_offset,
            }
        };

        Self {
            ai: AiTuning::default(),
            archetypes: ArchetypeTable::default(),
            attacks: vec![
                prototype("Snowball", AttackKind::Ranged, 10, 20.0, 2.0, 0.5, 1.0),
                prototype("Slam", AttackKind::Melee, 15, 0.0, 0.4, 2.5, 2.5),
                prototype("WaterJet", AttackKind::Ranged, 8, 15.0, 1.5, 0.6, 1.0),
                prototype("Splash", AttackKind::Melee, 12, 0.0, 0.4, 2.5, 2.5),
                prototype("Fireball", AttackKind::Ranged, 25, 18.0, 3.5, 0.8, 2.0),
                prototype("Punch", AttackKind::Melee, 30, 0.0, 0.5, 2.5, 2.5),
            ],
        }
    }
}

impl GameplayConfig {
    /// Find an attack prototype by name.
    #[must_use]
    pub fn prototype(&self, name: &str) -> Option<&AttackPrototype> {
        self.attacks.iter().find(|p| p.name == name)
    }

    /// Check that every prototype named by the archetype tuning exists.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPrototype` for the first dangling name
    pub fn validate(&self) -> Result<(), GameplayError> {
        for tuning in self.archetypes.iter() {
            for name in [&tuning.ranged_attack, &tuning.melee_attack]
                .into_iter()
                .flatten()
            {
                if self.prototype(name).is_none() {
                    return Err(GameplayError::UnknownPrototype(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a RON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_ron_str(text: &str) -> Result<Self, GameplayError> {
        let config: Self =
            ron::from_str(text).map_err(|e| GameplayError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the config as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, GameplayError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameplayError::Serialize(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, GameplayError> {
        let content = fs::read_to_string(path).map_err(|e| GameplayError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), GameplayError> {
        let text = self.to_ron_string()?;
        fs::write(path, text).map_err(|e| GameplayError::Io(e.to_string()))
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, GameplayError> {
        let content = fs::read_to_string(path).map_err(|e| GameplayError::Io(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| GameplayError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config, picking the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameplayError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}
