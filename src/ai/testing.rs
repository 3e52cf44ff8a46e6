//! Shared fixture for state and controller tests

use glam::Vec3;
use hecs::Entity;

use super::fsm::{AiContext, PlayerStatus};
use crate::combat::{Unit, UnitType};
use crate::core::{AiTuning, ArchetypeTable, ArchetypeTuning, Services};
use crate::ecs::{StuckPrevention, Transform};

/// An enemy at the origin facing -Z, with a healthy player 10 units ahead.
pub(crate) struct Rig {
    pub entity: Entity,
    pub transform: Transform,
    pub unit: Unit,
    pub stuck: StuckPrevention,
    pub tuning: ArchetypeTuning,
    pub ai: AiTuning,
    pub player: PlayerStatus,
    pub waypoints: Vec<Vec3>,
    pub services: Services,
    pub delta_time: f32,
}

impl Rig {
    fn new(unit_type: UnitType) -> Self {
        let mut world = hecs::World::new();
        let entity = world.spawn(());
        let tuning = ArchetypeTable::default()
            .get(unit_type)
            .cloned()
            .expect("enemy archetype has default tuning");

        Self {
            entity,
            transform: Transform::default(),
            unit: tuning.build_unit(unit_type),
            stuck: StuckPrevention::default(),
            tuning,
            ai: AiTuning::default(),
            player: PlayerStatus::alive_at(Vec3::new(0.0, 0.0, -10.0)),
            waypoints: Vec::new(),
            services: Services::new(),
            delta_time: 0.1,
        }
    }

    pub fn snowman() -> Self {
        Self::new(UnitType::Snowman)
    }

    pub fn water_monster() -> Self {
        Self::new(UnitType::WaterMonster)
    }

    pub fn demon() -> Self {
        Self::new(UnitType::Demon)
    }

    /// Run `f` against a context borrowing this rig.
    pub fn run<R>(&mut self, f: impl FnOnce(&mut AiContext<'_>) -> R) -> R {
        let mut ctx = AiContext {
            delta_time: self.delta_time,
            entity: self.entity,
            transform: &mut self.transform,
            unit: &mut self.unit,
            stuck: &mut self.stuck,
            tuning: &self.tuning,
            ai: &self.ai,
            player: self.player,
            waypoints: &self.waypoints,
            services: &mut self.services,
        };
        f(&mut ctx)
    }
}
