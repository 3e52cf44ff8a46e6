//! Headless gameplay simulation
//!
//! Owns the entity world, the physics world, the shared services and the
//! loaded configuration, and advances all of them with [`Simulation::tick`].
//!
//! # Tick order
//!
//! 1. Swap the event queue
//! 2. Push unit transforms into their kinematic bodies and step physics
//! 3. Snapshot the player
//! 4. Run perception for every living enemy
//! 5. Tick every enemy controller
//! 6. Tick attack cooldowns
//! 7. Turn spawn requests into attack entities
//! 8. Move attacks, resolve overlaps and apply damage
//! 9. Run death sequences and despawn whatever expired

use glam::{Quat, Vec3};
use hecs::Entity;

use super::config::GameplayConfig;
use super::error::GameplayError;
use super::events::GameEvent;
use super::services::Services;
use crate::ai::{
    AiFrame, EnemyController, EnemySight, PlayerStatus, StateEvent, StateKey, WaypointRegistry,
};
use crate::combat::{Attack, Enemy, Unit, UnitType};
use crate::ecs::{Name, StuckPrevention, Transform, World};
use crate::physics::{ColliderHandle, ColliderTag, Physics, RigidBodyHandle, UNIT_EYE_HEIGHT};

/// Player health when spawned.
pub const PLAYER_MAX_HEALTH: i32 = 100;

/// Player body radius.
pub const PLAYER_RADIUS: f32 = 0.5;

/// Physics body backing a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Unit that spawned an attack entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instigator(pub Entity);

/// A unit struck by an attack this tick.
struct Hit {
    target: Entity,
    unit_type: UnitType,
    amount: i32,
    origin: UnitType,
    killed: bool,
}

/// The gameplay world and everything needed to advance it.
pub struct Simulation {
    /// ECS world holding units and attacks
    pub world: World,
    /// Colliders for line of sight
    pub physics: Physics,
    /// Events, spawn requests and combat counters
    pub services: Services,
    config: GameplayConfig,
    waypoints: WaypointRegistry,
    player: Option<Entity>,
    elapsed: f32,
    ticks: u64,
}

impl Simulation {
    /// Create an empty simulation running with `config`.
    pub fn new(config: GameplayConfig) -> Self {
        Self {
            world: World::new(),
            physics: Physics::new(),
            services: Services::new(),
            config,
            waypoints: WaypointRegistry::new(),
            player: None,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Seconds simulated so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // ------------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------------

    /// Register a named patrol point.
    pub fn add_waypoint(&mut self, name: impl Into<String>, position: Vec3) {
        self.waypoints.insert(name, position);
    }

    /// Spawn the player, replacing any previous one.
    pub fn spawn_player(&mut self, position: Vec3) -> Entity {
        if let Some(previous) = self.player.take() {
            log::warn!("Replacing existing player {previous:?}");
            self.despawn(previous);
        }

        let (body, collider) = self
            .physics
            .add_unit(position, PLAYER_RADIUS, ColliderTag::Player);
        let unit = Unit::new(UnitType::Player, PLAYER_MAX_HEALTH).with_radius(PLAYER_RADIUS);
        let entity = self.world.spawn((
            Name::new("Player"),
            Transform::from_position(position),
            unit,
            PhysicsBody { body, collider },
        ));

        log::info!("Spawned player {entity:?} at {position}");
        self.player = Some(entity);
        entity
    }

    /// Spawn an enemy walking the named route.
    ///
    /// # Errors
    ///
    /// Fails when no player exists yet, when the archetype has no tuning,
    /// or when the route names an unknown waypoint.
    pub fn spawn_enemy(
        &mut self,
        unit_type: UnitType,
        position: Vec3,
        route: &[&str],
    ) -> Result<Entity, GameplayError> {
        if self.player.is_none() {
            return Err(GameplayError::MissingDependency("player".to_string()));
        }
        let tuning = self.config.archetypes.get(unit_type).ok_or_else(|| {
            GameplayError::MissingDependency(format!("archetype tuning for {unit_type:?}"))
        })?;
        let patrol_points = self.waypoints.resolve(route)?;

        let unit = tuning.build_unit(unit_type);
        let (body, collider) = self
            .physics
            .add_unit(position, tuning.radius, ColliderTag::Enemy);
        let transform = Transform::from_position(position);

        let entity = self.world.spawn((
            Name::new(format!("{unit_type:?}")),
            transform,
            unit,
            Enemy::new(transform.scale),
            EnemyController::new(patrol_points),
            StuckPrevention::default(),
            EnemySight::from_tuning(&self.config.ai),
            PhysicsBody { body, collider },
        ));

        log::info!(
            "Spawned {unit_type:?} {entity:?} at {position} with {} waypoints",
            route.len()
        );
        Ok(entity)
    }

    /// Add a static box that blocks line of sight.
    pub fn add_obstacle(&mut self, position: Vec3, half_extents: Vec3) -> RigidBodyHandle {
        let (body, _) = self
            .physics
            .add_obstacle(position, Quat::IDENTITY, half_extents);
        body
    }

    // ------------------------------------------------------------------------
    // Queries and host input
    // ------------------------------------------------------------------------

    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    /// Move the player; the host's character controller calls this each frame.
    pub fn set_player_position(&mut self, position: Vec3) {
        let Some(player) = self.player else {
            return;
        };
        if let Ok(mut transform) = self.world.get_mut::<Transform>(player) {
            transform.position = position;
        }
    }

    /// Snapshot of the player for this tick.
    pub fn player_status(&self) -> Option<PlayerStatus> {
        let player = self.player?;
        let position = self.world.copied::<Transform>(player)?.position;
        let unit = self.world.get::<Unit>(player).ok()?;
        Some(PlayerStatus {
            position,
            dying: unit.is_dead(),
            health: unit.health(),
        })
    }

    /// Current behavior state of an enemy.
    pub fn enemy_state(&self, enemy: Entity) -> Option<StateKey> {
        self.world
            .get::<EnemyController>(enemy)
            .ok()
            .and_then(|controller| controller.current_key())
    }

    /// Health of any unit.
    pub fn health(&self, entity: Entity) -> Option<i32> {
        self.world.get::<Unit>(entity).ok().map(|unit| unit.health())
    }

    /// Number of live attack entities.
    pub fn attack_count(&self) -> usize {
        self.world.query::<&Attack>().iter().count()
    }

    /// Damage a unit directly, as the host's player weapons do.
    ///
    /// Only the health actually lost is counted. Returns `true` for the
    /// killing blow.
    pub fn damage_unit(&mut self, entity: Entity, amount: i32, origin: UnitType) -> bool {
        let (unit_type, lost, killed) = {
            let Ok(mut unit) = self.world.get_mut::<Unit>(entity) else {
                return false;
            };
            if unit.is_dead() || amount <= 0 {
                return false;
            }
            let before = unit.health();
            let killed = unit.take_damage(amount);
            (unit.unit_type(), before - unit.health(), killed)
        };

        self.record_hit(Hit {
            target: entity,
            unit_type,
            amount: lost,
            origin,
            killed,
        });
        killed
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advance the whole simulation by `delta_time` seconds.
    pub fn tick(&mut self, delta_time: f32) {
        let dt = delta_time.max(0.0);
        self.services.events.swap();
        self.elapsed += dt;
        self.ticks += 1;

        self.step_physics(dt);

        // Strikes issued this frame start counting from the next one
        for (_, unit) in self.world.query_mut::<&mut Unit>() {
            unit.tick_cooldown(dt);
        }

        if let Some(player) = self.player_status() {
            self.run_perception(player);
            self.run_controllers(dt, player);
        }

        self.spawn_attacks();
        self.update_attacks(dt);
        self.run_deaths(dt);
    }

    fn step_physics(&mut self, dt: f32) {
        for (_, (transform, body)) in self.world.query::<(&Transform, &PhysicsBody)>().iter() {
            self.physics
                .set_kinematic_pose(body.body, transform.position, transform.rotation);
        }
        self.physics.step(dt);
    }

    fn run_perception(&mut self, player: PlayerStatus) {
        let player_eye = player.position + Vec3::Y * UNIT_EYE_HEIGHT;

        for (entity, (transform, unit, sight, body, controller)) in self.world.query_mut::<(
            &Transform,
            &Unit,
            &mut EnemySight,
            &PhysicsBody,
            &mut EnemyController,
        )>() {
            if unit.is_dead() {
                continue;
            }

            let eye = transform.position + Vec3::Y * UNIT_EYE_HEIGHT;
            let Some(distance) = sight.sense(eye, Some(body.collider), player_eye, &self.physics)
            else {
                continue;
            };
            // A dead player still trips the trigger but is not worth chasing
            if player.dying {
                continue;
            }

            self.services.emit(GameEvent::PlayerSpotted {
                enemy: entity,
                distance,
            });
            let from = controller.current_key();
            if let Some(to) = controller.raise(StateEvent::PlayerSpotted) {
                log::debug!("Enemy {entity:?} spotted the player at {distance:.1}");
                self.services.emit(GameEvent::StateChanged {
                    enemy: entity,
                    from,
                    to,
                });
            }
        }
    }

    fn run_controllers(&mut self, dt: f32, player: PlayerStatus) {
        let frame = AiFrame {
            delta_time: dt,
            player,
            ai: &self.config.ai,
        };

        for (entity, (transform, unit, stuck, controller, enemy)) in self.world.query_mut::<(
            &mut Transform,
            &mut Unit,
            &mut StuckPrevention,
            &mut EnemyController,
            &mut Enemy,
        )>() {
            let Some(tuning) = self.config.archetypes.get(unit.unit_type()) else {
                continue;
            };

            let before = transform.rotation;
            controller.tick(
                entity,
                transform,
                unit,
                stuck,
                tuning,
                &frame,
                &mut self.services,
            );
            enemy.track_rotation(before, transform.rotation);
        }
    }

    fn spawn_attacks(&mut self) {
        let requests: Vec<_> = self.services.take_spawns().collect();

        for request in requests {
            let Some(prototype) = self.config.prototype(&request.prototype) else {
                log::warn!(
                    "Dropping spawn request from {:?}: unknown attack prototype {}",
                    request.instigator,
                    request.prototype
                );
                continue;
            };

            let (attack, transform) = prototype.instantiate(request.origin_type, &request.transform);
            let kind = attack.kind;
            let position = transform.position;
            let entity = self
                .world
                .spawn((attack, transform, Instigator(request.instigator)));

            log::debug!(
                "{:?} {:?} spawned {} {entity:?}",
                request.origin_type,
                request.instigator,
                request.prototype
            );
            self.services.stats.attacks_spawned += 1;
            self.services.emit(GameEvent::AttackSpawned {
                attack: entity,
                instigator: request.instigator,
                kind,
                position,
            });
        }
    }

    fn update_attacks(&mut self, dt: f32) {
        let mut live = Vec::new();
        for (entity, (attack, transform)) in self.world.query_mut::<(&mut Attack, &mut Transform)>() {
            attack.tick(dt, transform);
            if attack.is_active {
                live.push((entity, transform.position));
            }
        }

        let mut hits = Vec::new();
        for (attack_entity, position) in live {
            let Ok(mut attack) = self.world.inner.get::<&mut Attack>(attack_entity) else {
                continue;
            };

            let mut targets = self.world.inner.query::<(&Transform, &mut Unit)>();
            for (target, (transform, unit)) in targets.iter() {
                if !attack.overlaps(position, transform.position, unit.radius) {
                    continue;
                }
                if let Some(amount) = attack.resolve_hit(unit) {
                    hits.push(Hit {
                        target,
                        unit_type: unit.unit_type(),
                        amount,
                        origin: attack.origin_type,
                        killed: unit.is_dead(),
                    });
                }
                if attack.has_collided {
                    break;
                }
            }
        }

        for hit in hits {
            self.record_hit(hit);
        }

        let expired: Vec<Entity> = self
            .world
            .query::<&Attack>()
            .iter()
            .filter(|(_, attack)| !attack.is_active)
            .map(|(entity, _)| entity)
            .collect();
        for entity in expired {
            self.despawn(entity);
        }
    }

    fn record_hit(&mut self, hit: Hit) {
        log::debug!(
            "{:?} {:?} took {} from {:?}",
            hit.unit_type,
            hit.target,
            hit.amount,
            hit.origin
        );
        self.services.emit(GameEvent::UnitDamaged {
            entity: hit.target,
            amount: hit.amount,
            origin: hit.origin,
        });
        if hit.unit_type == UnitType::Player {
            self.services.stats.damage_taken += i64::from(hit.amount);
        } else {
            self.services.stats.damage_dealt += i64::from(hit.amount);
        }

        if !hit.killed {
            return;
        }

        log::info!("{:?} {:?} died", hit.unit_type, hit.target);
        self.services.emit(GameEvent::UnitDied {
            entity: hit.target,
            unit_type: hit.unit_type,
        });
        if !hit.unit_type.is_enemy() {
            return;
        }

        self.services.stats.record_kill(hit.unit_type);
        if let Ok(mut controller) = self.world.get_mut::<EnemyController>(hit.target) {
            let from = controller.current_key();
            if let Some(to) = controller.raise(StateEvent::Died) {
                self.services.emit(GameEvent::StateChanged {
                    enemy: hit.target,
                    from,
                    to,
                });
            }
        }
    }

    fn run_deaths(&mut self, dt: f32) {
        let mut finished = Vec::new();
        for (entity, (enemy, unit, transform)) in
            self.world
                .query_mut::<(&mut Enemy, &mut Unit, &mut Transform)>()
        {
            if enemy.die(dt, unit, transform) {
                finished.push(entity);
            }
        }

        for entity in finished {
            log::info!("Removing {entity:?} after its death sequence");
            self.despawn(entity);
        }
    }

    fn despawn(&mut self, entity: Entity) {
        if let Some(body) = self.world.copied::<PhysicsBody>(entity) {
            self.physics.remove_body(body.body);
        }
        if self.world.despawn(entity) {
            self.services.emit(GameEvent::EntityDespawned { entity });
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(GameplayConfig::default())
    }
}
