//! Headless skirmish demonstrating the gameplay core
//!
//! Usage: `gameplay [config.ron|config.json]`

use gameplay::prelude::*;

const TICK: f32 = 1.0 / 30.0;
const DURATION: f32 = 30.0;

/// Build the arena: a player strafing past three patrolling enemies.
fn setup(sim: &mut Simulation) -> Result<Vec<hecs::Entity>, GameplayError> {
    sim.spawn_player(Vec3::new(0.0, 0.0, 20.0));

    sim.add_waypoint("west_gate", Vec3::new(-12.0, 0.0, 0.0));
    sim.add_waypoint("west_well", Vec3::new(-12.0, 0.0, -10.0));
    sim.add_waypoint("east_gate", Vec3::new(12.0, 0.0, 0.0));
    sim.add_waypoint("east_well", Vec3::new(12.0, 0.0, -10.0));
    sim.add_waypoint("keep", Vec3::new(0.0, 0.0, -25.0));

    // A low wall the player can hide behind
    sim.add_obstacle(Vec3::new(0.0, 1.0, 6.0), Vec3::new(4.0, 1.5, 0.3));

    Ok(vec![
        sim.spawn_enemy(
            UnitType::Snowman,
            Vec3::new(-12.0, 0.0, 0.0),
            &["west_gate", "west_well"],
        )?,
        sim.spawn_enemy(
            UnitType::WaterMonster,
            Vec3::new(12.0, 0.0, 0.0),
            &["east_gate", "east_well"],
        )?,
        sim.spawn_enemy(UnitType::Demon, Vec3::new(0.0, 0.0, -25.0), &["keep"])?,
    ])
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading gameplay config from {path}");
            GameplayConfig::load(&path)?
        }
        None => GameplayConfig::default(),
    };

    let mut sim = Simulation::new(config);
    let enemies = setup(&mut sim)?;

    let steps = (DURATION / TICK) as u32;
    for step in 0..steps {
        // Walk the player down the middle of the arena and back
        let t = step as f32 * TICK;
        let z = 20.0 - 15.0 * (t * 0.2).sin().abs();
        let x = 6.0 * (t * 0.5).sin();
        sim.set_player_position(Vec3::new(x, 0.0, z));

        sim.tick(TICK);

        // The player fights back at whatever stands closest
        if step % 15 == 0
            && let Some(target) = nearest_living_enemy(&sim, &enemies)
        {
            sim.damage_unit(target, 12, UnitType::Player);
        }

        for event in sim.services.events.iter_pending() {
            if let GameEvent::StateChanged { enemy, from, to } = event {
                log::info!("t={t:5.2}s {enemy:?}: {from:?} -> {to}");
            }
        }

        if sim.player_status().is_some_and(|player| player.dying) {
            log::info!("Player fell after {t:.1}s");
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&sim.services.stats)?);
    Ok(())
}

fn nearest_living_enemy(sim: &Simulation, enemies: &[hecs::Entity]) -> Option<hecs::Entity> {
    let player = sim.player_status()?.position;
    enemies
        .iter()
        .copied()
        .filter(|&enemy| sim.health(enemy).is_some_and(|health| health > 0))
        .filter_map(|enemy| {
            let position = sim.world.copied::<Transform>(enemy)?.position;
            Some((enemy, position.distance(player)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(enemy, _)| enemy)
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("Skirmish failed: {e}");
        std::process::exit(1);
    }
}
