//! Attack: close in on the player and strike

use crate::ai::fsm::{AiContext, State, StateEvent, StateKey, Transition};
use crate::ai::steering::{facing_angle, planar_distance};
use crate::combat::{AttackKind, Enemy, Unit};
use crate::core::{ArchetypeTuning, AttackSelection, StrikeRule};

/// Pursues the player using the archetype's approach and strike table.
#[derive(Debug, Default)]
pub struct AttackState {
    /// Strikes issued while in this state
    pub strikes: u32,
}

/// Pick the attack kind and thresholds that apply at `distance`.
fn select_rule(
    tuning: &ArchetypeTuning,
    unit: &Unit,
    distance: f32,
) -> Option<(AttackKind, StrikeRule)> {
    let ranged = tuning.ranged.map(|rule| (AttackKind::Ranged, rule));
    let melee = tuning.melee.map(|rule| (AttackKind::Melee, rule));

    match tuning.selection {
        AttackSelection::PreferRanged => {
            if unit.ranged_attack.is_some() && ranged.is_some() {
                ranged
            } else {
                melee.or(ranged)
            }
        }
        AttackSelection::ByDistance => match melee {
            Some((_, rule)) if distance < rule.strike_distance => melee,
            _ => ranged.or(melee),
        },
    }
}

impl State for AttackState {
    fn key(&self) -> StateKey {
        StateKey::Attack
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        let target = ctx.player.position;
        Enemy::rotate_towards(ctx.transform, target, ctx.tuning.rotation_damping);
        ctx.stuck.suspend();

        // Death outranks every other decision this tick
        if ctx.unit.health() == 0 {
            return Transition::Raise(StateEvent::Died);
        }

        let distance = planar_distance(ctx.transform.position, target);
        if ctx.player.dying || distance > ctx.tuning.disengage_distance {
            return Transition::Raise(StateEvent::TargetLost);
        }

        let Some((kind, rule)) = select_rule(ctx.tuning, ctx.unit, distance) else {
            return Transition::None;
        };
        let angle = facing_angle(ctx.transform, target);

        if ctx.tuning.always_advance || distance > rule.approach_distance {
            let step = ctx.transform.planar_forward() * ctx.tuning.speed * ctx.delta_time;
            ctx.transform.translate(step);
        }

        if rule.allows_strike(distance, angle) {
            let struck = match ctx.tuning.selection {
                AttackSelection::PreferRanged => {
                    Enemy::attack(ctx.unit, ctx.entity, ctx.transform, ctx.services)
                }
                AttackSelection::ByDistance => {
                    let name = match kind {
                        AttackKind::Melee => ctx.unit.melee_attack.clone(),
                        AttackKind::Ranged => ctx.unit.ranged_attack.clone(),
                    };
                    name.is_some_and(|name| {
                        Enemy::demon_attack(ctx.unit, &name, ctx.entity, ctx.transform, ctx.services)
                    })
                }
            };
            if struck {
                self.strikes += 1;
                log::trace!(
                    "Enemy {:?} strikes ({kind:?}) at {distance:.1} units, {angle:.1} deg",
                    ctx.entity
                );
            }
        }

        Transition::None
    }
}
