//! Health ledger: damage application and death systems.

use bevy::prelude::*;

use crate::ai::Bot;
use crate::combat::{DamageDealt, DamageRequest, EntityDied};
use crate::components::{Actor, Dead, DespawnAfter, Health, NavAgent, TeamId, NEUTRAL_TEAM};
use crate::schedules::SimClock;

/// Post-death linger before a bot is despawned (seconds)
pub const DEATH_LINGER_SECONDS: f32 = 3.0;

/// Friendly-fire / self-damage rules
///
/// - self hit: only area effects hurt their own instigator
/// - same non-neutral team: ignored
pub fn is_damage_allowed(target: Entity, target_team: TeamId, request: &DamageRequest) -> bool {
    if request.instigator == Some(target) {
        return request.is_area_effect;
    }
    let neutral = target_team == NEUTRAL_TEAM || request.instigator_team == NEUTRAL_TEAM;
    neutral || target_team != request.instigator_team
}

/// Система: DamageRequest → Health (Damage set)
///
/// Dead targets ignore further damage; the killing blow emits `EntityDied`
/// exactly once.
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&Actor, &mut Health), Without<Dead>>,
    mut dealt: EventWriter<DamageDealt>,
    mut died: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        let Ok((actor, mut health)) = targets.get_mut(request.target) else {
            continue;
        };
        if !health.is_alive() || !is_damage_allowed(request.target, actor.team, request) {
            continue;
        }

        health.take_damage(request.amount);
        dealt.write(DamageDealt {
            attacker: request.instigator,
            target: request.target,
            damage: request.amount,
            hit_point: request.hit_point,
        });

        if !health.is_alive() {
            crate::log_info(&format!(
                "💀 {:?} killed by {:?} (instigator id {})",
                request.target, request.instigator, request.instigator_id
            ));
            died.write(EntityDied {
                entity: request.target,
                killer: request.instigator,
            });
        }
    }
}

/// Система: смерть → Dead marker, stop navigation, linger then despawn (bots)
pub fn handle_deaths(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    mut actors: Query<(Option<&mut NavAgent>, Has<Bot>), Without<Dead>>,
) {
    for event in deaths.read() {
        let Ok((nav, is_bot)) = actors.get_mut(event.entity) else {
            continue;
        };

        if let Some(mut nav) = nav {
            nav.stop();
        }

        let Ok(mut entity_commands) = commands.get_entity(event.entity) else {
            continue;
        };
        entity_commands.insert(Dead);
        if is_bot {
            entity_commands.insert(DespawnAfter {
                remaining: DEATH_LINGER_SECONDS,
            });
        }

        crate::log(&format!("INFO: {:?} is dead, brain and movement off", event.entity));
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    mut lingering: Query<(Entity, &mut DespawnAfter)>,
    clock: Res<SimClock>,
) {
    for (entity, mut despawn_after) in lingering.iter_mut() {
        despawn_after.remaining -= clock.dt;
        if despawn_after.remaining <= 0.0 {
            crate::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}
