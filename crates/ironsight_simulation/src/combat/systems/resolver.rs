//! Combat resolver: fire / reload / switch decisions, predictive aim.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{Bot, BotState, BrainDisabled, Combatant, CombatantIndex, TargetTracker};
use crate::combat::aim::{predict_aim_point, random_in_unit_sphere};
use crate::combat::{CombatTuning, FireReadiness, Loadout, LoadoutTick, WeaponFired};
use crate::components::{Actor, BotId, Dead};
use crate::physics::{planar_heading, Occluders};
use crate::schedules::SimClock;
use crate::DeterministicRng;

/// Shot geometry for one fire decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSolution {
    pub origin: Vec3,
    pub direction: Dir3,
    pub distance: f32,
}

/// Range + line-of-fire + aim.
///
/// None → no shot this tick (out of range, blocked, degenerate aim).
pub fn solve_shot(
    shooter: Entity,
    position: Vec3,
    target: &Combatant,
    tuning: &CombatTuning,
    occluders: &Occluders,
    rng: &mut impl Rng,
) -> Option<ShotSolution> {
    let origin = position + Vec3::Y * tuning.muzzle_height;
    let distance = origin.distance(target.position);
    if distance > tuning.max_shoot_distance {
        return None;
    }

    // Fresh line-of-fire trace (грудь цели)
    let chest = target.position + Vec3::Y * tuning.line_of_fire_height;
    if !occluders.segment_clear(origin, chest, &[shooter, target.entity]) {
        return None;
    }

    let predicted = predict_aim_point(
        target.position,
        target.velocity,
        distance,
        tuning.projectile_speed,
        tuning.lead_accuracy,
        tuning.aim_height,
    );
    let noisy = predicted + random_in_unit_sphere(rng) * tuning.spread_radius(distance);
    let direction = Dir3::new(noisy - origin).ok()?;

    Some(ShotSolution {
        origin,
        direction,
        distance,
    })
}

/// Система: combat resolver (Combat set)
///
/// Timers tick for every living bot. Fire decisions only in engaging states
/// (Attack/Chase/Retreat); otherwise a tactical reload when possible.
pub fn resolve_combat(
    mut bots: Query<
        (
            Entity,
            &BotState,
            &TargetTracker,
            &Actor,
            Option<&BotId>,
            &CombatTuning,
            &mut Loadout,
            &mut Transform,
        ),
        (With<Bot>, Without<Dead>, Without<BrainDisabled>),
    >,
    index: Res<CombatantIndex>,
    occluders: Res<Occluders>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut fired: EventWriter<WeaponFired>,
) {
    let dt = clock.dt;

    for (entity, state, tracker, actor, bot_id, tuning, mut loadout, mut transform) in
        bots.iter_mut()
    {
        let timers = loadout.tick(dt);
        if let LoadoutTick::ReloadFinished { loaded } = timers {
            crate::log(&format!(
                "🔄 {:?}: reloaded {} (+{})",
                entity,
                loadout.active_slot().spec.name,
                loaded
            ));
        }
        if timers.was_busy() {
            continue;
        }

        if !state.is_engaging() {
            // Tactical reload вне боя
            if loadout.start_reload() {
                crate::log(&format!("🔄 {:?}: tactical reload", entity));
            }
            continue;
        }

        let Some(target) = tracker.target.and_then(|target| index.living(target)).copied() else {
            continue;
        };

        match loadout.readiness() {
            FireReadiness::SwitchSlots => {
                loadout.start_switch();
                crate::log(&format!(
                    "🔀 {:?}: switching to {}",
                    entity,
                    loadout.active_slot().spec.name
                ));
                continue;
            }
            FireReadiness::Reload => {
                loadout.start_reload();
                crate::log(&format!("🔄 {:?}: reloading (magazine empty)", entity));
                continue;
            }
            FireReadiness::Busy | FireReadiness::OutOfAmmo | FireReadiness::CoolingDown => continue,
            FireReadiness::Ready => {}
        }

        let Some(shot) = solve_shot(
            entity,
            transform.translation,
            &target,
            tuning,
            &occluders,
            &mut rng.rng,
        ) else {
            continue;
        };

        // Поворот корпуса к горизонтальной проекции прицела
        if let Some(heading) = planar_heading(*shot.direction) {
            let facing = Transform::IDENTITY.looking_to(heading, Vec3::Y).rotation;
            let t = (dt * tuning.aim_turn_rate).min(1.0);
            transform.rotation = transform.rotation.slerp(facing, t);
        }

        let jitter = rng
            .rng
            .gen_range((1.0 - tuning.cooldown_jitter)..=(1.0 + tuning.cooldown_jitter));
        let slot = loadout.active;
        let Some(damage) = loadout.consume_shot(jitter) else {
            continue;
        };

        fired.write(WeaponFired {
            shooter: entity,
            shooter_id: bot_id.map(|id| id.0).unwrap_or(entity.to_bits()),
            team: actor.team,
            slot,
            origin: shot.origin,
            direction: shot.direction,
            damage,
            speed: tuning.projectile_speed,
            max_distance: tuning.max_shoot_distance,
        });

        crate::log(&format!(
            "🔫 {:?} fires at {:?} ({:.1} m, spread {:.2} m)",
            entity,
            target.entity,
            shot.distance,
            tuning.spread_radius(shot.distance)
        ));
    }
}
