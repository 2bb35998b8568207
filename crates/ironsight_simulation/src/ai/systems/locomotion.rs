//! Locomotion adapter: active state → destination requests.
//!
//! Only writes the navigation intent (`NavAgent`) and, in Attack, the heading:
//! the bot keeps facing its target while advancing or backing off, the
//! provider only translates it. The navigation provider does the actual moving.

use bevy::prelude::*;

use crate::ai::{
    Bot, BotConfig, BotState, BrainDisabled, CombatantIndex, PatrolCursor, TargetMemory,
    TargetTracker,
};
use crate::components::{Dead, NavAgent, PatrolRoute};
use crate::physics::planar_heading;
use crate::pickups::{Pickup, PickupKind};
use crate::schedules::SimClock;

/// Ближайший доступный pickup нужного вида
pub fn nearest_pickup<'a>(
    pickups: impl Iterator<Item = (&'a Transform, &'a Pickup)>,
    from: Vec3,
    wanted: fn(&PickupKind) -> bool,
) -> Option<Vec3> {
    pickups
        .filter(|(_, pickup)| pickup.is_available() && wanted(&pickup.kind))
        .map(|(transform, _)| transform.translation)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

fn is_health(kind: &PickupKind) -> bool {
    matches!(kind, PickupKind::Health { .. })
}

fn is_ammo(kind: &PickupKind) -> bool {
    matches!(kind, PickupKind::Ammo)
}

/// Patrol step: request the next waypoint once the current one is reached
/// (or there is no path yet). Missing/empty route → stop in place.
pub fn patrol_step(
    route: Option<&PatrolRoute>,
    cursor: &mut PatrolCursor,
    nav: &mut NavAgent,
    position: Vec3,
    tolerance: f32,
) {
    let Some(route) = route.filter(|route| !route.is_empty()) else {
        nav.stop();
        return;
    };

    let current = cursor.index.and_then(|index| route.get(index));
    let Some(waypoint) = current else {
        // Cursor сброшен → ближайшая точка маршрута
        let nearest = route
            .points
            .iter()
            .enumerate()
            .min_by(|a, b| {
                a.1.distance_squared(position)
                    .total_cmp(&b.1.distance_squared(position))
            })
            .map(|(index, _)| index);
        cursor.index = nearest;
        nav.request(nearest.and_then(|index| route.get(index)));
        return;
    };

    let reached = position.distance_squared(waypoint) <= tolerance * tolerance;
    if reached || !nav.has_path() {
        let next = cursor.advance(route.len());
        nav.request(next.and_then(|index| route.get(index)));
    }
}

/// Attack positioning: advance / back off / hold, always turning to the target
///
/// The provider must not re-head the bot here, otherwise backing off turns it
/// away from the target and the next visibility sample fails the FOV test.
pub fn attack_step(
    nav: &mut NavAgent,
    transform: &mut Transform,
    target_position: Vec3,
    config: &BotConfig,
    dt: f32,
) {
    let position = transform.translation;
    let distance = position.distance(target_position);
    nav.update_rotation = false;

    if distance > config.ideal_combat_distance + 1.0 {
        nav.set_destination(target_position);
    } else if distance < config.too_close_distance {
        if let Some(away) = (position - target_position).try_normalize() {
            nav.set_destination(position + away * config.back_off_distance);
        }
    } else {
        nav.stop();
    }

    if let Some(heading) = planar_heading(target_position - position) {
        let facing = Transform::IDENTITY.looking_to(heading, Vec3::Y).rotation;
        let t = (dt * config.turn_rate).min(1.0);
        transform.rotation = transform.rotation.slerp(facing, t);
    }
}

/// Система: per-state locomotion tick
pub fn drive_locomotion(
    mut bots: Query<
        (
            &BotState,
            &BotConfig,
            &TargetTracker,
            &TargetMemory,
            &mut NavAgent,
            &mut PatrolCursor,
            &mut Transform,
            Option<&PatrolRoute>,
        ),
        (With<Bot>, Without<Dead>, Without<BrainDisabled>),
    >,
    pickups: Query<(&Transform, &Pickup), Without<Bot>>,
    index: Res<CombatantIndex>,
    clock: Res<SimClock>,
) {
    for (state, config, tracker, memory, mut nav, mut cursor, mut transform, route) in
        bots.iter_mut()
    {
        if !nav.on_navigable_surface {
            continue;
        }

        let position = transform.translation;
        let live_target = tracker
            .target
            .and_then(|target| index.living(target))
            .map(|target| target.position);
        let remembered = memory.recall(config.max_search_time);

        if *state == BotState::Retreat {
            nav.speed = nav.base_speed * config.retreat_speed_multiplier;
        } else {
            nav.reset_speed();
        }
        // Heading по ходу движения; attack_step снимает флаг
        nav.update_rotation = true;

        match state {
            BotState::Patrol => {
                patrol_step(route, &mut cursor, &mut nav, position, config.waypoint_tolerance);
            }
            BotState::Chase => {
                nav.request(live_target.or(remembered));
            }
            BotState::Search => {
                nav.request(remembered);
            }
            BotState::Attack => match live_target {
                Some(target) => attack_step(&mut nav, &mut transform, target, config, clock.dt),
                None => {
                    nav.request(remembered);
                }
            },
            BotState::Retreat => {
                if let Some(pickup) = nearest_pickup(pickups.iter(), position, is_health) {
                    nav.set_destination(pickup);
                } else if let Some(threat) = live_target.or(remembered) {
                    if let Some(away) = (position - threat).try_normalize() {
                        nav.set_destination(position + away * config.flee_distance);
                    }
                }
            }
            BotState::GoToAmmo => {
                match nearest_pickup(pickups.iter(), position, is_ammo) {
                    Some(pickup) => {
                        nav.set_destination(pickup);
                    }
                    // Нет ammo pickup'ов → ведём себя как Patrol
                    None => {
                        patrol_step(route, &mut cursor, &mut nav, position, config.waypoint_tolerance)
                    }
                }
            }
        }
    }
}
