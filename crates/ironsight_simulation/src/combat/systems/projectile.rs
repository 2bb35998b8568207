//! Headless projectile spawner: instant hit-scan along the fired direction.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

use crate::ai::CombatantIndex;
use crate::combat::{DamageRequest, WeaponFired};
use crate::physics::Occluders;

/// Combatant hitbox: capsule approximated by a box, feet at the origin
pub const HITBOX_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.9, 0.4);

pub fn hitbox(position: Vec3) -> Aabb3d {
    Aabb3d::new(position + Vec3::Y * HITBOX_HALF_EXTENTS.y, HITBOX_HALF_EXTENTS)
}

/// What a shot hit first
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotImpact {
    Combatant { entity: Entity, distance: f32 },
    World { entity: Entity, distance: f32 },
}

/// First impact along the shot: living combatant hitboxes vs blocking volumes.
/// The shooter is never hit by its own shot.
pub fn trace_shot(shot: &WeaponFired, index: &CombatantIndex, occluders: &Occluders) -> Option<ShotImpact> {
    let ray = RayCast3d::from_ray(Ray3d::new(shot.origin, shot.direction), shot.max_distance);

    let body = index
        .iter()
        .filter(|combatant| combatant.alive && combatant.entity != shot.shooter)
        .filter_map(|combatant| {
            ray.aabb_intersection_at(&hitbox(combatant.position))
                .map(|distance| (combatant.entity, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let wall = occluders.first_hit(shot.origin, shot.direction, shot.max_distance, &[shot.shooter]);

    match (body, wall) {
        (Some((_, distance)), Some(wall)) if wall.distance < distance => Some(ShotImpact::World {
            entity: wall.entity,
            distance: wall.distance,
        }),
        (Some((entity, distance)), _) => Some(ShotImpact::Combatant { entity, distance }),
        (None, Some(wall)) => Some(ShotImpact::World {
            entity: wall.entity,
            distance: wall.distance,
        }),
        (None, None) => None,
    }
}

/// Система: WeaponFired → DamageRequest (Projectiles set)
pub fn resolve_hitscan(
    mut fired: EventReader<WeaponFired>,
    index: Res<CombatantIndex>,
    occluders: Res<Occluders>,
    mut requests: EventWriter<DamageRequest>,
) {
    for shot in fired.read() {
        let Some(ShotImpact::Combatant { entity, distance }) = trace_shot(shot, &index, &occluders)
        else {
            continue;
        };

        requests.write(DamageRequest {
            target: entity,
            amount: shot.damage,
            instigator: Some(shot.shooter),
            instigator_team: shot.team,
            instigator_id: shot.shooter_id,
            hit_point: shot.origin + shot.direction * distance,
            is_area_effect: false,
        });
    }
}
