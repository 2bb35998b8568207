//! Obstruction traces (line-of-sight / line-of-fire)
//!
//! Headless stand-in for a physics raycast: segment vs axis-aligned blocking
//! volumes. A hit on a volume rooted at an ignored entity (the target itself,
//! or the tracer) does not count as obstruction.
//!
//! The occluder list is rebuilt once per tick (`refresh_occluders`), so every
//! trace in a tick sees the same world.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

use crate::components::{BlockingVolume, ColliderRoot};

#[derive(Debug, Clone, Copy)]
pub struct Occluder {
    pub entity: Entity,
    pub aabb: Aabb3d,
    /// Combatant this collider belongs to (None = static world geometry)
    pub root: Option<Entity>,
}

impl Occluder {
    fn belongs_to(&self, ignore: &[Entity]) -> bool {
        ignore.contains(&self.entity) || self.root.is_some_and(|root| ignore.contains(&root))
    }
}

/// Per-tick snapshot of all blocking volumes
#[derive(Resource, Debug, Default)]
pub struct Occluders {
    pub volumes: Vec<Occluder>,
}

/// First obstruction along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub entity: Entity,
    /// Distance from origin (meters)
    pub distance: f32,
    pub point: Vec3,
}

impl Occluders {
    /// Closest hit along `origin → origin + direction * max_distance`
    pub fn first_hit(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        ignore: &[Entity],
    ) -> Option<TraceHit> {
        let ray = RayCast3d::from_ray(Ray3d::new(origin, direction), max_distance);

        self.volumes
            .iter()
            .filter(|occluder| !occluder.belongs_to(ignore))
            .filter_map(|occluder| {
                ray.aabb_intersection_at(&occluder.aabb)
                    .map(|distance| (occluder.entity, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, distance)| TraceHit {
                entity,
                distance,
                point: origin + direction * distance,
            })
    }

    /// Segment `from → to` is clear of everything not rooted at `ignore`
    ///
    /// Degenerate segments (from == to) are clear.
    pub fn segment_clear(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool {
        let delta = to - from;
        let Ok(direction) = Dir3::new(delta) else {
            return true;
        };
        self.first_hit(from, direction, delta.length(), ignore).is_none()
    }
}

/// System: rebuild the occluder snapshot (Perception, first)
pub fn refresh_occluders(
    mut occluders: ResMut<Occluders>,
    volumes: Query<(Entity, &Transform, &BlockingVolume, Option<&ColliderRoot>)>,
) {
    occluders.volumes.clear();
    occluders
        .volumes
        .extend(volumes.iter().map(|(entity, transform, volume, root)| Occluder {
            entity,
            aabb: volume.aabb(transform.translation),
            root: root.map(|root| root.0),
        }));

    // Query order is archetype order; sort for reproducible tie-breaks
    occluders.volumes.sort_by_key(|occluder| occluder.entity.index());
}
