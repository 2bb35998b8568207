//! World компоненты: PatrolRoute, BlockingVolume, ColliderRoot

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

/// Ordered patrol waypoints, assigned by the spawner
///
/// Locomotion never mutates the points, it only keeps a cursor
/// (`ai::PatrolCursor`).
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PatrolRoute {
    pub points: Vec<Vec3>,
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }
}

/// Static axis-aligned occluder (walls, crates, cover)
///
/// Centered on the entity's `Transform::translation`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BlockingVolume {
    pub half_extents: Vec3,
}

impl BlockingVolume {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    pub fn aabb(&self, center: Vec3) -> Aabb3d {
        Aabb3d::new(center, self.half_extents)
    }
}

/// Collider belongs to a combatant (hitbox, shield, carried cover)
///
/// Trace hits on a volume rooted at the target or the tracer are ignored.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderRoot(pub Entity);
