//! Combat events: fire → hit-scan → damage → death.
//!
//! - `WeaponFired`: resolver → projectile spawner (headless hit-scan)
//! - `DamageRequest`: hit-scan (или любой внешний источник) → health ledger
//! - `DamageDealt` / `EntityDied`: ledger → lifecycle, spawner, tests

use bevy::prelude::*;

use crate::combat::SlotKind;
use crate::components::TeamId;

/// Event: бот выстрелил (Fire(origin, direction, damage, ownerTeam, ownerId))
#[derive(Event, Debug, Clone)]
pub struct WeaponFired {
    pub shooter: Entity,
    /// Stable owner id (BotId)
    pub shooter_id: u64,
    pub team: TeamId,
    pub slot: SlotKind,
    /// Muzzle position
    pub origin: Vec3,
    /// Raw aim vector (spread included)
    pub direction: Dir3,
    pub damage: u32,
    pub speed: f32,
    pub max_distance: f32,
}

/// Event: ApplyDamage(amount, instigatorTeam, instigatorId, hitPoint, isAreaEffect)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: u32,
    /// Entity that caused the damage (None = world/environment)
    pub instigator: Option<Entity>,
    pub instigator_team: TeamId,
    pub instigator_id: u64,
    pub hit_point: Vec3,
    /// Explosions etc. may hurt their own instigator
    pub is_area_effect: bool,
}

/// Event: урон применён к health ledger
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub hit_point: Vec3,
}

/// Event: актор умер (Health дошёл до 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}
