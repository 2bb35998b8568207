//! Health / ammo pickup points
//!
//! A bot inside the pickup radius collects it: health heals (only if hurt),
//! ammo refills reserves up to their starting amount (only if something is
//! missing). A collected pickup is unavailable until its cooldown runs out.

use bevy::prelude::*;

use crate::ai::Bot;
use crate::combat::Loadout;
use crate::components::{Dead, Health};
use crate::schedules::SimClock;

/// Что даёт pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Health { amount: u32 },
    Ammo,
}

/// Pickup point (Transform = позиция)
#[derive(Component, Debug, Clone, PartialEq)]
#[require(Transform)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Collection radius (meters)
    pub radius: f32,
    /// Seconds until the pickup is back after collection
    pub respawn_time: f32,
    /// Remaining cooldown (≤ 0 → available)
    pub cooldown: f32,
}

impl Pickup {
    pub const DEFAULT_RADIUS: f32 = 1.5;
    pub const DEFAULT_RESPAWN_TIME: f32 = 15.0;

    pub fn health(amount: u32) -> Self {
        Self::new(PickupKind::Health { amount })
    }

    pub fn ammo() -> Self {
        Self::new(PickupKind::Ammo)
    }

    fn new(kind: PickupKind) -> Self {
        Self {
            kind,
            radius: Self::DEFAULT_RADIUS,
            respawn_time: Self::DEFAULT_RESPAWN_TIME,
            cooldown: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Applies a pickup to one bot. Returns false when the bot has no use for it
/// (full health / full reserves), the pickup then stays in place.
pub fn apply_pickup(kind: PickupKind, health: &mut Health, loadout: Option<&mut Loadout>) -> bool {
    match kind {
        PickupKind::Health { amount } => {
            if !health.is_alive() || health.current >= health.max {
                return false;
            }
            health.heal(amount);
            true
        }
        PickupKind::Ammo => {
            let Some(loadout) = loadout else {
                return false;
            };
            let missing = [&loadout.primary, &loadout.secondary]
                .iter()
                .any(|slot| slot.reserve < slot.spec.starting_reserve);
            if !missing {
                return false;
            }
            loadout.refill_reserves();
            true
        }
    }
}

/// Система: сбор pickup'ов (Movement, после навигации)
///
/// Боты обходятся в порядке entity index, так что при двух претендентах
/// результат детерминирован.
pub fn collect_pickups(
    mut bots: Query<(Entity, &Transform, &mut Health, Option<&mut Loadout>), (With<Bot>, Without<Dead>)>,
    mut pickups: Query<(Entity, &Transform, &mut Pickup), Without<Bot>>,
) {
    let mut order: Vec<Entity> = bots.iter().map(|(entity, ..)| entity).collect();
    order.sort_by_key(|entity| entity.index());

    for (pickup_entity, pickup_transform, mut pickup) in pickups.iter_mut() {
        if !pickup.is_available() {
            continue;
        }

        for &bot in &order {
            let Ok((entity, transform, mut health, loadout)) = bots.get_mut(bot) else {
                continue;
            };
            let in_range = transform.translation.distance_squared(pickup_transform.translation)
                <= pickup.radius * pickup.radius;
            if !in_range {
                continue;
            }

            if apply_pickup(pickup.kind, &mut health, loadout.map(|loadout| loadout.into_inner())) {
                pickup.cooldown = pickup.respawn_time;
                crate::log(&format!(
                    "📦 {:?} collected {:?} ({:?})",
                    entity, pickup.kind, pickup_entity
                ));
                break;
            }
        }
    }
}

/// Система: pickup cooldown countdown (Lifecycle)
pub fn tick_pickup_cooldowns(mut pickups: Query<&mut Pickup>, clock: Res<SimClock>) {
    for mut pickup in pickups.iter_mut() {
        if pickup.cooldown > 0.0 {
            pickup.cooldown -= clock.dt;
        }
    }
}

/// Pickup plugin
pub struct PickupPlugin;

impl Plugin for PickupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                tick_pickup_cooldowns.in_set(crate::schedules::SimSet::Lifecycle),
                collect_pickups
                    .after(crate::physics::integrate_nav_agents)
                    .in_set(crate::schedules::SimSet::Movement),
            ),
        );
    }
}
