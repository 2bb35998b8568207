//! Combat system module
//!
//! ECS ответственность:
//! - Loadout state: magazine/reserve, reload, slot switch, fire cooldown
//! - Fire decisions: range, line of fire, lead prediction, spread curve
//! - Health ledger: DamageRequest → Health, friendly fire, deaths
//!
//! Поток событий за тик:
//! `resolve_combat` → WeaponFired → `resolve_hitscan` → DamageRequest
//! → `apply_damage_requests` → DamageDealt / EntityDied → `handle_deaths`

use bevy::prelude::*;

use crate::schedules::{add_sim_event, SimSet};

pub mod aim;
pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use aim::SpreadCurve;
pub use components::*;
pub use events::{DamageDealt, DamageRequest, EntityDied, WeaponFired};
pub use systems::{is_damage_allowed, DEATH_LINGER_SECONDS};

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate, host only):
/// 1. Combat: resolve_combat: timers, fire/reload/switch decisions
/// 2. Projectiles: resolve_hitscan: WeaponFired → DamageRequest
/// 3. Damage: apply_damage_requests: health ledger
/// 4. Lifecycle: handle_deaths → despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        add_sim_event::<WeaponFired>(app);
        add_sim_event::<DamageRequest>(app);
        add_sim_event::<DamageDealt>(app);
        add_sim_event::<EntityDied>(app);

        // Регистрация систем в FixedUpdate
        app.add_systems(FixedUpdate, systems::resolve_combat.in_set(SimSet::Combat))
            .add_systems(FixedUpdate, systems::resolve_hitscan.in_set(SimSet::Projectiles))
            .add_systems(
                FixedUpdate,
                systems::apply_damage_requests.in_set(SimSet::Damage),
            )
            .add_systems(
                FixedUpdate,
                (systems::handle_deaths, systems::despawn_after_timeout)
                    .chain()
                    .in_set(SimSet::Lifecycle),
            );
    }
}
