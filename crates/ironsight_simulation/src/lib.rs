//! Ironsight Simulation Core
//!
//! Headless ECS simulation of the bot decision core (Bevy 0.16, FixedUpdate).
//!
//! Per tick, in order:
//! - perception: combatant index, stale target cleanup, throttled visibility sampling
//! - decision: priority state machine (Retreat > GoToAmmo > Attack/Chase > Search > Patrol)
//! - relay: squad alerts
//! - locomotion: state → destination requests for the navigation provider
//! - combat: ammo/reload/switch state machine, predictive aim, fire
//! - damage + lifecycle: health ledger, deaths, linger, respawn, pickups
//! - replication: host publishes derived state, observers mirror it
//!
//! Only the authoritative host runs the decision/combat sets (see `replication`).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod error;
pub mod logger;
pub mod physics;
pub mod pickups;
pub mod replication;
pub mod schedules;
pub mod spawn;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, BotConfig, BotState, TargetMemory, TargetTracker};
pub use combat::{
    CombatPlugin, CombatTuning, DamageDealt, DamageRequest, EntityDied, Loadout, SlotKind,
    SpreadCurve, WeaponFired, WeaponSlot, WeaponSpec,
};
pub use components::*;
pub use error::{BotSetupError, SetupResult};
pub use logger::{log, log_error, log_info, log_warning};
pub use replication::{ReplicatedBotState, ReplicationPlugin, ReplicationUpdate, SessionAuthority};
pub use schedules::{SimClock, SimSet};
pub use spawn::{bot_bundle, BotSpawnParams, BotSpawner};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .init_resource::<DeterministicRng>()
            .init_resource::<SessionAuthority>();

        schedules::configure_sets(app);

        app.add_plugins((
            physics::PhysicsPlugin,
            AIPlugin,
            CombatPlugin,
            pickups::PickupPlugin,
            spawn::SpawnPlugin,
            ReplicationPlugin,
        ));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Every random draw in the simulation (aim error, cooldown jitter, patrol
/// start, perception phase, route choice) goes through this resource.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт App для headless симуляции
///
/// Only the task pools, no time plugins: the loop is driven by
/// [`step_simulation`], one `FixedUpdate` run per tick, so runs are
/// reproducible regardless of wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(bevy::app::TaskPoolPlugin::default())
        .insert_resource(DeterministicRng::new(seed));
    app
}

/// Advances the simulation by `ticks` fixed ticks.
pub fn step_simulation(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
