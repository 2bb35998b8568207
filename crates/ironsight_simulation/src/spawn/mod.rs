//! Bot spawner: initial population + respawn after death
//!
//! Spawn points are used round-robin, every bot gets a random patrol route
//! with a random start waypoint and direction. A bot spawned here respawns
//! `respawn_delay` seconds after its `EntityDied` (the corpse lingers and
//! despawns on its own, see `combat::systems::damage`).

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{Bot, BotConfig, PatrolCursor};
use crate::combat::{CombatTuning, EntityDied, Loadout};
use crate::components::{Actor, BotId, NavAgent, PatrolRoute, TeamId};
use crate::error::{BotSetupError, SetupResult};
use crate::schedules::{SimClock, SimSet};
use crate::DeterministicRng;

/// Компонент-маркер: бот принадлежит spawner'у (респавнится после смерти)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SpawnerOwned;

/// Spawner configuration + runtime bookkeeping
#[derive(Resource, Debug, Clone)]
pub struct BotSpawner {
    /// Position + rotation of each spawn point
    pub spawn_points: Vec<Transform>,
    /// Patrol routes, one is drawn per spawned bot
    pub routes: Vec<PatrolRoute>,
    /// Bots alive at the same time
    pub count: usize,
    /// Seconds between a death and the replacement spawn
    pub respawn_delay: f32,
    pub team: TeamId,
    pub config: BotConfig,
    pub tuning: CombatTuning,
    pub loadout: Loadout,
    /// Stable ids start here
    pub next_id: u64,
    next_spawn_index: usize,
    spawned_total: u64,
    pending_respawns: Vec<f32>,
    initial_spawn_done: bool,
}

impl Default for BotSpawner {
    fn default() -> Self {
        Self {
            spawn_points: Vec::new(),
            routes: Vec::new(),
            count: 3,
            respawn_delay: 5.0,
            team: 1,
            config: BotConfig::default(),
            tuning: CombatTuning::default(),
            loadout: Loadout::default(),
            next_id: 1,
            next_spawn_index: 0,
            spawned_total: 0,
            pending_respawns: Vec::new(),
            initial_spawn_done: false,
        }
    }
}

impl BotSpawner {
    pub fn new(spawn_points: Vec<Transform>, routes: Vec<PatrolRoute>) -> Self {
        Self {
            spawn_points,
            routes,
            ..Default::default()
        }
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn pending_respawns(&self) -> usize {
        self.pending_respawns.len()
    }

    pub fn validate(&self) -> SetupResult<()> {
        if self.spawn_points.is_empty() {
            return Err(BotSetupError::NoSpawnPoints);
        }
        if !(self.respawn_delay.is_finite() && self.respawn_delay >= 0.0) {
            return Err(BotSetupError::InvalidInterval {
                name: "respawn_delay",
                value: self.respawn_delay,
            });
        }
        self.config.validate()?;
        self.tuning.validate()?;
        self.loadout.validate()
    }

    /// Следующий spawn point (round-robin)
    fn next_spawn_point(&mut self) -> SetupResult<Transform> {
        if self.spawn_points.is_empty() {
            return Err(BotSetupError::NoSpawnPoints);
        }
        let point = self.spawn_points[self.next_spawn_index % self.spawn_points.len()];
        self.next_spawn_index = self.next_spawn_index.wrapping_add(1);
        Ok(point)
    }
}

/// Всё, что нужно для одного бота
#[derive(Debug, Clone)]
pub struct BotSpawnParams {
    pub id: u64,
    pub team: TeamId,
    pub transform: Transform,
    pub config: BotConfig,
    pub tuning: CombatTuning,
    pub loadout: Loadout,
    pub cursor: PatrolCursor,
    pub nav: NavAgent,
}

impl BotSpawnParams {
    pub fn new(id: u64, team: TeamId, position: Vec3) -> Self {
        Self {
            id,
            team,
            transform: Transform::from_translation(position),
            config: BotConfig::default(),
            tuning: CombatTuning::default(),
            loadout: Loadout::default(),
            cursor: PatrolCursor::default(),
            nav: NavAgent::default(),
        }
    }
}

/// Полный набор компонентов бота (brain + collaborators)
///
/// Route is not part of the bundle: a bot without one is valid and idles.
pub fn bot_bundle(params: BotSpawnParams) -> impl Bundle {
    (
        Bot,
        BotId(params.id),
        Actor::new(params.team),
        params.transform,
        params.config,
        params.cursor,
        params.nav,
        params.loadout,
        params.tuning,
    )
}

/// Instantiate one bot from the spawner: next spawn point, random route,
/// random patrol start + direction.
pub fn spawn_bot(
    commands: &mut Commands,
    spawner: &mut BotSpawner,
    rng: &mut impl Rng,
) -> SetupResult<Entity> {
    let transform = spawner.next_spawn_point()?;

    let id = spawner.next_id;
    spawner.next_id += 1;
    spawner.spawned_total += 1;

    let route = if spawner.routes.is_empty() {
        None
    } else {
        Some(spawner.routes[rng.gen_range(0..spawner.routes.len())].clone())
    };

    let mut cursor = PatrolCursor::new(if rng.gen_bool(0.5) { 1 } else { -1 });
    let mut nav = NavAgent::default();
    if let Some(route) = route.as_ref().filter(|route| !route.is_empty()) {
        let start = rng.gen_range(0..route.len());
        cursor.index = Some(start);
        if let Some(waypoint) = route.get(start) {
            nav.set_destination(waypoint);
        }
    }

    let params = BotSpawnParams {
        id,
        team: spawner.team,
        transform,
        config: spawner.config.clone(),
        tuning: spawner.tuning.clone(),
        loadout: spawner.loadout.clone(),
        cursor,
        nav,
    };

    let mut entity_commands = commands.spawn((bot_bundle(params), SpawnerOwned));
    match route {
        Some(route) => {
            entity_commands.insert(route);
        }
        None => crate::log_warning(&format!(
            "⚠️ BotSpawner: no patrol routes, bot {} will idle in place",
            id
        )),
    }

    let entity = entity_commands.id();
    crate::log(&format!(
        "🤖 Spawned bot {} ({:?}) at {:?}",
        id, entity, transform.translation
    ));
    Ok(entity)
}

/// Система: начальная популяция (один раз)
pub fn spawn_initial_bots(
    mut commands: Commands,
    mut spawner: ResMut<BotSpawner>,
    mut rng: ResMut<DeterministicRng>,
) {
    if spawner.initial_spawn_done {
        return;
    }
    spawner.initial_spawn_done = true;

    if let Err(err) = spawner.validate() {
        crate::log_error(&format!("❌ BotSpawner disabled: {}", err));
        return;
    }

    for _ in 0..spawner.count {
        if let Err(err) = spawn_bot(&mut commands, &mut spawner, &mut rng.rng) {
            crate::log_error(&format!("❌ BotSpawner: {}", err));
            return;
        }
    }
    crate::log_info(&format!("Spawned {} bots", spawner.count));
}

/// Система: смерть своего бота → respawn timer
pub fn schedule_respawns(
    mut deaths: EventReader<EntityDied>,
    owned: Query<(), With<SpawnerOwned>>,
    mut spawner: ResMut<BotSpawner>,
) {
    for event in deaths.read() {
        if owned.get(event.entity).is_ok() {
            let delay = spawner.respawn_delay;
            spawner.pending_respawns.push(delay);
        }
    }
}

/// Система: отсчёт respawn timers, spawn по истечении
pub fn tick_respawns(
    mut commands: Commands,
    mut spawner: ResMut<BotSpawner>,
    mut rng: ResMut<DeterministicRng>,
    clock: Res<SimClock>,
) {
    if spawner.pending_respawns.is_empty() {
        return;
    }

    for remaining in spawner.pending_respawns.iter_mut() {
        *remaining -= clock.dt;
    }
    let due = spawner
        .pending_respawns
        .iter()
        .filter(|remaining| **remaining <= 0.0)
        .count();
    spawner.pending_respawns.retain(|remaining| *remaining > 0.0);

    for _ in 0..due {
        if let Err(err) = spawn_bot(&mut commands, &mut spawner, &mut rng.rng) {
            crate::log_error(&format!("❌ BotSpawner respawn failed: {}", err));
        }
    }
}

/// Spawn plugin (active only when a `BotSpawner` resource exists)
pub struct SpawnPlugin;

impl Plugin for SpawnPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (spawn_initial_bots, schedule_respawns, tick_respawns)
                .chain()
                .in_set(SimSet::Lifecycle)
                .run_if(resource_exists::<BotSpawner>),
        );
    }
}
