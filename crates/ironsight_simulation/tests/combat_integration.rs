//! Combat integration test
//!
//! Две команды ботов дерутся headless; spawner респавнит, observer не стреляет.
//!
//! Проверяем:
//! - Health / ammo инварианты каждый тик
//! - Смерть → linger → despawn
//! - Respawn через respawn_delay
//! - Observer: brain off, ни одного выстрела
//! - Host публикует ReplicationUpdate

use bevy::prelude::*;
use ironsight_simulation::ai::{Bot, BrainDisabled, DisableReason};
use ironsight_simulation::*;

const TICKS_PER_SECOND: usize = 60;

fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

/// Бот в `position`, смотрит на `look_at`
fn spawn_fighter(app: &mut App, id: u64, team: TeamId, position: Vec3, look_at: Vec3) -> Entity {
    let mut params = BotSpawnParams::new(id, team, position);
    params.transform = Transform::from_translation(position).looking_at(look_at, Vec3::Y);
    app.world_mut().spawn(bot_bundle(params)).id()
}

fn check_invariants(app: &mut App, tick: usize) {
    let world = app.world_mut();
    let mut bots = world.query_filtered::<(Entity, &Health, &Loadout), With<Bot>>();
    for (entity, health, loadout) in bots.iter(world) {
        assert!(
            health.current <= health.max,
            "tick {}: {:?} health {} > max {}",
            tick,
            entity,
            health.current,
            health.max
        );
        for slot in [&loadout.primary, &loadout.secondary] {
            assert!(
                slot.magazine <= slot.spec.magazine_capacity,
                "tick {}: {:?} magazine overflow",
                tick,
                entity
            );
        }
        let fraction = loadout.ammo_fraction();
        assert!((0.0..=1.0).contains(&fraction));
    }
}

fn bot_count(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query_filtered::<Entity, With<Bot>>().iter(world).count()
}

#[test]
fn test_duel_until_death_and_despawn() {
    let mut app = create_combat_app(42);
    let a = spawn_fighter(&mut app, 1, 1, Vec3::ZERO, Vec3::new(0.0, 0.0, -8.0));
    let b = spawn_fighter(&mut app, 2, 2, Vec3::new(0.0, 0.0, -8.0), Vec3::ZERO);

    let mut first_death_tick = None;
    for tick in 0..6 * TICKS_PER_SECOND {
        step_simulation(&mut app, 1);
        check_invariants(&mut app, tick);

        if first_death_tick.is_none() {
            let dead = [a, b]
                .iter()
                .any(|&entity| app.world().get::<Dead>(entity).is_some());
            if dead {
                first_death_tick = Some(tick);
            }
        }
    }

    let first_death_tick = first_death_tick.expect("somebody died within 6 s");
    assert!(first_death_tick < 4 * TICKS_PER_SECOND);

    // Linger 3 с, потом despawn; выживший (если есть) остаётся
    step_simulation(&mut app, 4 * TICKS_PER_SECOND);
    assert!(bot_count(&mut app) < 2);
    for entity in [a, b] {
        if let Ok(entity_ref) = app.world().get_entity(entity) {
            assert!(entity_ref.get::<Dead>().is_none(), "dead bot was not despawned");
        }
    }
}

#[test]
fn test_spawner_respawns_dead_bot() {
    let mut app = create_combat_app(42);
    let mut spawner = BotSpawner::new(
        vec![Transform::from_xyz(0.0, 0.0, 0.0)],
        vec![PatrolRoute::new(vec![Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)])],
    );
    spawner.count = 1;
    spawner.respawn_delay = 1.0;
    app.insert_resource(spawner);

    step_simulation(&mut app, 1);
    assert_eq!(bot_count(&mut app), 1);

    let bot = {
        let world = app.world_mut();
        world
            .query_filtered::<Entity, With<Bot>>()
            .single(world)
            .expect("one bot")
    };
    app.world_mut().send_event(DamageRequest {
        target: bot,
        amount: 1_000,
        instigator: None,
        instigator_team: NEUTRAL_TEAM,
        instigator_id: 0,
        hit_point: Vec3::ZERO,
        is_area_effect: false,
    });

    step_simulation(&mut app, 1);
    assert!(app.world().get::<Dead>(bot).is_some());
    assert_eq!(app.world().resource::<BotSpawner>().pending_respawns(), 1);

    step_simulation(&mut app, TICKS_PER_SECOND + 1);
    let spawner = app.world().resource::<BotSpawner>();
    assert_eq!(spawner.spawned_total(), 2);
    assert_eq!(spawner.pending_respawns(), 0);

    // Труп ещё лежит (linger 3 с), новый бот уже есть
    assert_eq!(bot_count(&mut app), 2);

    step_simulation(&mut app, 3 * TICKS_PER_SECOND);
    assert_eq!(bot_count(&mut app), 1);
    assert!(app.world().get_entity(bot).is_err());
}

#[test]
fn test_observer_never_runs_brains() {
    let mut app = create_combat_app(42);
    app.insert_resource(SessionAuthority::Observer);

    let bot = spawn_fighter(&mut app, 1, 1, Vec3::ZERO, Vec3::new(0.0, 0.0, -8.0));
    let target = app
        .world_mut()
        .spawn((Actor::new(0), Health::new(100), Transform::from_xyz(0.0, 0.0, -8.0)))
        .id();

    step_simulation(&mut app, 2 * TICKS_PER_SECOND);

    assert_eq!(
        app.world().get::<BrainDisabled>(bot).expect("disabled").reason,
        DisableReason::NotAuthoritative
    );
    assert_eq!(*app.world().get::<BotState>(bot).expect("state"), BotState::Patrol);
    assert_eq!(app.world().get::<Health>(target).expect("health").current, 100);
    let loadout = app.world().get::<Loadout>(bot).expect("loadout");
    assert_eq!(loadout.primary.magazine, loadout.primary.spec.magazine_capacity);
}

#[test]
fn test_host_publishes_state_changes() {
    let mut app = create_combat_app(42);
    let bot = spawn_fighter(&mut app, 5, 1, Vec3::ZERO, Vec3::new(0.0, 0.0, -8.0));
    app.world_mut()
        .spawn((Actor::new(0), Health::new(10_000), Transform::from_xyz(0.0, 0.0, -8.0)));

    step_simulation(&mut app, TICKS_PER_SECOND);

    let replicated = app
        .world()
        .get::<ReplicatedBotState>(bot)
        .expect("host published state");
    assert!(replicated.alive);
    assert_eq!(replicated.state, BotState::Attack);

    // Шлём ту же картину observer'у руками: update несёт BotId, не Entity
    let mut observer = create_combat_app(1);
    observer.insert_resource(SessionAuthority::Observer);
    let mirror = spawn_fighter(&mut observer, 5, 1, Vec3::ZERO, Vec3::new(0.0, 0.0, -8.0));
    observer.world_mut().send_event(ReplicationUpdate {
        bot_id: 5,
        state: *replicated,
    });
    step_simulation(&mut observer, 1);

    let mirrored = observer
        .world()
        .get::<ReplicatedBotState>(mirror)
        .expect("mirrored");
    assert_eq!(mirrored.state, BotState::Attack);
}
