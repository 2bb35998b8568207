//! Headless симуляция Ironsight
//!
//! Небольшая арена: spawner с тремя ботами, неподвижный игрок-мишень,
//! стена посередине, аптечка и ammo pickup. Прогоняет 30 секунд и пишет
//! сводку состояний ботов в лог.

use bevy::prelude::*;
use ironsight_simulation::ai::Bot;
use ironsight_simulation::pickups::Pickup;
use ironsight_simulation::*;

const SEED: u64 = 42;
const SECONDS: usize = 30;

fn main() {
    let mut app = build_arena(SEED);

    let ticks_per_second = app.world().resource::<SimClock>().ticks_for(1.0);

    for second in 1..=SECONDS {
        step_simulation(&mut app, ticks_per_second);

        if second % 5 == 0 {
            let world = app.world_mut();
            let mut bots = world.query_filtered::<(&BotId, &BotState, &Health), With<Bot>>();
            let mut summary: Vec<_> = bots
                .iter(world)
                .map(|(id, state, health)| (id.0, *state, health.current))
                .collect();
            summary.sort_by_key(|(id, ..)| *id);

            let line = summary
                .iter()
                .map(|(id, state, hp)| format!("#{} {} ({} hp)", id, state.as_str(), hp))
                .collect::<Vec<_>>()
                .join(", ");
            log_info(&format!("t={}s: {}", second, line));
        }
    }

    let spawned = app.world().resource::<BotSpawner>().spawned_total();
    log_info(&format!("Simulation complete! ({} bots spawned in total)", spawned));
}

/// App + spawner + статичная часть арены
fn build_arena(seed: u64) -> App {
    // create_headless_app поднимает logger, до него строки теряются
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    log_info(&format!("Starting Ironsight headless simulation (seed: {})", seed));

    let routes = vec![
        PatrolRoute::new(vec![
            Vec3::new(-20.0, 0.0, -20.0),
            Vec3::new(-20.0, 0.0, 20.0),
            Vec3::new(-5.0, 0.0, 20.0),
        ]),
        PatrolRoute::new(vec![
            Vec3::new(20.0, 0.0, -20.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, -20.0),
        ]),
    ];
    let spawner = BotSpawner::new(
        vec![
            Transform::from_xyz(-25.0, 0.0, -25.0),
            Transform::from_xyz(25.0, 0.0, -25.0),
        ],
        routes,
    );
    app.insert_resource(spawner);
    spawn_scenery(app.world_mut());
    app
}

fn spawn_scenery(world: &mut World) {
    // Игрок-мишень (team 0)
    world.spawn((Actor::new(0), Health::new(200), Transform::from_xyz(0.0, 0.0, 15.0)));
    // Стена между спавном и игроком
    world.spawn((
        BlockingVolume::new(Vec3::new(6.0, 1.5, 0.5)),
        Transform::from_xyz(0.0, 1.5, 0.0),
    ));
    world.spawn((Pickup::health(25), Transform::from_xyz(-10.0, 0.0, -10.0)));
    world.spawn((Pickup::ammo(), Transform::from_xyz(10.0, 0.0, -10.0)));
}
