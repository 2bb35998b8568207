//! Simulation clock and per-tick system ordering
//!
//! # Архитектура
//!
//! **FixedUpdate** → `advance_clock` (first), then the host-only sets in a
//! strict chain, then replication:
//!
//! ```text
//! Clock → Perception → Decision → Relay → Locomotion → Combat
//!       → Projectiles → Damage → Lifecycle → Movement → Replication
//! ```
//!
//! Every wait in the simulation (reload, switch, linger, respawn, perception
//! throttle) is a timer decremented by `SimClock::dt`, never a blocking call.

use bevy::prelude::*;

use crate::replication::is_authoritative;

/// Fixed tick length (60 Hz)
pub const DEFAULT_TICK_SECONDS: f32 = 1.0 / 60.0;

/// Глобальный tick counter + fixed delta
///
/// Wraparound safe: tick использует wrapping_add.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub tick: u64,
    /// Seconds per tick (constant for the whole session)
    pub dt: f32,
    /// Simulated seconds since start
    pub elapsed: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::with_dt(DEFAULT_TICK_SECONDS)
    }
}

impl SimClock {
    pub fn with_dt(dt: f32) -> Self {
        Self {
            tick: 0,
            dt,
            elapsed: 0.0,
        }
    }

    /// Number of ticks needed to cover `seconds` (rounded up)
    pub fn ticks_for(&self, seconds: f32) -> usize {
        (seconds / self.dt).ceil().max(0.0) as usize
    }
}

/// Per-tick stages of the simulation loop
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Clock,
    Perception,
    Decision,
    Relay,
    Locomotion,
    Combat,
    Projectiles,
    Damage,
    Lifecycle,
    Movement,
    Replication,
}

/// Stages that write bot decision state: host only
const HOST_ONLY: [SimSet; 9] = [
    SimSet::Perception,
    SimSet::Decision,
    SimSet::Relay,
    SimSet::Locomotion,
    SimSet::Combat,
    SimSet::Projectiles,
    SimSet::Damage,
    SimSet::Lifecycle,
    SimSet::Movement,
];

pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            SimSet::Clock,
            SimSet::Perception,
            SimSet::Decision,
            SimSet::Relay,
            SimSet::Locomotion,
            SimSet::Combat,
            SimSet::Projectiles,
            SimSet::Damage,
            SimSet::Lifecycle,
            SimSet::Movement,
            SimSet::Replication,
        )
            .chain(),
    );

    for set in HOST_ONLY {
        app.configure_sets(FixedUpdate, set.run_if(is_authoritative));
    }

    app.add_systems(FixedUpdate, advance_clock.in_set(SimSet::Clock));
}

/// Registers an event whose buffers rotate once per simulation tick.
///
/// The loop only runs `FixedUpdate`, so the `First`-schedule event update
/// never fires; an event written in tick N is readable in ticks N and N+1.
pub(crate) fn add_sim_event<E: Event>(app: &mut App) {
    app.add_event::<E>()
        .add_systems(FixedUpdate, rotate_events::<E>.in_set(SimSet::Clock));
}

fn rotate_events<E: Event>(mut events: ResMut<Events<E>>) {
    events.update();
}

/// System: advance tick counter (FixedUpdate, runs first)
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick = clock.tick.wrapping_add(1);
    clock.elapsed += clock.dt as f64;
}
