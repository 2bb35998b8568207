//! Physics simulation module
//!
//! Headless kinematic navigation + obstruction traces (no physics engine).

use bevy::prelude::*;

use crate::schedules::SimSet;

pub mod movement;
pub mod trace;

// Re-export основных типов
pub use movement::{integrate_nav_agents, planar_heading, step_agent};
pub use trace::{refresh_occluders, Occluder, Occluders, TraceHit};

/// Plugin: occluder snapshot (start of tick) + navigation step (end of tick)
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Occluders>().add_systems(
            FixedUpdate,
            (
                refresh_occluders.in_set(SimSet::Perception),
                integrate_nav_agents.in_set(SimSet::Movement),
            ),
        );
    }
}
