//! Bot decision core
//!
//! Порядок выполнения (FixedUpdate, host only):
//! 1. Perception: setup новых ботов → CombatantIndex → stale targets → throttled sampling
//! 2. Decision: priority FSM + transition actions (alerts, nav reset)
//! 3. Relay: AllyAlert → союзники в радиусе
//! 4. Locomotion: state → NavAgent destination

use bevy::prelude::*;

use crate::physics::refresh_occluders;
use crate::schedules::{add_sim_event, SimSet};

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::{AllyAlert, BotStateChanged};
pub use systems::{
    decide, is_target_visible, CombatantIndex, Combatant, DecisionInput, Viewpoint,
};

/// AI Plugin
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        add_sim_event::<AllyAlert>(app);
        add_sim_event::<BotStateChanged>(app);

        app.init_resource::<CombatantIndex>()
            .add_systems(
                FixedUpdate,
                (
                    systems::configure_new_bots,
                    systems::refresh_combatant_index,
                    systems::invalidate_stale_targets,
                    systems::sample_perception,
                )
                    .chain() // Последовательное выполнение для детерминизма
                    .after(refresh_occluders)
                    .in_set(SimSet::Perception),
            )
            .add_systems(FixedUpdate, systems::run_decisions.in_set(SimSet::Decision))
            .add_systems(FixedUpdate, systems::relay_ally_alerts.in_set(SimSet::Relay))
            .add_systems(FixedUpdate, systems::drive_locomotion.in_set(SimSet::Locomotion));
    }
}
