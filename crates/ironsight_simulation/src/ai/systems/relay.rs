//! Memory & alert relay: deliver squad alerts to allies in radius.

use bevy::prelude::*;

use crate::ai::{
    AllyAlert, Bot, BotState, BotStateChanged, BrainDisabled, TargetMemory, TargetTracker,
};
use crate::components::{Actor, Dead};

/// Система: обработка AllyAlert (Relay, после Decision)
///
/// Receivers: living, brain-enabled bots of the sender's team within the
/// radius. They refresh memory and, when idle (Patrol/Search), escalate to
/// Chase. Idempotent: a repeated alert only refreshes the timestamp.
/// Escalation does not re-broadcast.
pub fn relay_ally_alerts(
    mut alerts: EventReader<AllyAlert>,
    mut receivers: Query<
        (
            Entity,
            &Transform,
            &Actor,
            &mut TargetMemory,
            &mut TargetTracker,
            &mut BotState,
        ),
        (With<Bot>, Without<Dead>, Without<BrainDisabled>),
    >,
    mut state_events: EventWriter<BotStateChanged>,
) {
    for alert in alerts.read() {
        let radius_sq = alert.radius * alert.radius;

        for (entity, transform, actor, mut memory, mut tracker, mut state) in receivers.iter_mut() {
            if entity == alert.sender || actor.team != alert.team {
                continue;
            }
            if transform.translation.distance_squared(alert.origin) > radius_sq {
                continue;
            }

            memory.record_sighting(alert.target_position);

            if tracker.target.is_none() {
                if let Some(target) = alert.target {
                    tracker.set_target(target);
                }
            }

            if matches!(*state, BotState::Patrol | BotState::Search) {
                let previous = *state;
                *state = BotState::Chase;
                state_events.write(BotStateChanged {
                    entity,
                    from: previous,
                    to: BotState::Chase,
                });
                crate::log(&format!(
                    "📢 {:?}: alert from {:?}, {} → Chase",
                    entity,
                    alert.sender,
                    previous.as_str()
                ));
            }
        }
    }
}
