//! Authority & replication gate
//!
//! Ровно один writer состояния ботов: host. На observer'е host-only sets не
//! запускаются вовсе (run conditions в `schedules`), мозги ботов помечаются
//! `BrainDisabled { NotAuthoritative }`, а derived state приходит через
//! `ReplicationUpdate` и зеркалится в `ReplicatedBotState`.
//!
//! Транспорт не входит в core: update сериализуется serde'ом, дальше любой канал.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{Bot, BotState, BrainDisabled, DisableReason};
use crate::components::{BotId, Dead, Health, LinearVelocity};
use crate::schedules::{add_sim_event, SimSet};

/// Роль этого процесса в сессии
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionAuthority {
    /// Authoritative: runs perception/decision/combat
    #[default]
    Host,
    /// Mirrors replicated state only
    Observer,
}

/// Run condition: host-only systems
pub fn is_authoritative(authority: Res<SessionAuthority>) -> bool {
    *authority == SessionAuthority::Host
}

/// Run condition: observer-only systems
pub fn is_observer(authority: Res<SessionAuthority>) -> bool {
    *authority == SessionAuthority::Observer
}

/// Replicated derived state (animation speed, alive/dead, state tag)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedBotState {
    pub move_speed: f32,
    pub alive: bool,
    pub state: BotState,
}

impl Default for ReplicatedBotState {
    fn default() -> Self {
        Self {
            move_speed: 0.0,
            alive: true,
            state: BotState::Patrol,
        }
    }
}

impl ReplicatedBotState {
    /// Speed changes below this are not worth a network update (m/s)
    pub const SPEED_EPSILON: f32 = 0.05;

    /// True if `other` differs enough to publish
    pub fn differs_from(&self, other: &Self) -> bool {
        self.alive != other.alive
            || self.state != other.state
            || (self.move_speed - other.move_speed).abs() > Self::SPEED_EPSILON
    }
}

/// Event: host → observers (keyed by stable `BotId`, never by Entity)
#[derive(Event, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationUpdate {
    pub bot_id: u64,
    pub state: ReplicatedBotState,
}

/// Система (host): публикует изменившееся derived state
///
/// Боты обходятся по BotId, порядок updates детерминирован.
pub fn publish_replicated_state(
    mut commands: Commands,
    mut bots: Query<
        (
            Entity,
            &BotId,
            &BotState,
            &Health,
            &LinearVelocity,
            Has<Dead>,
            Option<&mut ReplicatedBotState>,
        ),
        With<Bot>,
    >,
    mut updates: EventWriter<ReplicationUpdate>,
) {
    let mut sorted: Vec<_> = bots.iter_mut().collect();
    sorted.sort_by_key(|(_, bot_id, ..)| bot_id.0);

    for (entity, bot_id, state, health, velocity, dead, published) in sorted {
        let current = ReplicatedBotState {
            move_speed: velocity.0.length(),
            alive: health.is_alive() && !dead,
            state: *state,
        };

        match published {
            Some(mut published) => {
                if !published.differs_from(&current) {
                    continue;
                }
                *published = current;
            }
            None => {
                commands.entity(entity).insert(current);
            }
        }

        updates.write(ReplicationUpdate {
            bot_id: bot_id.0,
            state: current,
        });
    }
}

/// Система (observer): мозг бота узнаёт, что он не authoritative
pub fn disable_observer_brains(
    mut commands: Commands,
    bots: Query<(Entity, Option<&BotId>), (With<Bot>, Without<BrainDisabled>)>,
) {
    for (entity, bot_id) in bots.iter() {
        commands.entity(entity).insert(BrainDisabled {
            reason: DisableReason::NotAuthoritative,
        });
        crate::log(&format!(
            "🔒 Bot {:?} (id {:?}): not authoritative, mirroring host state",
            entity,
            bot_id.map(|id| id.0)
        ));
    }
}

/// Система (observer): применяет входящие updates к зеркалам по BotId
pub fn apply_replication_updates(
    mut commands: Commands,
    mut updates: EventReader<ReplicationUpdate>,
    mut mirrors: Query<(Entity, &BotId, Option<&mut ReplicatedBotState>), With<Bot>>,
) {
    let by_id: HashMap<u64, Entity> = mirrors
        .iter()
        .map(|(entity, bot_id, _)| (bot_id.0, entity))
        .collect();

    for update in updates.read() {
        let Some(&entity) = by_id.get(&update.bot_id) else {
            // Бот ещё не заспавнен у observer'а (или уже удалён)
            continue;
        };
        let Ok((_, _, mirror)) = mirrors.get_mut(entity) else {
            continue;
        };
        match mirror {
            Some(mut mirror) => *mirror = update.state,
            None => {
                commands.entity(entity).insert(update.state);
            }
        }
    }
}

/// Replication plugin
pub struct ReplicationPlugin;

impl Plugin for ReplicationPlugin {
    fn build(&self, app: &mut App) {
        add_sim_event::<ReplicationUpdate>(app);

        app.add_systems(
            FixedUpdate,
            (
                publish_replicated_state.run_if(is_authoritative),
                (disable_observer_brains, apply_replication_updates)
                    .chain()
                    .run_if(is_observer),
            )
                .in_set(SimSet::Replication),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Actor;
    use bevy::ecs::system::RunSystemOnce;

    fn replication_world(authority: SessionAuthority) -> World {
        let mut world = World::new();
        world.insert_resource(authority);
        world.init_resource::<Events<ReplicationUpdate>>();
        world
    }

    #[test]
    fn test_host_publishes_only_changes() {
        let mut world = replication_world(SessionAuthority::Host);
        let bot = world.spawn((Bot, BotId(7), Actor::new(1))).id();

        world.run_system_once(publish_replicated_state).expect("publish runs");
        assert_eq!(world.resource::<Events<ReplicationUpdate>>().len(), 1);

        // Ничего не изменилось → нет нового update
        world.run_system_once(publish_replicated_state).expect("publish runs");
        assert_eq!(world.resource::<Events<ReplicationUpdate>>().len(), 1);

        *world.get_mut::<BotState>(bot).expect("state") = BotState::Chase;
        world.get_mut::<LinearVelocity>(bot).expect("velocity").0 = Vec3::new(3.0, 0.0, 4.0);
        world.run_system_once(publish_replicated_state).expect("publish runs");

        let events = world.resource::<Events<ReplicationUpdate>>();
        let mut reader = events.get_cursor();
        let last = reader.read(events).last().expect("update").clone();
        assert_eq!(last.bot_id, 7);
        assert_eq!(last.state.state, BotState::Chase);
        assert!((last.state.move_speed - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_observer_disables_brain_and_mirrors() {
        let mut world = replication_world(SessionAuthority::Observer);
        let bot = world.spawn((Bot, BotId(3), Actor::new(1))).id();

        world.run_system_once(disable_observer_brains).expect("disable runs");
        assert_eq!(
            world.get::<BrainDisabled>(bot).expect("disabled").reason,
            DisableReason::NotAuthoritative
        );

        world.send_event(ReplicationUpdate {
            bot_id: 3,
            state: ReplicatedBotState {
                move_speed: 2.5,
                alive: false,
                state: BotState::Retreat,
            },
        });
        world.send_event(ReplicationUpdate {
            bot_id: 99, // неизвестный бот: игнорируем
            state: ReplicatedBotState::default(),
        });
        world.run_system_once(apply_replication_updates).expect("apply runs");

        let mirror = world.get::<ReplicatedBotState>(bot).expect("mirror");
        assert!(!mirror.alive);
        assert_eq!(mirror.state, BotState::Retreat);
        // Decision state на observer'е не трогаем
        assert_eq!(*world.get::<BotState>(bot).expect("state"), BotState::Patrol);
    }

    #[test]
    fn test_update_payload_round_trip() {
        let update = ReplicationUpdate {
            bot_id: 42,
            state: ReplicatedBotState {
                move_speed: 3.5,
                alive: true,
                state: BotState::GoToAmmo,
            },
        };

        let json = serde_json::to_string(&update).expect("serialize");
        assert!(json.contains("GoToAmmo"));
        let decoded: ReplicationUpdate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, update);
    }

    #[test]
    fn test_speed_jitter_is_not_a_change() {
        let a = ReplicatedBotState::default();
        let mut b = a;
        b.move_speed = 0.01;
        assert!(!a.differs_from(&b));
        b.alive = false;
        assert!(a.differs_from(&b));
    }
}
