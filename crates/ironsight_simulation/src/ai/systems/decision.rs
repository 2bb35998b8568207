//! Decision engine: priority state machine + transition actions.
//!
//! `decide` is a pure function of the tick's inputs; `run_decisions` applies
//! the result and performs the on-enter actions. Per-state behaviour lives in
//! locomotion and the combat resolver.

use bevy::prelude::*;

use crate::ai::{
    AllyAlert, Bot, BotConfig, BotState, BotStateChanged, BrainDisabled, CombatantIndex,
    PatrolCursor, TargetMemory, TargetTracker,
};
use crate::combat::Loadout;
use crate::components::{Actor, Dead, Health, HealthSource, NavAgent, Vitals};

/// Everything `decide` looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInput {
    pub previous: BotState,
    pub health_fraction: f32,
    pub ammo_fraction: f32,
    pub target_visible: bool,
    /// Distance to the current target (ignored when not visible)
    pub target_distance: f32,
    pub time_since_last_seen: f32,
}

/// Priority evaluation, first match wins:
/// Retreat > GoToAmmo > Attack/Chase > Search > Patrol
pub fn decide(input: &DecisionInput, config: &BotConfig) -> BotState {
    let alive = input.health_fraction > 0.0;
    if alive && input.health_fraction <= config.low_health_threshold {
        return BotState::Retreat;
    }

    if input.ammo_fraction <= config.low_ammo_threshold {
        return BotState::GoToAmmo;
    }

    // Цель дальше give-up distance считается невидимой
    if input.target_visible && input.target_distance <= config.give_up_distance {
        // Hysteresis: уже атакуем → выходим только за внешней границей
        let attack_distance = if input.previous == BotState::Attack {
            config.attack_exit_distance()
        } else {
            config.attack_enter_distance()
        };

        return if input.target_distance <= attack_distance {
            BotState::Attack
        } else {
            BotState::Chase
        };
    }

    let was_hunting = matches!(
        input.previous,
        BotState::Chase | BotState::Attack | BotState::Search
    );
    if was_hunting && input.time_since_last_seen < config.max_search_time {
        return BotState::Search;
    }

    BotState::Patrol
}

/// Система: evaluate every active bot once per tick
///
/// Bots off the navigable surface keep their state untouched.
pub fn run_decisions(
    mut bots: Query<
        (
            Entity,
            &Transform,
            &Actor,
            &Health,
            &Loadout,
            &BotConfig,
            &TargetTracker,
            &TargetMemory,
            &mut BotState,
            &mut NavAgent,
            &mut PatrolCursor,
        ),
        (With<Bot>, Without<Dead>, Without<BrainDisabled>),
    >,
    index: Res<CombatantIndex>,
    mut state_events: EventWriter<BotStateChanged>,
    mut alerts: EventWriter<AllyAlert>,
) {
    for (
        entity,
        transform,
        actor,
        health,
        loadout,
        config,
        tracker,
        memory,
        mut state,
        mut nav,
        mut cursor,
    ) in bots.iter_mut()
    {
        if !nav.on_navigable_surface {
            continue;
        }

        let vitals = Vitals::new(actor, health);
        let input = DecisionInput {
            previous: *state,
            health_fraction: vitals.health_fraction(),
            ammo_fraction: loadout.ammo_fraction(),
            target_visible: tracker.visible && tracker.target.is_some(),
            target_distance: tracker.distance,
            time_since_last_seen: memory.time_since_last_seen,
        };

        let next = decide(&input, config);
        if next == *state {
            continue;
        }

        let previous = *state;
        *state = next;

        crate::log(&format!(
            "🧠 {:?}: {} → {} (hp {:.2}, ammo {:.2}, dist {:.1})",
            entity,
            previous.as_str(),
            next.as_str(),
            input.health_fraction,
            input.ammo_fraction,
            input.target_distance
        ));
        state_events.write(BotStateChanged {
            entity,
            from: previous,
            to: next,
        });

        // Transition actions
        match next {
            BotState::Chase | BotState::Attack => {
                let target = tracker.target.and_then(|target| index.living(target));
                if let Some(target) = target {
                    alerts.write(AllyAlert {
                        sender: entity,
                        team: actor.team,
                        origin: transform.translation,
                        radius: config.alert_radius,
                        target_position: target.position,
                        target: Some(target.entity),
                    });
                }
            }
            BotState::Retreat | BotState::GoToAmmo => {
                nav.clear_destination();
            }
            BotState::Patrol => {
                cursor.reset();
            }
            BotState::Search => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(previous: BotState) -> DecisionInput {
        DecisionInput {
            previous,
            health_fraction: 1.0,
            ammo_fraction: 1.0,
            target_visible: false,
            target_distance: 0.0,
            time_since_last_seen: f32::INFINITY,
        }
    }

    fn visible_at(previous: BotState, distance: f32) -> DecisionInput {
        DecisionInput {
            target_visible: true,
            target_distance: distance,
            time_since_last_seen: 0.0,
            ..input(previous)
        }
    }

    #[test]
    fn test_low_health_retreats_from_any_state() {
        let config = BotConfig::default();
        for previous in [
            BotState::Patrol,
            BotState::Chase,
            BotState::Attack,
            BotState::Search,
            BotState::Retreat,
            BotState::GoToAmmo,
        ] {
            let low = DecisionInput {
                health_fraction: 0.15,
                ..visible_at(previous, 5.0)
            };
            assert_eq!(decide(&low, &config), BotState::Retreat);
        }
    }

    #[test]
    fn test_low_health_beats_low_ammo() {
        let config = BotConfig::default();
        let both = DecisionInput {
            health_fraction: 0.1,
            ammo_fraction: 0.05,
            ..input(BotState::Patrol)
        };
        assert_eq!(decide(&both, &config), BotState::Retreat);
    }

    #[test]
    fn test_zero_health_never_retreats() {
        let config = BotConfig::default();
        let dead = DecisionInput {
            health_fraction: 0.0,
            ..input(BotState::Patrol)
        };
        assert_eq!(decide(&dead, &config), BotState::Patrol);
    }

    #[test]
    fn test_low_ammo_goes_to_ammo() {
        let config = BotConfig::default();
        let low = DecisionInput {
            ammo_fraction: 0.2,
            ..visible_at(BotState::Attack, 5.0)
        };
        assert_eq!(decide(&low, &config), BotState::GoToAmmo);
    }

    #[test]
    fn test_chase_far_attack_close() {
        let config = BotConfig::default();
        assert_eq!(decide(&visible_at(BotState::Patrol, 20.0), &config), BotState::Chase);
        assert_eq!(decide(&visible_at(BotState::Patrol, 5.0), &config), BotState::Attack);
        assert_eq!(decide(&visible_at(BotState::Chase, 11.0), &config), BotState::Attack);
    }

    #[test]
    fn test_attack_hysteresis() {
        let config = BotConfig::default();
        // Между 11 и 13 м: Chase остаётся Chase, Attack остаётся Attack
        assert_eq!(decide(&visible_at(BotState::Chase, 12.0), &config), BotState::Chase);
        assert_eq!(decide(&visible_at(BotState::Attack, 12.0), &config), BotState::Attack);
        assert_eq!(decide(&visible_at(BotState::Attack, 13.5), &config), BotState::Chase);
    }

    #[test]
    fn test_beyond_give_up_distance_is_not_visible() {
        let config = BotConfig::default();
        let far = DecisionInput {
            time_since_last_seen: f32::INFINITY,
            ..visible_at(BotState::Patrol, 130.0)
        };
        assert_eq!(decide(&far, &config), BotState::Patrol);
    }

    #[test]
    fn test_lost_target_searches_then_patrols() {
        let config = BotConfig::default();
        let lost = DecisionInput {
            time_since_last_seen: 3.0,
            ..input(BotState::Chase)
        };
        assert_eq!(decide(&lost, &config), BotState::Search);

        let still_searching = DecisionInput {
            time_since_last_seen: 9.9,
            ..input(BotState::Search)
        };
        assert_eq!(decide(&still_searching, &config), BotState::Search);

        let expired = DecisionInput {
            time_since_last_seen: 10.0,
            ..input(BotState::Search)
        };
        assert_eq!(decide(&expired, &config), BotState::Patrol);
    }

    #[test]
    fn test_patrol_does_not_start_searching() {
        let config = BotConfig::default();
        let fresh_memory = DecisionInput {
            time_since_last_seen: 1.0,
            ..input(BotState::Patrol)
        };
        assert_eq!(decide(&fresh_memory, &config), BotState::Patrol);
    }
}
