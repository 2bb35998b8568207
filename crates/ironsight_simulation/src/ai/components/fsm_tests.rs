//! Tests for bot brain components.

#[cfg(test)]
mod tests {
    use super::super::fsm::{BotConfig, BotState, PatrolCursor, TargetMemory, TargetTracker};
    use crate::error::BotSetupError;
    use bevy::prelude::*;

    #[test]
    fn test_bot_state_default() {
        let state = BotState::default();
        assert_eq!(state, BotState::Patrol);
        assert!(!state.is_engaging());
    }

    #[test]
    fn test_engaging_states() {
        assert!(BotState::Attack.is_engaging());
        assert!(BotState::Chase.is_engaging());
        assert!(BotState::Retreat.is_engaging());
        assert!(!BotState::Search.is_engaging());
        assert!(!BotState::GoToAmmo.is_engaging());

        assert!(BotState::Chase.is_pursuit());
        assert!(!BotState::Retreat.is_pursuit());
    }

    #[test]
    fn test_bot_config_default() {
        let config = BotConfig::default();
        assert_eq!(config.view_radius, 60.0);
        assert_eq!(config.ideal_combat_distance, 10.0);
        assert_eq!(config.low_health_threshold, 0.2);
        assert_eq!(config.max_search_time, 10.0);
        assert!((config.attack_enter_distance() - 11.0).abs() < 1e-5);
        assert!((config.attack_exit_distance() - 13.0).abs() < 1e-5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bot_config_rejects_bad_values() {
        let config = BotConfig {
            low_ammo_threshold: 1.5,
            ..default()
        };
        assert!(matches!(
            config.validate(),
            Err(BotSetupError::InvalidThreshold { name: "low_ammo_threshold", .. })
        ));

        let config = BotConfig {
            view_radius: 0.0,
            ..default()
        };
        assert!(config.validate().is_err());

        let config = BotConfig {
            attack_exit_factor: 1.0,
            ..default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_decay() {
        let mut memory = TargetMemory::default();
        assert_eq!(memory.recall(10.0), None);

        memory.record_sighting(Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(memory.recall(10.0), Some(Vec3::new(5.0, 0.0, 5.0)));

        for _ in 0..10 {
            memory.age(1.0);
        }
        assert_eq!(memory.recall(10.0), None); // Окно поиска истекло
    }

    #[test]
    fn test_tracker_set_target_resets_visibility() {
        let mut tracker = TargetTracker::default();
        let target = Entity::from_raw(7);

        tracker.set_target(target);
        tracker.visible = true;
        tracker.set_target(target); // Тот же target: видимость сохраняется
        assert!(tracker.visible);

        tracker.set_target(Entity::from_raw(8));
        assert!(!tracker.visible);

        tracker.clear();
        assert_eq!(tracker.target, None);
    }

    #[test]
    fn test_patrol_cursor_ping_pong() {
        let mut cursor = PatrolCursor::new(1);
        cursor.index = Some(0);

        let visited: Vec<_> = (0..6).filter_map(|_| cursor.advance(3)).collect();
        assert_eq!(visited, vec![1, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn test_patrol_cursor_backward_start() {
        let mut cursor = PatrolCursor::new(-1);
        cursor.index = Some(1);

        assert_eq!(cursor.advance(3), Some(0));
        assert_eq!(cursor.advance(3), Some(1)); // Развернулся на конце маршрута
        assert_eq!(cursor.direction, 1);
    }

    #[test]
    fn test_patrol_cursor_degenerate_routes() {
        let mut cursor = PatrolCursor::default();
        assert_eq!(cursor.advance(0), None);

        cursor.index = Some(0);
        assert_eq!(cursor.advance(1), Some(0));

        cursor.index = Some(9); // Маршрут стал короче
        assert_eq!(cursor.advance(2), Some(0));
    }
}
